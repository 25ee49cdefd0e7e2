//! Integration tests for anchor resolution against a document source.

use margins_anchor::{AnchorResolver, engine};
use margins_core::types::id::RoomId;

use crate::helpers::TestApp;

const PASSAGE: &str = "In the beginning God created the heavens and the earth.";

#[tokio::test]
async fn test_anchor_roundtrip_in_room() {
    let app = TestApp::new();
    let room = RoomId::new();
    app.documents.put(room, PASSAGE);

    let resolver = AnchorResolver::new(app.documents.clone());

    let anchor = resolver.create_in_room(room, 0, 16).await.expect("create");
    assert_eq!(anchor.selected_text, "In the beginning");

    let resolution = resolver
        .resolve_in_room(room, &anchor)
        .await
        .expect("source ok")
        .expect("unmodified document resolves");
    assert!(resolution.is_exact());
    assert_eq!(resolution.span(), (0, 16));
}

#[tokio::test]
async fn test_offset_drift_falls_back_to_search() {
    let app = TestApp::new();
    let room = RoomId::new();
    app.documents.put(room, PASSAGE);

    let resolver = AnchorResolver::new(app.documents.clone());
    let anchor = resolver.create_in_room(room, 0, 16).await.expect("create");

    // An editor prepends a heading; every offset drifts.
    app.documents.put(room, format!("Week One Study\n\n{PASSAGE}"));

    let resolution = resolver
        .resolve_in_room(room, &anchor)
        .await
        .expect("source ok")
        .expect("fallback still finds the text");
    assert!(!resolution.is_exact());

    let (start, end) = resolution.span();
    assert_eq!(end - start, 16);
    assert_eq!(start, 16); // after "Week One Study\n\n"
}

#[tokio::test]
async fn test_deleted_text_resolves_to_none() {
    let app = TestApp::new();
    let room = RoomId::new();
    app.documents.put(room, PASSAGE);

    let resolver = AnchorResolver::new(app.documents.clone());
    let anchor = resolver.create_in_room(room, 0, 16).await.expect("create");

    app.documents.put(room, "An entirely different passage this week.");

    // The anchored text is gone: the comment becomes a positionless
    // discussion item, never an error and never dropped.
    let resolution = resolver
        .resolve_in_room(room, &anchor)
        .await
        .expect("source ok");
    assert!(resolution.is_none());
}

#[test]
fn test_engine_matches_resolver_semantics() {
    // The pure engine is what the resolver delegates to.
    let anchor = engine::create_anchor(PASSAGE, 17, 20).expect("create");
    assert_eq!(anchor.selected_text, "God");

    let resolution = engine::resolve(PASSAGE, &anchor).expect("resolves");
    assert_eq!(resolution.span(), (17, 20));
}
