//! Integration tests for the full annotation flow: anchored comments over
//! the gateway, marker grouping on the receiving side, and edit
//! semantics.

use margins_anchor::engine;
use margins_annotation::group_by_anchor;
use margins_core::types::id::RoomId;
use margins_realtime::collaborators::CommentStore;
use margins_realtime::message::types::{ClientEvent, ServerEvent};

use crate::helpers::TestApp;

const PASSAGE: &str = "Week One.\nIn the beginning God created the heavens and the earth.";

#[tokio::test]
async fn test_two_reader_annotation_scenario() {
    let app = TestApp::new();
    let room = RoomId::new();
    app.documents.put(room, PASSAGE);

    let (ada, ada_tokens) = app.login("Ada").await;
    let (ben, ben_tokens) = app.login("Ben").await;
    app.grant(&ada, room);
    app.grant(&ben, room);

    let mut conn_a = app.connect(&ada_tokens.access_token);
    let mut conn_b = app.connect(&ben_tokens.access_token);
    conn_a.emit(&ClientEvent::JoinRoom { room_id: room }).await;
    conn_b.emit(&ClientEvent::JoinRoom { room_id: room }).await;
    conn_a.drain();
    conn_b.drain();

    // Ada anchors "In the beginning" (chars 10..26 of the passage).
    let anchor = engine::create_anchor(PASSAGE, 10, 26).expect("create anchor");
    assert_eq!(anchor.selected_text, "In the beginning");

    conn_a
        .emit(&ClientEvent::AddComment {
            room_id: None,
            content: "Note the tense".to_string(),
            text_anchor: Some(anchor.clone()),
            parent_id: None,
        })
        .await;

    // Comment broadcasts include the actor.
    let first = match conn_a.recv() {
        Some(ServerEvent::CommentAdded { comment, author }) => {
            assert_eq!(author, ada);
            comment
        }
        other => panic!("expected comment-added, got {other:?}"),
    };

    // Ben receives it too and groups locally: one marker, one participant.
    let received = match conn_b.recv() {
        Some(ServerEvent::CommentAdded { comment, .. }) => comment,
        other => panic!("expected comment-added, got {other:?}"),
    };
    let markers = group_by_anchor(&[received]);
    assert_eq!(markers.len(), 1);
    let marker = markers.values().next().unwrap();
    assert_eq!(marker.participants(), vec![ada.clone()]);

    // Ben replies on the same anchor.
    conn_b
        .emit(&ClientEvent::AddComment {
            room_id: None,
            content: "Agreed — bara is perfective".to_string(),
            text_anchor: Some(anchor.clone()),
            parent_id: Some(first.id),
        })
        .await;
    conn_a.drain();
    conn_b.drain();

    // Regrouping the room's comment set: one marker, two comments,
    // participants in first-appearance order.
    let comments = app.comments.list_by_room(room).await.expect("list");
    let markers = group_by_anchor(&comments);
    assert_eq!(markers.len(), 1);

    let marker = markers.values().next().unwrap();
    assert_eq!(marker.comment_count(), 2);
    assert_eq!(marker.participants(), vec![ada, ben]);
    assert_eq!(
        marker.latest_comment().unwrap().content,
        "Agreed — bara is perfective"
    );

    // And every client can still place the marker on the passage.
    let resolution = engine::resolve(PASSAGE, &marker.anchor).expect("resolves");
    assert_eq!(resolution.span(), (10, 26));
}

#[tokio::test]
async fn test_update_comment_is_author_only() {
    let app = TestApp::new();
    let room = RoomId::new();

    let (ada, ada_tokens) = app.login("Ada").await;
    let (ben, ben_tokens) = app.login("Ben").await;
    app.grant(&ada, room);
    app.grant(&ben, room);

    let mut conn_a = app.connect(&ada_tokens.access_token);
    let mut conn_b = app.connect(&ben_tokens.access_token);
    conn_a.emit(&ClientEvent::JoinRoom { room_id: room }).await;
    conn_b.emit(&ClientEvent::JoinRoom { room_id: room }).await;
    conn_a.drain();
    conn_b.drain();

    conn_a
        .emit(&ClientEvent::AddComment {
            room_id: None,
            content: "original".to_string(),
            text_anchor: None,
            parent_id: None,
        })
        .await;
    let comment = match conn_a.recv() {
        Some(ServerEvent::CommentAdded { comment, .. }) => comment,
        other => panic!("expected comment-added, got {other:?}"),
    };
    conn_b.drain();

    // Ben cannot edit Ada's comment; the failure is scoped to Ben.
    conn_b
        .emit(&ClientEvent::UpdateComment {
            comment_id: comment.id,
            content: "hijacked".to_string(),
        })
        .await;
    assert!(matches!(conn_b.recv(), Some(ServerEvent::Error { .. })));
    assert!(conn_a.recv().is_none());

    // Ada edits her own; everyone sees the update.
    conn_a
        .emit(&ClientEvent::UpdateComment {
            comment_id: comment.id,
            content: "clarified".to_string(),
        })
        .await;

    for conn in [&mut conn_a, &mut conn_b] {
        match conn.recv() {
            Some(ServerEvent::CommentUpdated { comment, author }) => {
                assert_eq!(comment.content, "clarified");
                assert_eq!(author, ada);
            }
            other => panic!("expected comment-updated, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_comment_validation_errors_are_scoped() {
    let app = TestApp::new();
    let room = RoomId::new();

    let (ada, tokens) = app.login("Ada").await;
    app.grant(&ada, room);

    let mut conn = app.connect(&tokens.access_token);

    // Not in a room and no explicit room: rejected.
    conn.emit(&ClientEvent::AddComment {
        room_id: None,
        content: "floating".to_string(),
        text_anchor: None,
        parent_id: None,
    })
    .await;
    assert!(matches!(conn.recv(), Some(ServerEvent::Error { .. })));

    conn.emit(&ClientEvent::JoinRoom { room_id: room }).await;
    conn.drain();

    // Whitespace-only content: rejected.
    conn.emit(&ClientEvent::AddComment {
        room_id: None,
        content: "   ".to_string(),
        text_anchor: None,
        parent_id: None,
    })
    .await;
    assert!(matches!(conn.recv(), Some(ServerEvent::Error { .. })));
}

#[tokio::test]
async fn test_malformed_frame_does_not_poison_connection() {
    let app = TestApp::new();
    let room = RoomId::new();

    let (ada, tokens) = app.login("Ada").await;
    app.grant(&ada, room);

    let mut conn = app.connect(&tokens.access_token);

    conn.emit_raw("{this is not json").await;
    assert!(matches!(conn.recv(), Some(ServerEvent::Error { .. })));

    conn.emit_raw(r#"{"event":"no-such-event"}"#).await;
    assert!(matches!(conn.recv(), Some(ServerEvent::Error { .. })));

    // The connection is still fully functional.
    conn.emit(&ClientEvent::JoinRoom { room_id: room }).await;
    assert!(matches!(conn.recv(), Some(ServerEvent::ActiveUsers { .. })));
}

#[tokio::test]
async fn test_general_comments_stay_out_of_markers() {
    let app = TestApp::new();
    let room = RoomId::new();

    let (ada, tokens) = app.login("Ada").await;
    app.grant(&ada, room);

    let mut conn = app.connect(&tokens.access_token);
    conn.emit(&ClientEvent::JoinRoom { room_id: room }).await;
    conn.drain();

    conn.emit(&ClientEvent::AddComment {
        room_id: None,
        content: "General question about this week".to_string(),
        text_anchor: None,
        parent_id: None,
    })
    .await;
    assert!(matches!(conn.recv(), Some(ServerEvent::CommentAdded { .. })));

    // The comment exists but produces no marker.
    let comments = app.comments.list_by_room(room).await.expect("list");
    assert_eq!(comments.len(), 1);
    assert!(group_by_anchor(&comments).is_empty());
}
