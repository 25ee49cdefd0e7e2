//! Integration tests for the credential lifecycle.

use jsonwebtoken::{EncodingKey, Header, encode};

use margins_auth::jwt::{Claims, TokenType};
use margins_core::error::ErrorKind;
use margins_core::types::id::SessionId;
use margins_entity::Identity;

use crate::helpers::TestApp;

/// Builds an access token whose expiry is comfortably in the past
/// (beyond the decoder's clock-skew leeway).
fn expired_access_token(app: &TestApp, identity: &Identity, session_id: SessionId) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: identity.principal_id,
        sid: session_id,
        name: identity.display_name.clone(),
        iat: now - 3600,
        exp: now - 600,
        jti: uuid::Uuid::new_v4(),
        token_type: TokenType::Access,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(app.auth_config.jwt_secret.as_bytes()),
    )
    .expect("encode")
}

#[tokio::test]
async fn test_refresh_preserves_session_identity() {
    let app = TestApp::new();
    let identity = Identity::new(margins_core::types::id::PrincipalId::new(), "Ada");

    let (session, tokens) = app
        .session_manager
        .open_session(&identity)
        .await
        .expect("open");

    // Two sequential refreshes both succeed and both reference the same
    // session — there is no session rotation.
    let first = app
        .session_manager
        .refresh(&tokens.refresh_token)
        .await
        .expect("first refresh");
    let second = app
        .session_manager
        .refresh(&first.refresh_token)
        .await
        .expect("second refresh");

    let auth = app
        .authenticator
        .authenticate(&second.access_token)
        .expect("fresh access token authenticates");
    assert_eq!(auth.session_id, session.id);

    // Each refresh mints genuinely new tokens.
    assert_ne!(tokens.access_token, first.access_token);
    assert_ne!(first.access_token, second.access_token);
}

#[tokio::test]
async fn test_refresh_after_revoke_always_fails() {
    let app = TestApp::new();
    let (_, tokens) = app.login("Ada").await;

    let auth = app
        .authenticator
        .authenticate(&tokens.access_token)
        .expect("valid before revoke");

    app.session_manager
        .revoke(auth.session_id)
        .await
        .expect("revoke");

    let err = app
        .session_manager
        .refresh(&tokens.refresh_token)
        .await
        .expect_err("deleted session must never refresh");
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_expired_access_with_valid_refresh() {
    let app = TestApp::new();
    let identity = Identity::new(margins_core::types::id::PrincipalId::new(), "Ada");
    let (session, tokens) = app
        .session_manager
        .open_session(&identity)
        .await
        .expect("open");

    let stale = expired_access_token(&app, &identity, session.id);

    // The stale token is dead on both verification paths.
    assert!(app.session_manager.verify_access(&stale).is_err());
    assert!(app.authenticator.authenticate(&stale).is_err());

    // The refresh token still works and yields a usable new pair.
    let renewed = app
        .session_manager
        .refresh(&tokens.refresh_token)
        .await
        .expect("refresh");
    assert_ne!(renewed.access_token, stale);

    let auth = app
        .authenticator
        .authenticate(&renewed.access_token)
        .expect("renewed access token authenticates");
    assert_eq!(auth.identity, identity);

    // The old access token is never resurrected.
    assert!(app.authenticator.authenticate(&stale).is_err());
}

#[tokio::test]
async fn test_revoked_session_rejects_both_paths() {
    let app = TestApp::new();
    let identity = Identity::new(margins_core::types::id::PrincipalId::new(), "Ada");
    let (session, tokens) = app
        .session_manager
        .open_session(&identity)
        .await
        .expect("open");

    app.session_manager.revoke(session.id).await.expect("revoke");

    // Request path: refresh surfaces an authentication failure.
    let err = app
        .session_manager
        .refresh(&tokens.refresh_token)
        .await
        .expect_err("revoked");
    assert_eq!(err.kind, ErrorKind::Authentication);

    // Realtime path: an expired access token is rejected outright — there
    // is no refresh fallback at the handshake.
    let stale = expired_access_token(&app, &identity, session.id);
    assert!(app.authenticator.authenticate(&stale).is_err());
}

#[tokio::test]
async fn test_handshake_rejects_wrong_token_kind() {
    let app = TestApp::new();
    let (_, tokens) = app.login("Ada").await;

    // A refresh token is not a handshake credential.
    let err = app
        .authenticator
        .authenticate(&tokens.refresh_token)
        .expect_err("refresh token at handshake");
    assert_eq!(err.kind, ErrorKind::Authentication);

    let err = app
        .authenticator
        .authenticate("garbage")
        .expect_err("malformed token");
    assert_eq!(err.kind, ErrorKind::Authentication);
}
