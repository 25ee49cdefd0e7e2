//! Margins Server — real-time passage annotation for study groups.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use margins_auth::jwt::{JwtDecoder, JwtEncoder};
use margins_auth::session::SessionManager;
use margins_core::config::AppConfig;
use margins_core::error::AppError;
use margins_core::types::id::{PrincipalId, RoomId};
use margins_entity::Identity;
use margins_realtime::{Gateway, GatewayAuthenticator, RealtimeServer};
use margins_store::{
    MemoryCommentStore, MemoryDocumentSource, MemoryMembership, MemorySessionRepository,
};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("MARGINS_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Margins v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: In-memory collaborator stores ────────────────────
    let sessions = Arc::new(MemorySessionRepository::new());
    let membership = Arc::new(MemoryMembership::new());
    let comments = Arc::new(MemoryCommentStore::new());
    let documents = Arc::new(MemoryDocumentSource::new());

    // ── Step 2: Auth system ──────────────────────────────────────
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
    let session_manager = Arc::new(SessionManager::new(
        Arc::clone(&jwt_encoder),
        Arc::clone(&jwt_decoder),
        sessions,
        config.session.clone(),
    ));

    // ── Step 3: Realtime gateway ─────────────────────────────────
    let membership_checker: Arc<dyn margins_realtime::MembershipChecker> = membership.clone();
    let comment_store: Arc<dyn margins_realtime::CommentStore> = comments.clone();
    let gateway = Arc::new(Gateway::new(
        config.realtime.clone(),
        membership_checker,
        comment_store,
    ));
    let authenticator = GatewayAuthenticator::new(Arc::clone(&jwt_decoder));

    // ── Step 4: Optional demo seed for local development ─────────
    if std::env::var("MARGINS_DEMO").is_ok() {
        seed_demo(&config, &session_manager, &membership, &documents).await?;
    }

    // ── Step 5: Serve until shutdown ─────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let server = RealtimeServer::new(
        gateway,
        authenticator,
        config.server.clone(),
        config.realtime.clone(),
    );

    let server_handle = tokio::spawn({
        let server = server.clone();
        async move { server.run(shutdown_rx).await }
    });

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    let grace = std::time::Duration::from_secs(config.server.shutdown_grace_seconds);
    match tokio::time::timeout(grace, server_handle).await {
        Ok(joined) => {
            if let Ok(Err(e)) = joined {
                tracing::error!("Realtime server error: {}", e);
            }
        }
        Err(_) => {
            tracing::warn!("Shutdown grace period elapsed, exiting");
        }
    }

    tracing::info!("Margins server shut down gracefully");
    Ok(())
}

/// Seeds a demo principal, room, and passage, and logs a ready-to-use
/// access token. Local development only.
async fn seed_demo(
    config: &AppConfig,
    session_manager: &SessionManager,
    membership: &MemoryMembership,
    documents: &MemoryDocumentSource,
) -> Result<(), AppError> {
    let identity = Identity::new(PrincipalId::new(), "Demo Reader");
    let room_id = RoomId::new();

    membership.grant(identity.principal_id, room_id);
    documents.put(
        room_id,
        "In the beginning God created the heavens and the earth.",
    );

    let (_, tokens) = session_manager.open_session(&identity).await?;

    tracing::info!(room_id = %room_id, "Demo room seeded");
    tracing::info!(
        "Connect with: ws://{}:{}/?token={}",
        config.server.host,
        config.server.port,
        tokens.access_token
    );

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
