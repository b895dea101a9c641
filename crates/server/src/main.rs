//! Homestay-rs server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use homestay_api::{AppState, DashboardBroadcaster, SseEvent, router as api_router};
use homestay_common::Config;
use homestay_core::services::{
    AccountService, BroadcastNotifier, ChangeNotifierHandle, DashboardService, FacilitationService,
    ModerationService, TerminationService,
};
use homestay_db::repositories::{
    AccountRepository, FacilitationRepository, TerminationRepository,
};
use homestay_realtime::{DashboardBridge, FeedEvent, RedisPubSub};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn feed_to_sse(event: FeedEvent) -> SseEvent {
    match event {
        FeedEvent::Changed {
            seq,
            at,
            new_signups,
        } => SseEvent::Changed {
            seq,
            at,
            new_signups,
        },
        FeedEvent::SignedUp {
            seq,
            at,
            new_signups,
        } => SseEvent::SignedUp {
            seq,
            at,
            new_signups,
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homestay=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting homestay-rs server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(homestay_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    homestay_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let account_repo = AccountRepository::new(db.clone());
    let facilitation_repo = FacilitationRepository::new(db.clone());
    let termination_repo = TerminationRepository::new(db);

    // Initialize SSE broadcaster
    let dashboard_broadcaster = DashboardBroadcaster::new();

    // Pick the change notifier: Redis-backed when realtime is enabled,
    // process-local broadcast otherwise. Either way the local SSE
    // broadcaster receives every signal.
    let notifier: ChangeNotifierHandle = if config.realtime.enabled {
        info!("Connecting to Redis Pub/Sub...");
        let pubsub = Arc::new(RedisPubSub::new(&config.redis.url, &config.redis.prefix).await?);
        pubsub.start().await?;

        let bridge = DashboardBridge::new(pubsub.clone());
        let broadcaster = dashboard_broadcaster.clone();
        bridge
            .start(move |event| broadcaster.broadcast(feed_to_sse(event)))
            .await;
        info!("Realtime change feed enabled");

        pubsub
    } else {
        let local = Arc::new(BroadcastNotifier::default());
        let mut rx = local.subscribe();
        let broadcaster = dashboard_broadcaster.clone();
        tokio::spawn(async move {
            while let Ok(signal) = rx.recv().await {
                broadcaster.broadcast(SseEvent::Changed {
                    seq: signal.seq,
                    at: signal.at,
                    new_signups: signal.new_signups,
                });
            }
        });
        info!("Realtime disabled, using in-process change feed");

        local
    };

    // Initialize services
    let account_service = Arc::new(AccountService::new(account_repo.clone(), notifier.clone()));
    let moderation_service = Arc::new(ModerationService::new(
        account_repo.clone(),
        notifier.clone(),
    ));
    let facilitation_service = Arc::new(FacilitationService::new(
        facilitation_repo.clone(),
        account_repo.clone(),
        notifier.clone(),
    ));
    let termination_service = Arc::new(TerminationService::new(
        termination_repo.clone(),
        facilitation_repo,
        notifier,
    ));
    let dashboard_service = Arc::new(DashboardService::new(account_repo, termination_repo));

    // Create app state
    let state = AppState {
        account_service,
        moderation_service,
        facilitation_service,
        termination_service,
        dashboard_service,
        dashboard_broadcaster,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            homestay_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
