use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use workout_sessions::adapters::{
    router, AppState, FileSessionStore, InMemorySessionStore, RoomManager,
};
use workout_sessions::application::SessionActorRegistry;
use workout_sessions::config::{AppConfig, StorageBackend};
use workout_sessions::ports::SessionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))?;
    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    config.validate()?;

    let store: Arc<dyn SessionStore> = match (config.storage.backend, &config.storage.data_dir) {
        (StorageBackend::File, Some(dir)) => {
            tracing::info!(data_dir = %dir.display(), "Using file session store");
            Arc::new(FileSessionStore::new(dir))
        }
        _ => {
            tracing::warn!("Using in-memory session store; sessions are lost on restart");
            Arc::new(InMemorySessionStore::new())
        }
    };

    let room_manager = Arc::new(RoomManager::new(config.actor.room_capacity));
    let registry = Arc::new(SessionActorRegistry::new(
        store,
        room_manager.clone(),
        config.actor.actor_config(),
    ));

    let app = router(AppState {
        registry,
        room_manager,
        cors_origins: config.server.cors_origins_list(),
        request_timeout: Duration::from_secs(config.server.request_timeout_secs),
    });

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        "Workout sessions server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
