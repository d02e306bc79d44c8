pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod notify;
pub mod seed;
pub mod store;

// Export API types
pub use api::routes;
pub use api::{ApiError, AppState};

// Export logic types
pub use logic::{
    CityFilter, FieldValidator, PageRequest, PatchEngine, PatchError, ValidationErrors,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{CityInfoRepository, InMemoryStore, PostgresStore, Store};

use std::sync::Arc;

use crate::config::{AppConfig, MailProvider, StoreBackend};
use crate::notify::{CloudMailService, LocalMailService, MailService};

/// Pick the mail service named in the configuration
pub fn mail_service(config: &AppConfig) -> Arc<dyn MailService> {
    match config.mail.provider {
        MailProvider::Local => Arc::new(LocalMailService::new(&config.mail)),
        MailProvider::Cloud => Arc::new(CloudMailService::new(&config.mail)),
    }
}

/// Router with its state attached, ready to serve
pub fn build_app<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> axum::Router {
    let state = AppState::new(store, mail_service(config), config.pagination);
    routes::create_router::<S>().with_state(state)
}

/// Connect to the configured backend and serve until shutdown
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let app = match config.database.backend {
        StoreBackend::Memory => {
            log::info!("Using in-memory store with seed data");
            build_app(Arc::new(InMemoryStore::seeded()), &config)
        }
        StoreBackend::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let database_url = config.database_url()?;
            let max_connections = config.database.max_connections.unwrap_or(20);
            let postgres_store = PostgresStore::new(&database_url, max_connections).await?;

            log::info!("Running database migrations...");
            postgres_store.migrate().await?;

            if config.seed_data {
                log::info!("Loading seed data...");
                seed::load_seed_data(&postgres_store).await?;
            }

            build_app(Arc::new(postgres_store), &config)
        }
    };

    let bind_address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log::info!("CityInfo API running on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
