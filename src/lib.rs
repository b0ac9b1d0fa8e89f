pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod service;
pub mod store;

use std::sync::Arc;

use log::info;

use crate::config::{AppConfig, StoreBackend};

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{ServiceError, StoreError};

// Export logic types
pub use logic::{
    attendance_category, attendance_rate, format_date, format_gpa, format_grade,
    format_percentage, gpa, grade_color_tag, letter_grade, percentage, tally_attendance,
    AttendanceCategory, AttendanceTally, LetterGrade,
};

// Export all model types
pub use model::*;

// Export seed module
pub use seed::*;

pub use service::{BatchOutcome, FailedItem, RecordService, SchoolServices};

// Export store types
pub use store::{MemoryStore, RecordOutcome, RemoteOptions, RemoteStore, StorageAdapter};

/// Open the storage backend selected in `config`.
pub fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn StorageAdapter>> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory record store");
            Ok(Arc::new(
                MemoryStore::school().with_latency(config.store.latency()),
            ))
        }
        StoreBackend::Remote => {
            let store = RemoteStore::new(config.store.remote_options()?)?;
            info!("Using remote record store at {}", store.base_url());
            Ok(Arc::new(store))
        }
    }
}

// Function for integration testing
pub async fn run_server() -> anyhow::Result<()> {
    use axum::serve;
    use tokio::net::TcpListener;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with INFO level only (suppress DEBUG logs)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    // Load configuration
    let config = AppConfig::load()?;

    let services = SchoolServices::new(build_store(&config)?);
    if config.store.seed {
        seed::load_seed_data(&services).await?;
    }

    let app = routes::create_router(services);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;

    serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_is_the_default() {
        let config = AppConfig::default();
        let services = SchoolServices::new(build_store(&config).unwrap());

        assert!(services.students.get_all().await.unwrap().is_empty());
    }

    #[test]
    fn remote_backend_without_url_fails_to_build() {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Remote;
        config.store.base_url = None;

        assert!(build_store(&config).is_err());
    }
}
