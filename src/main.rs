use axum::serve;
use school_records::api::routes::create_router;
use school_records::config::AppConfig;
use school_records::service::SchoolServices;
use school_records::{build_store, seed};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Info by default, RUST_LOG overrides; keep reqwest/hyper quiet
    use env_logger::{Builder, Env};
    use log::LevelFilter;

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .init();

    println!("School Records: student, class, grade and attendance server");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}, store={:?}",
        config.server.host, config.server.port, config.store.backend
    );

    let services = SchoolServices::new(build_store(&config)?);

    // Load seed data for demonstration (optional)
    if config.store.seed {
        println!("Loading seed data...");
        seed::load_seed_data(&services).await?;
        println!("Seed data loaded successfully");
    }

    run_server(create_router(services), &config).await?;

    Ok(())
}

async fn run_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("School Records server running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
