use city_info::config::AppConfig;
use city_info::run_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    log::info!("CityInfo: city and point of interest catalog");

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{} backend={:?}",
        config.server.host,
        config.server.port,
        config.database.backend
    );

    run_server(config).await
}
