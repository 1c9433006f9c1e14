
pub mod coerce;
pub mod config;
pub mod fetch;
pub mod queries;
pub mod records;
pub mod reports;
pub mod resolver;

use {
    config::ReportConfig,
    fetch::DataFetcher,
    queries::ReportQueries,
    reports::ReportEngine,
    resolver::SellerResolver,
    std::sync::Arc,
};

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = ReportConfig::from_env()?;

    log::info!("🚀 Starting MarketFlow report service");
    log::info!("   Upstream: {}", config.base_url);
    log::info!("   Service name: {}", config.service_name);
    log::info!("   HTTP timeout: {}s", config.timeout_secs);

    let fetcher = DataFetcher::new(config.clone())?;
    let resolver = SellerResolver::new(config)?;
    let engine = ReportEngine::new(Arc::new(fetcher));
    let queries = ReportQueries::new(engine, resolver);

    let stats = queries.dashboard_stats().await;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
