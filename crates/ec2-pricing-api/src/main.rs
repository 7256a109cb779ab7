use ec2_pricing_api::config::ServerConfig;
use ec2_pricing_api::server::PricingServer;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ec2_pricing_api=info,info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ServerConfig::from_env()?;
    info!(
        addr = %config.addr,
        data_path = %config.data_path.display(),
        usd_to_inr = config.usd_to_inr,
        preload = config.preload_catalog,
        "Starting EC2 pricing API"
    );

    PricingServer::new(config)?.serve().await
}
