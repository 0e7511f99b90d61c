use anyhow::Result;
use blouza::config::StorefrontConfig;
use blouza::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "BLOUZA_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // First argument, then BLOUZA_CONFIG, then built-in defaults
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok());

    let config = match config_path {
        Some(path) => {
            tracing::info!(%path, "loading configuration");
            StorefrontConfig::from_yaml_file(&path)?
        }
        None => StorefrontConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    let bind = config.server.bind.clone();
    ServerBuilder::new().with_config(config).serve(&bind).await
}
