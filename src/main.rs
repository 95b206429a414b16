use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sample_token_deploy::{pipeline, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;
    init_tracing(&config.service.log_level);

    info!(
        "Deploying {} from {} to {}",
        config.contract.name,
        config.contract.path.display(),
        config.network.rpc_url
    );

    match pipeline::run(&config, &mut std::io::stdout()).await {
        Ok(record) => {
            info!(
                "Done: {} at {:?} (deployment tx {:?})",
                record.name(),
                record.address(),
                record.tx_hash()
            );
            Ok(())
        }
        Err(e) if e.is_key_missing() => {
            eprintln!("{}", e.root());
            std::process::exit(1);
        }
        Err(e) => Err(e).context("Deployment failed"),
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
