use clap::Parser;
use redis_lite::config::Config;
use redis_lite::{server, Error};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();

    let _ = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    server::run(config).await
}
