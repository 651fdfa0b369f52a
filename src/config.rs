use clap::Parser;
use tracing::Level;

use crate::codec::DEFAULT_MAX_FRAME_SIZE;

const HOST: &str = "127.0.0.1";
const PORT: u16 = 6379;

/// Server settings, read from the command line with environment variable fallbacks.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// The address to bind to
    #[arg(long, env = "REDIS_LITE_HOST", default_value = HOST)]
    pub host: String,

    /// The port to listen on
    #[arg(short, long, env = "REDIS_LITE_PORT", default_value_t = PORT)]
    pub port: u16,

    /// Largest frame, in bytes, a client may send before its connection is dropped
    #[arg(long, env = "MAX_FRAME_SIZE", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,

    /// Most verbose log level to emit
    #[arg(long, env = "REDIS_LITE_LOG", default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: HOST.to_string(),
            port: PORT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            log_level: Level::INFO,
        }
    }
}
