pub mod codec;
pub mod commands;
pub mod config;
pub mod connection;
pub mod frame;
pub mod server;
pub mod store;

use thiserror::Error as ThisError;

/// Errors that end a connection. Command errors never reach this type: they are turned into
/// error replies and the connection keeps serving.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("protocol error; {0}")]
    Protocol(#[from] frame::Error),
    #[error("connection closed by peer in the middle of a frame")]
    ConnectionClosed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
