use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{debug, error, info, instrument, warn};

use crate::codec::FrameCodec;
use crate::commands::executable::Executable;
use crate::commands::Command;
use crate::config::Config;
use crate::connection::Connection;
use crate::store::{Storage, Store};
use crate::Error;

/// Binds the configured address and serves a fresh, empty store on it until the process exits.
pub async fn run(config: Config) -> Result<(), Error> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let codec = FrameCodec::new(config.max_frame_size);

    serve(listener, Store::new(), codec).await
}

/// Accepts connections on `listener` forever, spawning one task per client. Every task shares
/// `store`.
pub async fn serve<S>(listener: TcpListener, store: S, codec: FrameCodec) -> Result<(), Error>
where
    S: Storage + Clone + 'static,
{
    info!(
        "Redis server listening on {} (max frame size {} bytes)",
        listener.local_addr()?,
        codec.max_frame_size()
    );

    loop {
        let (socket, client_address) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                // A failed accept only affects that one client.
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        let store = store.clone();
        let codec = codec.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, store, codec).await {
                error!("Connection from {} terminated: {}", client_address, e);
            }
        });
    }
}

/// Serves a single client until it disconnects or sends something that cannot be decoded.
///
/// Requests are answered strictly in the order they arrive. Decode and write errors end the
/// session; command errors are sent back as error replies and the session continues.
#[instrument(
    name = "connection",
    skip(stream, client_address, store, codec),
    fields(connection_id, client_address)
)]
pub async fn handle_connection<T, S>(
    stream: T,
    client_address: SocketAddr,
    store: S,
    codec: FrameCodec,
) -> Result<(), Error>
where
    T: AsyncRead + AsyncWrite + Unpin,
    S: Storage,
{
    let mut conn = Connection::with_codec(stream, codec);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    while let Some(frame) = conn.read_frame().await? {
        debug!("Received frame from client: {}", frame);

        let res = match Command::from_frame(frame) {
            Some(Ok(cmd)) => {
                info!("Received command {}", cmd.name());
                cmd.exec(&store)
            }
            Some(Err(e)) => {
                warn!("Rejected command: {}", e);
                e.into()
            }
            None => {
                debug!("Ignoring frame that is not a command");
                continue;
            }
        };

        debug!("Sending response to client: {}", res);
        conn.write_frame(res).await?;
    }

    info!("Connection closed");
    Ok(())
}
