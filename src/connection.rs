use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::FrameCodec;
use crate::frame::Frame;
use crate::Error;

/// One client session: the framed socket plus an id used to correlate log lines.
///
/// Dropping the connection closes the underlying stream, whichever way the session ended.
pub struct Connection<T> {
    pub id: Uuid,
    // Data is read from the socket into the codec's read buffer. When a frame is parsed, the
    // corresponding bytes are removed from the buffer.
    framed: Framed<T, FrameCodec>,
}

impl<T> Connection<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: T) -> Connection<T> {
        Self::with_codec(stream, FrameCodec::default())
    }

    pub fn with_codec(stream: T, codec: FrameCodec) -> Connection<T> {
        Connection {
            id: Uuid::new_v4(),
            framed: Framed::new(stream, codec),
        }
    }

    /// Reads the next frame. Returns `None` once the peer has closed the stream cleanly between
    /// frames.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        self.framed.next().await.transpose()
    }

    /// Writes a frame and flushes it, so replies go out in request order.
    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), Error> {
        self.framed.send(frame).await
    }
}
