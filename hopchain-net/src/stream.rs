//! Byte streams as handed out by dialers.

use tokio::io::{AsyncRead, AsyncWrite};

/// A transport stream that can be read from and written to,
/// and moved freely between tasks.
///
/// Implemented for every type that satisfies its bounds, e.g.
/// a [`tokio::net::TcpStream`] or an upgraded websocket stream.
pub trait Stream: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> Stream for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

/// A type-erased [`Stream`], the connection type shared by all dialers
/// so that links of different kinds can be stacked on top of one another.
pub type BoxStream = Box<dyn Stream>;
