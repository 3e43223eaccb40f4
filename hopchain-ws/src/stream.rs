use bytes::{Buf, Bytes};
use futures_util::{Sink, Stream as _};
use std::{
    fmt, io,
    pin::Pin,
    task::{Context, Poll, ready},
};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_tungstenite::{
    WebSocketStream,
    tungstenite::{
        Error as WsError, Message, Utf8Bytes,
        error::ProtocolError,
        protocol::{CloseFrame, frame::coding::CloseCode},
    },
};

/// Default maximum payload size of a single outgoing message.
pub const DEFAULT_WRITE_FRAME_SIZE: usize = 16 << 10;

/// A byte stream carried over the binary messages of an upgraded websocket.
///
/// Writes are sent as binary messages of at most
/// [`Self::write_frame_size`] bytes. Reads yield the payload of incoming
/// data messages, text and binary alike, in order. Pings are answered by the
/// websocket itself and a close frame from the peer is reported as end of
/// stream. Shutting the stream down sends a normal close frame.
pub struct WsStream<S> {
    inner: WebSocketStream<S>,
    read_buf: Bytes,
    write_frame_size: usize,
    read_closed: bool,
    close_queued: bool,
}

impl<S> fmt::Debug for WsStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsStream")
            .field("write_frame_size", &self.write_frame_size)
            .field("read_closed", &self.read_closed)
            .field("close_queued", &self.close_queued)
            .finish_non_exhaustive()
    }
}

impl<S> WsStream<S> {
    /// Wrap a websocket on which the handshake already took place.
    pub fn new(inner: WebSocketStream<S>) -> Self {
        Self {
            inner,
            read_buf: Bytes::new(),
            write_frame_size: DEFAULT_WRITE_FRAME_SIZE,
            read_closed: false,
            close_queued: false,
        }
    }

    /// Set the maximum payload size of a single outgoing message,
    /// a value of `0` is treated as `1`.
    #[must_use]
    pub fn with_write_frame_size(mut self, write_frame_size: usize) -> Self {
        self.write_frame_size = write_frame_size.max(1);
        self
    }

    /// The maximum payload size of a single outgoing message.
    pub fn write_frame_size(&self) -> usize {
        self.write_frame_size
    }

    /// Returns a shared reference to the underlying websocket.
    pub fn get_ref(&self) -> &WebSocketStream<S> {
        &self.inner
    }

    /// Consume the [`WsStream`], returning the underlying websocket.
    ///
    /// Buffered but not yet delivered data is lost.
    pub fn into_inner(self) -> WebSocketStream<S> {
        self.inner
    }
}

impl<S> WsStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Push the reply to a received close frame out without blocking
    /// the read path on it.
    fn poll_flush_close_reply(&mut self, cx: &mut Context<'_>) {
        match Pin::new(&mut self.inner).poll_flush(cx) {
            Poll::Ready(Err(WsError::ConnectionClosed | WsError::AlreadyClosed))
            | Poll::Ready(Ok(()))
            | Poll::Pending => (),
            Poll::Ready(Err(err)) => {
                tracing::debug!("ws stream: failed to reply to close frame: {err}");
            }
        }
    }

    fn poll_close_handshake(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), WsError>> {
        if !self.close_queued {
            ready!(Pin::new(&mut self.inner).poll_ready(cx))?;
            Pin::new(&mut self.inner).start_send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: Utf8Bytes::from_static(""),
            })))?;
            self.close_queued = true;
        }
        Pin::new(&mut self.inner).poll_close(cx)
    }
}

impl<S> AsyncRead for WsStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        loop {
            if !this.read_buf.is_empty() {
                let n = buf.remaining().min(this.read_buf.len());
                buf.put_slice(&this.read_buf[..n]);
                this.read_buf.advance(n);
                return Poll::Ready(Ok(()));
            }
            if this.read_closed {
                return Poll::Ready(Ok(()));
            }

            match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                Some(Ok(Message::Binary(data))) => this.read_buf = data,
                Some(Ok(Message::Text(text))) => this.read_buf = Bytes::from(text),
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => (),
                Some(Ok(Message::Close(frame))) => {
                    tracing::trace!(
                        code = ?frame.as_ref().map(|frame| frame.code),
                        "ws stream: close frame received",
                    );
                    this.read_closed = true;
                    this.poll_flush_close_reply(cx);
                }
                Some(Err(WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)))
                | None => {
                    tracing::trace!("ws stream: transport closed");
                    this.read_closed = true;
                }
                Some(Err(err)) => {
                    tracing::debug!("ws stream: read failed: {err}");
                    this.read_closed = true;
                    return Poll::Ready(Err(into_io_error(err)));
                }
            }
        }
    }
}

impl<S> AsyncWrite for WsStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.close_queued {
            return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
        }
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        ready!(Pin::new(&mut this.inner).poll_ready(cx)).map_err(into_io_error)?;
        let n = buf.len().min(this.write_frame_size);
        Pin::new(&mut this.inner)
            .start_send(Message::Binary(Bytes::copy_from_slice(&buf[..n])))
            .map_err(into_io_error)?;
        // the message is accepted, a pending flush is completed by the next call
        if let Poll::Ready(Err(err)) = Pin::new(&mut this.inner).poll_flush(cx) {
            return Poll::Ready(Err(into_io_error(err)));
        }
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner)
            .poll_flush(cx)
            .map_err(into_io_error)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match ready!(self.get_mut().poll_close_handshake(cx)) {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Poll::Ready(Ok(())),
            Err(err) => Poll::Ready(Err(into_io_error(err))),
        }
    }
}

fn into_io_error(err: WsError) -> io::Error {
    match err {
        WsError::Io(err) => err,
        err @ (WsError::ConnectionClosed
        | WsError::AlreadyClosed
        | WsError::Protocol(ProtocolError::SendAfterClosing)) => {
            io::Error::new(io::ErrorKind::BrokenPipe, err)
        }
        err => io::Error::new(io::ErrorKind::InvalidData, err),
    }
}
