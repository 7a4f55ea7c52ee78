use std::io;

use async_trait::async_trait;

use crate::conn::{Connection, WriteCloser};
use crate::types::{DuplexError, EndpointPair, Request};

/// Failed accept, carrying the response sink back to the caller.
///
/// A rejected exchange still has to be answered somehow; the sink rides
/// along in the error so the caller can degrade to a plain response on it.
/// On the precondition failures ([`DuplexError::Http2NotSupported`],
/// [`DuplexError::AddrResolution`], [`DuplexError::BodyConsumed`]) nothing
/// has been written to it yet.
pub struct AcceptError<W> {
    pub sink: W,
    pub error: DuplexError,
}

impl<W> AcceptError<W> {
    fn new(sink: W, error: DuplexError) -> Self {
        Self { sink, error }
    }

    pub fn into_parts(self) -> (W, DuplexError) {
        (self.sink, self.error)
    }
}

impl<W> std::fmt::Debug for AcceptError<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcceptError")
            .field("error", &self.error)
            .finish()
    }
}

impl<W> std::fmt::Display for AcceptError<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl<W> std::error::Error for AcceptError<W> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<W> From<AcceptError<W>> for DuplexError {
    fn from(err: AcceptError<W>) -> Self {
        err.error
    }
}

/// Response sink provided by the hosting framework.
///
/// Covers the little the acceptor needs from the framework's response half:
/// committing the status, writing body bytes, and pushing buffered bytes out
/// to the peer. `supports_flush` reports whether `flush` actually reaches the
/// wire; sinks that buffer until the handler returns must return `false` so
/// accept can reject the exchange.
#[async_trait]
pub trait ResponseWriter: Send {
    /// Commits the response status and headers.
    async fn write_head(&mut self, status: u16) -> io::Result<()>;

    /// Writes response body bytes, returning how many were accepted.
    async fn write_data(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Pushes buffered bytes to the peer.
    async fn flush(&mut self) -> io::Result<()>;

    /// Whether `flush` delivers bytes to the peer immediately.
    fn supports_flush(&self) -> bool;
}

/// Accepts HTTP/2 exchanges as full-duplex connections.
///
/// The status code written on a successful accept is the only tunable.
#[derive(Debug, Clone)]
pub struct Server {
    pub status_code: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self { status_code: 200 }
    }
}

impl Server {
    pub fn new(status_code: u16) -> Self {
        Self { status_code }
    }

    /// Extracts a full-duplex connection from an inbound exchange.
    ///
    /// Validates that the exchange can carry a duplex stream, resolves the
    /// endpoint addresses, replaces the request's context with the
    /// connection's derived child (so closing the connection also releases
    /// whatever still waits on the request), then commits the status and
    /// flushes it, opening the channel.
    ///
    /// Every failure hands the sink back inside [`AcceptError`]; until
    /// `write_head` runs nothing has been written to it, so the caller may
    /// still respond in a non-duplex manner.
    pub async fn accept<W>(
        &self,
        mut sink: W,
        request: &mut Request,
    ) -> Result<Connection, AcceptError<W>>
    where
        W: ResponseWriter + 'static,
    {
        if !request.proto_at_least(2, 0) {
            return Err(AcceptError::new(sink, DuplexError::Http2NotSupported));
        }
        if !sink.supports_flush() {
            return Err(AcceptError::new(sink, DuplexError::Http2NotSupported));
        }

        let addrs = match EndpointPair::resolve(request.host(), request.remote_addr()).await {
            Ok(addrs) => addrs,
            Err(err) => return Err(AcceptError::new(sink, err)),
        };
        let body = match request.take_body() {
            Some(body) => body,
            None => return Err(AcceptError::new(sink, DuplexError::BodyConsumed)),
        };

        // Hand the derived context back to the framework before committing
        // any bytes: closing the connection must also release everything
        // still waiting on the request.
        let (context, cancel) = request.context().child();
        request.set_context(context);

        if let Err(err) = sink.write_head(self.status_code).await {
            return Err(AcceptError::new(sink, err.into()));
        }
        if let Err(err) = sink.flush().await {
            return Err(AcceptError::new(sink, err.into()));
        }

        Ok(Connection::from_parts(
            addrs,
            body,
            Box::new(FlushWriter { sink }),
            cancel,
        ))
    }
}

/// Accepts an inbound exchange with the default configuration (status 200).
///
/// The server-side connection lives until the surrounding handler returns;
/// if the client does not speak HTTP/2, [`DuplexError::Http2NotSupported`]
/// comes back together with the untouched sink, and the caller can fall back
/// to a plain response on it.
pub async fn accept<W>(sink: W, request: &mut Request) -> Result<Connection, AcceptError<W>>
where
    W: ResponseWriter + 'static,
{
    Server::default().accept(sink, request).await
}

/// Write side of a server connection: every write is flushed to the peer
/// right away, since the response body is otherwise buffered and outbound
/// bytes could sit until the handler returns.
struct FlushWriter<W: ResponseWriter> {
    sink: W,
}

#[async_trait]
impl<W: ResponseWriter> WriteCloser for FlushWriter<W> {
    async fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let result = self.sink.write_data(data).await;
        // The flush's own failure is folded away; a broken sink surfaces on
        // the next write or read.
        let _ = self.sink.flush().await;
        result
    }

    async fn close(&mut self) -> io::Result<()> {
        // The hosting framework only closes the server-to-client direction
        // when the handler returns; the connection's cancelled context is the
        // caller-visible close signal.
        Ok(())
    }
}
