use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Mutex;

use crate::context::{CancelHandle, Context};
use crate::types::EndpointPair;

/// Inbound byte stream of one side of the exchange.
pub type BodyReader = Box<dyn AsyncRead + Send + Unpin>;

/// Write side of a duplex connection.
///
/// The server role wires the response sink in through
/// [`FlushWriter`](crate::server::accept); a client role supplies its own
/// implementation over the outbound request body.
#[async_trait]
pub trait WriteCloser: Send {
    async fn write(&mut self, data: &[u8]) -> io::Result<usize>;
    async fn close(&mut self) -> io::Result<()>;
}

/// Client/server symmetric duplex connection over one HTTP/2 exchange.
///
/// Reads and writes are independently serialized: concurrent reads queue on
/// the read guard, concurrent writes on the write guard, and a read never
/// waits for an in-flight write or vice versa.
pub struct Connection {
    addrs: EndpointPair,
    reader: Mutex<BodyReader>,
    writer: Mutex<Box<dyn WriteCloser>>,
    cancel: CancelHandle,
}

impl Connection {
    /// Builds a connection around the exchange's two byte streams.
    ///
    /// Derives a cancellable child of `parent` and returns it alongside the
    /// connection; the hosting code must observe the child for the rest of
    /// the exchange so that [`close`](Connection::close) unblocks it.
    pub fn new(
        parent: &Context,
        addrs: EndpointPair,
        reader: BodyReader,
        writer: Box<dyn WriteCloser>,
    ) -> (Self, Context) {
        let (context, cancel) = parent.child();
        (Self::from_parts(addrs, reader, writer, cancel), context)
    }

    pub(crate) fn from_parts(
        addrs: EndpointPair,
        reader: BodyReader,
        writer: Box<dyn WriteCloser>,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            addrs,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            cancel,
        }
    }

    /// Reads from the connection.
    ///
    /// Blocks until at least one byte is available, the peer finishes its
    /// stream (`Ok(0)`), or the underlying stream errors. Stream errors are
    /// returned verbatim.
    pub async fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut reader = self.reader.lock().await;
        reader.read(buf).await
    }

    /// Writes to the connection.
    ///
    /// Every write is pushed to the peer immediately; the underlying write's
    /// result is returned verbatim.
    pub async fn write(&self, data: &[u8]) -> io::Result<usize> {
        let mut writer = self.writer.lock().await;
        writer.write(data).await
    }

    /// Closes the connection.
    ///
    /// Cancels the lifetime context (first call only, later calls are no-ops
    /// for the cancellation) and closes the write side. In-flight reads and
    /// writes are not interrupted; they return whenever the underlying
    /// stream does. The cancellation signal is delivered before the write
    /// guard is taken, so it is observable immediately; the write-side close
    /// itself waits for an in-flight write to finish.
    pub async fn close(&self) -> io::Result<()> {
        self.cancel.cancel();
        let mut writer = self.writer.lock().await;
        writer.close().await
    }

    /// Local address of the underlying connection.
    pub fn local_addr(&self) -> SocketAddr {
        self.addrs.local
    }

    /// Address of the remote end of the underlying connection.
    pub fn remote_addr(&self) -> SocketAddr {
        self.addrs.remote
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("addrs", &self.addrs)
            .finish()
    }
}
