use crate::conn::BodyReader;
use crate::context::Context;

/// Inbound request as seen by [`accept`](crate::server::accept).
///
/// Constructed by the hosting framework from the exchange it is already
/// serving: the negotiated protocol version, the peer's declared address, the
/// request authority, the request body stream, and the lifetime context the
/// framework will keep observing for the rest of the exchange.
///
/// The body stream can be taken exactly once; accept takes it as the read side
/// of the duplex connection.
pub struct Request {
    proto_major: u16,
    proto_minor: u16,
    remote_addr: String,
    host: String,
    body: Option<BodyReader>,
    context: Context,
}

impl Request {
    /// Creates a request for an HTTP/2 exchange with a fresh root context.
    pub fn new(
        remote_addr: impl Into<String>,
        host: impl Into<String>,
        body: BodyReader,
    ) -> Self {
        Self {
            proto_major: 2,
            proto_minor: 0,
            remote_addr: remote_addr.into(),
            host: host.into(),
            body: Some(body),
            context: Context::new(),
        }
    }

    /// Overrides the negotiated protocol version. Frameworks fronting
    /// pre-HTTP/2 clients must report the real version so accept can reject
    /// the exchange.
    pub fn with_protocol(mut self, major: u16, minor: u16) -> Self {
        self.proto_major = major;
        self.proto_minor = minor;
        self
    }

    /// Ties the request to an existing lifetime context instead of a root one.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn proto_at_least(&self, major: u16, minor: u16) -> bool {
        self.proto_major > major || (self.proto_major == major && self.proto_minor >= minor)
    }

    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Replaces the request's lifetime context.
    ///
    /// Accept installs the connection's derived child here, so everything
    /// still watching this request observes cancellation once the connection
    /// closes.
    pub fn set_context(&mut self, context: Context) {
        self.context = context;
    }

    pub(crate) fn take_body(&mut self) -> Option<BodyReader> {
        self.body.take()
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("proto_major", &self.proto_major)
            .field("proto_minor", &self.proto_minor)
            .field("remote_addr", &self.remote_addr)
            .field("host", &self.host)
            .field("body_taken", &self.body.is_none())
            .finish()
    }
}
