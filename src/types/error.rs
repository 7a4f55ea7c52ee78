use std::io;

#[derive(Debug)]
pub enum DuplexError {
    /// The inbound exchange cannot carry a duplex stream: either the request
    /// arrived over a protocol version below HTTP/2, or the response sink is
    /// unable to flush written bytes to the peer on demand. The caller may
    /// still answer with a plain response on the same sink.
    Http2NotSupported,

    /// An address string from the request could not be resolved into a
    /// socket address. Carries the offending string and the resolver error.
    AddrResolution(String, io::Error),

    /// The request's body stream was already taken by a previous accept.
    BodyConsumed,

    /// Passthrough from the response sink while committing the handshake.
    Io(io::Error),
}

impl std::fmt::Display for DuplexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplexError::Http2NotSupported => write!(f, "HTTP2 not supported"),
            DuplexError::AddrResolution(addr, err) => {
                write!(f, "Failed to resolve address '{}': {}", addr, err)
            }
            DuplexError::BodyConsumed => write!(f, "Request body already consumed"),
            DuplexError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for DuplexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DuplexError::AddrResolution(_, err) => Some(err),
            DuplexError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DuplexError {
    fn from(err: io::Error) -> Self {
        DuplexError::Io(err)
    }
}
