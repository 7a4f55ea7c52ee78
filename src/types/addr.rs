use std::io;
use std::net::SocketAddr;

use tokio::net::lookup_host;

use super::error::DuplexError;

/// Resolved local/remote socket addresses of one duplex connection.
///
/// Built once during accept and immutable afterwards: the request's authority
/// resolves to the local endpoint, the declared peer address to the remote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointPair {
    pub local: SocketAddr,
    pub remote: SocketAddr,
}

impl EndpointPair {
    pub async fn resolve(local: &str, remote: &str) -> Result<Self, DuplexError> {
        let remote = resolve_addr(remote).await?;
        let local = resolve_addr(local).await?;
        Ok(Self { local, remote })
    }
}

impl std::fmt::Display for EndpointPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.local, self.remote)
    }
}

async fn resolve_addr(addr: &str) -> Result<SocketAddr, DuplexError> {
    let mut resolved = lookup_host(addr)
        .await
        .map_err(|e| DuplexError::AddrResolution(addr.to_string(), e))?;

    resolved.next().ok_or_else(|| {
        DuplexError::AddrResolution(
            addr.to_string(),
            io::Error::new(io::ErrorKind::NotFound, "no addresses resolved"),
        )
    })
}
