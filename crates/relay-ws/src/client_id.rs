use std::fmt;
use std::net::SocketAddr;

/// Identity of a connected client, derived from the peer's network address
/// at admission time.
///
/// Stable for the lifetime of the connection and unique within the live set,
/// but not globally unique across reconnects: peers behind a shared NAT can
/// resurface on a previously seen address:port pair. A readmission under an
/// identity that is still live replaces the stale entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Derive the identity from the remote peer address.
    pub fn from_addr(addr: SocketAddr) -> Self {
        Self(addr.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SocketAddr> for ClientId {
    fn from(addr: SocketAddr) -> Self {
        Self::from_addr(addr)
    }
}
