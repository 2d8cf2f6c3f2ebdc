use std::fmt;

use crate::error::HandshakeError;

/// Endpoint identifier for one side of the proxy tunnel.
///
/// Holds the host and port of either the intermediary proxy or the final
/// target. The coordinator never resolves or connects to the endpoint; it
/// only carries the identifiers for the driver and for diagnostics.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TunnelEndpoint {
    host: String,
    port: u16,
}

impl TunnelEndpoint {
    /// Creates a new endpoint from the supplied host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, HandshakeError> {
        let host = host.into();
        let trimmed = host.trim();
        if trimmed.is_empty() {
            return Err(HandshakeError::EmptyEndpointHost);
        }
        Ok(Self {
            host: trimmed.to_owned(),
            port,
        })
    }

    /// Returns the host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for TunnelEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
