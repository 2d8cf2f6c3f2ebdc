use std::io;

use thiserror::Error;

use crate::coordinator::ActionError;

/// Errors surfaced by handshake coordination.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// A tunnel endpoint was constructed with an empty host.
    #[error("tunnel endpoint host must be non-empty")]
    EmptyEndpointHost,
    /// The unregister hook failed while detaching the coordinator.
    #[error("unregister hook failed during handshake completion")]
    Unregister(#[source] ActionError),
    /// A deferred action failed after the tunnel was established.
    #[error("deferred action failed after handshake completion")]
    DeferredAction(#[source] ActionError),
}

impl From<HandshakeError> for io::Error {
    fn from(err: HandshakeError) -> Self {
        match err {
            HandshakeError::EmptyEndpointHost => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            HandshakeError::Unregister(_) | HandshakeError::DeferredAction(_) => {
                io::Error::other(err)
            }
        }
    }
}
