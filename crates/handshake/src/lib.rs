#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod config;
mod coordinator;
mod endpoint;
mod error;

pub use crate::config::{SessionConfig, TIMEOUT_PROPERTY};
pub use crate::coordinator::{
    ActionError, DEFAULT_HANDSHAKE_TIMEOUT, HANDSHAKE_GRACE_FLOOR, HandshakeCoordinator,
    TunnelCredentials,
};
pub use crate::endpoint::TunnelEndpoint;
pub use crate::error::HandshakeError;
