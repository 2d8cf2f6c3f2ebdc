use zeroize::{Zeroize, Zeroizing};

/// Proxy credentials owned by the coordinator.
///
/// The secret lives in a [`Zeroizing`] buffer, so its bytes are overwritten
/// with zeros when the value is dropped; [`TunnelCredentials::clear`] scrubs
/// eagerly for code paths that retire the secret before the coordinator goes
/// away. Neither field ever appears in log output.
#[derive(Debug)]
pub struct TunnelCredentials {
    user: Option<String>,
    secret: Zeroizing<Vec<u8>>,
}

impl TunnelCredentials {
    /// Creates credentials from an optional user and an optional secret.
    ///
    /// A missing secret yields an empty buffer, not an absent one, so every
    /// later scrub and access path is unconditional.
    #[must_use]
    pub fn new(user: Option<String>, secret: Option<Vec<u8>>) -> Self {
        Self {
            user,
            secret: Zeroizing::new(secret.unwrap_or_default()),
        }
    }

    /// Creates empty credentials for an unauthenticated proxy.
    #[must_use]
    pub fn none() -> Self {
        Self::new(None, None)
    }

    /// Returns the user identifier, if any.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Calls `f` with a view of the secret bytes.
    ///
    /// The closure-scoped access keeps the secret from being copied into
    /// caller-owned storage by accident; a retired secret presents as an
    /// empty slice.
    pub fn with_secret<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.secret)
    }

    /// Returns whether the secret buffer is empty.
    #[must_use]
    pub fn secret_is_empty(&self) -> bool {
        self.secret.is_empty()
    }

    /// Overwrites the secret bytes with zeros and replaces the buffer with an
    /// empty one. Safe to call any number of times.
    pub fn clear(&mut self) {
        self.secret.zeroize();
        self.secret = Zeroizing::new(Vec::new());
    }
}
