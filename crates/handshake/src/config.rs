/// Property key the coordinator consults for the handshake timeout, in
/// milliseconds.
pub const TIMEOUT_PROPERTY: &str = "proxy-handshake-timeout-millis";

/// Configuration source the coordinator reads at initialization time.
///
/// The session layer owns the actual configuration store; the coordinator
/// only needs a single signed integer lookup. A missing key or a
/// non-positive value makes the coordinator fall back to
/// [`DEFAULT_HANDSHAKE_TIMEOUT`](crate::DEFAULT_HANDSHAKE_TIMEOUT).
pub trait SessionConfig {
    /// Returns the signed integer value stored under `key`, if any.
    fn long_property(&self, key: &str) -> Option<i64>;
}

impl<F> SessionConfig for F
where
    F: Fn(&str) -> Option<i64>,
{
    fn long_property(&self, key: &str) -> Option<i64> {
        self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_serves_as_session_config() {
        let config = |key: &str| (key == TIMEOUT_PROPERTY).then_some(5000);
        assert_eq!(config.long_property(TIMEOUT_PROPERTY), Some(5000));
        assert_eq!(config.long_property("unrelated"), None);
    }

    #[test]
    fn missing_key_yields_none() {
        let config = |_: &str| None;
        assert_eq!(config.long_property(TIMEOUT_PROPERTY), None);
    }
}
