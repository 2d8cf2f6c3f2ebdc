use std::fmt;

use indexmap::IndexMap;

/// One authentication challenge offered by a proxy or server.
///
/// Per RFC 7235 a challenge is a mechanism name followed either by a single
/// token68 blob or by a comma-separated list of `key=value` arguments. The
/// populating parser decides which form applies from the wire syntax it
/// observed and calls [`AuthChallenge::set_token`] or
/// [`AuthChallenge::add_argument`] accordingly; the object itself does not
/// enforce the mutual exclusivity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthChallenge {
    mechanism: String,
    token: Option<String>,
    arguments: IndexMap<String, String>,
}

impl AuthChallenge {
    /// Creates a new challenge for the given mechanism, with no token and no
    /// arguments.
    #[must_use]
    pub fn new(mechanism: impl Into<String>) -> Self {
        Self {
            mechanism: mechanism.into(),
            token: None,
            arguments: IndexMap::new(),
        }
    }

    /// Returns the authentication mechanism of this challenge, for instance
    /// `"Basic"`.
    #[must_use]
    pub fn mechanism(&self) -> &str {
        &self.mechanism
    }

    /// Returns the token68 value of the challenge, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Records the single-token form of the challenge.
    ///
    /// The populating parser calls this once when it observed a token68
    /// value; re-setting replaces the previous token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Appends or overwrites one `key=value` argument.
    ///
    /// Insertion order is preserved; a duplicate key keeps its original
    /// position and takes the latest value.
    pub fn add_argument(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.arguments.insert(key.into(), value.into());
    }

    /// Returns the arguments of the challenge.
    ///
    /// The map is empty (not absent) when no arguments were added, so callers
    /// never need a presence check before iterating.
    #[must_use]
    pub fn arguments(&self) -> &IndexMap<String, String> {
        &self.arguments
    }
}

impl fmt::Display for AuthChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuthChallenge[{}, {}, {{",
            self.mechanism,
            self.token.as_deref().unwrap_or("<none>")
        )?;
        for (index, (key, value)) in self.arguments.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_challenge_has_no_token() {
        let challenge = AuthChallenge::new("Basic");
        assert_eq!(challenge.mechanism(), "Basic");
        assert!(challenge.token().is_none());
    }

    #[test]
    fn new_challenge_has_empty_arguments() {
        let challenge = AuthChallenge::new("Basic");
        assert!(challenge.arguments().is_empty());
    }

    #[test]
    fn set_token_records_value() {
        let mut challenge = AuthChallenge::new("Negotiate");
        challenge.set_token("dGVzdA==");
        assert_eq!(challenge.token(), Some("dGVzdA=="));
    }

    #[test]
    fn set_token_replaces_previous_value() {
        let mut challenge = AuthChallenge::new("Negotiate");
        challenge.set_token("first");
        challenge.set_token("second");
        assert_eq!(challenge.token(), Some("second"));
    }

    #[test]
    fn add_argument_preserves_insertion_order() {
        let mut challenge = AuthChallenge::new("Digest");
        challenge.add_argument("realm", "x");
        challenge.add_argument("nonce", "y");
        challenge.add_argument("qop", "auth");

        let keys: Vec<&str> = challenge.arguments().keys().map(String::as_str).collect();
        assert_eq!(keys, ["realm", "nonce", "qop"]);
    }

    #[test]
    fn duplicate_key_keeps_position_and_takes_latest_value() {
        let mut challenge = AuthChallenge::new("Digest");
        challenge.add_argument("realm", "x");
        challenge.add_argument("nonce", "y");
        challenge.add_argument("realm", "z");

        let entries: Vec<(&str, &str)> = challenge
            .arguments()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(entries, [("realm", "z"), ("nonce", "y")]);
    }

    #[test]
    fn clone_and_eq_work() {
        let mut challenge = AuthChallenge::new("Digest");
        challenge.add_argument("realm", "x");

        let cloned = challenge.clone();
        assert_eq!(challenge, cloned);

        let other = AuthChallenge::new("Digest");
        assert_ne!(challenge, other);
    }

    #[test]
    fn display_marks_absent_token() {
        let mut challenge = AuthChallenge::new("Digest");
        challenge.add_argument("realm", "x");
        challenge.add_argument("nonce", "y");

        assert_eq!(
            challenge.to_string(),
            "AuthChallenge[Digest, <none>, {realm=x, nonce=y}]"
        );
    }

    #[test]
    fn display_includes_token_when_present() {
        let mut challenge = AuthChallenge::new("Negotiate");
        challenge.set_token("dGVzdA==");

        assert_eq!(
            challenge.to_string(),
            "AuthChallenge[Negotiate, dGVzdA==, {}]"
        );
    }

    #[test]
    fn display_of_bare_challenge_is_stable() {
        let challenge = AuthChallenge::new("Basic");
        assert_eq!(challenge.to_string(), "AuthChallenge[Basic, <none>, {}]");
    }
}
