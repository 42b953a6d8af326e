//! # Group tokens.
//!
//! A [`Token`] identifies one job-group for its entire lifetime. Tokens are
//! generated once at registration, never reused, and equality is the only
//! operation the barrier needs from them.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Opaque, unique identifier scoping one job-group's lifecycle.
///
/// Cheap to clone (`Arc<str>` inside). Tokens are usually produced by
/// [`Token::generate`]; fixed tokens (via `From<&str>`) are mainly useful
/// in tests and for callers that carry their own identity scheme.
///
/// # Example
/// ```
/// use rendergate::Token;
///
/// let a = Token::generate();
/// let b = Token::generate();
/// assert_ne!(a, b);
/// assert_eq!(a, a.clone());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token(Arc<str>);

impl Token {
    /// Generates a statistically-unique token (UUID v4).
    pub fn generate() -> Self {
        Token(Uuid::new_v4().to_string().into())
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(s.into())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token(s.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_tokens_are_unique() {
        let tokens: HashSet<Token> = (0..64).map(|_| Token::generate()).collect();
        assert_eq!(tokens.len(), 64);
    }

    #[test]
    fn test_fixed_token_round_trip() {
        let t = Token::from("group-a");
        assert_eq!(t.as_str(), "group-a");
        assert_eq!(t.to_string(), "group-a");
        assert_eq!(t, Token::from("group-a"));
    }
}
