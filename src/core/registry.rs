//! # Pending registry: the set of job-groups still in flight.
//!
//! [`PendingSet`] holds the tokens whose group runners have not yet reported
//! an outcome. It is exclusively owned and mutated by the barrier's single
//! coordination loop; everything else requests add/remove through bus
//! messages. That funneling is what makes the registry race-free without a
//! lock — this is deliberately a plain struct, not a `Mutex<HashSet>`.
//!
//! ## Rules
//! - `add` / `remove` are idempotent
//! - A token is a member iff its runner has not reported an outcome
//! - The non-empty→empty transition is reported **exactly once** per drain
//!   cycle via [`Removal::Drained`]; removals from an already-empty set (or
//!   of absent tokens) never report it

use std::collections::HashSet;

use crate::jobs::Token;

/// Result of removing a token from the pending set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Removal {
    /// The token was not pending; nothing changed.
    NotPresent,
    /// The token was removed; other groups are still pending.
    Removed,
    /// The token was removed and it was the last one: the set transitioned
    /// from non-empty to empty.
    Drained,
}

/// Mutable set of tokens for job-groups currently in flight.
#[derive(Debug, Default)]
pub(crate) struct PendingSet {
    tokens: HashSet<Token>,
}

impl PendingSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records the token as pending. Returns `false` if it was already
    /// present (duplicate registration; the set is left intact).
    pub(crate) fn add(&mut self, token: Token) -> bool {
        self.tokens.insert(token)
    }

    /// Records the token as no-longer-pending.
    ///
    /// The `Drained` variant fires only on an actual non-empty→empty
    /// transition, so a caller emitting `RegistryEmpty` on it can never
    /// double-fire within one drain cycle.
    pub(crate) fn remove(&mut self, token: &Token) -> Removal {
        if !self.tokens.remove(token) {
            return Removal::NotPresent;
        }
        if self.tokens.is_empty() {
            Removal::Drained
        } else {
            Removal::Removed
        }
    }

    /// Returns true iff no tokens are pending.
    pub(crate) fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut set = PendingSet::new();
        assert!(set.add(Token::from("a")));
        assert!(!set.add(Token::from("a")));
        assert_eq!(set.remove(&Token::from("a")), Removal::Drained);
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_absent_token_is_noop() {
        let mut set = PendingSet::new();
        assert_eq!(set.remove(&Token::from("ghost")), Removal::NotPresent);
        assert!(set.is_empty());
    }

    #[test]
    fn test_drained_fires_exactly_once_per_cycle() {
        let mut set = PendingSet::new();
        set.add(Token::from("a"));
        set.add(Token::from("b"));

        assert_eq!(set.remove(&Token::from("a")), Removal::Removed);
        assert_eq!(set.remove(&Token::from("b")), Removal::Drained);
        // Second removal of the same token: no second transition.
        assert_eq!(set.remove(&Token::from("b")), Removal::NotPresent);
    }

    #[test]
    fn test_refill_starts_a_new_drain_cycle() {
        let mut set = PendingSet::new();
        set.add(Token::from("a"));
        assert_eq!(set.remove(&Token::from("a")), Removal::Drained);

        set.add(Token::from("b"));
        assert_eq!(set.remove(&Token::from("b")), Removal::Drained);
    }
}
