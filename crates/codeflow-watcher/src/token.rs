//! Supersede tokens for in-flight recomputations

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one recomputation. Later tokens compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(u64);

impl Token {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Hands out tokens and remembers which one is the latest. Only work
/// holding the latest token may publish.
#[derive(Debug, Default)]
pub struct TokenIssuer {
    latest: AtomicU64,
}

impl TokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// New token, superseding every earlier one.
    pub fn issue(&self) -> Token {
        Token(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest(&self) -> Option<Token> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(Token(n)),
        }
    }

    pub fn is_current(&self, token: Token) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_tokens_supersede() {
        let issuer = TokenIssuer::new();
        assert_eq!(issuer.latest(), None);

        let first = issuer.issue();
        assert!(issuer.is_current(first));

        let second = issuer.issue();
        assert!(second > first);
        assert!(!issuer.is_current(first));
        assert!(issuer.is_current(second));
        assert_eq!(issuer.latest(), Some(second));
        assert_eq!(second.sequence(), 2);
    }
}
