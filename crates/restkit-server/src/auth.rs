//! Token authentication for client identification.
//!
//! Only tokens known to an [`Authenticator`] make a client authenticated;
//! any other `Authorization` header leaves the client anonymous and it is
//! throttled by address.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Resolves a presented token to a user id.
pub trait Authenticator: Send + Sync + fmt::Debug {
    /// User id for `token`, or `None` when the token is not recognised.
    fn authenticate(&self, token: &str) -> Option<String>;
}

/// Authenticator backed by a fixed token → user map (`auth.tokens`).
///
/// An empty map rejects every token.
#[derive(Clone, Default)]
pub struct StaticTokens {
    tokens: HashMap<String, String>,
}

impl StaticTokens {
    pub fn new(tokens: &BTreeMap<String, String>) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|(token, user)| (token.clone(), user.clone()))
                .collect(),
        }
    }

    /// Agrega un token (builder style, util en tests).
    pub fn with_token(mut self, token: impl Into<String>, user: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user.into());
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Authenticator for StaticTokens {
    fn authenticate(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }
}

// Nunca loguear los tokens
impl fmt::Debug for StaticTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokens")
            .field("tokens", &format!("[{} tokens]", self.tokens.len()))
            .finish()
    }
}
