//! Signed-in state, passed explicitly to guards and widgets.
//!
//! A [`Session`] starts out [`SessionStatus::Resolving`], settles once the
//! current user has been looked up, is replaced on sign-in and cleared on
//! sign-out.

pub mod store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::User;

pub use store::TokenStore;

/// Looks up the user behind the current credentials.
///
/// Implementations never fail: an invalid or expired token resolves to
/// `None`, the same as having no token at all.
#[async_trait]
pub trait UserResolver {
    async fn resolve_current_user(&self) -> Option<User>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Resolving,
    Resolved(Option<User>),
}

#[derive(Debug, Clone)]
pub struct Session {
    status: SessionStatus,
    tokens: Option<TokenPair>,
}

impl Session {
    pub fn new(tokens: Option<TokenPair>) -> Self {
        Self {
            status: SessionStatus::Resolving,
            tokens,
        }
    }

    /// A settled session with nobody signed in.
    pub fn anonymous() -> Self {
        Self {
            status: SessionStatus::Resolved(None),
            tokens: None,
        }
    }

    /// A settled session for `user`, mostly useful in tests.
    pub fn signed_in(user: User, tokens: TokenPair) -> Self {
        Self {
            status: SessionStatus::Resolved(Some(user)),
            tokens: Some(tokens),
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Resolving
    }

    /// The signed-in user, if the session has settled with one.
    pub fn user(&self) -> Option<&User> {
        match &self.status {
            SessionStatus::Resolved(user) => user.as_ref(),
            SessionStatus::Resolving => None,
        }
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.access.as_str())
    }

    /// Settle the session. Without a token the resolver is not consulted.
    pub async fn resolve<R: UserResolver + ?Sized>(&mut self, resolver: &R) {
        self.status = SessionStatus::Resolving;
        let user = if self.tokens.is_some() {
            resolver.resolve_current_user().await
        } else {
            None
        };
        match &user {
            Some(u) => debug!("Session resolved for {} ({})", u.username, u.role),
            None => debug!("Session resolved without a user"),
        }
        self.status = SessionStatus::Resolved(user);
    }

    pub fn sign_in(&mut self, tokens: TokenPair, user: Option<User>) {
        self.tokens = Some(tokens);
        self.status = SessionStatus::Resolved(user);
    }

    /// Drop credentials and user. Returns the tokens that were held.
    pub fn sign_out(&mut self) -> Option<TokenPair> {
        self.status = SessionStatus::Resolved(None);
        self.tokens.take()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(None)
    }
}
