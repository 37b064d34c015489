//! Identity provider seam.
//!
//! Handlers never reach for ambient session or user state; they receive an
//! [`IdentityProvider`] and call it explicitly. [`MemoryIdentityProvider`] is the
//! reference implementation used by the binary and the tests.

use secrecy::SecretString;
use std::{fmt, sync::Arc, time::Duration};
use thiserror::Error;

pub mod memory;
pub use self::memory::MemoryIdentityProvider;

pub type UserId = u64;

pub type SharedProvider = Arc<dyn IdentityProvider>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Sign-in input. The password is only exposed to the provider.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub remember: bool,
}

/// An established session; `token` is what the session cookie carries.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
    pub persistent: bool,
    pub ttl: Duration,
}

/// The form a security token was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    Login,
    Register,
}

impl TokenScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "menu_login_ajax_nonce",
            Self::Register => "menu_register_ajax_nonce",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("username already exists: {0}")]
    UsernameExists(String),
    #[error("email already exists")]
    EmailExists,
    #[error("invalid account data: {0}")]
    InvalidAccount(&'static str),
    #[error("identity storage unavailable")]
    Storage,
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// User accounts, sessions and anti-forgery tokens owned by the host.
pub trait IdentityProvider: Send + Sync + fmt::Debug {
    /// Verify credentials and open a session.
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidCredentials`] for unknown users and bad
    /// passwords alike.
    fn sign_in(&self, credentials: &Credentials) -> Result<Session, ProviderError>;

    /// # Errors
    /// Returns an error if the account cannot be stored.
    fn create_account(
        &self,
        username: &str,
        password: &SecretString,
        email: &str,
    ) -> Result<UserId, ProviderError>;

    fn current_session(&self, token: &str) -> Option<UserRecord>;

    fn lookup_by_email(&self, email: &str) -> Option<UserRecord>;

    fn lookup_by_username(&self, username: &str) -> bool;

    fn generate_random_password(&self, length: usize) -> SecretString;

    fn mint_token(&self, scope: TokenScope) -> String;

    fn verify_token(&self, token: &str, scope: TokenScope) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_scopes_are_distinct() {
        assert_ne!(TokenScope::Login.as_str(), TokenScope::Register.as_str());
        assert_eq!(TokenScope::Login.to_string(), "menu_login_ajax_nonce");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let credentials = Credentials {
            username: "alice".to_string(),
            password: SecretString::from("hunter2".to_string()),
            remember: true,
        };
        let debug = format!("{credentials:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
