use crate::protocol::{Action, AuthResult};
use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

/// Failures below the envelope. The `Display` text is the detail shown after
/// the `AJAX Error` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Decode(String),
}

/// One call to a handler with its form fields.
#[derive(Debug)]
pub enum ActionRequest {
    Login {
        username: String,
        password: SecretString,
        security: String,
    },
    CurrentUserInfo,
    Register {
        email: String,
        security: String,
    },
}

impl ActionRequest {
    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::Login { .. } => Action::Login,
            Self::CurrentUserInfo => Action::CurrentUserInfo,
            Self::Register { .. } => Action::Register,
        }
    }
}

/// Carries one request to the server and hands back the decoded envelope.
///
/// Handler failures come back as `Ok(AuthResult::Failure)`; `Err` is reserved
/// for the request itself failing.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ActionRequest) -> Result<AuthResult, TransportError>;
}
