use crate::protocol::AuthResult;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Every way a handler can fail. The `Display` text is what the client shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("Security check failed.")]
    InvalidToken,
    #[error("{0}")]
    Validation(&'static str),
    // Same text for unknown users and wrong passwords.
    #[error("Invalid username or password.")]
    Auth,
    #[error("Not logged in.")]
    NotAuthenticated,
    #[error("Email already registered.")]
    Conflict,
    #[error("Registration failed.")]
    Creation,
    #[error("Account created, but automatic login failed. Please log in manually.")]
    PostRegistrationAuth,
}

impl HandlerError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth | Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Creation | Self::PostRegistrationAuth => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<HandlerError> for AuthResult {
    fn from(err: HandlerError) -> Self {
        Self::failure(err.to_string())
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        (self.status(), Json(AuthResult::from(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_client_copy() {
        assert_eq!(
            HandlerError::Auth.to_string(),
            "Invalid username or password."
        );
        assert_eq!(
            HandlerError::Conflict.to_string(),
            "Email already registered."
        );
        assert_eq!(
            HandlerError::Validation("Email is required.").to_string(),
            "Email is required."
        );
    }

    #[test]
    fn partial_registration_is_distinct_from_creation_failure() {
        assert_ne!(
            HandlerError::PostRegistrationAuth.to_string(),
            HandlerError::Creation.to_string()
        );
    }

    #[test]
    fn status_mapping() {
        assert_eq!(HandlerError::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            HandlerError::Validation("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(HandlerError::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            HandlerError::NotAuthenticated.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
