//! Wire types shared by the server handlers and the popup client.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of every handler.
///
/// Serialized as the envelope clients branch on:
/// `{"success": true, "data": {"message": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Envelope", from = "Envelope")]
pub enum AuthResult {
    Success {
        message: Option<String>,
        html: Option<String>,
    },
    Failure {
        message: String,
    },
}

impl AuthResult {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Success {
            message: Some(message.into()),
            html: None,
        }
    }

    #[must_use]
    pub fn html(html: impl Into<String>) -> Self {
        Self::Success {
            message: None,
            html: Some(html.into()),
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: EnvelopeData,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvelopeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl From<AuthResult> for Envelope {
    fn from(result: AuthResult) -> Self {
        match result {
            AuthResult::Success { message, html } => Self {
                success: true,
                data: EnvelopeData { message, html },
            },
            AuthResult::Failure { message } => Self {
                success: false,
                data: EnvelopeData {
                    message: Some(message),
                    html: None,
                },
            },
        }
    }
}

impl From<Envelope> for AuthResult {
    fn from(envelope: Envelope) -> Self {
        let EnvelopeData { message, html } = envelope.data;
        if envelope.success {
            Self::Success { message, html }
        } else {
            Self::Failure {
                message: message.unwrap_or_default(),
            }
        }
    }
}

/// Security tokens a popup submits with each form.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FormTokens {
    pub login: String,
    pub register: String,
}

/// The three AJAX actions a popup can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Login,
    CurrentUserInfo,
    Register,
}

impl Action {
    /// Path of the action relative to the server base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "menu-login/login",
            Self::CurrentUserInfo => "menu-login/current-user",
            Self::Register => "menu-login/register",
        }
    }
}
