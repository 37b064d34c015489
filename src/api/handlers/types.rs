//! Request/response types for the menu login endpoints.

use crate::protocol::FormTokens;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Login form fields. Missing fields deserialize as empty strings.
#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default = "empty_secret", deserialize_with = "secret_string")]
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
    #[serde(default)]
    pub security: String,
}

impl Default for LoginRequest {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: empty_secret(),
            security: String::new(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub security: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct WidgetResponse {
    pub html: String,
    /// Popup markup; only while logged out with AJAX enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup: Option<String>,
    /// Only present alongside `popup`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<FormTokens>,
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}
