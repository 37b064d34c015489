use crate::{
    identity::{IdentityProvider, SharedProvider, TokenScope},
    protocol::FormTokens,
};
use axum::{extract::Extension, response::IntoResponse, Json};

/// Mint one token per popup form.
#[must_use]
pub fn form_tokens(provider: &dyn IdentityProvider) -> FormTokens {
    FormTokens {
        login: provider.mint_token(TokenScope::Login),
        register: provider.mint_token(TokenScope::Register),
    }
}

#[utoipa::path(
    get,
    path= "/menu-login/tokens",
    responses (
        (status = 200, description = "Fresh security tokens for the login and register forms", body = FormTokens),
    ),
    tag= "tokens"
)]
pub async fn tokens(provider: Extension<SharedProvider>) -> impl IntoResponse {
    Json(form_tokens(provider.0.as_ref()))
}
