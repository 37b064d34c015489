use super::{
    error::HandlerError, session::session_cookie, state::AjaxConfig, types::LoginRequest,
    utils::sanitize_username,
};
use crate::{
    identity::{Credentials, IdentityProvider, ProviderError, Session, SharedProvider, TokenScope},
    protocol::{AuthResult, Envelope},
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Verify the login token, validate the credentials and open a persistent
/// session.
///
/// # Errors
/// [`HandlerError::InvalidToken`] before anything else is looked at, then
/// [`HandlerError::Validation`] for blank fields (the provider is not called),
/// and [`HandlerError::Auth`] when the provider rejects the credentials.
pub fn authenticate(
    provider: &dyn IdentityProvider,
    request: &LoginRequest,
) -> Result<Session, HandlerError> {
    if !provider.verify_token(&request.security, TokenScope::Login) {
        debug!("Invalid login token");
        return Err(HandlerError::InvalidToken);
    }

    let username = sanitize_username(&request.username, false);
    if username.is_empty() || request.password.expose_secret().trim().is_empty() {
        return Err(HandlerError::Validation("Username/password cannot be empty."));
    }

    let credentials = Credentials {
        username,
        password: SecretString::from(request.password.expose_secret().to_string()),
        remember: true,
    };

    provider.sign_in(&credentials).map_err(|e| {
        match e {
            ProviderError::InvalidCredentials => debug!("Sign-in rejected"),
            other => error!("Sign-in failed: {other}"),
        }
        HandlerError::Auth
    })
}

#[utoipa::path(
    post,
    path= "/menu-login/login",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Login successful, session cookie set", body = Envelope),
        (status = 400, description = "Username or password empty", body = Envelope),
        (status = 401, description = "Invalid username or password", body = Envelope),
        (status = 403, description = "Security check failed", body = Envelope),
    ),
    tag= "login"
)]
#[instrument(skip_all)]
pub async fn login(
    provider: Extension<SharedProvider>,
    config: Extension<Arc<AjaxConfig>>,
    payload: Option<Form<LoginRequest>>,
) -> Response {
    let request = payload.map(|Form(request)| request).unwrap_or_default();

    let session = match authenticate(provider.0.as_ref(), &request) {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    let mut headers = HeaderMap::new();
    match session_cookie(&config, &session) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(e) => {
            error!("Error building session cookie: {e}");
            return HandlerError::Auth.into_response();
        }
    }

    debug!(user_id = session.user.id, "Login successful");

    (
        StatusCode::OK,
        headers,
        Json(AuthResult::message("Login successful!")),
    )
        .into_response()
}
