use super::{
    error::HandlerError,
    session::session_cookie,
    state::AjaxConfig,
    types::RegisterRequest,
    utils::{normalize_email, sanitize_username, valid_email},
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
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

const GENERATED_PASSWORD_LEN: usize = 12;
const FALLBACK_USERNAME: &str = "user";

/// Username candidate taken from the local part of an email address.
#[must_use]
pub fn derive_username(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let username = sanitize_username(local, true);
    if username.is_empty() {
        FALLBACK_USERNAME.to_string()
    } else {
        username
    }
}

/// Keep `candidate` unless it is taken, in which case append `_` and a random
/// four-digit number. Only one suffix is tried; a second collision surfaces as
/// a creation failure.
pub fn choose_username<R: Rng>(
    provider: &dyn IdentityProvider,
    candidate: String,
    rng: &mut R,
) -> String {
    if provider.lookup_by_username(&candidate) {
        let suffix: u16 = rng.gen_range(1000..=9999);
        format!("{candidate}_{suffix}")
    } else {
        candidate
    }
}

/// Create an account from an email address and sign it in.
///
/// # Errors
/// [`HandlerError::InvalidToken`], [`HandlerError::Validation`] and
/// [`HandlerError::Conflict`] leave no trace. [`HandlerError::Creation`] means the
/// provider refused the account. [`HandlerError::PostRegistrationAuth`] means the
/// account exists but no session could be opened.
pub fn register_account<R: Rng>(
    provider: &dyn IdentityProvider,
    request: &RegisterRequest,
    rng: &mut R,
) -> Result<Session, HandlerError> {
    if !provider.verify_token(&request.security, TokenScope::Register) {
        debug!("Invalid register token");
        return Err(HandlerError::InvalidToken);
    }

    let email = normalize_email(&request.email);
    if email.is_empty() {
        return Err(HandlerError::Validation("Email is required."));
    }
    if !valid_email(&email) {
        return Err(HandlerError::Validation("Invalid email address."));
    }

    if provider.lookup_by_email(&email).is_some() {
        return Err(HandlerError::Conflict);
    }

    let username = choose_username(provider, derive_username(&email), rng);
    let password = provider.generate_random_password(GENERATED_PASSWORD_LEN);

    match provider.create_account(&username, &password, &email) {
        Ok(id) => debug!(user_id = id, "Account created"),
        Err(ProviderError::EmailExists) => return Err(HandlerError::Conflict),
        Err(e) => {
            error!("Error creating account: {e}");
            return Err(HandlerError::Creation);
        }
    }

    let credentials = Credentials {
        username,
        password,
        remember: true,
    };

    provider.sign_in(&credentials).map_err(|e| {
        warn!("Account created but sign-in failed: {e}");
        HandlerError::PostRegistrationAuth
    })
}

#[utoipa::path(
    post,
    path= "/menu-login/register",
    request_body(content = RegisterRequest, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Registration successful, session cookie set", body = Envelope),
        (status = 400, description = "Email missing or malformed", body = Envelope),
        (status = 403, description = "Security check failed", body = Envelope),
        (status = 409, description = "Email already registered", body = Envelope),
        (status = 500, description = "Account could not be created or signed in", body = Envelope),
    ),
    tag= "register"
)]
#[instrument(skip_all)]
pub async fn register(
    provider: Extension<SharedProvider>,
    config: Extension<Arc<AjaxConfig>>,
    payload: Option<Form<RegisterRequest>>,
) -> Response {
    let request = payload.map(|Form(request)| request).unwrap_or_default();

    let session = match register_account(provider.0.as_ref(), &request, &mut rand::thread_rng()) {
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
            return HandlerError::PostRegistrationAuth.into_response();
        }
    }

    (
        StatusCode::OK,
        headers,
        Json(AuthResult::message("Registration successful!")),
    )
        .into_response()
}
