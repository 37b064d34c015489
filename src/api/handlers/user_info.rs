use super::{
    error::HandlerError, session::extract_session_token, state::AjaxConfig, utils::escape_html,
};
use crate::{
    identity::{IdentityProvider, SharedProvider, UserRecord},
    protocol::{AuthResult, Envelope},
};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

const DISPLAY_NAME_LIMIT: usize = 20;
const DISPLAY_NAME_KEEP: usize = 17;

/// Username as shown next to the avatar: anything over 20 characters is cut to
/// 17 plus an ellipsis.
#[must_use]
pub fn display_name(username: &str) -> String {
    if username.chars().count() > DISPLAY_NAME_LIMIT {
        let mut name: String = username.chars().take(DISPLAY_NAME_KEEP).collect();
        name.push_str("...");
        name
    } else {
        username.to_string()
    }
}

/// Single uppercased letter used when the user has no avatar image.
#[must_use]
pub fn avatar_letter(username: &str) -> String {
    username
        .chars()
        .next()
        .map_or_else(
            || '?'.to_string(),
            |c| c.to_uppercase().next().unwrap_or(c).to_string(),
        )
}

/// Icon and welcome block for a logged-in user.
#[must_use]
pub fn render_user_fragment(user: &UserRecord, welcome_message: &str) -> String {
    let icon = match &user.avatar_url {
        Some(url) => format!(
            r#"<div class="menu-login-icon loggedin-new"><img alt="Avatar" src="{}" class="menu-login-svg-icon avatar-img" height="96" width="96" /></div>"#,
            escape_html(url)
        ),
        None => format!(
            r#"<div class="menu-login-icon loggedin-new">{}</div>"#,
            escape_html(&avatar_letter(&user.username))
        ),
    };

    format!(
        concat!(
            "{}",
            r#"<div class="menu-login-messages" style="gap:4px;">"#,
            r#"<span class="menu-login-message menu-login-welcome">{}</span>"#,
            r#"<span class="menu-login-message menu-login-user-name">{}</span>"#,
            "</div>"
        ),
        icon,
        escape_html(welcome_message),
        escape_html(&display_name(&user.username))
    )
}

/// Resolve the session and render the refreshed trigger content.
///
/// # Errors
/// [`HandlerError::NotAuthenticated`] when there is no live session.
pub fn current_user_info(
    provider: &dyn IdentityProvider,
    session_token: Option<&str>,
    welcome_message: &str,
) -> Result<String, HandlerError> {
    let user = session_token
        .and_then(|token| provider.current_session(token))
        .ok_or(HandlerError::NotAuthenticated)?;

    debug!(user_id = user.id, "Rendering current user");

    Ok(render_user_fragment(&user, welcome_message))
}

#[utoipa::path(
    post,
    path= "/menu-login/current-user",
    responses (
        (status = 200, description = "Markup for the logged-in trigger", body = Envelope),
        (status = 401, description = "Not logged in", body = Envelope),
    ),
    tag= "login"
)]
#[instrument(skip_all)]
pub async fn current_user(
    headers: HeaderMap,
    provider: Extension<SharedProvider>,
    config: Extension<Arc<AjaxConfig>>,
) -> Response {
    let token = extract_session_token(&headers);
    match current_user_info(
        provider.0.as_ref(),
        token.as_deref(),
        config.welcome_message(),
    ) {
        Ok(html) => (StatusCode::OK, Json(AuthResult::html(html))).into_response(),
        Err(e) => e.into_response(),
    }
}
