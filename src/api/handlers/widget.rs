use super::{
    error::HandlerError,
    session::extract_session_token,
    state::AjaxConfig,
    tokens::form_tokens,
    types::WidgetResponse,
    user_info::render_user_fragment,
    utils::{escape_html, valid_widget_id},
};
use crate::{
    identity::{SharedProvider, UserRecord},
    popup::PopupElements,
};
use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Wrapper and anchor for one widget placement.
///
/// Logged-in visitors get the account link and the user fragment. Everyone else
/// gets the `unlogged` icon, and with AJAX enabled an anchor carrying the popup
/// trigger id.
#[must_use]
pub fn render_trigger(widget_id: &str, user: Option<&UserRecord>, config: &AjaxConfig) -> String {
    let id = escape_html(widget_id);
    let account_url = escape_html(config.account_url());
    let (anchor, content) = match user {
        Some(user) => (
            format!(r#"<a href="{account_url}" class="menu-login-link">"#),
            render_user_fragment(user, config.welcome_message()),
        ),
        None => (
            if config.enable_ajax() {
                format!(r##"<a href="#" class="menu-login-link" id="menu-login-ajax-trigger-{id}">"##)
            } else {
                format!(r#"<a href="{account_url}" class="menu-login-link">"#)
            },
            format!(
                concat!(
                    r#"<div class="menu-login-icon unlogged"></div>"#,
                    r#"<div class="menu-login-messages" style="gap:4px;">"#,
                    r#"<span class="menu-login-message menu-login-welcome">{}</span>"#,
                    r#"<span class="menu-login-message menu-login-login-text">login</span>"#,
                    "</div>"
                ),
                escape_html(config.welcome_message())
            ),
        ),
    };

    format!(
        r#"<div class="menu-login-wrapper menu-login-wrapper-{id}" style="display:inline-flex;align-items:center;gap:8px;">{anchor}{content}</a></div>"#
    )
}

/// Hidden popup with the login and register forms of one widget placement.
///
/// The register form and the spinner start hidden; the controller toggles them.
#[must_use]
pub fn render_popup(widget_id: &str, config: &AjaxConfig) -> String {
    let id = escape_html(widget_id);
    let ids = PopupElements::for_instance(&id);
    let title = escape_html(config.login_title());

    let login = format!(
        concat!(
            r#"<div id="{form}">"#,
            r#"<h3 class="menu-login-title">{title}</h3>"#,
            r#"<form id="menu-login-ajax-form-{id}">"#,
            r#"<label class="menu-login-field-label">Username</label>"#,
            r#"<input type="text" id="menu-login-username-{id}" />"#,
            r#"<label class="menu-login-field-label">Password</label>"#,
            r#"<input type="password" id="menu-login-password-{id}" />"#,
            r#"<button type="submit" class="menu-login-button">Log In</button>"#,
            r#"<button type="button" class="menu-login-cancel-button" id="{cancel}">Cancel</button>"#,
            "</form>",
            r#"<div id="{error}"></div>"#,
            r##"<div class="menu-login-register"><a href="#" class="menu-toggle-link">Register</a></div>"##,
            "</div>"
        ),
        form = ids.login_form,
        title = title,
        id = id,
        cancel = ids.login_cancel,
        error = ids.login_error,
    );

    let register = format!(
        concat!(
            r#"<div id="{form}" style="display:none;">"#,
            r#"<h3 class="menu-login-title">Register</h3>"#,
            r#"<form id="menu-register-ajax-form-{id}">"#,
            r#"<label class="menu-login-field-label">Email</label>"#,
            r#"<input type="email" id="menu-register-email-{id}" />"#,
            r#"<button type="submit" class="menu-login-button">Register</button>"#,
            r#"<button type="button" class="menu-login-cancel-button" id="{cancel}">Cancel</button>"#,
            "</form>",
            r#"<div id="{error}"></div>"#,
            r##"<div><a href="#" class="menu-toggle-link">Return to Login</a></div>"##,
            "</div>"
        ),
        form = ids.register_form,
        id = id,
        cancel = ids.register_cancel,
        error = ids.register_error,
    );

    format!(
        concat!(
            r#"<div id="{popup}" class="menu-login-ajax-popup" style="display:none;position:fixed;top:0;left:0;width:100vw;height:100vh;background-color:rgba(0,0,0,0.7);justify-content:center;align-items:center;z-index:999999;">"#,
            r#"<div id="menu-login-ajax-content-{id}" style="max-width:300px;width:90%;text-align:center;">"#,
            "{login}{register}",
            r#"<div id="{loading}" style="display:none;margin:auto;"><div class="menu-login-spinner"></div></div>"#,
            "</div></div>"
        ),
        popup = ids.popup,
        id = id,
        login = login,
        register = register,
        loading = ids.loading,
    )
}

#[utoipa::path(
    get,
    path= "/menu-login/widget/{widget_id}",
    params(("widget_id" = String, Path, description = "Widget placement id")),
    responses (
        (status = 200, description = "Trigger markup, plus popup markup and form tokens when logged out", body = WidgetResponse),
        (status = 400, description = "Invalid widget id", body = crate::protocol::Envelope),
    ),
    tag= "widget"
)]
#[instrument(skip(headers, provider, config))]
pub async fn widget(
    Path(widget_id): Path<String>,
    headers: HeaderMap,
    provider: Extension<SharedProvider>,
    config: Extension<Arc<AjaxConfig>>,
) -> Response {
    if !valid_widget_id(&widget_id) {
        return HandlerError::Validation("Invalid widget id.").into_response();
    }

    let user = extract_session_token(&headers).and_then(|token| provider.current_session(&token));
    let html = render_trigger(&widget_id, user.as_ref(), &config);
    let (popup, tokens) = if user.is_none() && config.enable_ajax() {
        (
            Some(render_popup(&widget_id, &config)),
            Some(form_tokens(provider.0.as_ref())),
        )
    } else {
        (None, None)
    };

    (StatusCode::OK, Json(WidgetResponse { html, popup, tokens })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_out_trigger_opens_popup() {
        let html = render_trigger("abc123", None, &AjaxConfig::new());
        assert!(html.contains(r#"class="menu-login-wrapper menu-login-wrapper-abc123""#));
        assert!(html.contains(r##"href="#""##));
        assert!(html.contains(r#"id="menu-login-ajax-trigger-abc123""#));
        assert!(html.contains("menu-login-icon unlogged"));
        assert!(html.contains(">login</span>"));
    }

    #[test]
    fn trigger_without_ajax_links_to_account() {
        let config = AjaxConfig::new()
            .with_account_url("/account/".to_string())
            .with_enable_ajax(false);
        let html = render_trigger("abc123", None, &config);
        assert!(html.contains(r#"<a href="/account/" class="menu-login-link">"#));
        assert!(!html.contains("menu-login-ajax-trigger"));
        assert!(html.contains("menu-login-icon unlogged"));
    }

    #[test]
    fn popup_carries_every_element_id() {
        let config = AjaxConfig::new();
        let markup = format!(
            "{}{}",
            render_trigger("abc123", None, &config),
            render_popup("abc123", &config)
        );
        for id in PopupElements::for_instance("abc123").all() {
            assert!(markup.contains(id), "missing {id}");
        }
    }

    #[test]
    fn popup_starts_hidden_on_login_form() {
        let config = AjaxConfig::new().with_login_title("Sign <in>".to_string());
        let html = render_popup("abc123", &config);
        assert!(html.starts_with(r#"<div id="menu-login-ajax-popup-abc123" class="menu-login-ajax-popup" style="display:none;"#));
        assert!(html.contains(r#"<div id="menu-login-form-container-abc123">"#));
        assert!(html.contains(r#"<div id="menu-register-form-container-abc123" style="display:none;">"#));
        assert!(html.contains(r#"<div id="menu-login-loading-abc123" style="display:none;"#));
        assert!(html.contains(">Sign &lt;in&gt;</h3>"));
        assert!(html.contains(">Return to Login</a>"));
    }

    #[test]
    fn logged_in_trigger_links_to_account() {
        let user = UserRecord {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            avatar_url: None,
        };
        let config = AjaxConfig::new().with_account_url("/account/".to_string());
        let html = render_trigger("abc123", Some(&user), &config);
        assert!(html.contains(r#"<a href="/account/" class="menu-login-link">"#));
        assert!(!html.contains("menu-login-ajax-trigger"));
        assert!(!html.contains("unlogged"));
        assert!(html.contains("loggedin-new\">A</div>"));
    }
}
