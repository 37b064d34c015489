//! Session cookie plumbing.

use super::state::AjaxConfig;
use crate::identity::Session;
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

pub const SESSION_COOKIE_NAME: &str = "menu_login_session";

/// Build an `HttpOnly` cookie for the session token.
///
/// Persistent sessions get a `Max-Age`; the others live until the browser closes.
pub(crate) fn session_cookie(
    config: &AjaxConfig,
    session: &Session,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
        session.token
    );
    if session.persistent {
        cookie.push_str(&format!("; Max-Age={}", session.ttl.as_secs()));
    }
    if config.secure_cookies() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty() {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UserRecord;
    use std::time::Duration;

    fn session(persistent: bool) -> Session {
        Session {
            token: "01HZY".to_string(),
            user: UserRecord {
                id: 1,
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                avatar_url: None,
            },
            persistent,
            ttl: Duration::from_secs(60),
        }
    }

    #[test]
    fn persistent_cookie_has_max_age() -> Result<(), InvalidHeaderValue> {
        let cookie = session_cookie(&AjaxConfig::new(), &session(true))?;
        assert_eq!(
            cookie.to_str().unwrap_or_default(),
            "menu_login_session=01HZY; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );
        Ok(())
    }

    #[test]
    fn browser_session_cookie_is_secure_when_configured() -> Result<(), InvalidHeaderValue> {
        let config = AjaxConfig::new().with_secure_cookies(true);
        let cookie = session_cookie(&config, &session(false))?;
        assert_eq!(
            cookie.to_str().unwrap_or_default(),
            "menu_login_session=01HZY; Path=/; HttpOnly; SameSite=Lax; Secure"
        );
        Ok(())
    }

    #[test]
    fn extract_finds_session_among_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; menu_login_session=abc123; other=1"),
        );
        assert_eq!(extract_session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn extract_ignores_missing_or_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("menu_login_session="));
        assert_eq!(extract_session_token(&headers), None);
    }
}
