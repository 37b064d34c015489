//! # Menu Login
//!
//! `menu_login` powers a login/account trigger placed in a site menu, plus the
//! popup that lets a visitor sign in or register without leaving the page.
//!
//! ## Server
//!
//! Three `POST` handlers proxy to an injected [`identity::IdentityProvider`]:
//! login, current-user-info and registration. Every handler answers with the
//! same envelope (`{"success": bool, "data": {...}}`, see
//! [`protocol::AuthResult`]) and never surfaces provider internals.
//!
//! State-mutating handlers verify a scoped security token before doing anything
//! else. Tokens are minted per form (`login`, `register`) and handed to the
//! client together with the widget markup.
//!
//! ## Client
//!
//! [`popup::PopupController`] is the per-widget state machine driving the popup:
//! `Hidden`, `LoginForm`, `RegisterForm` and `Submitting`. Submissions are
//! single-flight and go through a [`popup::Transport`]; the bundled
//! [`popup::HttpTransport`] talks to the server over HTTP.

pub mod api;
pub mod cli;
pub mod identity;
pub mod popup;
pub mod protocol;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
