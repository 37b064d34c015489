//! Drives the popup controller against a live server.
//!
//! Each test binds the router to an ephemeral port, fetches the widget the way a
//! page would and submits through [`HttpTransport`] with a shared cookie store.

use anyhow::Result;
use menu_login::{
    api::{self, AjaxConfig},
    identity::{IdentityProvider, MemoryIdentityProvider},
    popup::{
        ActionRequest, FormKind, HttpTransport, Outcome, PopupController, PopupElements,
        PopupSettings, PopupState,
    },
    protocol::FormTokens,
};
use reqwest::Client;
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

#[derive(Deserialize)]
struct Widget {
    html: String,
    popup: Option<String>,
    tokens: Option<FormTokens>,
}

struct TestServer {
    base_url: Url,
    client: Client,
    provider: Arc<MemoryIdentityProvider>,
}

impl TestServer {
    async fn start() -> Result<Self> {
        let provider = Arc::new(MemoryIdentityProvider::new());
        provider.create_account(
            "alice",
            &SecretString::from("CorrectHorse".to_string()),
            "alice@example.com",
        )?;

        let app = api::router(provider.clone(), AjaxConfig::new());
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service()).await;
        });

        Ok(Self {
            base_url: Url::parse(&format!("http://{addr}/"))?,
            client: Client::builder().cookie_store(true).build()?,
            provider,
        })
    }

    async fn widget(&self) -> Result<Widget> {
        Ok(self
            .client
            .get(self.base_url.join("menu-login/widget/main")?)
            .send()
            .await?
            .json()
            .await?)
    }

    fn transport(&self) -> HttpTransport {
        HttpTransport::with_client(self.client.clone(), self.base_url.clone())
    }
}

fn login(username: &str, password: &str, tokens: &FormTokens) -> ActionRequest {
    ActionRequest::Login {
        username: username.to_string(),
        password: SecretString::from(password.to_string()),
        security: tokens.login.clone(),
    }
}

#[tokio::test]
async fn login_replaces_trigger() -> Result<()> {
    let server = TestServer::start().await?;
    let widget = server.widget().await?;
    assert!(widget.html.contains("menu-login-icon unlogged"));
    let tokens = widget.tokens.unwrap_or_default();
    let markup = format!("{}{}", widget.html, widget.popup.unwrap_or_default());
    for id in PopupElements::for_instance("main").all() {
        assert!(markup.contains(id), "missing {id}");
    }

    let mut popup = PopupController::new("main", PopupSettings::new());
    assert!(popup.click_trigger());
    assert_eq!(popup.state(), PopupState::LoginForm);

    let outcome = popup
        .submit(&server.transport(), login("alice", "CorrectHorse", &tokens))
        .await?;
    assert_eq!(outcome, Outcome::LoggedIn);
    assert_eq!(popup.state(), PopupState::Hidden);

    let view = popup.view();
    assert!(!view.popup_visible);
    assert_eq!(view.trigger_href, "/my-account/");
    assert!(!view.trigger_unlogged);
    assert!(!view.trigger_bound);
    let html = view.trigger_html.clone().unwrap_or_default();
    assert!(html.contains("menu-login-icon loggedin-new"));
    assert!(html.contains("menu-login-user-name\">alice<"));

    // the session cookie now renders the logged-in trigger
    let widget = server.widget().await?;
    assert!(widget.tokens.is_none());
    assert!(widget.popup.is_none());
    assert!(widget.html.contains(r#"href="/my-account/""#));
    Ok(())
}

#[tokio::test]
async fn wrong_password_keeps_login_form() -> Result<()> {
    let server = TestServer::start().await?;
    let tokens = server.widget().await?.tokens.unwrap_or_default();

    let mut popup = PopupController::new("main", PopupSettings::new());
    popup.click_trigger();
    let outcome = popup
        .submit(&server.transport(), login("alice", "wrong", &tokens))
        .await?;

    assert_eq!(
        outcome,
        Outcome::Failed {
            form: FormKind::Login,
            message: "Invalid username or password.".to_string(),
        }
    );
    assert_eq!(popup.state(), PopupState::LoginForm);
    assert!(popup.view().login_visible);
    assert!(popup.view().trigger_bound);
    Ok(())
}

#[tokio::test]
async fn stale_token_fails_security_check() -> Result<()> {
    let server = TestServer::start().await?;
    let tokens = FormTokens {
        login: "not-a-token".to_string(),
        register: String::new(),
    };

    let mut popup = PopupController::new("main", PopupSettings::new());
    popup.click_trigger();
    popup
        .submit(&server.transport(), login("alice", "CorrectHorse", &tokens))
        .await?;
    assert_eq!(popup.view().login_error, "Security check failed.");
    Ok(())
}

#[tokio::test]
async fn duplicate_email_shows_conflict_then_toggle_clears_it() -> Result<()> {
    let server = TestServer::start().await?;
    let tokens = server.widget().await?.tokens.unwrap_or_default();

    let mut popup = PopupController::new("main", PopupSettings::new());
    popup.click_trigger();
    assert!(popup.click_toggle());
    assert_eq!(popup.view().toggle_text, "Return to Login");

    let outcome = popup
        .submit(
            &server.transport(),
            ActionRequest::Register {
                email: "alice@example.com".to_string(),
                security: tokens.register.clone(),
            },
        )
        .await?;
    assert!(matches!(outcome, Outcome::Failed { form: FormKind::Register, .. }));
    assert_eq!(popup.state(), PopupState::RegisterForm);
    assert_eq!(popup.view().register_error, "Email already registered.");
    assert_eq!(server.provider.user_count(), 1);

    assert!(popup.click_toggle());
    assert_eq!(popup.state(), PopupState::LoginForm);
    assert!(popup.view().register_error.is_empty());
    assert!(popup.view().login_error.is_empty());
    Ok(())
}

#[tokio::test]
async fn registration_logs_in_new_account() -> Result<()> {
    let server = TestServer::start().await?;
    let tokens = server.widget().await?.tokens.unwrap_or_default();

    let mut popup = PopupController::new("main", PopupSettings::new());
    popup.click_trigger();
    popup.click_toggle();
    let outcome = popup
        .submit(
            &server.transport(),
            ActionRequest::Register {
                email: "Bob@Example.com".to_string(),
                security: tokens.register,
            },
        )
        .await?;

    assert_eq!(outcome, Outcome::LoggedIn);
    assert!(popup
        .view()
        .trigger_html
        .as_deref()
        .is_some_and(|html| html.contains("menu-login-user-name\">bob<")));
    assert!(server.provider.lookup_by_email("bob@example.com").is_some());
    Ok(())
}

#[tokio::test]
async fn account_page_asks_for_reload() -> Result<()> {
    let server = TestServer::start().await?;
    let tokens = server.widget().await?.tokens.unwrap_or_default();

    let settings =
        PopupSettings::new().with_page_url(format!("{}my-account/", server.base_url));
    let mut popup = PopupController::new("main", settings);
    popup.click_trigger();
    let outcome = popup
        .submit(&server.transport(), login("alice", "CorrectHorse", &tokens))
        .await?;
    assert_eq!(outcome, Outcome::Reload);
    Ok(())
}
