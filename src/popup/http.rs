use super::transport::{ActionRequest, Transport, TransportError};
use crate::{protocol::AuthResult, APP_USER_AGENT};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::{debug, instrument};
use url::Url;

/// [`Transport`] over HTTP. The client keeps a cookie store so the session set
/// by login or registration rides along on the current-user request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: Url) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured client, e.g. one sharing the page's cookie jar.
    #[must_use]
    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        // join() replaces the last segment unless the base ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip_all, fields(action = ?request.action()))]
    async fn send(&self, request: ActionRequest) -> Result<AuthResult, TransportError> {
        let url = self
            .base_url
            .join(request.action().path())
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let fields: Vec<(&str, &str)> = match &request {
            ActionRequest::Login {
                username,
                password,
                security,
            } => vec![
                ("username", username.as_str()),
                ("password", password.expose_secret()),
                ("security", security.as_str()),
            ],
            ActionRequest::CurrentUserInfo => Vec::new(),
            ActionRequest::Register { email, security } => {
                vec![("email", email.as_str()), ("security", security.as_str())]
            }
        };

        let response = self
            .client
            .post(url)
            .form(&fields)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        debug!(%status, "Response received");

        // Failures carry the envelope too, so the status alone is not an error.
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        serde_json::from_slice::<AuthResult>(&body).map_err(|e| {
            if status.is_success() {
                TransportError::Decode(e.to_string())
            } else {
                TransportError::Network(
                    status
                        .canonical_reason()
                        .map_or_else(|| status.to_string(), ToString::to_string),
                )
            }
        })
    }
}
