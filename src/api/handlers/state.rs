//! Handler configuration shared through an `Extension`.

const DEFAULT_ACCOUNT_URL: &str = "/my-account/";
const DEFAULT_WELCOME_MESSAGE: &str = "Welcome ";
const DEFAULT_LOGIN_TITLE: &str = "Login";

#[derive(Clone, Debug)]
pub struct AjaxConfig {
    account_url: String,
    welcome_message: String,
    login_title: String,
    secure_cookies: bool,
    /// Logged-out visitors get the popup; otherwise a plain account link.
    enable_ajax: bool,
}

impl Default for AjaxConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AjaxConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            account_url: DEFAULT_ACCOUNT_URL.to_string(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            login_title: DEFAULT_LOGIN_TITLE.to_string(),
            secure_cookies: false,
            enable_ajax: true,
        }
    }

    #[must_use]
    pub fn with_account_url(mut self, url: String) -> Self {
        self.account_url = url;
        self
    }

    #[must_use]
    pub fn with_welcome_message(mut self, message: String) -> Self {
        self.welcome_message = message;
        self
    }

    #[must_use]
    pub fn with_login_title(mut self, title: String) -> Self {
        self.login_title = title;
        self
    }

    #[must_use]
    pub fn with_enable_ajax(mut self, enable: bool) -> Self {
        self.enable_ajax = enable;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn account_url(&self) -> &str {
        &self.account_url
    }

    #[must_use]
    pub fn welcome_message(&self) -> &str {
        &self.welcome_message
    }

    #[must_use]
    pub fn login_title(&self) -> &str {
        &self.login_title
    }

    #[must_use]
    pub const fn enable_ajax(&self) -> bool {
        self.enable_ajax
    }

    #[must_use]
    pub const fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}
