use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_ACCOUNT_URL: &str = "account-url";
pub const ARG_WELCOME_MESSAGE: &str = "welcome-message";
pub const ARG_ALLOWED_ORIGIN: &str = "allowed-origin";
pub const ARG_SECURE_COOKIES: &str = "secure-cookies";
pub const ARG_ENABLE_AJAX: &str = "enable-ajax";
pub const ARG_LOGIN_TITLE: &str = "login-title";

/// How the widget presents itself on the site.
#[derive(Debug, Clone)]
pub struct Options {
    pub account_url: String,
    pub welcome_message: String,
    pub allowed_origin: Option<String>,
    pub secure_cookies: bool,
    pub enable_ajax: bool,
    pub login_title: String,
}

impl Options {
    /// Parse site arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the account URL is blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let account_url = match matches.get_one::<String>(ARG_ACCOUNT_URL).cloned() {
            Some(value) if !value.trim().is_empty() => value,
            _ => anyhow::bail!("missing required argument: --{ARG_ACCOUNT_URL}"),
        };

        Ok(Self {
            account_url,
            welcome_message: matches
                .get_one::<String>(ARG_WELCOME_MESSAGE)
                .cloned()
                .unwrap_or_default(),
            allowed_origin: matches
                .get_one::<String>(ARG_ALLOWED_ORIGIN)
                .cloned()
                .filter(|v| !v.trim().is_empty()),
            secure_cookies: matches.get_flag(ARG_SECURE_COOKIES),
            enable_ajax: matches
                .get_one::<bool>(ARG_ENABLE_AJAX)
                .copied()
                .unwrap_or(true),
            login_title: matches
                .get_one::<String>(ARG_LOGIN_TITLE)
                .cloned()
                .unwrap_or_default(),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ACCOUNT_URL)
                .long(ARG_ACCOUNT_URL)
                .help("Account page the logged-in trigger links to")
                .env("MENU_LOGIN_ACCOUNT_URL")
                .default_value("/my-account/"),
        )
        .arg(
            Arg::new(ARG_WELCOME_MESSAGE)
                .long(ARG_WELCOME_MESSAGE)
                .help("Text shown before the user name")
                .env("MENU_LOGIN_WELCOME_MESSAGE")
                .default_value("Welcome "),
        )
        .arg(
            Arg::new(ARG_ALLOWED_ORIGIN)
                .long(ARG_ALLOWED_ORIGIN)
                .help("Site origin allowed to call the API with credentials (CORS)")
                .env("MENU_LOGIN_ALLOWED_ORIGIN"),
        )
        .arg(
            Arg::new(ARG_SECURE_COOKIES)
                .long(ARG_SECURE_COOKIES)
                .help("Mark the session cookie Secure")
                .env("MENU_LOGIN_SECURE_COOKIES")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_ENABLE_AJAX)
                .long(ARG_ENABLE_AJAX)
                .help("Open the login popup from the trigger; false links to the account page")
                .env("MENU_LOGIN_ENABLE_AJAX")
                .value_parser(clap::value_parser!(bool))
                .default_value("true"),
        )
        .arg(
            Arg::new(ARG_LOGIN_TITLE)
                .long(ARG_LOGIN_TITLE)
                .help("Heading of the popup login form")
                .env("MENU_LOGIN_LOGIN_TITLE")
                .default_value("Login"),
        )
}
