//! Maps validated CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, site};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if arguments are missing or malformed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let site_opts = site::Options::parse(matches)?;
    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        account_url: site_opts.account_url,
        welcome_message: site_opts.welcome_message,
        allowed_origin: site_opts.allowed_origin,
        secure_cookies: site_opts.secure_cookies,
        enable_ajax: site_opts.enable_ajax,
        login_title: site_opts.login_title,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        seed_users: auth_opts.seed_users,
    }))
}
