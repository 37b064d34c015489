use crate::{
    api::{self, AjaxConfig},
    cli::commands::auth::SeedUser,
    identity::{IdentityProvider, MemoryIdentityProvider, SharedProvider},
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub account_url: String,
    pub welcome_message: String,
    pub allowed_origin: Option<String>,
    pub secure_cookies: bool,
    pub enable_ajax: bool,
    pub login_title: String,
    pub session_ttl_seconds: u64,
    pub seed_users: Vec<SeedUser>,
}

impl Args {
    #[must_use]
    pub fn ajax_config(&self) -> AjaxConfig {
        AjaxConfig::new()
            .with_account_url(self.account_url.clone())
            .with_welcome_message(self.welcome_message.clone())
            .with_secure_cookies(self.secure_cookies)
            .with_enable_ajax(self.enable_ajax)
            .with_login_title(self.login_title.clone())
    }

    /// Build the in-memory provider and create the seed accounts.
    ///
    /// # Errors
    /// Returns an error if a seed account cannot be created.
    pub fn provider(&self) -> Result<SharedProvider> {
        let provider = MemoryIdentityProvider::new()
            .with_remember_ttl(Duration::from_secs(self.session_ttl_seconds));

        for seed in &self.seed_users {
            let id = provider
                .create_account(&seed.username, &seed.password, &seed.email)
                .with_context(|| format!("Failed to create seed user {}", seed.username))?;
            debug!(user_id = id, username = %seed.username, "Seed user created");
        }

        Ok(Arc::new(provider))
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if seeding fails or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let provider = args.provider()?;
    let config = args.ajax_config();

    info!(
        account_url = config.account_url(),
        enable_ajax = config.enable_ajax(),
        seed_users = args.seed_users.len(),
        "Starting menu login server"
    );

    api::new(args.port, provider, config, args.allowed_origin).await
}
