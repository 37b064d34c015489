use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SEED_USER: &str = "seed-user";

/// An account created at start-up, given as `username:email:password`.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

impl SeedUser {
    /// Split `username:email:password`. The password may itself contain `:`.
    ///
    /// # Errors
    /// Returns an error if any of the three parts is missing or blank.
    pub fn parse(value: &str) -> Result<Self> {
        let mut parts = value.splitn(3, ':');
        let (Some(username), Some(email), Some(password)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(anyhow!(
                "invalid --{ARG_SEED_USER}, expected username:email:password"
            ));
        };

        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(anyhow!(
                "invalid --{ARG_SEED_USER}, username, email and password are required"
            ));
        }

        Ok(Self {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: SecretString::from(password.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    pub session_ttl_seconds: u64,
    pub seed_users: Vec<SeedUser>,
}

impl Options {
    /// Parse session and account arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a seed user is malformed.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let seed_users = matches
            .get_many::<String>(ARG_SEED_USER)
            .map(|values| values.map(|v| SeedUser::parse(v)).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            session_ttl_seconds: matches
                .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(1_209_600),
            seed_users,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Lifetime of remember-me sessions in seconds")
                .env("MENU_LOGIN_SESSION_TTL_SECONDS")
                .default_value("1209600")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SEED_USER)
                .long(ARG_SEED_USER)
                .help("Account to create at start-up, as username:email:password (repeatable)")
                .env("MENU_LOGIN_SEED_USER")
                .action(ArgAction::Append),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_seed_user_parse() -> Result<()> {
        let user = SeedUser::parse("alice:alice@example.com:pa:ss")?;
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.password.expose_secret(), "pa:ss");
        Ok(())
    }

    #[test]
    fn test_seed_user_rejects_missing_parts() {
        assert!(SeedUser::parse("alice").is_err());
        assert!(SeedUser::parse("alice:alice@example.com").is_err());
        assert!(SeedUser::parse("alice:alice@example.com:").is_err());
        assert!(SeedUser::parse(" :alice@example.com:pw").is_err());
    }

    #[test]
    fn test_options_from_args() -> Result<()> {
        temp_env::with_vars(
            [
                ("MENU_LOGIN_SESSION_TTL_SECONDS", None::<&str>),
                ("MENU_LOGIN_SEED_USER", None),
            ],
            || {
                let matches = with_args(Command::new("test")).get_matches_from(vec![
                    "test",
                    "--seed-user",
                    "alice:alice@example.com:pw1",
                    "--seed-user",
                    "bob:bob@example.com:pw2",
                ]);
                let options = Options::parse(&matches)?;
                assert_eq!(options.session_ttl_seconds, 1_209_600);
                assert_eq!(options.seed_users.len(), 2);
                assert_eq!(options.seed_users[1].username, "bob");
                Ok(())
            },
        )
    }

    #[test]
    fn test_session_ttl_env() -> Result<()> {
        temp_env::with_vars(
            [
                ("MENU_LOGIN_SESSION_TTL_SECONDS", Some("3600")),
                ("MENU_LOGIN_SEED_USER", None),
            ],
            || {
                let matches = with_args(Command::new("test")).get_matches_from(vec!["test"]);
                let options = Options::parse(&matches)?;
                assert_eq!(options.session_ttl_seconds, 3600);
                assert!(options.seed_users.is_empty());
                Ok(())
            },
        )
    }
}
