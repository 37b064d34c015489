//! In-process identity provider backed by hash maps.

use super::{
    Credentials, IdentityProvider, ProviderError, Session, TokenScope, UserId, UserRecord,
};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng, RngCore};
use secrecy::{ExposeSecret, SecretSlice, SecretString};
use sha2::Sha256;
use std::{
    collections::HashMap,
    sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};
use tracing::{debug, error};
use ulid::Ulid;

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_REMEMBER_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(2 * 24 * 60 * 60);
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_USERNAME_LEN: usize = 60;
const TOKEN_KEY_LEN: usize = 32;

/// Checked when the login matches no account so both paths pay for argon2.
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

#[derive(Debug)]
struct StoredUser {
    record: UserRecord,
    password_hash: String,
}

#[derive(Debug)]
struct SessionEntry {
    user_id: UserId,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Store {
    next_id: UserId,
    users: HashMap<UserId, StoredUser>,
    sessions: HashMap<String, SessionEntry>,
}

impl Store {
    fn find_by_login(&self, login: &str) -> Option<&StoredUser> {
        self.users.values().find(|user| {
            user.record.username.eq_ignore_ascii_case(login)
                || user.record.email.eq_ignore_ascii_case(login)
        })
    }

    fn username_taken(&self, username: &str) -> bool {
        self.users
            .values()
            .any(|user| user.record.username.eq_ignore_ascii_case(username))
    }

    fn email_taken(&self, email: &str) -> bool {
        self.users
            .values()
            .any(|user| user.record.email.eq_ignore_ascii_case(email))
    }
}

/// Users and sessions live in memory. Form tokens are not stored: each one is
/// a ULID signed with a per-process key, so it only verifies against the
/// provider that minted it.
#[derive(Debug)]
pub struct MemoryIdentityProvider {
    store: RwLock<Store>,
    token_key: SecretSlice<u8>,
    remember_ttl: Duration,
    session_ttl: Duration,
    token_ttl: Duration,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        let mut key = vec![0u8; TOKEN_KEY_LEN];
        OsRng.fill_bytes(&mut key);
        dummy_hash();

        Self {
            store: RwLock::new(Store {
                next_id: 1,
                ..Store::default()
            }),
            token_key: SecretSlice::from(key),
            remember_ttl: DEFAULT_REMEMBER_TTL,
            session_ttl: DEFAULT_SESSION_TTL,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Lifetime of "remember me" sessions.
    #[must_use]
    pub fn with_remember_ttl(mut self, ttl: Duration) -> Self {
        self.remember_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Attach an avatar image to an existing user.
    ///
    /// # Errors
    /// Returns an error if the user does not exist or the store is unavailable.
    pub fn set_avatar_url(&self, id: UserId, url: impl Into<String>) -> Result<(), ProviderError> {
        let mut store = self.write().ok_or(ProviderError::Storage)?;
        let user = store
            .users
            .get_mut(&id)
            .ok_or(ProviderError::InvalidAccount("unknown user"))?;
        user.record.avatar_url = Some(url.into());
        Ok(())
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.read().map_or(0, |store| store.users.len())
    }

    fn token_mac(&self, scope: TokenScope, id: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.token_key.expose_secret())
            .map_err(|e| error!("Invalid token key: {e}"))
            .ok()?;
        mac.update(scope.as_str().as_bytes());
        mac.update(b"|");
        mac.update(id.as_bytes());
        Some(mac)
    }

    fn read(&self) -> Option<RwLockReadGuard<'_, Store>> {
        match self.store.read() {
            Ok(guard) => Some(guard),
            Err(e) => {
                error!("Identity store lock poisoned: {e}");
                None
            }
        }
    }

    fn write(&self) -> Option<RwLockWriteGuard<'_, Store>> {
        match self.store.write() {
            Ok(guard) => Some(guard),
            Err(e) => {
                error!("Identity store lock poisoned: {e}");
                None
            }
        }
    }
}

fn hash_password(password: &SecretString) -> Result<String, ProviderError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ProviderError::Hash(e.to_string()))
}

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| hash_password(&SecretString::from("menu-login".to_string())).ok())
        .as_deref()
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

fn verify_password(password: &SecretString, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.expose_secret().as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    fn sign_in(&self, credentials: &Credentials) -> Result<Session, ProviderError> {
        let found = {
            let store = self.read().ok_or(ProviderError::Storage)?;
            store
                .find_by_login(&credentials.username)
                .map(|user| (user.record.clone(), user.password_hash.clone()))
        };

        // Hash verification runs without holding the lock.
        let Some((record, password_hash)) = found else {
            if let Some(hash) = dummy_hash() {
                verify_password(&credentials.password, hash);
            }
            return Err(ProviderError::InvalidCredentials);
        };
        if !verify_password(&credentials.password, &password_hash) {
            return Err(ProviderError::InvalidCredentials);
        }

        let ttl = if credentials.remember {
            self.remember_ttl
        } else {
            self.session_ttl
        };
        let token = Ulid::new().to_string();
        let now = Instant::now();

        let mut store = self.write().ok_or(ProviderError::Storage)?;
        store.sessions.retain(|_, entry| entry.expires_at > now);
        store.sessions.insert(
            token.clone(),
            SessionEntry {
                user_id: record.id,
                expires_at: now + ttl,
            },
        );

        debug!(user_id = record.id, "session opened");

        Ok(Session {
            token,
            user: record,
            persistent: credentials.remember,
            ttl,
        })
    }

    fn create_account(
        &self,
        username: &str,
        password: &SecretString,
        email: &str,
    ) -> Result<UserId, ProviderError> {
        if username.is_empty() {
            return Err(ProviderError::InvalidAccount("empty username"));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(ProviderError::InvalidAccount("username too long"));
        }

        let password_hash = hash_password(password)?;

        let mut store = self.write().ok_or(ProviderError::Storage)?;
        if store.username_taken(username) {
            return Err(ProviderError::UsernameExists(username.to_string()));
        }
        if store.email_taken(email) {
            return Err(ProviderError::EmailExists);
        }

        let id = store.next_id;
        store.next_id += 1;
        store.users.insert(
            id,
            StoredUser {
                record: UserRecord {
                    id,
                    username: username.to_string(),
                    email: email.to_string(),
                    avatar_url: None,
                },
                password_hash,
            },
        );

        debug!(user_id = id, "account created");

        Ok(id)
    }

    fn current_session(&self, token: &str) -> Option<UserRecord> {
        let store = self.read()?;
        let entry = store.sessions.get(token)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        store
            .users
            .get(&entry.user_id)
            .map(|user| user.record.clone())
    }

    fn lookup_by_email(&self, email: &str) -> Option<UserRecord> {
        let store = self.read()?;
        store
            .users
            .values()
            .find(|user| user.record.email.eq_ignore_ascii_case(email))
            .map(|user| user.record.clone())
    }

    fn lookup_by_username(&self, username: &str) -> bool {
        self.read()
            .is_some_and(|store| store.username_taken(username))
    }

    fn generate_random_password(&self, length: usize) -> SecretString {
        let password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect();
        SecretString::from(password)
    }

    fn mint_token(&self, scope: TokenScope) -> String {
        let id = Ulid::new().to_string();
        let tag = self
            .token_mac(scope, &id)
            .map(|mac| hex::encode(mac.finalize().into_bytes()))
            .unwrap_or_default();
        format!("{id}.{tag}")
    }

    fn verify_token(&self, token: &str, scope: TokenScope) -> bool {
        let Some((id, tag)) = token.split_once('.') else {
            return false;
        };
        let Ok(ulid) = Ulid::from_string(id) else {
            return false;
        };
        let Ok(tag) = hex::decode(tag) else {
            return false;
        };
        let Some(mac) = self.token_mac(scope, id) else {
            return false;
        };
        if mac.verify_slice(&tag).is_err() {
            return false;
        }

        let age = unix_millis().saturating_sub(ulid.timestamp_ms());
        u128::from(age) < self.token_ttl.as_millis()
    }
}
