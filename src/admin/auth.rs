use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::workflows::onboarding::RepositoryError;

const MIN_PASSWORD_LEN: usize = 4;
const SESSION_TTL_HOURS: i64 = 2;

/// Storage for the single admin password hash.
pub trait AdminCredentialRepository: Send + Sync {
    fn load_hash(&self) -> Result<Option<String>, RepositoryError>;
    fn store_hash(&self, hash: &str) -> Result<(), RepositoryError>;
}

/// Opaque capability proving the caller holds a live admin session. Guarded
/// operations take this token explicitly; nothing reads ambient session
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdminToken(pub String);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
    #[error("Admin settings not configured")]
    NotConfigured,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Verifies the admin password and manages session tokens with a fixed
/// expiry window.
pub struct AdminAuthService {
    credentials: Arc<dyn AdminCredentialRepository>,
    sessions: Mutex<HashMap<String, DateTime<Utc>>>,
    ttl: Duration,
}

impl AdminAuthService {
    pub fn new(credentials: Arc<dyn AdminCredentialRepository>) -> Self {
        Self {
            credentials,
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::hours(SESSION_TTL_HOURS),
        }
    }

    /// Check the password against the stored hash; a match issues a fresh
    /// session token.
    pub fn verify(&self, password: &str) -> Result<AdminToken, AuthError> {
        let stored = self
            .credentials
            .load_hash()?
            .ok_or(AuthError::NotConfigured)?;

        if !verify_password(password, &stored) {
            return Err(AuthError::InvalidPassword);
        }

        let token = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        // Each login sweeps expired sessions so abandoned tokens do not pile
        // up until their exact token is re-checked.
        sessions.retain(|_, expires_at| *expires_at > now);
        sessions.insert(token.clone(), now + self.ttl);
        drop(sessions);
        info!("admin session established");

        Ok(AdminToken(token))
    }

    /// Whether the token maps to a live, unexpired session. Expired entries
    /// are pruned on the way through.
    pub fn check(&self, token: &AdminToken) -> bool {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        match sessions.get(&token.0) {
            Some(expires_at) if *expires_at > Utc::now() => true,
            Some(_) => {
                sessions.remove(&token.0);
                false
            }
            None => false,
        }
    }

    /// Capability check for guarded operations.
    pub fn authorize(&self, token: &AdminToken) -> Result<(), AuthError> {
        if self.check(token) {
            Ok(())
        } else {
            Err(AuthError::Unauthorized)
        }
    }

    pub fn logout(&self, token: &AdminToken) {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .remove(&token.0);
    }

    /// Replace the stored password hash. Requires a live session token.
    pub fn update_password(&self, token: &AdminToken, new_password: &str) -> Result<(), AuthError> {
        self.authorize(token)?;

        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }

        self.credentials.store_hash(&hash_password(new_password))?;
        info!("admin password updated");
        Ok(())
    }
}

/// Salted SHA-256, stored as `salt$digest` in lowercase hex.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_hex = to_hex(&salt);
    format!("{salt_hex}${}", digest_hex(&salt_hex, password))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt_hex, digest)) => digest_hex(salt_hex, password) == digest,
        None => false,
    }
}

fn digest_hex(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
