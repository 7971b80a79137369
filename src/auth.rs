//! JSON-backed user registry used by the host CLI to open shell sessions
//!
//! Passwords are stored as unsalted SHA-256 hex digests. This is a login
//! gate for a local simulation, not a credential store.

use crate::session::{Role, User};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Username already exists.")]
    UserExists,

    #[error("Username cannot be empty.")]
    InvalidUsername,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Login failed. Invalid credentials.")]
    InvalidCredentials,

    #[error("Failed to access user registry {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt user registry: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub password: String,
    #[serde(deserialize_with = "lenient_role")]
    pub role: Role,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_login: Option<DateTime<Utc>>,
    pub name: String,
}

fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Role, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(Role::parse(&raw))
}

/// Accepts RFC 3339 as well as naive ISO 8601 timestamps (read as UTC).
/// Anything unparseable is treated as "never logged in".
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Utc));
    }
    match raw.parse::<NaiveDateTime>() {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            log::warn!("⚠️  [AUTH] Ignoring unreadable last_login '{}': {}", raw, e);
            None
        }
    }
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub last_login: DateTime<Utc>,
}

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

pub struct UserRegistry {
    path: PathBuf,
    users: BTreeMap<String, UserRecord>,
}

impl UserRegistry {
    /// Load the registry, starting empty if the file doesn't exist yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref().to_path_buf();

        let users = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| AuthError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, users })
    }

    pub fn save(&self) -> Result<(), AuthError> {
        let content = serde_json::to_string_pretty(&self.users)?;
        fs::write(&self.path, content).map_err(|source| AuthError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Add a user and persist the registry.
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        confirm: &str,
        role: Role,
    ) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::InvalidUsername);
        }
        if self.contains(username) {
            return Err(AuthError::UserExists);
        }
        if password != confirm {
            return Err(AuthError::PasswordMismatch);
        }

        self.users.insert(
            username.to_string(),
            UserRecord {
                password: hash_password(password),
                role,
                last_login: None,
                name: username.to_string(),
            },
        );
        self.save()?;

        log::info!("🟢 [AUTH] Registered {} as {}", username, role);
        Ok(())
    }

    /// Check credentials, stamp the login time and persist it.
    pub fn login(&mut self, username: &str, password: &str) -> Result<Session, AuthError> {
        let username = username.trim();
        let record = self
            .users
            .get_mut(username)
            .filter(|record| record.password == hash_password(password))
            .ok_or_else(|| {
                log::warn!("⚠️  [AUTH] Failed login for '{}'", username);
                AuthError::InvalidCredentials
            })?;

        let now = Utc::now();
        record.last_login = Some(now);
        let user = User::new(record.name.clone(), record.role);
        self.save()?;

        log::info!("🟢 [AUTH] {} logged in", username);
        Ok(Session {
            user,
            last_login: now,
        })
    }
}
