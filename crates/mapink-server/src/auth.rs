//! Accounts, password hashing, and bearer sessions.

use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Session lifetime in seconds (24 hours).
pub const SESSION_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username already taken")]
    UsernameTaken,
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("invalid or expired session")]
    InvalidSession,
    #[error("auth failure: {0}")]
    Internal(String),
}

/// Account privilege level, fixed into the session at issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// JWT claims: the session binds a username and role until expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the session is bound to.
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

/// HS256 signing/verification keys derived from one secret.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a signed, time-limited session token.
    pub fn issue(&self, username: &str, role: Role) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .as_secs();
        let claims = Claims {
            sub: username.to_string(),
            role,
            exp: (now + SESSION_TTL_SECS) as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Verify signature and expiry; both are checked on every call.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidSession)
    }
}

#[derive(Debug, Clone)]
struct UserRecord {
    password_hash: String,
    role: Role,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

/// Registered accounts. Passwords are only ever stored as salted
/// bcrypt hashes.
pub struct UserRegistry {
    users: DashMap<String, UserRecord>,
    admin_username: String,
}

impl UserRegistry {
    /// `admin_username` names the one account that receives the admin
    /// role; every other account is a plain user.
    pub fn new(admin_username: impl Into<String>) -> Self {
        Self {
            users: DashMap::new(),
            admin_username: admin_username.into(),
        }
    }

    /// Create an account. The first writer wins a racing registration;
    /// the loser sees `UsernameTaken`.
    pub fn register(&self, username: &str, password: &str) -> Result<Role, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::InvalidInput("username is required"));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidInput("password is required"));
        }
        // Hash outside the map lock; bcrypt is deliberately slow.
        let password_hash =
            hash(password, DEFAULT_COST).map_err(|e| AuthError::Internal(e.to_string()))?;
        let role = self.role_for(username);

        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AuthError::UsernameTaken),
            Entry::Vacant(slot) => {
                slot.insert(UserRecord {
                    password_hash,
                    role,
                    created_at: Utc::now(),
                    last_login: None,
                });
                Ok(role)
            }
        }
    }

    /// Check credentials. Unknown usernames and wrong passwords are
    /// indistinguishable to the caller.
    pub fn login(&self, username: &str, password: &str) -> Result<Role, AuthError> {
        let mut user = self
            .users
            .get_mut(username)
            .ok_or(AuthError::InvalidCredentials)?;
        let valid = verify(password, &user.password_hash)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }
        user.last_login = Some(Utc::now());
        Ok(user.role)
    }

    /// Stored hash for a username (inspection/testing).
    pub fn password_hash(&self, username: &str) -> Option<String> {
        self.users.get(username).map(|u| u.password_hash.clone())
    }

    /// When the account was created, if it exists.
    pub fn created_at(&self, username: &str) -> Option<DateTime<Utc>> {
        self.users.get(username).map(|u| u.created_at)
    }

    /// Most recent successful login, if any.
    pub fn last_login(&self, username: &str) -> Option<DateTime<Utc>> {
        self.users.get(username).and_then(|u| u.last_login)
    }

    fn role_for(&self, username: &str) -> Role {
        if username == self.admin_username {
            Role::Admin
        } else {
            Role::User
        }
    }
}
