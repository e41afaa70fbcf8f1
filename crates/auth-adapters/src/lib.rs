//! # Auth Adapters
//!
//! Implementation of the `AuthProvider` port: email/password sign-in over
//! argon2 password hashes, opaque bearer tokens naming live sessions, and a
//! watch channel bumped on every session change. The hosted identity
//! service this stands in for is an external collaborator; its session
//! shape (`uid`, display name, photo URL, email) is preserved.

use std::sync::atomic::{AtomicU64, Ordering};

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use async_trait::async_trait;
use dashmap::DashMap;
use domains::{
    AuthProvider, DomainError, DomainResult, Session, SessionToken, UserId,
};
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

/// Input for registering a user with the provider.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

struct UserRecord {
    uid: UserId,
    display_name: String,
    photo_url: Option<String>,
    password_hash: String,
}

pub struct SessionAuth {
    users: DashMap<String, UserRecord>,
    sessions: DashMap<String, Session>,
    generation: AtomicU64,
    changed: watch::Sender<u64>,
}

impl SessionAuth {
    pub fn new() -> Self {
        let (changed, _) = watch::channel(0);
        Self {
            users: DashMap::new(),
            sessions: DashMap::new(),
            generation: AtomicU64::new(0),
            changed,
        }
    }

    /// Registers a user account. Emails are unique.
    pub fn register(&self, input: NewUser) -> DomainResult<UserId> {
        if self.users.contains_key(&input.email) {
            return Err(DomainError::Conflict(format!(
                "account already exists for {}",
                input.email
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| DomainError::Store(format!("password hashing failed: {e}")))?
            .to_string();

        let uid = UserId(Uuid::new_v4().to_string());
        self.users.insert(
            input.email.clone(),
            UserRecord {
                uid: uid.clone(),
                display_name: input.display_name,
                photo_url: input.photo_url,
                password_hash,
            },
        );
        info!(email = %input.email, uid = %uid, "user registered");
        Ok(uid)
    }

    fn bump(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.changed.send(generation);
    }
}

impl Default for SessionAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for SessionAuth {
    async fn sign_in(&self, email: &str, password: &str) -> DomainResult<(SessionToken, Session)> {
        let record = self
            .users
            .get(email)
            .ok_or(DomainError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&record.password_hash)
            .map_err(|e| DomainError::Store(format!("stored hash unreadable: {e}")))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| DomainError::InvalidCredentials)?;

        let session = Session {
            uid: record.uid.clone(),
            display_name: record.display_name.clone(),
            email: email.to_owned(),
            photo_url: record.photo_url.clone(),
        };
        drop(record);

        let token = SessionToken(Uuid::new_v4().to_string());
        self.sessions.insert(token.0.clone(), session.clone());
        self.bump();
        info!(uid = %session.uid, "signed in");
        Ok((token, session))
    }

    async fn sign_out(&self, token: &SessionToken) -> DomainResult<()> {
        if let Some((_, session)) = self.sessions.remove(&token.0) {
            debug!(uid = %session.uid, "signed out");
            self.bump();
        }
        Ok(())
    }

    async fn current(&self, token: &SessionToken) -> DomainResult<Option<Session>> {
        Ok(self.sessions.get(&token.0).map(|s| s.clone()))
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }
}
