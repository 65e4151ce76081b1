//! User accounts: the store seam and an in-memory implementation

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;

use emotrack_auth::{Role, Subject};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Email already registered: {0}")]
    EmailTaken(String),
}

/// Account as held by the store (includes the password hash)
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Identity fields a session token is minted from
    pub fn subject(&self) -> Subject {
        Subject {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }

    /// Public view, without the password hash
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Account storage. Email addresses are unique.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn find_by_email(&self, email: &str) -> Option<UserRecord>;

    async fn find_by_id(&self, id: i64) -> Option<UserRecord>;

    /// Returns whether an account was removed
    async fn delete(&self, id: i64) -> bool;
}

/// Process-local store; accounts live as long as the server
pub struct InMemoryUserStore {
    users: DashMap<i64, UserRecord>,
    emails: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        // The email slot stays locked until the record is in place
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::EmailTaken(user.email)),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let record = UserRecord {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    name: user.name,
                    email: user.email,
                    password_hash: user.password_hash,
                    role: user.role,
                    created_at: now,
                    updated_at: now,
                };
                self.users.insert(record.id, record.clone());
                slot.insert(record.id);
                Ok(record)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let id = *self.emails.get(email)?;
        self.find_by_id(id).await
    }

    async fn find_by_id(&self, id: i64) -> Option<UserRecord> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }

    async fn delete(&self, id: i64) -> bool {
        match self.users.remove(&id) {
            Some((_, user)) => {
                self.emails.remove(&user.email);
                true
            }
            None => false,
        }
    }
}
