//! In-memory repository implementations.
//!
//! [`MemoryUserRepository`] and [`MemoryAdRepository`] implement the same
//! traits as the PostgreSQL repositories and are used by the test suites and
//! for running the server without a database.
//!
//! - **Thread-safe**: state sits behind a [`parking_lot::RwLock`]
//! - **Ordered**: rows live in a [`BTreeMap`] keyed by id, so listings come
//!   back in ascending id order like `ORDER BY id ASC`
//! - **Atomic**: each mutation happens under a single write-lock acquisition
//!
//! Data is not persisted; everything is lost when the value is dropped.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::repository::{AdRepository, Counter, LegacyPassword, StoredUser, UserRepository};
use crate::ads::{Ad, AdError, AdId, AdResult};
use crate::auth::{AuthError, AuthResult, Role, User, UserId};

struct UserRow {
    user: User,
    password: String,
    password_hashed: bool,
}

#[derive(Default)]
struct UserTable {
    next_id: UserId,
    rows: BTreeMap<UserId, UserRow>,
}

impl UserTable {
    fn insert(&mut self, username: &str, password: &str, role: Role, hashed: bool) -> User {
        self.next_id += 1;
        let user = User {
            id: self.next_id,
            username: username.to_string(),
            role,
            created_at: Utc::now(),
        };
        self.rows.insert(
            user.id,
            UserRow {
                user: user.clone(),
                password: password.to_string(),
                password_hashed: hashed,
            },
        );
        user
    }
}

/// In-memory `UserRepository`
#[derive(Default)]
pub struct MemoryUserRepository {
    table: RwLock<UserTable>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row the way a pre-hashing deployment would have: the password
    /// stored verbatim and not marked as hashed.
    pub fn insert_legacy_user(&self, username: &str, password: &str, role: Role) -> User {
        self.table.write().insert(username, password, role, false)
    }

    /// Raw stored password column for `username`
    pub fn stored_password(&self, username: &str) -> Option<String> {
        self.table
            .read()
            .rows
            .values()
            .find(|row| row.user.username == username)
            .map(|row| row.password.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> AuthResult<User> {
        let mut table = self.table.write();
        if table.rows.values().any(|row| row.user.username == username) {
            return Err(AuthError::UsernameTaken);
        }
        Ok(table.insert(username, password_hash, role, true))
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<StoredUser>> {
        Ok(self
            .table
            .read()
            .rows
            .values()
            .find(|row| row.user.username == username)
            .map(|row| StoredUser {
                user: row.user.clone(),
                password_hash: row.password.clone(),
            }))
    }

    async fn list_unhashed(&self) -> AuthResult<Vec<LegacyPassword>> {
        Ok(self
            .table
            .read()
            .rows
            .values()
            .filter(|row| !row.password_hashed)
            .map(|row| LegacyPassword {
                id: row.user.id,
                username: row.user.username.clone(),
                password: row.password.clone(),
            })
            .collect())
    }

    async fn replace_legacy_password(
        &self,
        id: UserId,
        legacy_value: &str,
        replacement: &str,
    ) -> AuthResult<bool> {
        let mut table = self.table.write();
        match table.rows.get_mut(&id) {
            Some(row) if !row.password_hashed && row.password == legacy_value => {
                row.password = replacement.to_string();
                row.password_hashed = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
struct AdTable {
    next_id: AdId,
    rows: BTreeMap<AdId, Ad>,
}

/// In-memory `AdRepository`
#[derive(Default)]
pub struct MemoryAdRepository {
    table: RwLock<AdTable>,
}

impl MemoryAdRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdRepository for MemoryAdRepository {
    async fn create_ad(&self, name: &str, ad_type: Option<&str>) -> AdResult<Ad> {
        let mut table = self.table.write();
        table.next_id += 1;
        let ad = Ad {
            id: table.next_id,
            name: name.to_string(),
            ad_type: ad_type.map(str::to_string),
            impressions: 0,
            clicks: 0,
            created_at: Utc::now(),
        };
        table.rows.insert(ad.id, ad.clone());
        Ok(ad)
    }

    async fn list_ads(&self) -> AdResult<Vec<Ad>> {
        Ok(self.table.read().rows.values().cloned().collect())
    }

    async fn increment(&self, id: AdId, counter: Counter) -> AdResult<Option<Ad>> {
        let mut table = self.table.write();
        let Some(ad) = table.rows.get_mut(&id) else {
            return Ok(None);
        };

        // Same range as the INT column; overflow is a storage error there too.
        let value = match counter {
            Counter::Impressions => &mut ad.impressions,
            Counter::Clicks => &mut ad.clicks,
        };
        *value = value.checked_add(1).ok_or(AdError::CounterOverflow(id))?;

        Ok(Some(ad.clone()))
    }

    async fn health_check(&self) -> AdResult<()> {
        Ok(())
    }
}
