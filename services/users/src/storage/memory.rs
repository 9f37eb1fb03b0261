//! In-memory storage adapter for tests
//!
//! Matches the PostgreSQL adapter's results and error classes: users are
//! listed by login then id, and the context is checked before every
//! operation. Delete is a single atomic removal rather than a lookup followed
//! by a delete. Operations that got past the context check are counted so
//! tests can prove a request never reached storage.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use common::{RequestContext, User};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StorageError, StorageResult, UserStorage};

/// User storage kept in a map
#[derive(Debug, Default)]
pub struct InMemoryUserStorage {
    users: RwLock<BTreeMap<Uuid, User>>,
    operations: AtomicUsize,
}

impl InMemoryUserStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations that reached the store
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn enter(&self, op: &'static str, ctx: &RequestContext) -> StorageResult<()> {
        ctx.check().map_err(|e| StorageError::cancelled(op, e))?;
        self.operations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn get_users(&self, ctx: &RequestContext) -> StorageResult<Vec<User>> {
        self.enter("memory.user.get_users", ctx)?;
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| (&a.login, a.id).cmp(&(&b.login, b.id)));
        Ok(users)
    }

    async fn get_user_by_id(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User> {
        const OP: &str = "memory.user.get_user_by_id";
        self.enter(OP, ctx)?;
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound { op: OP })
    }

    async fn insert_user(&self, ctx: &RequestContext, user: User) -> StorageResult<User> {
        const OP: &str = "memory.user.insert_user";
        self.enter(OP, ctx)?;

        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StorageError::AlreadyExists { op: OP });
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        user: User,
    ) -> StorageResult<User> {
        const OP: &str = "memory.user.update_user";
        self.enter(OP, ctx)?;

        let mut users = self.users.write().await;
        let stored = users.get_mut(&id).ok_or(StorageError::NotFound { op: OP })?;
        stored.login = user.login;
        stored.password = user.password;
        Ok(stored.clone())
    }

    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User> {
        const OP: &str = "memory.user.delete_user";
        self.enter(OP, ctx)?;

        self.users
            .write()
            .await
            .remove(&id)
            .ok_or(StorageError::NotFound { op: OP })
    }
}
