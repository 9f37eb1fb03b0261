//! PostgreSQL storage adapter

use async_trait::async_trait;
use common::{RequestContext, User, error::DatabaseResult};
use sqlx::{PgPool, migrate::Migrator};
use tracing::{debug, info};
use uuid::Uuid;

use super::{StorageError, StorageResult, UserStorage};

/// Embedded schema migrations for the `users` table
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Apply pending migrations
pub async fn run_migrations(pool: &PgPool) -> DatabaseResult<()> {
    info!("Applying database migrations");
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// User storage backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgUserStorage {
    pool: PgPool,
}

impl PgUserStorage {
    /// Create a new user storage
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStorage for PgUserStorage {
    async fn get_users(&self, ctx: &RequestContext) -> StorageResult<Vec<User>> {
        const OP: &str = "storage.user.get_users";

        ctx.check().map_err(|e| StorageError::cancelled(OP, e))?;

        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password
            FROM users
            ORDER BY login, id
            "#,
        )
        .fetch_all(&self.pool);

        let users = ctx
            .run(query)
            .await
            .map_err(|e| StorageError::cancelled(OP, e))?
            .map_err(|e| StorageError::from_sqlx(OP, e))?;

        debug!("{}: fetched {} users", OP, users.len());
        Ok(users)
    }

    async fn get_user_by_id(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User> {
        const OP: &str = "storage.user.get_user_by_id";

        ctx.check().map_err(|e| StorageError::cancelled(OP, e))?;

        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool);

        ctx.run(query)
            .await
            .map_err(|e| StorageError::cancelled(OP, e))?
            .map_err(|e| StorageError::from_sqlx(OP, e))
    }

    async fn insert_user(&self, ctx: &RequestContext, user: User) -> StorageResult<User> {
        const OP: &str = "storage.user.insert_user";

        ctx.check().map_err(|e| StorageError::cancelled(OP, e))?;

        let query = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, login, password)
            VALUES ($1, $2, $3)
            RETURNING id, login, password
            "#,
        )
        .bind(user.id)
        .bind(&user.login)
        .bind(&user.password)
        .fetch_one(&self.pool);

        let stored = ctx
            .run(query)
            .await
            .map_err(|e| StorageError::cancelled(OP, e))?
            .map_err(|e| StorageError::from_sqlx(OP, e))?;

        info!("{}: inserted user {}", OP, stored.id);
        Ok(stored)
    }

    async fn update_user(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        user: User,
    ) -> StorageResult<User> {
        const OP: &str = "storage.user.update_user";

        ctx.check().map_err(|e| StorageError::cancelled(OP, e))?;

        let query = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET login = $2, password = $3
            WHERE id = $1
            RETURNING id, login, password
            "#,
        )
        .bind(id)
        .bind(&user.login)
        .bind(&user.password)
        .fetch_optional(&self.pool);

        let updated = ctx
            .run(query)
            .await
            .map_err(|e| StorageError::cancelled(OP, e))?
            .map_err(|e| StorageError::from_sqlx(OP, e))?;

        // No row back means zero rows were affected
        match updated {
            Some(user) => {
                info!("{}: updated user {}", OP, user.id);
                Ok(user)
            }
            None => Err(StorageError::NotFound { op: OP }),
        }
    }

    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User> {
        const OP: &str = "storage.user.delete_user";

        ctx.check().map_err(|e| StorageError::cancelled(OP, e))?;

        let user = self.get_user_by_id(ctx, id).await?;

        let query = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool);

        let result = ctx
            .run(query)
            .await
            .map_err(|e| StorageError::cancelled(OP, e))?
            .map_err(|e| StorageError::from_sqlx(OP, e))?;

        // A concurrent delete may have won the race since the lookup
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { op: OP });
        }

        info!("{}: deleted user {}", OP, id);
        Ok(user)
    }
}
