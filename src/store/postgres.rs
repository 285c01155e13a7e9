use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    normalize_patch, normalize_text, CredentialStore, NewTask, Result, StoreError,
    StoredCredential, Task, TaskPatch, TaskRepository,
};

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn list(&self, owner: &str) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, text, completed, owner, created_at, updated_at
            FROM tasks
            WHERE owner = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn create(&self, owner: &str, task: NewTask) -> Result<Task> {
        let text = normalize_text(&task.text)?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, text, owner)
            VALUES ($1, $2, $3)
            RETURNING id, text, completed, owner, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(text)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update(&self, owner: &str, id: Uuid, patch: TaskPatch) -> Result<Task> {
        let patch = normalize_patch(patch)?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET
                text = COALESCE($3, text),
                completed = COALESCE($4, completed),
                updated_at = NOW()
            WHERE id = $2 AND owner = $1
            RETURNING id, text, completed, owner, created_at, updated_at
            "#,
        )
        .bind(owner)
        .bind(id)
        .bind(patch.text)
        .bind(patch.completed)
        .fetch_optional(&self.pool)
        .await?;

        task.ok_or(StoreError::NotFound)
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND owner = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find(&self, username: &str) -> Result<Option<StoredCredential>> {
        let row = sqlx::query_as::<_, StoredCredential>(
            "SELECT username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert(&self, credential: StoredCredential) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(&credential.username)
        .bind(&credential.password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
