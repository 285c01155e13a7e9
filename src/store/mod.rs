//! Persistence for tasks and stored credentials.
//!
//! Every task operation takes the caller's username and only ever touches
//! records owned by it.

mod memory;
mod model;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::error::FieldError;

pub use memory::{InMemoryCredentialStore, InMemoryTaskRepository};
pub use model::{NewTask, StoredCredential, Task, TaskPatch};
pub use postgres::{PgCredentialStore, PgTaskRepository};

pub const TEXT_REQUIRED: &str = "Task text is required";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),
    #[error("no matching task")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Tasks owned by `owner`, oldest first.
    async fn list(&self, owner: &str) -> Result<Vec<Task>>;

    async fn create(&self, owner: &str, task: NewTask) -> Result<Task>;

    async fn update(&self, owner: &str, id: Uuid, patch: TaskPatch) -> Result<Task>;

    async fn delete(&self, owner: &str, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find(&self, username: &str) -> Result<Option<StoredCredential>>;

    /// Stores the credential unless the username is already taken.
    /// Returns `false` when another login registered it first.
    async fn insert(&self, credential: StoredCredential) -> Result<bool>;
}

/// Trims task text and rejects it when nothing is left.
pub fn normalize_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation(vec![FieldError::new(
            "text",
            TEXT_REQUIRED,
        )]));
    }
    Ok(trimmed.to_string())
}

fn normalize_patch(patch: TaskPatch) -> Result<TaskPatch> {
    let text = patch.text.as_deref().map(normalize_text).transpose()?;
    Ok(TaskPatch {
        text,
        completed: patch.completed,
    })
}
