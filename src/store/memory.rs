use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    normalize_patch, normalize_text, CredentialStore, NewTask, Result, StoreError,
    StoredCredential, Task, TaskPatch, TaskRepository,
};

/// Task repository kept in process memory, in insertion order.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list(&self, owner: &str) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| t.owner == owner).cloned().collect())
    }

    async fn create(&self, owner: &str, task: NewTask) -> Result<Task> {
        let text = normalize_text(&task.text)?;
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            text,
            completed: false,
            owner: owner.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn update(&self, owner: &str, id: Uuid, patch: TaskPatch) -> Result<Task> {
        let patch = normalize_patch(patch)?;
        let mut tasks = self.tasks.write().await;

        let task = tasks
            .iter_mut()
            .find(|t| t.id == id && t.owner == owner)
            .ok_or(StoreError::NotFound)?;

        if let Some(text) = patch.text {
            task.text = text;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();

        Ok(task.clone())
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        let index = tasks
            .iter()
            .position(|t| t.id == id && t.owner == owner)
            .ok_or(StoreError::NotFound)?;
        tasks.remove(index);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, StoredCredential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find(&self, username: &str) -> Result<Option<StoredCredential>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(&self, credential: StoredCredential) -> Result<bool> {
        let mut users = self.users.write().await;
        if users.contains_key(&credential.username) {
            return Ok(false);
        }
        users.insert(credential.username.clone(), credential);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(text: &str) -> NewTask {
        NewTask {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_in_insertion_order() {
        let repo = InMemoryTaskRepository::new();
        let first = repo.create("alice", new_task("first")).await.unwrap();
        let second = repo.create("alice", new_task("  second  ")).await.unwrap();
        repo.create("bob", new_task("not yours")).await.unwrap();

        assert!(!first.completed);
        assert_eq!(second.text, "second");
        assert_eq!(second.owner, "alice");

        let listed = repo.list("alice").await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_empty_text_is_never_persisted() {
        let repo = InMemoryTaskRepository::new();
        let err = repo.create("alice", new_task("   ")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(repo.list("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_applies_patch_and_keeps_owner() {
        let repo = InMemoryTaskRepository::new();
        let task = repo.create("alice", new_task("buy milk")).await.unwrap();

        let updated = repo
            .update(
                "alice",
                task.id,
                TaskPatch {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.text, "buy milk");
        assert_eq!(updated.owner, "alice");
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn test_foreign_and_missing_ids_are_not_found() {
        let repo = InMemoryTaskRepository::new();
        let task = repo.create("alice", new_task("secret")).await.unwrap();

        let patch = TaskPatch {
            completed: Some(true),
            ..Default::default()
        };
        let err = repo.update("bob", task.id, patch.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        let err = repo.delete("bob", task.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        let err = repo.update("alice", Uuid::new_v4(), patch).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        // alice's task is untouched
        let listed = repo.list("alice").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].completed);
    }

    #[tokio::test]
    async fn test_invalid_patch_wins_over_not_found() {
        let repo = InMemoryTaskRepository::new();
        let err = repo
            .update(
                "alice",
                Uuid::new_v4(),
                TaskPatch {
                    text: Some("".into()),
                    completed: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_task() {
        let repo = InMemoryTaskRepository::new();
        let task = repo.create("alice", new_task("temp")).await.unwrap();
        repo.delete("alice", task.id).await.unwrap();
        assert!(repo.list("alice").await.unwrap().is_empty());

        let err = repo.delete("alice", task.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_credential_insert_is_first_wins() {
        let store = InMemoryCredentialStore::new();
        let cred = |hash: &str| StoredCredential {
            username: "alice".into(),
            password_hash: hash.into(),
        };

        assert!(store.insert(cred("h1")).await.unwrap());
        assert!(!store.insert(cred("h2")).await.unwrap());
        assert_eq!(store.find("alice").await.unwrap().unwrap().password_hash, "h1");
        assert!(store.find("bob").await.unwrap().is_none());
    }
}
