use crate::{CollectionEvent, Result, TodoCollection, TodoError, TodoRepository, TodoStore};
use std::sync::Arc;
use todoboard_model::{NewTodo, Owner, Todo, TodoPatch};
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Runs repository operations for the signed-in user and applies each
/// result to the shared collection under one write lock.
pub struct TodoController<S> {
    repository: TodoRepository<S>,
    user: Owner,
    state: Arc<RwLock<TodoCollection>>,
}

impl<S> Clone for TodoController<S> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            user: self.user.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: TodoStore> TodoController<S> {
    pub fn new(repository: TodoRepository<S>, user: Owner) -> Self {
        Self::with_state(repository, user, Arc::default())
    }

    pub fn with_state(
        repository: TodoRepository<S>,
        user: Owner,
        state: Arc<RwLock<TodoCollection>>,
    ) -> Self {
        Self {
            repository,
            user,
            state,
        }
    }

    pub fn user(&self) -> &Owner {
        &self.user
    }

    pub fn state(&self) -> Arc<RwLock<TodoCollection>> {
        Arc::clone(&self.state)
    }

    pub async fn snapshot(&self) -> TodoCollection {
        self.state.read().await.clone()
    }

    /// Loads the user's todos once. Returns `Ok(false)` without touching the
    /// store if a load has already been started.
    pub async fn load(&self) -> Result<bool> {
        if !self.apply(CollectionEvent::ListRequested).await {
            debug!("Todo list already requested, skipping load");
            return Ok(false);
        }

        match self.repository.list_todos(Some(self.user.id.as_str())).await {
            Ok(todos) => {
                info!(count = todos.len(), "Loaded todos");
                self.apply(CollectionEvent::ListLoaded(todos)).await;
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, "Failed to load todos");
                self.apply(CollectionEvent::ListFailed(e.to_string())).await;
                Err(e)
            }
        }
    }

    pub async fn create(&self, fields: NewTodo) -> Result<Todo> {
        let todo = self.repository.create_todo(fields, &self.user).await?;
        self.apply(CollectionEvent::Created(todo.clone())).await;
        Ok(todo)
    }

    pub async fn update(&self, id: Uuid, patch: TodoPatch) -> Result<()> {
        self.repository.update_todo(id, &patch).await?;
        self.apply(CollectionEvent::Updated(id, patch)).await;
        Ok(())
    }

    /// Flips completion of a loaded todo and returns the new value.
    pub async fn toggle(&self, id: Uuid) -> Result<bool> {
        let completed = {
            let state = self.state.read().await;
            let todo = state.get(id).ok_or(TodoError::NotFound(id))?;
            !todo.completed
        };
        self.update(id, TodoPatch::completed(completed)).await?;
        Ok(completed)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repository.delete_todo(id).await?;
        self.apply(CollectionEvent::Deleted(id)).await;
        Ok(())
    }

    async fn apply(&self, event: CollectionEvent) -> bool {
        let mut state = self.state.write().await;
        let changed = state.apply(event);
        debug!(changed, status = ?state.status(), "Applied collection event");
        changed
    }
}
