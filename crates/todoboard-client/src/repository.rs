use crate::{Result, TodoStore};
use std::sync::Arc;
use todoboard_model::{NewTodo, Owner, Priority as ModelPriority, Todo, TodoPatch};
use todoboard_transfer::{CreateTodoRequest, Priority, TodoDocument, UpdateTodoRequest};
use tracing::{error, info};
use uuid::Uuid;

/// Maps between [`Todo`] entities and store documents, one store call per operation.
pub struct TodoRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for TodoRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: TodoStore> TodoRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn list_todos(&self, owner_id: Option<&str>) -> Result<Vec<Todo>> {
        info!(owner_id = ?owner_id, "Listing todos");
        let documents = self
            .store
            .list(owner_id)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to list todos"))?;
        Ok(documents.into_iter().map(document_to_todo).collect())
    }

    /// Validation failures return before the store is contacted.
    pub async fn create_todo(&self, fields: NewTodo, owner: &Owner) -> Result<Todo> {
        fields
            .validate()
            .inspect_err(|e| error!(error = %e, "Rejected todo before create"))?;

        info!(title = %fields.title, owner_id = %owner.id, "Creating todo");
        let document = self
            .store
            .create(new_todo_to_request(fields, owner))
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create todo"))?;
        Ok(document_to_todo(document))
    }

    /// Acknowledgement only: the caller merges `patch` into its own copy.
    pub async fn update_todo(&self, id: Uuid, patch: &TodoPatch) -> Result<()> {
        patch
            .validate()
            .inspect_err(|e| error!(error = %e, %id, "Rejected todo update"))?;

        info!(%id, "Updating todo");
        self.store
            .update(id, patch_to_request(patch))
            .await
            .inspect_err(|e| error!(error = %e, %id, "Failed to update todo"))?;
        Ok(())
    }

    pub async fn delete_todo(&self, id: Uuid) -> Result<()> {
        info!(%id, "Deleting todo");
        self.store
            .delete(id)
            .await
            .inspect_err(|e| error!(error = %e, %id, "Failed to delete todo"))?;
        Ok(())
    }
}

fn document_to_todo(doc: TodoDocument) -> Todo {
    Todo {
        id: doc.id,
        title: doc.title,
        description: doc.description,
        priority: priority_to_model(doc.priority),
        completed: doc.completed,
        due_date: doc.due_date,
        created_at: doc.created_at,
        owner: Owner::new(doc.user_id, doc.user_name),
    }
}

fn new_todo_to_request(fields: NewTodo, owner: &Owner) -> CreateTodoRequest {
    CreateTodoRequest {
        title: fields.title,
        description: fields.description,
        priority: priority_to_transfer(fields.priority),
        completed: fields.completed,
        due_date: fields.due_date,
        user_id: owner.id.clone(),
        user_name: owner.name.clone(),
    }
}

fn patch_to_request(patch: &TodoPatch) -> UpdateTodoRequest {
    UpdateTodoRequest {
        title: patch.title.clone(),
        description: patch.description.clone(),
        priority: patch.priority.map(priority_to_transfer),
        completed: patch.completed,
        due_date: patch.due_date,
    }
}

fn priority_to_model(priority: Priority) -> ModelPriority {
    match priority {
        Priority::Low => ModelPriority::Low,
        Priority::Mid => ModelPriority::Mid,
        Priority::High => ModelPriority::High,
    }
}

fn priority_to_transfer(priority: ModelPriority) -> Priority {
    match priority {
        ModelPriority::Low => Priority::Low,
        ModelPriority::Mid => Priority::Mid,
        ModelPriority::High => Priority::High,
    }
}
