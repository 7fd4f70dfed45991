//! In-process [`TodoStore`], handy for tests and running without a server.

use crate::{RemoteStoreError, TodoStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use todoboard_transfer::{CreateTodoRequest, TodoDocument, UpdateTodoRequest};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<TodoDocument>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store without counting a call.
    pub fn with_documents(documents: Vec<TodoDocument>) -> Self {
        Self {
            documents: Mutex::new(documents),
            ..Self::default()
        }
    }

    /// Number of store operations issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// While set, every operation fails as if the service were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn begin(&self) -> Result<(), RemoteStoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::Rejected {
                status: 503,
                message: "todo store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<TodoDocument>, RemoteStoreError> {
        self.begin()?;
        let documents = self.documents.lock().await;
        Ok(documents
            .iter()
            .filter(|doc| owner_id.is_none_or(|owner| doc.user_id == owner))
            .cloned()
            .collect())
    }

    async fn create(&self, req: CreateTodoRequest) -> Result<TodoDocument, RemoteStoreError> {
        self.begin()?;
        if req.title.trim().is_empty() {
            return Err(RemoteStoreError::Rejected {
                status: 422,
                message: "title must not be empty".to_string(),
            });
        }
        let document = TodoDocument {
            id: Uuid::new_v4(),
            title: req.title,
            description: req.description,
            priority: req.priority,
            completed: req.completed,
            due_date: req.due_date,
            created_at: Utc::now(),
            user_id: req.user_id,
            user_name: req.user_name,
        };
        self.documents.lock().await.push(document.clone());
        Ok(document)
    }

    async fn update(&self, id: Uuid, req: UpdateTodoRequest) -> Result<(), RemoteStoreError> {
        self.begin()?;
        let mut documents = self.documents.lock().await;
        let doc = documents
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or(RemoteStoreError::NotFound(id))?;

        if let Some(title) = req.title {
            doc.title = title;
        }
        if let Some(description) = req.description {
            doc.description = description;
        }
        if let Some(priority) = req.priority {
            doc.priority = priority;
        }
        if let Some(completed) = req.completed {
            doc.completed = completed;
        }
        if let Some(due_date) = req.due_date {
            doc.due_date = due_date;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RemoteStoreError> {
        self.begin()?;
        let mut documents = self.documents.lock().await;
        let before = documents.len();
        documents.retain(|doc| doc.id != id);
        if documents.len() == before {
            return Err(RemoteStoreError::NotFound(id));
        }
        Ok(())
    }
}
