use serde::Serialize;
use todoboard_model::{Todo, TodoPatch};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// A completed operation, applied to the collection as a single step.
#[derive(Debug, Clone)]
pub enum CollectionEvent {
    ListRequested,
    ListLoaded(Vec<Todo>),
    ListFailed(String),
    Created(Todo),
    Updated(Uuid, TodoPatch),
    Deleted(Uuid),
}

/// Confirmed store state: todos in insertion order plus load status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TodoCollection {
    todos: Vec<Todo>,
    status: LoadStatus,
    error: Option<String>,
}

impl TodoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn get(&self, id: Uuid) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Applies one transition and reports whether anything changed.
    ///
    /// List events only act in the state they belong to; mutation events
    /// never touch `status`, and a missing id is a no-op.
    pub fn apply(&mut self, event: CollectionEvent) -> bool {
        match event {
            CollectionEvent::ListRequested => {
                if self.status != LoadStatus::Idle {
                    return false;
                }
                self.status = LoadStatus::Loading;
                true
            }
            CollectionEvent::ListLoaded(todos) => {
                if self.status != LoadStatus::Loading {
                    return false;
                }
                self.todos = todos;
                self.status = LoadStatus::Succeeded;
                self.error = None;
                true
            }
            CollectionEvent::ListFailed(message) => {
                if self.status != LoadStatus::Loading {
                    return false;
                }
                self.status = LoadStatus::Failed;
                self.error = Some(message);
                true
            }
            CollectionEvent::Created(todo) => {
                self.todos.push(todo);
                true
            }
            CollectionEvent::Updated(id, patch) => {
                match self.todos.iter_mut().find(|todo| todo.id == id) {
                    Some(todo) => {
                        todo.apply(&patch);
                        true
                    }
                    None => false,
                }
            }
            CollectionEvent::Deleted(id) => {
                let before = self.todos.len();
                self.todos.retain(|todo| todo.id != id);
                self.todos.len() != before
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoboard_model::{NewTodo, Owner};

    fn todo(title: &str) -> Todo {
        Todo::create(NewTodo::new(title), Owner::new("u1", "Ada")).unwrap()
    }

    fn loaded(todos: Vec<Todo>) -> TodoCollection {
        let mut collection = TodoCollection::new();
        collection.apply(CollectionEvent::ListRequested);
        collection.apply(CollectionEvent::ListLoaded(todos));
        collection
    }

    #[test]
    fn test_load_lifecycle() {
        let mut collection = TodoCollection::new();
        assert_eq!(collection.status(), LoadStatus::Idle);

        assert!(collection.apply(CollectionEvent::ListRequested));
        assert_eq!(collection.status(), LoadStatus::Loading);

        // Only entered from idle
        assert!(!collection.apply(CollectionEvent::ListRequested));

        assert!(collection.apply(CollectionEvent::ListLoaded(vec![todo("a")])));
        assert_eq!(collection.status(), LoadStatus::Succeeded);
        assert_eq!(collection.todos().len(), 1);
        assert!(!collection.apply(CollectionEvent::ListRequested));
    }

    #[test]
    fn test_list_failure_records_error() {
        let mut collection = TodoCollection::new();
        collection.apply(CollectionEvent::ListRequested);
        collection.apply(CollectionEvent::ListFailed("store offline".to_string()));

        assert_eq!(collection.status(), LoadStatus::Failed);
        assert_eq!(collection.error(), Some("store offline"));
        assert!(collection.todos().is_empty());
    }

    #[test]
    fn test_list_result_outside_loading_is_ignored() {
        let mut collection = TodoCollection::new();
        assert!(!collection.apply(CollectionEvent::ListLoaded(vec![todo("stray")])));
        assert_eq!(collection.status(), LoadStatus::Idle);
        assert!(collection.todos().is_empty());
    }

    #[test]
    fn test_empty_load_succeeds() {
        let collection = loaded(Vec::new());
        assert_eq!(collection.status(), LoadStatus::Succeeded);
        assert!(collection.todos().is_empty());
    }

    #[test]
    fn test_mutations_keep_status() {
        let first = todo("first");
        let mut collection = loaded(vec![first.clone()]);

        let second = todo("second");
        collection.apply(CollectionEvent::Created(second.clone()));
        collection.apply(CollectionEvent::Updated(first.id, TodoPatch::completed(true)));
        collection.apply(CollectionEvent::Deleted(second.id));

        assert_eq!(collection.status(), LoadStatus::Succeeded);
        assert_eq!(collection.todos().len(), 1);
        assert!(collection.get(first.id).unwrap().completed);
    }

    #[test]
    fn test_create_appends_in_insertion_order() {
        let mut collection = loaded(vec![todo("a")]);
        collection.apply(CollectionEvent::Created(todo("b")));
        let titles: Vec<_> = collection.todos().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["a", "b"]);
    }

    #[test]
    fn test_update_after_delete_does_not_resurrect() {
        let doomed = todo("doomed");
        let mut collection = loaded(vec![doomed.clone(), todo("kept")]);

        assert!(collection.apply(CollectionEvent::Deleted(doomed.id)));
        assert!(!collection.apply(CollectionEvent::Updated(
            doomed.id,
            TodoPatch::completed(true)
        )));

        assert!(collection.get(doomed.id).is_none());
        assert_eq!(collection.todos().len(), 1);
    }

    #[test]
    fn test_last_update_wins() {
        let item = todo("item");
        let mut collection = loaded(vec![item.clone()]);

        collection.apply(CollectionEvent::Updated(item.id, TodoPatch::completed(true)));
        collection.apply(CollectionEvent::Updated(item.id, TodoPatch::completed(false)));

        assert!(!collection.get(item.id).unwrap().completed);
    }
}
