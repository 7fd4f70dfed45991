use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Mid,
    High,
}

impl Priority {
    /// Sort rank, higher is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Mid => 2,
            Priority::High => 3,
        }
    }
}

/// The user a todo belongs to, as reported by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Owner {
    pub id: String,
    pub name: String,
}

impl Owner {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("update does not change any field")]
    EmptyPatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub owner: Owner,
}

impl Todo {
    /// Builds a stored todo from validated input, assigning id and creation time.
    pub fn create(fields: NewTodo, owner: Owner) -> Result<Self, ValidationError> {
        fields.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            priority: fields.priority,
            completed: fields.completed,
            due_date: fields.due_date,
            created_at: Utc::now(),
            owner,
        })
    }

    /// Merges the fields present in `patch` into this todo.
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
    }
}

/// Input for creating a todo. Everything but the title has a default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Partial update over the mutable fields of a todo.
///
/// `description` and `due_date` are doubly optional: the outer `None` leaves
/// the field alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TodoPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
            && self.due_date.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        match &self.title {
            Some(title) if title.trim().is_empty() => Err(ValidationError::EmptyTitle),
            _ => Ok(()),
        }
    }
}

mod db;
pub use db::TodoDb;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Todo {
        Todo::create(
            NewTodo::new("Write report").with_description("quarterly numbers"),
            Owner::new("user_1", "Ada"),
        )
        .unwrap()
    }

    #[test]
    fn test_create_defaults() {
        let todo = sample();
        assert_eq!(todo.priority, Priority::Low);
        assert!(!todo.completed);
        assert!(todo.due_date.is_none());
        assert_eq!(todo.owner.id, "user_1");
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let err = Todo::create(NewTodo::new("   "), Owner::new("u", "n")).unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
    }

    #[test]
    fn test_apply_merges_only_present_fields() {
        let mut todo = sample();
        let before = todo.clone();

        todo.apply(&TodoPatch {
            priority: Some(Priority::High),
            description: Some(None),
            ..TodoPatch::default()
        });

        assert_eq!(todo.priority, Priority::High);
        assert_eq!(todo.description, None);
        assert_eq!(todo.title, before.title);
        assert_eq!(todo.completed, before.completed);
        assert_eq!(todo.id, before.id);
        assert_eq!(todo.created_at, before.created_at);
    }

    #[test]
    fn test_patch_validation() {
        assert_eq!(
            TodoPatch::default().validate(),
            Err(ValidationError::EmptyPatch)
        );
        let blank_title = TodoPatch {
            title: Some(String::new()),
            ..TodoPatch::default()
        };
        assert_eq!(blank_title.validate(), Err(ValidationError::EmptyTitle));
        assert!(TodoPatch::completed(true).validate().is_ok());
    }

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::High.rank() > Priority::Mid.rank());
        assert!(Priority::Mid.rank() > Priority::Low.rank());
    }
}
