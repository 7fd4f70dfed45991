use crate::Todo;
use anyhow::{Context, Result};
use sled::Db;
use uuid::Uuid;

/// Todo documents stored in sled, keyed by id bytes, bincode-encoded.
pub struct TodoDb {
    db: Db,
}

impl TodoDb {
    pub fn new(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let db = sled::open(path).context("Failed to open sled database")?;
        Ok(Self { db })
    }

    pub fn insert(&self, todo: &Todo) -> Result<()> {
        self.put(todo).context("Failed to insert todo")
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<Todo>> {
        match self.db.get(id.as_bytes()).context("Failed to get todo")? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All todos in creation order, optionally restricted to one owner.
    pub fn list(&self, owner_id: Option<&str>) -> Result<Vec<Todo>> {
        let mut todos = Vec::new();
        for item in self.db.iter() {
            let (_key, value) = item.context("Failed to iterate over todos")?;
            let todo = decode(&value)?;
            if owner_id.is_none_or(|owner| todo.owner.id == owner) {
                todos.push(todo);
            }
        }
        todos.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(todos)
    }

    pub fn update(&self, todo: &Todo) -> Result<()> {
        self.put(todo).context("Failed to update todo")
    }

    pub fn delete(&self, id: &Uuid) -> Result<bool> {
        let existed = self
            .db
            .remove(id.as_bytes())
            .context("Failed to delete todo")?
            .is_some();
        self.db.flush().context("Failed to flush database")?;
        Ok(existed)
    }

    fn put(&self, todo: &Todo) -> Result<()> {
        let config = bincode::config::standard();
        let value =
            bincode::serde::encode_to_vec(todo, config).context("Failed to serialize todo")?;
        self.db.insert(todo.id.as_bytes(), value)?;
        self.db.flush().context("Failed to flush database")?;
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> Result<Todo> {
    let config = bincode::config::standard();
    let (todo, _): (Todo, _) =
        bincode::serde::decode_from_slice(bytes, config).context("Failed to deserialize todo")?;
    Ok(todo)
}
