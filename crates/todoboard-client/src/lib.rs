//! Client side of todoboard: talks to the todo store, keeps the loaded
//! collection, and derives the page of todos to display.

mod config;
mod controller;
mod error;
pub mod memory;
mod repository;
mod state;
mod store;
pub mod view;

pub use config::ClientConfig;
pub use controller::TodoController;
pub use error::{RemoteStoreError, Result, TodoError};
pub use memory::MemoryStore;
pub use repository::TodoRepository;
pub use state::{CollectionEvent, LoadStatus, TodoCollection};
pub use store::{HttpTodoStore, TodoStore};
pub use view::{
    DashboardStats, DueDateFilter, PAGE_SIZE, PriorityFilter, SortKey, StatusFilter, ViewConfig,
    VisiblePage, compute_visible_page,
};

pub use todoboard_model::{NewTodo, Owner, Priority, Todo, TodoPatch, ValidationError};
