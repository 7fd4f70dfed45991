use todoboard_model::ValidationError;
use uuid::Uuid;

/// Any failure reported by the remote todo store.
#[derive(Debug, thiserror::Error)]
pub enum RemoteStoreError {
    #[error("request to todo store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("todo {0} not found in store")]
    NotFound(Uuid),

    #[error("todo store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response from todo store: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    #[error("invalid todo: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    RemoteStore(#[from] RemoteStoreError),

    /// The todo is not in the local collection.
    #[error("todo {0} is not loaded")]
    NotFound(Uuid),
}

pub type Result<T, E = TodoError> = std::result::Result<T, E>;
