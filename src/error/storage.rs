//! Errors from the message/user store.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A user with this name already exists.
    #[error("username {username:?} is already taken")]
    UsernameTaken { username: String },

    /// The backing store could not serve the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::UsernameTaken { .. } => "STORE_USERNAME_TAKEN",
            StorageError::Unavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}
