use serde_json::json;
use thiserror::Error;

use crate::outcome::Outcome;
use crate::storage::StorageError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        ServiceError::Storage(StorageError::from(err))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Storage(StorageError::from(err))
    }
}

impl ServiceError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) | ServiceError::Conflict(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Storage(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "Validation",
            ServiceError::NotFound(_) => "NotFound",
            ServiceError::Conflict(_) => "Conflict",
            ServiceError::Storage(_) => "Storage",
        }
    }

    pub fn into_outcome(self) -> Outcome {
        let message = self.to_string();
        let error = json!({ "kind": self.kind(), "message": message });
        Outcome::failure(message, error, self.status_code())
    }
}
