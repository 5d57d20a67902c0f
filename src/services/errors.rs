use thiserror::Error;

use crate::repository::RepositoryError;

/// Generic error type used by service layer functions.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Requested resource was not found. Carries the client-facing message.
    #[error("{0}")]
    NotFound(String),
    /// Client input could not be turned into domain values.
    #[error("{0}")]
    Form(String),
    /// Storage failure, propagated unchanged.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
