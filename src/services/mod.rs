pub mod comments;
pub mod entities;
pub mod errors;
pub mod includes;
pub mod relations;

pub use errors::{ServiceError, ServiceResult};
