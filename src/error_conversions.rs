//! Conversions from form errors into service errors.
//!
//! Kept apart from both layers so that `data`-only consumers never see the
//! form types.

use crate::domain::types::TypeConstraintError;
use crate::forms::comments::CommentFormError;
use crate::forms::filter::FilterFormError;
use crate::forms::posts::PostFormError;
use crate::forms::tags::TagFormError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<FilterFormError> for ServiceError {
    fn from(val: FilterFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<PostFormError> for ServiceError {
    fn from(val: PostFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<TagFormError> for ServiceError {
    fn from(val: TagFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<CommentFormError> for ServiceError {
    fn from(val: CommentFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
