use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::comment::CommentPatch;
use crate::domain::types::{CommentText, TypeConstraintError};

/// Body of `POST /posts/{id}/comments`; the post comes from the path.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewCommentForm {
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PatchCommentForm {
    #[validate(length(min = 1))]
    pub text: Option<String>,
}

#[derive(Debug, Error)]
pub enum CommentFormError {
    #[error("Comment form validation failed: {0}")]
    Validation(String),
    #[error("Comment form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Comment form does not change any field")]
    Empty,
}

impl From<ValidationErrors> for CommentFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for CommentFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<NewCommentForm> for CommentText {
    type Error = CommentFormError;

    fn try_from(value: NewCommentForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(CommentText::new(value.text)?)
    }
}

impl TryFrom<PatchCommentForm> for CommentPatch {
    type Error = CommentFormError;

    fn try_from(value: PatchCommentForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let patch = Self {
            text: value.text.map(CommentText::new).transpose()?,
        };
        if patch.is_empty() {
            return Err(CommentFormError::Empty);
        }
        Ok(patch)
    }
}
