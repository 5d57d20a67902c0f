use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::tag::{NewTag, TagPatch};
use crate::domain::types::{TagName, TypeConstraintError};

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewTagForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PatchTagForm {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum TagFormError {
    #[error("Tag form validation failed: {0}")]
    Validation(String),
    #[error("Tag form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Tag form does not change any field")]
    Empty,
}

impl From<ValidationErrors> for TagFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for TagFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<NewTagForm> for NewTag {
    type Error = TagFormError;

    fn try_from(value: NewTagForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            name: TagName::new(value.name)?,
        })
    }
}

impl TryFrom<PatchTagForm> for TagPatch {
    type Error = TagFormError;

    fn try_from(value: PatchTagForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let patch = Self {
            name: value.name.map(TagName::new).transpose()?,
        };
        if patch.is_empty() {
            return Err(TagFormError::Empty);
        }
        Ok(patch)
    }
}
