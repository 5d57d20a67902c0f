use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::post::{NewPost, PostPatch};
use crate::domain::types::{PostContent, PostTitle, TypeConstraintError};

/// Body of a post creation request. The id is always generated.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewPostForm {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

/// Body of a partial post update.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PatchPostForm {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
}

#[derive(Debug, Error)]
pub enum PostFormError {
    #[error("Post form validation failed: {0}")]
    Validation(String),
    #[error("Post form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Post form does not change any field")]
    Empty,
}

impl From<ValidationErrors> for PostFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for PostFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<NewPostForm> for NewPost {
    type Error = PostFormError;

    fn try_from(value: NewPostForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            title: PostTitle::new(value.title)?,
            content: PostContent::new(value.content)?,
        })
    }
}

impl TryFrom<PatchPostForm> for PostPatch {
    type Error = PostFormError;

    fn try_from(value: PatchPostForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let patch = Self {
            title: value.title.map(PostTitle::new).transpose()?,
            content: value.content.map(PostContent::new).transpose()?,
        };
        if patch.is_empty() {
            return Err(PostFormError::Empty);
        }
        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_post_trims_fields() {
        let form = NewPostForm {
            title: "  Hello ".to_string(),
            content: "World".to_string(),
        };

        let post: NewPost = form.try_into().unwrap();
        assert_eq!(post.title.as_str(), "Hello");
    }

    #[test]
    fn new_post_rejects_blank_title() {
        let form = NewPostForm {
            title: "   ".to_string(),
            content: "World".to_string(),
        };

        let post: Result<NewPost, _> = form.try_into();
        assert!(matches!(post, Err(PostFormError::TypeConstraint(_))));
    }

    #[test]
    fn new_post_rejects_client_supplied_id() {
        let body = r#"{"id": 3, "title": "Hello", "content": "World"}"#;
        assert!(serde_json::from_str::<NewPostForm>(body).is_err());
    }

    #[test]
    fn patch_requires_a_field() {
        let form = PatchPostForm {
            title: None,
            content: None,
        };

        let patch: Result<PostPatch, _> = form.try_into();
        assert!(matches!(patch, Err(PostFormError::Empty)));
    }

    #[test]
    fn patch_keeps_only_given_fields() {
        let form = PatchPostForm {
            title: None,
            content: Some("Updated".to_string()),
        };

        let patch: PostPatch = form.try_into().unwrap();
        assert!(patch.title.is_none());
        assert_eq!(patch.content.unwrap().as_str(), "Updated");
    }
}
