use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::comment::{
    Comment as DomainComment, CommentPatch, NewComment as DomainNewComment,
};
use crate::domain::types::{CommentText, TypeConstraintError};

/// Diesel model representing the `comments` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(crate::models::post::Post))]
#[diesel(table_name = crate::schema::comments)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub text: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewComment {
    pub post_id: i32,
    pub text: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::comments)]
pub struct CommentChangeset {
    pub text: Option<String>,
}

impl TryFrom<Comment> for DomainComment {
    type Error = TypeConstraintError;

    fn try_from(comment: Comment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: comment.id.try_into()?,
            post_id: comment.post_id.try_into()?,
            text: CommentText::new(comment.text)?,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        })
    }
}

impl From<&DomainNewComment> for NewComment {
    fn from(comment: &DomainNewComment) -> Self {
        Self {
            post_id: comment.post_id.get(),
            text: comment.text.as_str().to_string(),
        }
    }
}

impl From<&CommentPatch> for CommentChangeset {
    fn from(patch: &CommentPatch) -> Self {
        Self {
            text: patch.text.as_ref().map(|t| t.as_str().to_string()),
        }
    }
}
