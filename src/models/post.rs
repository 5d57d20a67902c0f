use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::post::{NewPost as DomainNewPost, Post as DomainPost, PostPatch};
use crate::domain::types::{PostContent, PostTitle, TypeConstraintError};

/// Diesel model representing the `posts` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::posts)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Post`]; timestamps are filled in by SQLite.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::posts)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

/// Partial update of a `posts` row. `None` columns are skipped.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::posts)]
pub struct PostChangeset {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl TryFrom<Post> for DomainPost {
    type Error = TypeConstraintError;

    fn try_from(post: Post) -> Result<Self, Self::Error> {
        Ok(Self {
            id: post.id.try_into()?,
            title: PostTitle::new(post.title)?,
            content: PostContent::new(post.content)?,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }
}

impl From<&DomainNewPost> for NewPost {
    fn from(post: &DomainNewPost) -> Self {
        Self {
            title: post.title.as_str().to_string(),
            content: post.content.as_str().to_string(),
        }
    }
}

impl From<&PostPatch> for PostChangeset {
    fn from(patch: &PostPatch) -> Self {
        Self {
            title: patch.title.as_ref().map(|t| t.as_str().to_string()),
            content: patch.content.as_ref().map(|c| c.as_str().to_string()),
        }
    }
}
