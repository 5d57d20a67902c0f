use serde::Serialize;

use crate::domain::comment::Comment;
use crate::domain::post::Post;
use crate::domain::tag::Tag;

/// Body of count, bulk patch and bulk delete responses.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CountDto {
    pub count: usize,
}

impl From<usize> for CountDto {
    fn from(count: usize) -> Self {
        Self { count }
    }
}

/// A post with the relations requested through `include`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostDto {
    #[serde(flatten)]
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            post,
            tags: None,
            comments: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TagDto {
    #[serde(flatten)]
    pub tag: Tag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
}

impl From<Tag> for TagDto {
    fn from(tag: Tag) -> Self {
        Self { tag, posts: None }
    }
}

/// A comment, optionally with the post it belongs to.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommentDto {
    #[serde(flatten)]
    pub comment: Comment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            comment,
            post: None,
        }
    }
}
