use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::filter::{FieldKind, FieldValue, FilterField, Filterable, Relation, Where};
use crate::domain::types::{PostContent, PostId, PostTitle};
use crate::domain::{Entity, NaturalKey};

/// A blog post. Tags are attached through category rows, comments point back
/// at the post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: PostTitle,
    pub content: PostContent,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`Post`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPost {
    pub title: PostTitle,
    pub content: PostContent,
}

/// Partial update of a [`Post`]; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPatch {
    pub title: Option<PostTitle>,
    pub content: Option<PostContent>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    pub fn apply_to(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostField {
    Id,
    Title,
    Content,
}

impl FilterField for PostField {
    const ALL: &'static [Self] = &[Self::Id, Self::Title, Self::Content];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Content => "content",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Id => FieldKind::Integer,
            Self::Title | Self::Content => FieldKind::Text,
        }
    }
}

/// Relations a post can embed through `include`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostRelation {
    Tags,
    Comments,
}

impl Relation for PostRelation {
    const ALL: &'static [Self] = &[Self::Tags, Self::Comments];

    fn name(self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::Comments => "comments",
        }
    }
}

impl Filterable<PostField> for Post {
    fn field_value(&self, field: PostField) -> FieldValue {
        match field {
            PostField::Id => self.id.get().into(),
            PostField::Title => self.title.as_str().into(),
            PostField::Content => self.content.as_str().into(),
        }
    }

    fn sort_key(&self) -> i32 {
        self.id.get()
    }
}

impl Entity for Post {
    type Id = PostId;
    type Field = PostField;
    type New = NewPost;
    type Patch = PostPatch;

    const NAME: &'static str = "Post";
    const ID_FIELD: PostField = PostField::Id;

    fn id(&self) -> PostId {
        self.id
    }
}

/// Posts are deduplicated by title when attached from the tag side.
impl NaturalKey for Post {
    fn natural_key(new: &NewPost) -> Where<PostField> {
        Where::eq(PostField::Title, new.title.as_str())
    }
}
