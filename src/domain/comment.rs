use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Entity;
use crate::domain::filter::{FieldKind, FieldValue, FilterField, Filterable, Relation};
use crate::domain::types::{CommentId, CommentText, PostId};

/// A comment left on a single post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub text: CommentText,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`Comment`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub post_id: PostId,
    pub text: CommentText,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentPatch {
    pub text: Option<CommentText>,
}

impl CommentPatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }

    pub fn apply_to(&self, comment: &mut Comment) {
        if let Some(text) = &self.text {
            comment.text = text.clone();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentField {
    Id,
    PostId,
    Text,
}

impl FilterField for CommentField {
    const ALL: &'static [Self] = &[Self::Id, Self::PostId, Self::Text];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::PostId => "postId",
            Self::Text => "text",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Id | Self::PostId => FieldKind::Integer,
            Self::Text => FieldKind::Text,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentRelation {
    Post,
}

impl Relation for CommentRelation {
    const ALL: &'static [Self] = &[Self::Post];

    fn name(self) -> &'static str {
        match self {
            Self::Post => "post",
        }
    }
}

impl Filterable<CommentField> for Comment {
    fn field_value(&self, field: CommentField) -> FieldValue {
        match field {
            CommentField::Id => self.id.get().into(),
            CommentField::PostId => self.post_id.get().into(),
            CommentField::Text => self.text.as_str().into(),
        }
    }

    fn sort_key(&self) -> i32 {
        self.id.get()
    }
}

impl Entity for Comment {
    type Id = CommentId;
    type Field = CommentField;
    type New = NewComment;
    type Patch = CommentPatch;

    const NAME: &'static str = "Comment";
    const ID_FIELD: CommentField = CommentField::Id;

    fn id(&self) -> CommentId {
        self.id
    }
}
