use serde::{Deserialize, Serialize};

use crate::domain::filter::{FieldKind, FieldValue, FilterField, Filterable, Relation, Where};
use crate::domain::types::{TagId, TagName};
use crate::domain::{Entity, NaturalKey};

/// A label that can be attached to any number of posts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: TagId,
    pub name: TagName,
}

/// Data required to insert a new [`Tag`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTag {
    pub name: TagName,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagPatch {
    pub name: Option<TagName>,
}

impl TagPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }

    pub fn apply_to(&self, tag: &mut Tag) {
        if let Some(name) = &self.name {
            tag.name = name.clone();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagField {
    Id,
    Name,
}

impl FilterField for TagField {
    const ALL: &'static [Self] = &[Self::Id, Self::Name];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Id => FieldKind::Integer,
            Self::Name => FieldKind::Text,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagRelation {
    Posts,
}

impl Relation for TagRelation {
    const ALL: &'static [Self] = &[Self::Posts];

    fn name(self) -> &'static str {
        match self {
            Self::Posts => "posts",
        }
    }
}

impl Filterable<TagField> for Tag {
    fn field_value(&self, field: TagField) -> FieldValue {
        match field {
            TagField::Id => self.id.get().into(),
            TagField::Name => self.name.as_str().into(),
        }
    }

    fn sort_key(&self) -> i32 {
        self.id.get()
    }
}

impl Entity for Tag {
    type Id = TagId;
    type Field = TagField;
    type New = NewTag;
    type Patch = TagPatch;

    const NAME: &'static str = "Tag";
    const ID_FIELD: TagField = TagField::Id;

    fn id(&self) -> TagId {
        self.id
    }
}

impl NaturalKey for Tag {
    fn natural_key(new: &NewTag) -> Where<TagField> {
        Where::eq(TagField::Name, new.name.as_str())
    }
}
