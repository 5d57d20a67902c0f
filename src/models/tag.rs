use diesel::prelude::*;

use crate::domain::tag::{NewTag as DomainNewTag, Tag as DomainTag, TagPatch};
use crate::domain::types::{TagName, TypeConstraintError};

/// Diesel model representing the `tags` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tags)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag {
    pub name: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::tags)]
pub struct TagChangeset {
    pub name: Option<String>,
}

impl TryFrom<Tag> for DomainTag {
    type Error = TypeConstraintError;

    fn try_from(tag: Tag) -> Result<Self, Self::Error> {
        Ok(Self {
            id: tag.id.try_into()?,
            name: TagName::new(tag.name)?,
        })
    }
}

impl From<&DomainNewTag> for NewTag {
    fn from(tag: &DomainNewTag) -> Self {
        Self {
            name: tag.name.as_str().to_string(),
        }
    }
}

impl From<&TagPatch> for TagChangeset {
    fn from(patch: &TagPatch) -> Self {
        Self {
            name: patch.name.as_ref().map(|n| n.as_str().to_string()),
        }
    }
}
