use diesel::prelude::*;

use crate::domain::category::Category as DomainCategory;
use crate::domain::types::TypeConstraintError;

/// Diesel model representing the `categories` join table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(crate::models::post::Post))]
#[diesel(belongs_to(crate::models::tag::Tag))]
#[diesel(table_name = crate::schema::categories)]
pub struct Category {
    pub id: i32,
    pub post_id: i32,
    pub tag_id: i32,
}

/// Insertable join row.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory {
    pub post_id: i32,
    pub tag_id: i32,
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: category.id.try_into()?,
            post_id: category.post_id.try_into()?,
            tag_id: category.tag_id.try_into()?,
        })
    }
}
