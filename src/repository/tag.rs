use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::filter::{Filter, Order, SortDirection, Where};
use crate::domain::tag::{NewTag, Tag, TagField, TagPatch};
use crate::domain::types::TagId;
use crate::models::tag::{NewTag as DbNewTag, Tag as DbTag, TagChangeset};
use crate::repository::filter::{
    Predicate, build_predicate, compare_integer, compare_text, integer_value, integer_values,
    text_value, text_values,
};
use crate::repository::{DieselRepository, EntityReader, EntityWriter, RepositoryResult};
use crate::schema::tags;

pub(crate) fn tag_predicate(
    where_clause: &Where<TagField>,
) -> RepositoryResult<Predicate<tags::table>> {
    build_predicate(
        where_clause,
        |field, op, value| {
            Ok(match field {
                TagField::Id => {
                    compare_integer!(tags::table, tags::id, op, integer_value(field, value)?)
                }
                TagField::Name => {
                    compare_text!(tags::table, tags::name, op, text_value(field, value)?)
                }
            })
        },
        |field, values| {
            let predicate: Predicate<tags::table> = match field {
                TagField::Id => Box::new(tags::id.eq_any(integer_values(field, values)?)),
                TagField::Name => Box::new(tags::name.eq_any(text_values(field, values)?)),
            };
            Ok(predicate)
        },
    )
}

fn order_tags(
    mut query: tags::BoxedQuery<'static, Sqlite>,
    order: &[Order<TagField>],
) -> tags::BoxedQuery<'static, Sqlite> {
    for key in order {
        query = match (key.field, key.direction) {
            (TagField::Id, SortDirection::Asc) => query.then_order_by(tags::id.asc()),
            (TagField::Id, SortDirection::Desc) => query.then_order_by(tags::id.desc()),
            (TagField::Name, SortDirection::Asc) => query.then_order_by(tags::name.asc()),
            (TagField::Name, SortDirection::Desc) => query.then_order_by(tags::name.desc()),
        };
    }
    query.then_order_by(tags::id.asc())
}

/// Load tags matching `filter`, optionally restricted to the ids in `scope`.
pub(crate) fn load_tags(
    conn: &mut SqliteConnection,
    filter: &Filter<TagField>,
    scope: Option<&[i32]>,
) -> RepositoryResult<Vec<Tag>> {
    let mut query = tags::table
        .into_boxed::<Sqlite>()
        .filter(tag_predicate(&filter.where_clause)?);
    if let Some(ids) = scope {
        query = query.filter(tags::id.eq_any(ids.to_vec()));
    }
    query = order_tags(query, &filter.order);
    if let Some(limit) = filter.limit {
        query = query.limit(limit.into());
    }
    if let Some(skip) = filter.skip {
        query = query.offset(skip.into());
    }

    let items = query
        .load::<DbTag>(conn)?
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<Vec<Tag>, _>>()?;
    Ok(items)
}

pub(crate) fn insert_tag(conn: &mut SqliteConnection, tag: &NewTag) -> RepositoryResult<Tag> {
    let inserted = diesel::insert_into(tags::table)
        .values(DbNewTag::from(tag))
        .get_result::<DbTag>(conn)?;
    Ok(inserted.try_into()?)
}

/// Update tags matching `where_clause` (and `scope`, when given).
pub(crate) fn update_tags(
    conn: &mut SqliteConnection,
    patch: &TagPatch,
    where_clause: &Where<TagField>,
    scope: Option<&[i32]>,
) -> RepositoryResult<usize> {
    if patch.is_empty() {
        return Ok(0);
    }

    let mut query = tags::table
        .into_boxed::<Sqlite>()
        .filter(tag_predicate(where_clause)?);
    if let Some(ids) = scope {
        query = query.filter(tags::id.eq_any(ids.to_vec()));
    }
    let ids = query.select(tags::id).load::<i32>(conn)?;
    if ids.is_empty() {
        return Ok(0);
    }

    let affected = diesel::update(tags::table.filter(tags::id.eq_any(ids)))
        .set(TagChangeset::from(patch))
        .execute(conn)?;
    Ok(affected)
}

impl EntityReader<Tag> for DieselRepository {
    fn find(&self, filter: &Filter<TagField>) -> RepositoryResult<Vec<Tag>> {
        let mut conn = self.conn()?;
        load_tags(&mut conn, filter, None)
    }

    fn count(&self, where_clause: &Where<TagField>) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let total = tags::table
            .into_boxed::<Sqlite>()
            .filter(tag_predicate(where_clause)?)
            .count()
            .get_result::<i64>(&mut conn)? as usize;
        Ok(total)
    }

    fn find_by_id(&self, id: TagId) -> RepositoryResult<Option<Tag>> {
        let mut conn = self.conn()?;

        let tag = tags::table
            .filter(tags::id.eq(id.get()))
            .first::<DbTag>(&mut conn)
            .optional()?;

        let tag = tag.map(TryInto::try_into).transpose()?;
        Ok(tag)
    }
}

impl EntityWriter<Tag> for DieselRepository {
    fn create(&self, new: &NewTag) -> RepositoryResult<Tag> {
        let mut conn = self.conn()?;
        insert_tag(&mut conn, new)
    }

    fn patch(&self, patch: &TagPatch, where_clause: &Where<TagField>) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| update_tags(conn, patch, where_clause, None))
    }

    fn delete(&self, where_clause: &Where<TagField>) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        conn.transaction(|conn| {
            let ids = tags::table
                .into_boxed::<Sqlite>()
                .filter(tag_predicate(where_clause)?)
                .select(tags::id)
                .load::<i32>(conn)?;
            let affected =
                diesel::delete(tags::table.filter(tags::id.eq_any(ids))).execute(conn)?;
            Ok(affected)
        })
    }
}
