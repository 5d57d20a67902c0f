use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::filter::{Filter, Order, SortDirection, Where};
use crate::domain::post::{NewPost, Post, PostField, PostPatch};
use crate::domain::types::PostId;
use crate::models::post::{NewPost as DbNewPost, Post as DbPost, PostChangeset};
use crate::repository::filter::{
    Predicate, build_predicate, compare_integer, compare_text, integer_value, integer_values,
    text_value, text_values,
};
use crate::repository::{DieselRepository, EntityReader, EntityWriter, RepositoryResult};
use crate::schema::posts;

pub(crate) fn post_predicate(
    where_clause: &Where<PostField>,
) -> RepositoryResult<Predicate<posts::table>> {
    build_predicate(
        where_clause,
        |field, op, value| {
            Ok(match field {
                PostField::Id => {
                    compare_integer!(posts::table, posts::id, op, integer_value(field, value)?)
                }
                PostField::Title => {
                    compare_text!(posts::table, posts::title, op, text_value(field, value)?)
                }
                PostField::Content => {
                    compare_text!(posts::table, posts::content, op, text_value(field, value)?)
                }
            })
        },
        |field, values| {
            let predicate: Predicate<posts::table> = match field {
                PostField::Id => Box::new(posts::id.eq_any(integer_values(field, values)?)),
                PostField::Title => Box::new(posts::title.eq_any(text_values(field, values)?)),
                PostField::Content => {
                    Box::new(posts::content.eq_any(text_values(field, values)?))
                }
            };
            Ok(predicate)
        },
    )
}

fn order_posts(
    mut query: posts::BoxedQuery<'static, Sqlite>,
    order: &[Order<PostField>],
) -> posts::BoxedQuery<'static, Sqlite> {
    for key in order {
        query = match (key.field, key.direction) {
            (PostField::Id, SortDirection::Asc) => query.then_order_by(posts::id.asc()),
            (PostField::Id, SortDirection::Desc) => query.then_order_by(posts::id.desc()),
            (PostField::Title, SortDirection::Asc) => query.then_order_by(posts::title.asc()),
            (PostField::Title, SortDirection::Desc) => query.then_order_by(posts::title.desc()),
            (PostField::Content, SortDirection::Asc) => {
                query.then_order_by(posts::content.asc())
            }
            (PostField::Content, SortDirection::Desc) => {
                query.then_order_by(posts::content.desc())
            }
        };
    }
    query.then_order_by(posts::id.asc())
}

/// Load posts matching `filter`, optionally restricted to the ids in `scope`.
pub(crate) fn load_posts(
    conn: &mut SqliteConnection,
    filter: &Filter<PostField>,
    scope: Option<&[i32]>,
) -> RepositoryResult<Vec<Post>> {
    let mut query = posts::table
        .into_boxed::<Sqlite>()
        .filter(post_predicate(&filter.where_clause)?);
    if let Some(ids) = scope {
        query = query.filter(posts::id.eq_any(ids.to_vec()));
    }
    query = order_posts(query, &filter.order);
    if let Some(limit) = filter.limit {
        query = query.limit(limit.into());
    }
    if let Some(skip) = filter.skip {
        query = query.offset(skip.into());
    }

    let items = query
        .load::<DbPost>(conn)?
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<Vec<Post>, _>>()?;
    Ok(items)
}

pub(crate) fn insert_post(conn: &mut SqliteConnection, post: &NewPost) -> RepositoryResult<Post> {
    let inserted = diesel::insert_into(posts::table)
        .values(DbNewPost::from(post))
        .get_result::<DbPost>(conn)?;
    Ok(inserted.try_into()?)
}

/// Update posts matching `where_clause` (and `scope`, when given), bumping
/// `updated_at`.
pub(crate) fn update_posts(
    conn: &mut SqliteConnection,
    patch: &PostPatch,
    where_clause: &Where<PostField>,
    scope: Option<&[i32]>,
) -> RepositoryResult<usize> {
    if patch.is_empty() {
        return Ok(0);
    }

    let mut query = posts::table
        .into_boxed::<Sqlite>()
        .filter(post_predicate(where_clause)?);
    if let Some(ids) = scope {
        query = query.filter(posts::id.eq_any(ids.to_vec()));
    }
    let ids = query.select(posts::id).load::<i32>(conn)?;
    if ids.is_empty() {
        return Ok(0);
    }

    let affected = diesel::update(posts::table.filter(posts::id.eq_any(ids)))
        .set((
            PostChangeset::from(patch),
            posts::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)?;
    Ok(affected)
}

impl EntityReader<Post> for DieselRepository {
    fn find(&self, filter: &Filter<PostField>) -> RepositoryResult<Vec<Post>> {
        let mut conn = self.conn()?;
        load_posts(&mut conn, filter, None)
    }

    fn count(&self, where_clause: &Where<PostField>) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let total = posts::table
            .into_boxed::<Sqlite>()
            .filter(post_predicate(where_clause)?)
            .count()
            .get_result::<i64>(&mut conn)? as usize;
        Ok(total)
    }

    fn find_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>> {
        let mut conn = self.conn()?;

        let post = posts::table
            .filter(posts::id.eq(id.get()))
            .first::<DbPost>(&mut conn)
            .optional()?;

        let post = post.map(TryInto::try_into).transpose()?;
        Ok(post)
    }
}

impl EntityWriter<Post> for DieselRepository {
    fn create(&self, new: &NewPost) -> RepositoryResult<Post> {
        let mut conn = self.conn()?;
        insert_post(&mut conn, new)
    }

    fn patch(&self, patch: &PostPatch, where_clause: &Where<PostField>) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| update_posts(conn, patch, where_clause, None))
    }

    /// Comments and tag links of deleted posts are removed by the
    /// `ON DELETE CASCADE` foreign keys.
    fn delete(&self, where_clause: &Where<PostField>) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        conn.transaction(|conn| {
            let ids = posts::table
                .into_boxed::<Sqlite>()
                .filter(post_predicate(where_clause)?)
                .select(posts::id)
                .load::<i32>(conn)?;
            let affected =
                diesel::delete(posts::table.filter(posts::id.eq_any(ids))).execute(conn)?;
            Ok(affected)
        })
    }
}
