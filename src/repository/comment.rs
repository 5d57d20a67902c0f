use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::comment::{Comment, CommentField, CommentPatch, NewComment};
use crate::domain::filter::{Filter, SortDirection, Where};
use crate::models::comment::{
    Comment as DbComment, CommentChangeset, NewComment as DbNewComment,
};
use crate::repository::filter::{
    Predicate, build_predicate, compare_integer, compare_text, integer_value, integer_values,
    text_value, text_values,
};
use crate::repository::{DieselRepository, EntityReader, EntityWriter, RepositoryResult};
use crate::schema::comments;

fn comment_predicate(
    where_clause: &Where<CommentField>,
) -> RepositoryResult<Predicate<comments::table>> {
    build_predicate(
        where_clause,
        |field, op, value| {
            Ok(match field {
                CommentField::Id => {
                    compare_integer!(comments::table, comments::id, op, integer_value(field, value)?)
                }
                CommentField::PostId => compare_integer!(
                    comments::table,
                    comments::post_id,
                    op,
                    integer_value(field, value)?
                ),
                CommentField::Text => {
                    compare_text!(comments::table, comments::text, op, text_value(field, value)?)
                }
            })
        },
        |field, values| {
            let predicate: Predicate<comments::table> = match field {
                CommentField::Id => {
                    Box::new(comments::id.eq_any(integer_values(field, values)?))
                }
                CommentField::PostId => {
                    Box::new(comments::post_id.eq_any(integer_values(field, values)?))
                }
                CommentField::Text => {
                    Box::new(comments::text.eq_any(text_values(field, values)?))
                }
            };
            Ok(predicate)
        },
    )
}

fn matching_comment_ids(
    conn: &mut SqliteConnection,
    where_clause: &Where<CommentField>,
) -> RepositoryResult<Vec<i32>> {
    let ids = comments::table
        .into_boxed::<Sqlite>()
        .filter(comment_predicate(where_clause)?)
        .select(comments::id)
        .load::<i32>(conn)?;
    Ok(ids)
}

impl EntityReader<Comment> for DieselRepository {
    fn find(&self, filter: &Filter<CommentField>) -> RepositoryResult<Vec<Comment>> {
        let mut conn = self.conn()?;

        let mut query = comments::table
            .into_boxed::<Sqlite>()
            .filter(comment_predicate(&filter.where_clause)?);
        for key in &filter.order {
            query = match (key.field, key.direction) {
                (CommentField::Id, SortDirection::Asc) => query.then_order_by(comments::id.asc()),
                (CommentField::Id, SortDirection::Desc) => {
                    query.then_order_by(comments::id.desc())
                }
                (CommentField::PostId, SortDirection::Asc) => {
                    query.then_order_by(comments::post_id.asc())
                }
                (CommentField::PostId, SortDirection::Desc) => {
                    query.then_order_by(comments::post_id.desc())
                }
                (CommentField::Text, SortDirection::Asc) => {
                    query.then_order_by(comments::text.asc())
                }
                (CommentField::Text, SortDirection::Desc) => {
                    query.then_order_by(comments::text.desc())
                }
            };
        }
        query = query.then_order_by(comments::id.asc());
        if let Some(limit) = filter.limit {
            query = query.limit(limit.into());
        }
        if let Some(skip) = filter.skip {
            query = query.offset(skip.into());
        }

        let items = query
            .load::<DbComment>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Comment>, _>>()?;
        Ok(items)
    }

    fn count(&self, where_clause: &Where<CommentField>) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let total = comments::table
            .into_boxed::<Sqlite>()
            .filter(comment_predicate(where_clause)?)
            .count()
            .get_result::<i64>(&mut conn)? as usize;
        Ok(total)
    }
}

impl EntityWriter<Comment> for DieselRepository {
    fn create(&self, new: &NewComment) -> RepositoryResult<Comment> {
        let mut conn = self.conn()?;

        let inserted = diesel::insert_into(comments::table)
            .values(DbNewComment::from(new))
            .get_result::<DbComment>(&mut conn)?;
        Ok(inserted.try_into()?)
    }

    fn patch(
        &self,
        patch: &CommentPatch,
        where_clause: &Where<CommentField>,
    ) -> RepositoryResult<usize> {
        if patch.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn()?;

        conn.transaction(|conn| {
            let ids = matching_comment_ids(conn, where_clause)?;
            if ids.is_empty() {
                return Ok(0);
            }
            let affected = diesel::update(comments::table.filter(comments::id.eq_any(ids)))
                .set((
                    CommentChangeset::from(patch),
                    comments::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;
            Ok(affected)
        })
    }

    fn delete(&self, where_clause: &Where<CommentField>) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        conn.transaction(|conn| {
            let ids = matching_comment_ids(conn, where_clause)?;
            let affected =
                diesel::delete(comments::table.filter(comments::id.eq_any(ids))).execute(conn)?;
            Ok(affected)
        })
    }
}
