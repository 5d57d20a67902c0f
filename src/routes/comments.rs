use actix_web::{Responder, delete, get, patch, post, web};

use crate::domain::comment::{Comment, CommentField, CommentPatch, CommentRelation};
use crate::domain::post::{Post, PostRelation};
use crate::domain::types::CommentText;
use crate::forms::comments::{NewCommentForm, PatchCommentForm};
use crate::forms::filter::{FilterQuery, WhereQuery};
use crate::repository::DieselRepository;
use crate::routes::{count_response, json_response, no_content_response, path_id};
use crate::services::includes::{Expand, expand_all};
use crate::services::{comments, entities};

#[get("/posts/{id}/comments")]
pub async fn list_post_comments(
    id: web::Path<i32>,
    query: web::Query<FilterQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Post>(id.into_inner()).and_then(|id| {
        let (filter, include) = query.parse::<CommentField, CommentRelation>()?;
        let found = comments::list_post_comments(id, filter, repo.get_ref())?;
        expand_all(found, &include, repo.get_ref())
    });
    json_response(result)
}

#[post("/posts/{id}/comments")]
pub async fn create_post_comment(
    id: web::Path<i32>,
    form: web::Json<NewCommentForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Post>(id.into_inner()).and_then(|id| {
        let text = CommentText::try_from(form.into_inner())?;
        comments::create_post_comment(id, text, repo.get_ref())
    });
    json_response(result)
}

#[patch("/posts/{id}/comments")]
pub async fn patch_post_comments(
    id: web::Path<i32>,
    query: web::Query<WhereQuery>,
    form: web::Json<PatchCommentForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Post>(id.into_inner()).and_then(|id| {
        let where_clause = query.parse::<CommentField>()?;
        let patch = CommentPatch::try_from(form.into_inner())?;
        comments::patch_post_comments(id, &patch, where_clause, repo.get_ref())
    });
    count_response(result)
}

#[delete("/posts/{id}/comments")]
pub async fn delete_post_comments(
    id: web::Path<i32>,
    query: web::Query<WhereQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Post>(id.into_inner()).and_then(|id| {
        let where_clause = query.parse::<CommentField>()?;
        comments::delete_post_comments(id, where_clause, repo.get_ref())
    });
    count_response(result)
}

#[get("/comments/{id}")]
pub async fn get_comment(
    id: web::Path<i32>,
    query: web::Query<FilterQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Comment>(id.into_inner()).and_then(|id| {
        let include = query.include::<CommentRelation>()?;
        entities::get_with::<Comment, _>(id, &include, repo.get_ref())
    });
    json_response(result)
}

#[patch("/comments/{id}")]
pub async fn patch_comment(
    id: web::Path<i32>,
    form: web::Json<PatchCommentForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Comment>(id.into_inner()).and_then(|id| {
        let patch = CommentPatch::try_from(form.into_inner())?;
        entities::patch::<Comment, _>(id, &patch, repo.get_ref())
    });
    no_content_response(result)
}

#[delete("/comments/{id}")]
pub async fn delete_comment(
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Comment>(id.into_inner())
        .and_then(|id| entities::delete::<Comment, _>(id, repo.get_ref()));
    no_content_response(result)
}

#[get("/comments/{id}/post")]
pub async fn get_comment_post(
    id: web::Path<i32>,
    query: web::Query<FilterQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Comment>(id.into_inner()).and_then(|id| {
        let include = query.include::<PostRelation>()?;
        comments::get_comment_post(id, repo.get_ref())?.expand(&include, repo.get_ref())
    });
    json_response(result)
}
