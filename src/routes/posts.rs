use actix_web::{Responder, delete, get, patch, post, web};

use crate::domain::post::{NewPost, Post, PostField, PostPatch, PostRelation};
use crate::forms::filter::{FilterQuery, WhereQuery};
use crate::forms::posts::{NewPostForm, PatchPostForm};
use crate::repository::DieselRepository;
use crate::routes::{count_response, json_response, no_content_response, path_id};
use crate::services::{ServiceError, entities};

#[get("/posts")]
pub async fn list_posts(
    query: web::Query<FilterQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = query
        .parse::<PostField, PostRelation>()
        .map_err(ServiceError::from)
        .and_then(|(filter, include)| {
            entities::list_with::<Post, _>(&filter, &include, repo.get_ref())
        });
    json_response(result)
}

#[get("/posts/count")]
pub async fn count_posts(
    query: web::Query<WhereQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = query
        .parse::<PostField>()
        .map_err(ServiceError::from)
        .and_then(|where_clause| entities::count::<Post, _>(&where_clause, repo.get_ref()));
    count_response(result)
}

#[post("/posts")]
pub async fn create_post(
    form: web::Json<NewPostForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = NewPost::try_from(form.into_inner())
        .map_err(ServiceError::from)
        .and_then(|new| entities::create::<Post, _>(&new, repo.get_ref()));
    json_response(result)
}

#[get("/posts/{id}")]
pub async fn get_post(
    id: web::Path<i32>,
    query: web::Query<FilterQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Post>(id.into_inner()).and_then(|id| {
        let include = query.include::<PostRelation>()?;
        entities::get_with::<Post, _>(id, &include, repo.get_ref())
    });
    json_response(result)
}

#[patch("/posts/{id}")]
pub async fn patch_post(
    id: web::Path<i32>,
    form: web::Json<PatchPostForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = path_id::<Post>(id.into_inner()).and_then(|id| {
        let patch = PostPatch::try_from(form.into_inner())?;
        entities::patch::<Post, _>(id, &patch, repo.get_ref())
    });
    no_content_response(result)
}

#[delete("/posts/{id}")]
pub async fn delete_post(id: web::Path<i32>, repo: web::Data<DieselRepository>) -> impl Responder {
    let result = path_id::<Post>(id.into_inner())
        .and_then(|id| entities::delete::<Post, _>(id, repo.get_ref()));
    no_content_response(result)
}
