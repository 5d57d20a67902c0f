//! HTTP surface. Handlers stay thin: extract, call a service, render.

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;

use crate::domain::Entity;
use crate::domain::comment::Comment;
use crate::domain::post::Post;
use crate::domain::tag::Tag;
use crate::dto::CountDto;
use crate::repository::RepositoryError;
use crate::services::{ServiceError, ServiceResult};

pub mod comments;
pub mod posts;
pub mod relations;
pub mod tags;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetails<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetails<'a> {
    status_code: u16,
    message: &'a str,
}

fn error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Form(_) => StatusCode::BAD_REQUEST,
        ServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
        ServiceError::Repository(RepositoryError::ValidationError(_)) => StatusCode::BAD_REQUEST,
        ServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render a service error as `{"error": {"statusCode": .., "message": ..}}`.
///
/// Storage failures are logged and reported without details.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    let status = error_status(err);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("Request failed: {err}");
        "Internal Server Error".to_string()
    } else {
        err.to_string()
    };

    HttpResponse::build(status).json(ErrorBody {
        error: ErrorDetails {
            status_code: status.as_u16(),
            message: &message,
        },
    })
}

pub fn json_response<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(err) => error_response(&err),
    }
}

pub fn count_response(result: ServiceResult<usize>) -> HttpResponse {
    json_response(result.map(CountDto::from))
}

pub fn no_content_response(result: ServiceResult<()>) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(&err),
    }
}

/// Parse an id taken from the path. Ids that cannot exist are reported as a
/// missing record rather than a bad request.
pub fn path_id<E: Entity>(raw: i32) -> ServiceResult<E::Id> {
    <E::Id as TryFrom<i32>>::try_from(raw)
        .map_err(|_| ServiceError::NotFound(E::not_found_message()))
}

/// Path segments that fail to parse as an id name a record that cannot
/// exist. The first segment tells which entity the id belongs to.
fn unparsable_path_id(req: &HttpRequest) -> ServiceError {
    let message = match req.path().trim_start_matches('/').split('/').next() {
        Some("posts") => Post::not_found_message(),
        Some("tags") => Tag::not_found_message(),
        Some("comments") => Comment::not_found_message(),
        _ => "Not found".to_string(),
    };
    ServiceError::NotFound(message)
}

/// Register every handler together with JSON error rendering for body, query
/// and path extraction failures.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = error_response(&ServiceError::Form(err.to_string()));
        InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = error_response(&ServiceError::Form(err.to_string()));
        InternalError::from_response(err, response).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        let response = error_response(&unparsable_path_id(req));
        InternalError::from_response(err, response).into()
    }))
    // `count` routes go before the `{id}` routes they would otherwise match.
    .service(posts::count_posts)
    .service(posts::list_posts)
    .service(posts::create_post)
    .service(posts::get_post)
    .service(posts::patch_post)
    .service(posts::delete_post)
    .service(tags::count_tags)
    .service(tags::list_tags)
    .service(tags::create_tag)
    .service(tags::get_tag)
    .service(tags::patch_tag)
    .service(tags::delete_tag)
    .service(relations::list_post_tags)
    .service(relations::create_post_tag)
    .service(relations::patch_post_tags)
    .service(relations::delete_post_tag)
    .service(relations::list_tag_posts)
    .service(relations::create_tag_post)
    .service(relations::patch_tag_posts)
    .service(relations::delete_tag_post)
    .service(comments::list_post_comments)
    .service(comments::create_post_comment)
    .service(comments::patch_post_comments)
    .service(comments::delete_post_comments)
    .service(comments::get_comment)
    .service(comments::patch_comment)
    .service(comments::delete_comment)
    .service(comments::get_comment_post);
}
