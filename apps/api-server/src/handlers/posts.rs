//! Post resource handlers.
//!
//! Every handler takes [`Identity`] first so unauthenticated requests are
//! answered with 401 before the path, query or body is inspected.

use actix_web::{HttpResponse, web};

use inkwell_core::DomainError;
use inkwell_core::domain::{NewPost, PageRequest, Post, validate_title};
use inkwell_core::error::RepoError;
use inkwell_shared::dto::{CreatePostRequest, ListPostsQuery, PostResponse, UpdatePostRequest};
use inkwell_shared::{PaginatedResponse, PaginationMeta};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn post_not_found(id: i64) -> AppError {
    DomainError::not_found("Post", id).into()
}

/// GET /api/posts
pub async fn index(
    _identity: Identity,
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let ListPostsQuery { page, per_page } = query.into_inner();
    let request = PageRequest::new(page, per_page)?;

    let page = state.posts.paginate(request).await?;
    let meta = PaginationMeta {
        current_page: page.request.page,
        per_page: page.request.per_page,
        total: page.total,
        last_page: page.last_page(),
    };

    Ok(HttpResponse::Ok().json(PaginatedResponse {
        data: page.items.into_iter().map(to_response).collect(),
        meta,
    }))
}

/// POST /api/posts
pub async fn store(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let new_post = NewPost::new(body.title.as_deref())?;

    let post = state.posts.create(new_post).await?;
    tracing::info!(post_id = post.id, user_id = %identity.user_id, "Post created");

    Ok(HttpResponse::Created().json(to_response(post)))
}

/// GET /api/posts/{id}
pub async fn show(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// PUT /api/posts/{id}
///
/// An unknown id is reported before the body is validated.
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if state.posts.find_by_id(id).await?.is_none() {
        return Err(post_not_found(id));
    }

    let title = validate_title(body.title.as_deref())?;

    let post = state
        .posts
        .update_title(id, title)
        .await?
        .ok_or_else(|| post_not_found(id))?;
    tracing::info!(post_id = post.id, user_id = %identity.user_id, "Post updated");

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// DELETE /api/posts/{id}
pub async fn destroy(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    match state.posts.delete(id).await {
        Ok(()) => {
            tracing::info!(post_id = id, user_id = %identity.user_id, "Post deleted");
            Ok(HttpResponse::NoContent().finish())
        }
        Err(RepoError::NotFound) => Err(post_not_found(id)),
        Err(e) => Err(e.into()),
    }
}
