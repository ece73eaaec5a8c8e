//! Post handlers.

use actix_web::{HttpResponse, web};

use board_core::domain::{NewPost, Post};
use board_shared::MessageResponse;
use board_shared::dto::PostResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        user: post.user_id.to_string(),
        text: post.text,
        name: post.name,
        avatar: post.avatar,
        date: post.created_at.to_rfc3339(),
    }
}

/// POST /api/posts
///
/// A body that is absent or not a JSON object is treated as an empty payload,
/// so the caller gets the same field errors as for `{}`.
pub async fn create_post(
    identity: Identity,
    state: web::Data<AppState>,
    body: Option<web::Json<NewPost>>,
) -> AppResult<HttpResponse> {
    let input = body.map(web::Json::into_inner).unwrap_or_default();

    let post = state.posts.create(identity.user_id, input).await?;
    tracing::info!(post_id = %post.id, user_id = %identity.user_id, "Post created");

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// GET /api/posts
pub async fn list_posts(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;

    Ok(HttpResponse::Ok().json(posts.into_iter().map(to_response).collect::<Vec<_>>()))
}

/// GET /api/posts/{id}
pub async fn get_post(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get_by_id(&path).await?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.posts.delete_by_id(&path, identity.user_id).await?;
    tracing::info!(post_id = %path, user_id = %identity.user_id, "Post removed");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post Removed")))
}
