/// Post and Comment Routes
///
/// Reads are public. Writes take an [`Identity`] and are limited to the
/// owning author or an admin.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{NewComment, NewPost, Post, PostChanges};
use crate::schemas::{CommentRequest, PostRequest, PostUpdateRequest};
use crate::state::AppState;

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct MsgResponse {
    msg: &'static str,
}

async fn load_post(state: &AppState, post_id: Uuid) -> Result<Post, AppError> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or(AppError::NotFound("Post"))
}

fn ensure_author_or_admin(identity: &Identity, post: &Post) -> Result<(), AppError> {
    if identity.user_id == post.author_id || identity.is_admin() {
        return Ok(());
    }

    tracing::warn!(
        user_id = %identity.user_id,
        post_id = %post.id,
        "Write attempt on a post owned by another user"
    );
    Err(AppError::Forbidden("only the author can modify this post".to_string()))
}

/// GET /posts
pub async fn status() -> HttpResponse {
    HttpResponse::Ok().json(MsgResponse { msg: "Posts is up!" })
}

/// GET /posts/all
pub async fn list_posts(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let posts = state.posts.list_all().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /posts/user/{user_id}
pub async fn list_user_posts(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let posts = state.posts.list_by_author(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /posts/{post_id}
///
/// # Errors
/// - 404: Unknown post
pub async fn get_post(
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let post = load_post(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /posts
pub async fn create_post(
    identity: Identity,
    body: web::Json<PostRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (title, content) = body.into_inner().validate()?;

    let post = state
        .posts
        .insert(NewPost {
            author_id: identity.user_id,
            title,
            content,
        })
        .await?;

    tracing::info!(user_id = %identity.user_id, post_id = %post.id, "Post created");
    Ok(HttpResponse::Created().json(post))
}

/// PUT /posts/{post_id}
///
/// # Errors
/// - 400: Neither title nor content given, or either is invalid
/// - 403: Caller is neither the author nor an admin
/// - 404: Unknown post
pub async fn update_post(
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostUpdateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (title, content) = body.into_inner().validate()?;
    let post = load_post(&state, path.into_inner()).await?;
    ensure_author_or_admin(&identity, &post)?;

    let updated = state
        .posts
        .update(post.id, PostChanges { title, content })
        .await?
        .ok_or(AppError::NotFound("Post"))?;

    tracing::info!(user_id = %identity.user_id, post_id = %updated.id, "Post updated");
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /posts/{post_id}
pub async fn delete_post(
    identity: Identity,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let post = load_post(&state, path.into_inner()).await?;
    ensure_author_or_admin(&identity, &post)?;

    if !state.posts.delete(post.id).await? {
        return Err(AppError::NotFound("Post"));
    }

    tracing::info!(user_id = %identity.user_id, post_id = %post.id, "Post deleted");
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post deleted successfully",
    }))
}

/// POST /posts/{post_id}/comments
pub async fn add_comment(
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let content = body.into_inner().validate()?;
    let post = load_post(&state, path.into_inner()).await?;

    let comment = state
        .posts
        .add_comment(NewComment {
            post_id: post.id,
            author_id: identity.user_id,
            content,
        })
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// DELETE /posts/{post_id}/{comment_id}
///
/// Allowed for the comment's author, the post's author and admins.
///
/// # Errors
/// - 403: Caller has none of those roles
/// - 404: Unknown post or comment
pub async fn delete_comment(
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (post_id, comment_id) = path.into_inner();
    let post = load_post(&state, post_id).await?;
    let comment = post
        .comments
        .iter()
        .find(|c| c.id == comment_id)
        .ok_or(AppError::NotFound("Comment"))?;

    if comment.author_id != identity.user_id {
        ensure_author_or_admin(&identity, &post)?;
    }

    if !state.posts.delete_comment(post_id, comment_id).await? {
        return Err(AppError::NotFound("Comment"));
    }

    tracing::info!(
        user_id = %identity.user_id,
        post_id = %post_id,
        comment_id = %comment_id,
        "Comment deleted"
    );
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Comment deleted successfully",
    }))
}
