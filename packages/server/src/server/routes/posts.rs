//! Post and comment CRUD routes.
//!
//! Create and edit handlers are the moderation pipeline's trigger
//! points: after the row is committed they hand the content snapshot to
//! the dispatcher. Dispatch can never fail the request.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::ApiError;
use crate::domains::moderation::TargetType;
use crate::domains::posts::{Comment, CommentData, Post, PostData};
use crate::server::app::AxumAppState;

const MAX_TITLE_LEN: usize = 26;

fn validate_title(title: &str) -> Result<&str, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required.".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::Validation(format!(
            "Title must be at most {} characters.",
            MAX_TITLE_LEN
        )));
    }
    Ok(title)
}

fn validate_content(content: &str) -> Result<&str, ApiError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation("Content is required.".to_string()));
    }
    Ok(content)
}

// ----------------------------------------------------------------------------
// Posts
// ----------------------------------------------------------------------------

#[derive(Serialize)]
pub struct PostListResponse {
    success: bool,
    posts: Vec<PostData>,
}

/// GET /posts - newest-first feed (hidden posts suppressed)
pub async fn list_posts_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<PostListResponse>, ApiError> {
    let posts = Post::list_visible(&state.db_pool).await?;

    Ok(Json(PostListResponse {
        success: true,
        posts: posts.into_iter().map(PostData::from).collect(),
    }))
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct PostMutationResponse {
    success: bool,
    message: String,
    post: PostData,
}

/// POST /posts - create a post and dispatch moderation
pub async fn create_post_handler(
    Extension(state): Extension<AxumAppState>,
    Json(body): Json<CreatePostRequest>,
) -> Result<Json<PostMutationResponse>, ApiError> {
    let title = validate_title(&body.title)?;
    let content = validate_content(&body.content)?;

    let post = Post::create(&state.db_pool, title, content).await?;

    state
        .dispatcher
        .schedule(TargetType::Post, post.id, &post.content)
        .await;

    Ok(Json(PostMutationResponse {
        success: true,
        message: "Post created.".to_string(),
        post: PostData::from(post),
    }))
}

#[derive(Serialize)]
pub struct PostDetailResponse {
    success: bool,
    post: PostDetail,
}

#[derive(Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    post: PostData,
    comments: Vec<CommentData>,
    comment_count: usize,
}

/// GET /posts/{id} - detail view; every visit bumps the view counter
pub async fn get_post_handler(
    Extension(state): Extension<AxumAppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let post = Post::bump_views(&state.db_pool, post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post"))?;

    let comments = Comment::list_for_post(&state.db_pool, post_id).await?;
    let comments: Vec<CommentData> = comments.into_iter().map(CommentData::from).collect();
    let comment_count = comments.len();

    Ok(Json(PostDetailResponse {
        success: true,
        post: PostDetail {
            post: PostData::from(post),
            comments,
            comment_count,
        },
    }))
}

/// PUT /posts/{id} - edit a post; resets moderation and re-dispatches
pub async fn update_post_handler(
    Extension(state): Extension<AxumAppState>,
    Path(post_id): Path<i64>,
    Json(body): Json<CreatePostRequest>,
) -> Result<Json<PostMutationResponse>, ApiError> {
    let title = validate_title(&body.title)?;
    let content = validate_content(&body.content)?;

    let post = Post::update(&state.db_pool, post_id, title, content)
        .await?
        .ok_or_else(|| ApiError::not_found("Post"))?;

    state
        .dispatcher
        .schedule(TargetType::Post, post.id, &post.content)
        .await;

    Ok(Json(PostMutationResponse {
        success: true,
        message: "Post updated.".to_string(),
        post: PostData::from(post),
    }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    success: bool,
}

/// DELETE /posts/{id}
pub async fn delete_post_handler(
    Extension(state): Extension<AxumAppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = Post::delete(&state.db_pool, post_id).await?;
    if !deleted {
        return Err(ApiError::not_found("Post"));
    }

    Ok(Json(DeleteResponse { success: true }))
}

#[derive(Deserialize)]
pub struct ToggleLikeRequest {
    pub liked: bool,
}

#[derive(Serialize)]
pub struct ToggleLikeResponse {
    success: bool,
    likes: i32,
    liked: bool,
}

/// POST /posts/{id}/like - toggle semantics: body carries the state
/// before the click ({"liked": false} means "like it now")
pub async fn toggle_like_handler(
    Extension(state): Extension<AxumAppState>,
    Path(post_id): Path<i64>,
    Json(body): Json<ToggleLikeRequest>,
) -> Result<Json<ToggleLikeResponse>, ApiError> {
    let delta = if body.liked { -1 } else { 1 };

    let post = Post::adjust_likes(&state.db_pool, post_id, delta)
        .await?
        .ok_or_else(|| ApiError::not_found("Post"))?;

    Ok(Json(ToggleLikeResponse {
        success: true,
        likes: post.likes,
        liked: !body.liked,
    }))
}

// ----------------------------------------------------------------------------
// Comments
// ----------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
    pub writer: Option<String>,
}

#[derive(Serialize)]
pub struct CommentMutationResponse {
    success: bool,
    comment: CommentData,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment_count: Option<i64>,
}

/// POST /posts/{id}/comments - add a comment and dispatch moderation
pub async fn add_comment_handler(
    Extension(state): Extension<AxumAppState>,
    Path(post_id): Path<i64>,
    Json(body): Json<AddCommentRequest>,
) -> Result<Json<CommentMutationResponse>, ApiError> {
    let content = validate_content(&body.content)?;

    // The parent post must exist.
    Post::find_by_id(&state.db_pool, post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post"))?;

    let comment = Comment::create(
        &state.db_pool,
        post_id,
        body.writer.as_deref(),
        content,
    )
    .await?;

    state
        .dispatcher
        .schedule(TargetType::Comment, comment.id, &comment.content)
        .await;

    let comment_count = Comment::count_for_post(&state.db_pool, post_id).await?;

    Ok(Json(CommentMutationResponse {
        success: true,
        comment: CommentData::from(comment),
        comment_count: Some(comment_count),
    }))
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// PUT /posts/{id}/comments/{comment_id} - edit a comment; resets
/// moderation and re-dispatches
pub async fn update_comment_handler(
    Extension(state): Extension<AxumAppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(body): Json<UpdateCommentRequest>,
) -> Result<Json<CommentMutationResponse>, ApiError> {
    let content = validate_content(&body.content)?;

    let comment = Comment::update_content(&state.db_pool, post_id, comment_id, content)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))?;

    state
        .dispatcher
        .schedule(TargetType::Comment, comment.id, &comment.content)
        .await;

    Ok(Json(CommentMutationResponse {
        success: true,
        comment: CommentData::from(comment),
        comment_count: None,
    }))
}

#[derive(Serialize)]
pub struct DeleteCommentResponse {
    success: bool,
    comment_count: i64,
}

/// DELETE /posts/{id}/comments/{comment_id} - returns remaining count
pub async fn delete_comment_handler(
    Extension(state): Extension<AxumAppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Json<DeleteCommentResponse>, ApiError> {
    let deleted = Comment::delete(&state.db_pool, post_id, comment_id).await?;
    if !deleted {
        return Err(ApiError::not_found("Comment"));
    }

    let comment_count = Comment::count_for_post(&state.db_pool, post_id).await?;

    Ok(Json(DeleteCommentResponse {
        success: true,
        comment_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_validation_limits() {
        assert!(validate_title("hello").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(27)).is_err());
        assert!(validate_title(&"x".repeat(26)).is_ok());
    }

    #[test]
    fn content_must_not_be_blank() {
        assert!(validate_content("fine").is_ok());
        assert!(validate_content(" \n\t").is_err());
    }
}
