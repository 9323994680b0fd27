//! API representations of posts and comments.
//!
//! The presentation layer never leaks hidden content: conversion from
//! the row models replaces the content of `hidden` targets with a
//! placeholder. (Hidden posts are additionally excluded from the list
//! feed at the query level.)

use serde::{Deserialize, Serialize};

use super::models::{Comment, Post};
use crate::domains::moderation::ModerationStatus;

/// Shown in place of content that moderation has hidden.
pub const HIDDEN_CONTENT_PLACEHOLDER: &str = "[removed by moderation]";

/// API representation of a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostData {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub likes: i32,
    pub views: i32,
    pub moderation_status: ModerationStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Post> for PostData {
    fn from(post: Post) -> Self {
        let content = if post.moderation_status == ModerationStatus::Hidden {
            HIDDEN_CONTENT_PLACEHOLDER.to_string()
        } else {
            post.content
        };

        Self {
            id: post.id,
            title: post.title,
            content,
            likes: post.likes,
            views: post.views,
            moderation_status: post.moderation_status,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

/// API representation of a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentData {
    pub id: i64,
    pub post_id: i64,
    pub writer: Option<String>,
    pub content: String,
    pub moderation_status: ModerationStatus,
    pub created_at: String,
}

impl From<Comment> for CommentData {
    fn from(comment: Comment) -> Self {
        let content = if comment.moderation_status == ModerationStatus::Hidden {
            HIDDEN_CONTENT_PLACEHOLDER.to_string()
        } else {
            comment.content
        };

        Self {
            id: comment.id,
            post_id: comment.post_id,
            writer: comment.writer,
            content,
            moderation_status: comment.moderation_status,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}
