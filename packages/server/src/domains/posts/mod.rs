pub mod data;
pub mod models;

pub use data::{CommentData, PostData, HIDDEN_CONTENT_PLACEHOLDER};
pub use models::{Comment, Post, DEFAULT_COMMENT_WRITER};
