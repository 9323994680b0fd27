// Community Board - API Core
//
// This crate provides the backend API for a small community board
// (posts and comments) with an asynchronous content-moderation pipeline.
// New and edited content is queued for classification by an external
// agent service; verdicts are applied back to the rows out of band.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
