// Common types and utilities shared across the application

pub mod error;

pub use error::ApiError;
