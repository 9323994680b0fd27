// Business domains

pub mod moderation;
pub mod posts;
