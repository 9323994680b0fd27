// HTTP routes
pub mod health;
pub mod internal;
pub mod posts;

pub use health::*;
pub use internal::*;
pub use posts::*;
