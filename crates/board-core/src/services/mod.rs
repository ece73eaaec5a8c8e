//! Application services - orchestrate ports around domain rules.

mod posts;

pub use posts::PostService;
