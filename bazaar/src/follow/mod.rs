pub mod cache;
pub mod service;

pub use cache::{DEFAULT_BATCH_LIMIT, FollowCache};
pub use service::FollowService;
