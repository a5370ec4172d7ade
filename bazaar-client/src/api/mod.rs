pub mod client;
pub mod follow;

pub use client::{ApiClient, CSRF_COOKIE, CSRF_HEADER};
pub use follow::HttpFollowApi;
