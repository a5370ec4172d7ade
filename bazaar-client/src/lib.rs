//! HTTP side of the Bazaar follow stack: the authenticated REST wrapper and
//! the `FollowApi` bindings the follow cache talks through.

pub mod api;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiClient, HttpFollowApi};
