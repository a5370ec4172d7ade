//! Follow-relationship state for the Bazaar storefront clients.
//!
//! The [`follow::FollowCache`] answers "does the current viewer follow this
//! user or shop" for every mounted view, talking to the remote API through
//! the [`ports::FollowApi`] seam and keeping answers in a [`ports::FollowStore`].

pub mod domain;
pub mod events;
pub mod follow;
pub mod ports;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use domain::{FollowKey, FollowListEntry, FollowListQuery, FollowListType, TargetType};
pub use events::FollowEvent;
pub use follow::{FollowCache, FollowService};
pub use ports::{FollowApi, FollowStore};
pub use session::{Viewer, ViewerSession};
