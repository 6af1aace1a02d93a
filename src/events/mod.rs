//! Event system for membership actions.
//!
//! Events are fired from every mutating action. If no listeners are
//! registered, they are silently ignored (zero overhead).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use anteroom::register_membership_listeners;
//! use anteroom::events::listeners::LoggingListener;
//!
//! fn main() {
//!     // register listeners at startup
//!     register_membership_listeners(|registry| {
//!         registry.listen(LoggingListener::new());
//!     });
//!
//!     // events will now be logged
//! }
//! ```
//!
//! # Custom Listeners
//!
//! Implement the [`Listener`] trait to react to membership changes; the
//! typical host use is invalidating cached member lists:
//!
//! ```rust,ignore
//! use anteroom::events::{Listener, MembershipEvent};
//! use async_trait::async_trait;
//!
//! struct CacheInvalidator;
//!
//! #[async_trait]
//! impl Listener for CacheInvalidator {
//!     async fn handle(&self, event: &MembershipEvent) {
//!         match event {
//!             MembershipEvent::InviteAccepted { workspace_id, .. }
//!             | MembershipEvent::MemberRemoved { workspace_id, .. } => {
//!                 // drop cached member list for workspace_id
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::MembershipEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_membership_listeners};
