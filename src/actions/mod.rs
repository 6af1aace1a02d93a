//! One action struct per public operation.
//!
//! Actions are the only write paths into the invite and membership stores.
//! Each one is constructed with the repositories and collaborators it needs
//! (no globals), consults [`crate::guard`] before any privileged store
//! access, and returns `Result<_, MembershipError>` whose `Display` output
//! is safe to show the end user.

mod accept;
mod cancel;
mod invite;
mod members;
mod remove;

pub use accept::{AcceptInvite, AcceptInviteOutput};
pub use cancel::CancelInvite;
pub use invite::{
    CreateEmailInvite, CreateEmailInviteInput, CreateInviteOutput, CreateLinkInvite,
    CreateLinkInviteInput, DeliveryStatus,
};
pub use members::{ListInvites, ListMembers};
pub use remove::RemoveMember;
