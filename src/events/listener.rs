use async_trait::async_trait;

use super::MembershipEvent;

/// Trait for handling membership events asynchronously.
///
/// Implement this trait to create custom event listeners. Listeners can
/// perform any async operation: logging, cache invalidation, notifications,
/// metrics, etc.
///
/// # Example
///
/// ```rust,ignore
/// use anteroom::events::{Listener, MembershipEvent};
/// use async_trait::async_trait;
///
/// struct AuditTrail {
///     sink: AuditSink,
/// }
///
/// #[async_trait]
/// impl Listener for AuditTrail {
///     async fn handle(&self, event: &MembershipEvent) {
///         if let MembershipEvent::MemberRemoved { workspace_id, user_id, removed_by, .. } = event {
///             // append a removal record
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handle a membership event.
    ///
    /// This method is called for every event dispatched. Filter by matching
    /// on the event variant to handle specific events.
    async fn handle(&self, event: &MembershipEvent);
}
