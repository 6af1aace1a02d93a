use async_trait::async_trait;

use crate::events::{Listener, MembershipEvent};

/// Emits membership events as tracing events.
///
/// Requires the `tracing` feature to be enabled.
///
/// # Example
///
/// ```rust,ignore
/// use anteroom::register_membership_listeners;
/// use anteroom::events::listeners::TracingListener;
///
/// register_membership_listeners(|registry| {
///     registry.listen(TracingListener);
/// });
/// ```
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &MembershipEvent) {
        tracing::info!(
            target: "anteroom::events",
            event_name = event.name(),
            workspace_id = %event.workspace_id(),
            ?event,
            "membership event"
        );
    }
}
