use crate::{
    error::{Endpoint, FetchError},
    store::Notification,
};

/// Hook the host application wires to its own notification and logging
/// facilities.
pub trait WidgetObserver: Send + Sync {
    /// A transient message for the user, e.g. a lookup-miss.
    fn notify(&self, notification: &Notification);

    /// A fetch failed. The widget has already degraded (cleared or kept
    /// stale data); this is for logging only.
    fn fetch_failed(&self, endpoint: Endpoint, error: &FetchError);
}

/// Forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl WidgetObserver for TracingObserver {
    fn notify(&self, notification: &Notification) {
        tracing::warn!(text = %notification.message, "notification");
    }

    fn fetch_failed(&self, endpoint: Endpoint, error: &FetchError) {
        tracing::error!(%endpoint, error = %error, "Error in fetching data");
    }
}
