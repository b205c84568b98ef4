use weather_widget_core::{Endpoint, FetchError, Notification, TracingObserver, WidgetObserver};

/// Shows notifications as a one-line "toast" on stderr and logs fetch failures.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    log: TracingObserver,
}

impl WidgetObserver for ConsoleObserver {
    fn notify(&self, notification: &Notification) {
        eprintln!("{}", toast_line(notification));
        self.log.notify(notification);
    }

    fn fetch_failed(&self, endpoint: Endpoint, error: &FetchError) {
        self.log.fetch_failed(endpoint, error);
    }
}

pub fn toast_line(notification: &Notification) -> String {
    format!("✖ {}", notification.message)
}
