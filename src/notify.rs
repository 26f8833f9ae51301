//! Notification-sink trait for user-facing conversion feedback.
//!
//! Inject an [`Arc<dyn NotificationSink>`] via
//! [`crate::ConversionPipeline::notifier`] to show a busy indicator and
//! status messages while a conversion runs. Hosts without any UI simply keep
//! the default [`NoopNotificationSink`]; every method is best-effort and the
//! pipeline never depends on what a sink does.
//!
//! # Example
//!
//! ```rust
//! use xlsx_to_pdf::{BusyIndicator, NotificationSink};
//!
//! struct Spinner;
//!
//! impl BusyIndicator for Spinner {
//!     fn release(self: Box<Self>) {
//!         eprintln!("done spinning");
//!     }
//! }
//!
//! struct StderrSink;
//!
//! impl NotificationSink for StderrSink {
//!     fn show_busy_indicator(&self) -> Option<Box<dyn BusyIndicator>> {
//!         Some(Box::new(Spinner))
//!     }
//!
//!     fn show_error_message(&self, text: &str) {
//!         eprintln!("{text}");
//!     }
//! }
//! ```

use std::sync::Arc;

/// A busy indicator currently on screen.
///
/// Releasing consumes the handle, so it cannot be released twice.
pub trait BusyIndicator: Send {
    fn release(self: Box<Self>);
}

/// Receives UI feedback from the conversion pipeline.
///
/// All methods have default no-op implementations so callers only override
/// what their host can display. Implementations must be `Send + Sync`:
/// a pipeline may run several conversions concurrently on different tasks.
pub trait NotificationSink: Send + Sync {
    /// Show a busy indicator. Return `None` if the host has none.
    fn show_busy_indicator(&self) -> Option<Box<dyn BusyIndicator>> {
        None
    }

    /// Show a transient informational message.
    fn show_info_message(&self, text: &str) {
        let _ = text;
    }

    /// Show an error message. `text` is already prefixed with `"Error: "`.
    fn show_error_message(&self, text: &str) {
        let _ = text;
    }

    /// Remove previously shown messages.
    fn clear_messages(&self) {}
}

/// A sink for hosts with no UI at all.
///
/// This is the default when no sink is configured.
pub struct NoopNotificationSink;

impl NotificationSink for NoopNotificationSink {}

/// Convenience alias matching the type held by [`crate::ConversionPipeline`].
pub type Notifier = Arc<dyn NotificationSink>;

/// Owns a busy indicator for the duration of one conversion.
///
/// [`BusyGuard::release`] is called on the normal terminal path; if the run
/// is torn down before reaching it (task aborted, panic), `Drop` releases the
/// indicator instead. Either way it is released exactly once.
pub(crate) struct BusyGuard(Option<Box<dyn BusyIndicator>>);

impl BusyGuard {
    pub(crate) fn acquire(sink: &dyn NotificationSink) -> Self {
        BusyGuard(sink.show_busy_indicator())
    }

    pub(crate) fn release(mut self) {
        if let Some(indicator) = self.0.take() {
            indicator.release();
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Some(indicator) = self.0.take() {
            indicator.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingIndicator {
        released: Arc<AtomicUsize>,
    }

    impl BusyIndicator for CountingIndicator {
        fn release(self: Box<Self>) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct CountingSink {
        shown: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    impl NotificationSink for CountingSink {
        fn show_busy_indicator(&self) -> Option<Box<dyn BusyIndicator>> {
            self.shown.fetch_add(1, Ordering::SeqCst);
            Some(Box::new(CountingIndicator {
                released: Arc::clone(&self.released),
            }))
        }
    }

    fn counting_sink() -> CountingSink {
        CountingSink {
            shown: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[test]
    fn noop_sink_does_not_panic() {
        let sink = NoopNotificationSink;
        assert!(sink.show_busy_indicator().is_none());
        sink.show_info_message("Converting to PDF...");
        sink.show_error_message("Error: nope");
        sink.clear_messages();
    }

    #[test]
    fn guard_releases_once_when_released_explicitly() {
        let sink = counting_sink();
        let guard = BusyGuard::acquire(&sink);
        guard.release();
        assert_eq!(sink.shown.load(Ordering::SeqCst), 1);
        assert_eq!(sink.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn guard_releases_on_drop() {
        let sink = counting_sink();
        {
            let _guard = BusyGuard::acquire(&sink);
        }
        assert_eq!(sink.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn guard_without_indicator_is_inert() {
        let guard = BusyGuard::acquire(&NoopNotificationSink);
        guard.release();
    }

    #[test]
    fn arc_dyn_sink_works() {
        let sink: Notifier = Arc::new(NoopNotificationSink);
        sink.show_info_message("hello");
        sink.clear_messages();
    }
}
