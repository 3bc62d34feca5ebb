//! Attributing asynchronously printed errors to a run.
//!
//! A capability can succeed while something it started fails later and
//! only prints to `console.error`. After a run's statements succeed and the
//! settle delay has passed, the correlator turns the first such unclaimed
//! error into the run's failure.

use probe_foundation::Error;

use crate::log::LogQueue;

/// Claims unseen error events from a log queue.
#[derive(Clone, Debug)]
pub struct Correlator {
    queue: LogQueue,
}

impl Correlator {
    /// Creates a correlator over `queue`.
    #[must_use]
    pub fn new(queue: LogQueue) -> Self {
        Self { queue }
    }

    /// Claims the first unseen error-level event, if any.
    ///
    /// The event is marked seen, so it is never reported by a later run.
    #[must_use]
    pub fn correlate(&self) -> Option<Error> {
        let event = self.queue.claim_unseen_error()?;
        tracing::warn!(
            event_id = event.id,
            message = %event.message,
            "attributing asynchronous console error to run"
        );
        Some(Error::async_console(event.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_errors_means_no_failure() {
        let queue = LogQueue::new();
        queue.log("hello");
        queue.warn("careful");
        assert!(Correlator::new(queue).correlate().is_none());
    }

    #[test]
    fn first_unseen_error_is_reported() {
        let queue = LogQueue::new();
        queue.error("first");
        queue.error("second");
        let correlator = Correlator::new(queue);

        let err = correlator.correlate().unwrap();
        assert_eq!(err.kind_name(), "AsyncConsoleError");
        assert!(err.to_string().starts_with("Error printed to console.error."));
        assert!(err.to_string().ends_with("\n\nfirst"));

        let err = correlator.correlate().unwrap();
        assert!(err.to_string().ends_with("\n\nsecond"));

        assert!(correlator.correlate().is_none());
    }
}
