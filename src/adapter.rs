//! Host-action adapter.
//!
//! Low-code hosts invoke the converter from a declarative "action" that
//! carries up to four string attributes and expects to be resumed once the
//! asynchronous work is over. This module maps those attributes onto a
//! [`ConversionRequest`] and turns the pipeline's outcome into a single
//! resume signal. Nothing here knows how a particular host stores its
//! attributes or implements resuming; that is the host's [`HostResume`].

use crate::callbacks::OutcomeCallbacks;
use crate::config::{ConversionRequest, RequestOptions};
use crate::convert::ConversionPipeline;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// The attributes of a host action, in the host's own positional naming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionAttributes {
    /// Conversion endpoint.
    pub attribute01: Option<String>,
    /// Source workbook URL.
    pub attribute02: Option<String>,
    /// Output filename.
    pub attribute03: Option<String>,
    /// Loading message.
    pub attribute04: Option<String>,
}

impl ActionAttributes {
    pub fn to_options(&self) -> RequestOptions {
        RequestOptions {
            api_url: self.attribute01.clone(),
            file_url: self.attribute02.clone(),
            output_filename: self.attribute03.clone(),
            loading_message: self.attribute04.clone(),
        }
    }
}

/// Signals the host that the action has finished.
pub trait HostResume: Send + Sync {
    /// `error` is `true` when the conversion failed.
    fn resume(&self, error: bool);
}

/// Run the conversion described by `attributes` and resume the host once.
///
/// Attributes that do not form a valid request are reported through the
/// pipeline's notification sink and resume the host with an error straight
/// away; no request is sent.
pub async fn handle_action(
    pipeline: &ConversionPipeline,
    attributes: &ActionAttributes,
    host: Arc<dyn HostResume>,
) {
    let on_success_host = Arc::clone(&host);
    let callbacks = OutcomeCallbacks::new()
        .on_success(move || on_success_host.resume(false))
        .on_error(move |err| {
            warn!("Host action failed: {}", err);
            host.resume(true);
        });

    match ConversionRequest::try_from(attributes.to_options()) {
        Ok(request) => pipeline.convert(request, callbacks).await,
        Err(err) => {
            pipeline.report_failure(&err);
            callbacks.deliver(Err(err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{BusyIndicator, NotificationSink};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MessageLog {
        events: Mutex<Vec<String>>,
    }

    impl NotificationSink for MessageLog {
        fn show_busy_indicator(&self) -> Option<Box<dyn BusyIndicator>> {
            self.events.lock().unwrap().push("busy:show".into());
            None
        }

        fn show_error_message(&self, text: &str) {
            self.events.lock().unwrap().push(format!("error:{text}"));
        }

        fn clear_messages(&self) {
            self.events.lock().unwrap().push("clear".into());
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        resumes: Mutex<Vec<bool>>,
    }

    impl HostResume for RecordingHost {
        fn resume(&self, error: bool) {
            self.resumes.lock().unwrap().push(error);
        }
    }

    #[test]
    fn attributes_map_positionally() {
        let attrs = ActionAttributes {
            attribute01: Some("http://svc/convert".into()),
            attribute02: Some("http://files/a.xlsx".into()),
            attribute03: None,
            attribute04: Some("Hold on".into()),
        };
        let request = ConversionRequest::try_from(attrs.to_options()).unwrap();
        assert_eq!(request.api_url(), "http://svc/convert");
        assert_eq!(request.file_url(), "http://files/a.xlsx");
        assert_eq!(request.output_filename(), "report.pdf");
        assert_eq!(request.loading_message(), "Hold on");
    }

    #[test]
    fn invalid_attributes_resume_with_error() {
        let host = Arc::new(RecordingHost::default());
        let pipeline = ConversionPipeline::new().unwrap();
        let attrs = ActionAttributes {
            attribute03: Some("..".into()),
            ..Default::default()
        };

        tokio_test::block_on(handle_action(&pipeline, &attrs, host.clone()));

        assert_eq!(*host.resumes.lock().unwrap(), vec![true]);
    }

    #[test]
    fn invalid_attributes_show_error_message() {
        let host = Arc::new(RecordingHost::default());
        let log = Arc::new(MessageLog::default());
        let pipeline = ConversionPipeline::new().unwrap().notifier(log.clone());
        let attrs = ActionAttributes {
            attribute03: Some("..".into()),
            ..Default::default()
        };

        tokio_test::block_on(handle_action(&pipeline, &attrs, host.clone()));

        let events = log.events.lock().unwrap().clone();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], "clear");
        assert!(events[1].starts_with("error:Error: Invalid configuration"));
        assert_eq!(*host.resumes.lock().unwrap(), vec![true]);
    }

    #[tokio::test]
    async fn failed_conversion_resumes_once_with_error() {
        let host = Arc::new(RecordingHost::default());
        let pipeline = ConversionPipeline::new().unwrap();

        handle_action(&pipeline, &ActionAttributes::default(), host.clone()).await;

        assert_eq!(*host.resumes.lock().unwrap(), vec![true]);
    }
}
