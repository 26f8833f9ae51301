//! Success/error callbacks for fire-and-forget conversions.
//!
//! [`crate::ConversionPipeline::convert`] does not return the outcome; it
//! hands it to an [`OutcomeCallbacks`] instead. Both callbacks are `FnOnce`
//! and the struct is consumed by [`OutcomeCallbacks::deliver`], so exactly
//! one of them runs, exactly once.

use crate::error::XlsxToPdfError;
use crate::output::ConversionOutput;
use std::fmt;
use tracing::error;

pub type SuccessCallback = Box<dyn FnOnce() + Send>;
pub type ErrorCallback = Box<dyn FnOnce(XlsxToPdfError) + Send>;

/// The pair of outcome callbacks supplied with a conversion.
///
/// Defaults: `on_success` does nothing, `on_error` logs the error.
pub struct OutcomeCallbacks {
    on_success: SuccessCallback,
    on_error: ErrorCallback,
}

impl Default for OutcomeCallbacks {
    fn default() -> Self {
        Self {
            on_success: Box::new(|| {}),
            on_error: Box::new(|err| error!("{}", err)),
        }
    }
}

impl fmt::Debug for OutcomeCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeCallbacks")
            .field("on_success", &"<FnOnce()>")
            .field("on_error", &"<FnOnce(XlsxToPdfError)>")
            .finish()
    }
}

impl OutcomeCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_success = Box::new(f);
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(XlsxToPdfError) + Send + 'static) -> Self {
        self.on_error = Box::new(f);
        self
    }

    /// Invoke the callback matching `result`.
    pub fn deliver(self, result: Result<ConversionOutput, XlsxToPdfError>) {
        match result {
            Ok(_) => (self.on_success)(),
            Err(err) => (self.on_error)(err),
        }
    }
}
