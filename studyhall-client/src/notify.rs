//! User-visible error surface

/// Where failed reorders are reported (toast, status bar, ...)
pub trait ErrorSink: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// Sink that only logs; the default for headless clients
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn notify_error(&self, message: &str) {
        tracing::error!(target: "studyhall_client::notify", "{}", message);
    }
}
