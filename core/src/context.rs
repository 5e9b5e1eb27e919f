//! Per-call deadline and cancellation.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Caller-side controls for one API call.
///
/// The effective timeout of a call is the shorter of `timeout` and the
/// client's maximum request timeout; a call can never outlive the client
/// limit. Cancelling the token aborts a call that is waiting on the network.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach an existing token, e.g. a child of a shutdown token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn effective_timeout(&self, max: Duration) -> Duration {
        match self.timeout {
            Some(t) => t.min(max),
            None => max,
        }
    }
}
