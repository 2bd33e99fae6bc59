use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop signal for the receive loop and a waiting host.
///
/// Setting it never blocks; the loop notices it after its next read returns
/// (data, timeout, or the socket being shut down).
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    inner: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    /// The raw flag, for APIs that poll an `AtomicBool`.
    pub fn as_atomic(&self) -> &AtomicBool {
        &self.inner
    }
}
