//! Process-wide shutdown state.
//!
//! Ctrl+C sets `SHUTDOWN` and cancels the export session registered with
//! [`register_session`], which aborts any in-flight fetches. Before a session
//! is registered there is nothing to unwind, so the process exits directly.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Cancellation token of the running export session
static SESSION: OnceLock<CancellationToken> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(token) = SESSION.get() {
            crate::log!("export"; "cancelling...");
            token.cancel();
        } else {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the export session so Ctrl+C can cancel it.
pub fn register_session(token: CancellationToken) {
    let _ = SESSION.set(token);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_session_keeps_first() {
        let first = CancellationToken::new();
        register_session(first.clone());
        register_session(CancellationToken::new());
        if let Some(token) = SESSION.get() {
            token.cancel();
        }
        assert!(first.is_cancelled());
        assert!(!is_shutdown());
    }
}
