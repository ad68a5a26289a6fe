//! Interrupt propagation for in-flight subprocesses.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result};

static GLOBAL: LazyLock<CancelToken> = LazyLock::new(CancelToken::new);

/// A shared flag checked by subprocess wait loops.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// The process-wide token tripped by Ctrl-C.
pub fn global() -> CancelToken {
    GLOBAL.clone()
}

/// Route Ctrl-C to the global token instead of terminating.
///
/// The wait loop then kills and reaps the child before the command returns.
pub fn install_interrupt_handler() -> Result<()> {
    let token = global();
    ctrlc::set_handler(move || {
        tracing::debug!("interrupt received");
        token.cancel();
    })
    .context("failed to install interrupt handler")
}
