//! Shutdown flag shared between the Ctrl-C handler and the frame loop.

use anyhow::{Context, Result};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::info;

#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Routes Ctrl-C into a token instead of killing the process, so the loop
/// gets a chance to save progress.
pub fn cancel_on_ctrlc() -> Result<CancellationToken> {
    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        info!("Interrupt received; stopping");
        handler_token.cancel();
    })
    .context("failed to install Ctrl-C handler")?;
    Ok(token)
}
