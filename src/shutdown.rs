//! Graceful shutdown signalling
//!
//! Ctrl+C flips a `watch` channel that every engine loop selects on. In-flight
//! requests are not cancelled; loops stop scheduling new ticks.

use anyhow::Result;
use tokio::sync::watch;

use crate::logger::{self, LogTag};

/// Cloneable receiver side handed to engine loops
pub type ShutdownReceiver = watch::Receiver<bool>;

#[derive(Clone)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownReceiver {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        // send_replace never fails, even without receivers
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Install a Ctrl+C handler that triggers this signal
    pub fn install_ctrlc_handler(&self) -> Result<()> {
        let signal = self.clone();
        ctrlc::set_handler(move || {
            logger::info(LogTag::System, "Received Ctrl+C, shutting down...");
            signal.trigger();
        })?;
        Ok(())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once shutdown was requested (or the sender is gone)
pub async fn wait_for_shutdown(rx: &mut ShutdownReceiver) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn receivers_observe_trigger() {
        let signal = ShutdownSignal::new();
        let mut rx = signal.subscribe();

        let waiter = tokio::spawn(async move {
            wait_for_shutdown(&mut rx).await;
        });

        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .expect("waiter should not panic");
        assert!(signal.is_triggered());
    }
}
