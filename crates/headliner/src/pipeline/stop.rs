// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use tokio::sync::watch;

/// The sending half of a broadcast stop signal.
///
/// Dropping the source stops every token as well, so abandoning the owner of
/// a refresh cycle also winds down its generator and workers.
#[derive(Debug)]
pub(crate) struct StopSource {
    tx: watch::Sender<bool>,
}

/// The receiving half of a broadcast stop signal, one per task.
#[derive(Debug, Clone)]
pub(crate) struct StopToken {
    rx: watch::Receiver<bool>,
}

impl StopSource {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub(crate) fn token(&self) -> StopToken {
        StopToken { rx: self.tx.subscribe() }
    }

    pub(crate) fn stop(&self) {
        self.tx.send_replace(true);
    }
}

impl StopToken {
    /// Completes once the signal has been raised or its source dropped.
    pub(crate) async fn stopped(&mut self) {
        // An error means the source is gone, which counts as a stop.
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }

    #[cfg(test)]
    pub(crate) fn is_stopped(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }
}
