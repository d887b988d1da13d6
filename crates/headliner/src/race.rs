// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Racing call executor.
//!
//! A racing call issues several identical remote calls at once and keeps only
//! the first outcome, trading redundant backend work for lower tail latency.

use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tick::{Clock, FutureExt as _};

use crate::CallResult;

/// Runs a remote operation as a group of concurrent replicas and keeps the first outcome.
///
/// The first replica to finish decides the result of the group, whether it
/// succeeded or failed. The remaining replicas are dropped and their results
/// are never observed.
///
/// If no replica finishes within the configured timeout, the whole group is
/// abandoned and a fresh group of the same size is launched. There is no
/// retry ceiling: against a permanently unreachable backend the call never
/// returns.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use headliner::{CallResult, Racer};
/// use tick::Clock;
///
/// # async fn example(clock: Clock) -> CallResult<u32> {
/// let racer = Racer::new(clock, Duration::from_secs(10));
///
/// // Three concurrent attempts, the quickest one wins.
/// let value = racer.race(3, || async { Ok(42) }).await?;
/// assert_eq!(value, 42);
/// # Ok(value)
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Racer {
    clock: Clock,
    timeout: Duration,
}

impl Racer {
    /// Creates a racer that abandons a replica group after `timeout`.
    #[must_use]
    pub fn new(clock: Clock, timeout: Duration) -> Self {
        Self { clock, timeout }
    }

    /// Returns the replica group timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invokes `operation` as `replicas` concurrent attempts and returns the first outcome.
    ///
    /// With `replicas <= 1` the operation is awaited directly, without racing
    /// and without a timeout.
    pub async fn race<T, F, Fut>(&self, replicas: usize, mut operation: F) -> CallResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CallResult<T>>,
    {
        if replicas <= 1 {
            return operation().await;
        }

        let mut group_index: u64 = 0;
        loop {
            group_index = group_index.saturating_add(1);

            let mut group: FuturesUnordered<Fut> = (0..replicas).map(|_| operation()).collect();
            tracing::debug!(replicas, group = group_index, "replica group launched");

            if let Ok(Some(outcome)) = group.next().timeout(&self.clock, self.timeout).await {
                return outcome;
            }

            tracing::warn!(
                replicas,
                group = group_index,
                timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                "replica group timed out, retrying"
            );
        }
    }
}
