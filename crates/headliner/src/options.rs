// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Default number of qualifying items kept in the cache.
pub const DEFAULT_REQUIRED_COUNT: usize = 30;

/// Default number of resolver workers.
pub const DEFAULT_WORKERS: usize = 40;

/// Default number of racing replicas for the ID list fetch.
pub const DEFAULT_LIST_REPLICAS: usize = 4;

/// Default number of racing replicas for each record fetch.
pub const DEFAULT_RECORD_REPLICAS: usize = 4;

/// Default time after which an unanswered replica group is abandoned and retried.
pub const DEFAULT_RACE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time after a completed refresh at which a background refresh starts.
pub const DEFAULT_REFRESH_AFTER: Duration = Duration::from_secs(600);

/// Default time after a completed refresh at which the cache is dropped.
pub const DEFAULT_EXPIRE_AFTER: Duration = Duration::from_secs(900);

/// Static configuration of the retrieval pipeline and the cache coordinator.
///
/// All settings are fixed for the lifetime of a coordinator. Values of zero
/// are clamped: the pool always has at least one worker and a replication
/// factor of `0` behaves like `1`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use headliner::Options;
///
/// let options = Options::default()
///     .required_count(10)
///     .workers(8)
///     .record_replicas(2)
///     .refresh_after(Duration::from_secs(60));
///
/// assert_eq!(options.get_required_count(), 10);
/// assert_eq!(options.get_workers(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    required_count: usize,
    workers: usize,
    list_replicas: usize,
    record_replicas: usize,
    race_timeout: Duration,
    refresh_after: Duration,
    expire_after: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            required_count: DEFAULT_REQUIRED_COUNT,
            workers: DEFAULT_WORKERS,
            list_replicas: DEFAULT_LIST_REPLICAS,
            record_replicas: DEFAULT_RECORD_REPLICAS,
            race_timeout: DEFAULT_RACE_TIMEOUT,
            refresh_after: DEFAULT_REFRESH_AFTER,
            expire_after: DEFAULT_EXPIRE_AFTER,
        }
    }
}

impl Options {
    /// Sets how many qualifying items a refresh collects.
    #[must_use]
    pub fn required_count(mut self, count: usize) -> Self {
        self.required_count = count;
        self
    }

    /// Sets the number of resolver workers.
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets how many concurrent attempts race for the ID list.
    #[must_use]
    pub fn list_replicas(mut self, replicas: usize) -> Self {
        self.list_replicas = replicas.max(1);
        self
    }

    /// Sets how many concurrent attempts race for each record.
    #[must_use]
    pub fn record_replicas(mut self, replicas: usize) -> Self {
        self.record_replicas = replicas.max(1);
        self
    }

    /// Sets how long a replica group may go unanswered before it is retried.
    #[must_use]
    pub fn race_timeout(mut self, timeout: Duration) -> Self {
        self.race_timeout = timeout;
        self
    }

    /// Sets the delay between a completed refresh and the next background refresh.
    #[must_use]
    pub fn refresh_after(mut self, after: Duration) -> Self {
        self.refresh_after = after;
        self
    }

    /// Sets the delay between a completed refresh and the expiry of its result.
    #[must_use]
    pub fn expire_after(mut self, after: Duration) -> Self {
        self.expire_after = after;
        self
    }

    /// Returns how many qualifying items a refresh collects.
    #[must_use]
    pub fn get_required_count(&self) -> usize {
        self.required_count
    }

    /// Returns the number of resolver workers.
    #[must_use]
    pub fn get_workers(&self) -> usize {
        self.workers
    }

    /// Returns the replication factor of the ID list fetch.
    #[must_use]
    pub fn get_list_replicas(&self) -> usize {
        self.list_replicas
    }

    /// Returns the replication factor of each record fetch.
    #[must_use]
    pub fn get_record_replicas(&self) -> usize {
        self.record_replicas
    }

    /// Returns the replica group timeout.
    #[must_use]
    pub fn get_race_timeout(&self) -> Duration {
        self.race_timeout
    }

    /// Returns the background refresh delay.
    #[must_use]
    pub fn get_refresh_after(&self) -> Duration {
        self.refresh_after
    }

    /// Returns the expiry delay.
    #[must_use]
    pub fn get_expire_after(&self) -> Duration {
        self.expire_after
    }
}
