// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Retrieval orchestration.

use std::fmt;
use std::sync::Arc;

use anyspawn::Spawner;
use tick::Clock;

use crate::pipeline::aggregate::aggregate;
use crate::pipeline::generator::generate;
use crate::pipeline::stop::StopSource;
use crate::pipeline::workers::{PoolSettings, resolve};
use crate::{CallResult, DisplayItem, Options, Racer, RemoteId, Upstream};

/// Runs complete refresh cycles against an [`Upstream`].
///
/// One cycle fetches the ranked ID list, resolves the IDs through a pool of
/// workers and returns the highest ranked qualifying records. Cycles are
/// independent of each other; a retriever can run several at once.
///
/// # Examples
///
/// ```no_run
/// use anyspawn::Spawner;
/// use headliner::{CallResult, Options, Retriever, Upstream};
/// use tick::Clock;
///
/// # async fn example(upstream: impl Upstream) -> CallResult<()> {
/// let retriever = Retriever::new(upstream, &Options::default(), Clock::new_tokio(), Spawner::new_tokio());
///
/// for item in retriever.refresh(10).await? {
///     println!("{} ({})", item.title.as_deref().unwrap_or_default(), item.host);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Retriever<U> {
    settings: Arc<PoolSettings<U>>,
    list_replicas: usize,
    clock: Clock,
    spawner: Spawner,
}

impl<U: Upstream> Retriever<U> {
    /// Creates a retriever that uses `clock` for racing timeouts and
    /// `spawner` to run the ID stream and the resolver pool.
    #[must_use]
    pub fn new(upstream: U, options: &Options, clock: Clock, spawner: Spawner) -> Self {
        let settings = PoolSettings {
            upstream: Arc::new(upstream),
            racer: Racer::new(clock.clone(), options.get_race_timeout()),
            workers: options.get_workers(),
            replicas: options.get_record_replicas(),
        };

        Self {
            settings: Arc::new(settings),
            list_replicas: options.get_list_replicas(),
            clock,
            spawner,
        }
    }

    /// Runs one refresh cycle and returns up to `required` qualifying items in rank order.
    ///
    /// Fewer than `required` items are returned when the ranked list runs out
    /// first. Failures to resolve individual records are skipped.
    ///
    /// # Errors
    ///
    /// Returns the error of the ID list fetch if it fails. No records are
    /// fetched in that case.
    pub async fn refresh(&self, required: usize) -> CallResult<Vec<DisplayItem>> {
        let stopwatch = self.clock.stopwatch();
        let upstream = &self.settings.upstream;

        let ranked: Arc<[RemoteId]> = match self.settings.racer.race(self.list_replicas, move || upstream.top_ids()).await {
            Ok(ids) => ids.into(),
            Err(error) => {
                tracing::warn!(%error, "fetching the ranked ID list failed");
                return Err(error);
            }
        };

        let stop = StopSource::new();
        let ids = generate(&self.spawner, Arc::clone(&ranked), stop.token());
        let results = resolve(&self.spawner, &self.settings, &ids, &stop.token());
        drop(ids);

        let items = aggregate(required, &ranked, results, stop).await;

        tracing::info!(
            ranked = ranked.len(),
            items = items.len(),
            required,
            elapsed_ms = u64::try_from(stopwatch.elapsed().as_millis()).unwrap_or(u64::MAX),
            "refresh cycle finished"
        );

        Ok(items)
    }
}

impl<U> Clone for Retriever<U> {
    fn clone(&self) -> Self {
        Self {
            settings: Arc::clone(&self.settings),
            list_replicas: self.list_replicas,
            clock: self.clock.clone(),
            spawner: self.spawner.clone(),
        }
    }
}

impl<U> fmt::Debug for Retriever<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retriever")
            .field("workers", &self.settings.workers)
            .field("list_replicas", &self.list_replicas)
            .field("record_replicas", &self.settings.replicas)
            .field("race_timeout", &self.settings.racer.timeout())
            .finish_non_exhaustive()
    }
}
