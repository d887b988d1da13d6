// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::VecDeque;
use std::sync::Arc;

use anyspawn::Spawner;
use futures_util::FutureExt as _;
use futures_util::future::{BoxFuture, OptionFuture};
use tokio::sync::mpsc;

use super::stop::StopToken;
use crate::{CallResult, Racer, Record, RemoteId, Upstream};

/// An ID paired with the outcome of resolving it.
pub(crate) type Resolved = (RemoteId, CallResult<Record>);

/// Shared inputs of every worker in a pool.
#[derive(Debug)]
pub(crate) struct PoolSettings<U> {
    pub(crate) upstream: Arc<U>,
    pub(crate) racer: Racer,
    pub(crate) workers: usize,
    pub(crate) replicas: usize,
}

/// Starts the resolver pool and returns the merged stream of outcomes.
///
/// Every ID taken from `ids` yields exactly one [`Resolved`] entry unless the
/// stop signal is raised first. The returned stream closes when all workers
/// have exited, which happens once `ids` is exhausted and every outcome has
/// been delivered, or as soon as the stop signal is raised.
pub(crate) fn resolve<U: Upstream>(
    spawner: &Spawner,
    settings: &PoolSettings<U>,
    ids: &async_channel::Receiver<RemoteId>,
    stop: &StopToken,
) -> mpsc::Receiver<Resolved> {
    let count = settings.workers.max(1);
    let (tx, rx) = mpsc::channel(count);

    for index in 0..count {
        let worker = Worker {
            index,
            upstream: Arc::clone(&settings.upstream),
            racer: settings.racer.clone(),
            replicas: settings.replicas,
            ids: ids.clone(),
            out: tx.clone(),
            stop: stop.clone(),
        };
        drop(spawner.spawn(worker.run()));
    }

    rx
}

struct Worker<U> {
    index: usize,
    upstream: Arc<U>,
    racer: Racer,
    replicas: usize,
    ids: async_channel::Receiver<RemoteId>,
    out: mpsc::Sender<Resolved>,
    stop: StopToken,
}

impl<U: Upstream> Worker<U> {
    async fn run(mut self) {
        // Outcomes waiting to be pushed, oldest first.
        let mut backlog: VecDeque<Resolved> = VecDeque::new();
        let mut in_flight: Option<BoxFuture<'static, Resolved>> = None;
        let mut input_open = true;
        let mut resolved: usize = 0;

        loop {
            if !input_open && in_flight.is_none() && backlog.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                () = self.stop.stopped() => {
                    tracing::debug!(worker = self.index, resolved, dropped = backlog.len(), "resolver stopped");
                    return;
                }
                permit = self.out.reserve(), if !backlog.is_empty() => {
                    let Ok(permit) = permit else {
                        // Nobody is listening anymore.
                        return;
                    };
                    if let Some(entry) = backlog.pop_front() {
                        permit.send(entry);
                    }
                }
                Some(entry) = OptionFuture::from(in_flight.as_mut()), if in_flight.is_some() => {
                    in_flight = None;
                    resolved = resolved.saturating_add(1);
                    backlog.push_back(entry);
                }
                next = self.ids.recv(), if input_open && in_flight.is_none() => {
                    match next {
                        Ok(id) => in_flight = Some(self.fetch(id)),
                        Err(_) => input_open = false,
                    }
                }
            }
        }

        tracing::debug!(worker = self.index, resolved, "resolver drained");
    }

    fn fetch(&self, id: RemoteId) -> BoxFuture<'static, Resolved> {
        let upstream = Arc::clone(&self.upstream);
        let racer = self.racer.clone();
        let replicas = self.replicas;
        let worker = self.index;

        async move {
            let outcome = racer.race(replicas, || upstream.record(id)).await;
            tracing::trace!(worker, %id, ok = outcome.is_ok(), "record resolved");
            (id, outcome)
        }
        .boxed()
    }
}
