// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cache coordinator.
//!
//! A single long-lived task owns the cache and serializes every event that
//! touches it: request arrivals, refresh completions and the two timers.
//! Requests are only taken from the queue when they can be answered, so an
//! early request simply waits until the first refresh has finished.

mod machine;

use std::fmt;
use std::time::Duration;

use anyspawn::Spawner;
use futures_util::future::OptionFuture;
use tick::{Clock, Delay};
use tokio::sync::{mpsc, oneshot};

pub use machine::Snapshot;
use machine::{CacheMachine, Effect, Effects, Event, Reply};

use crate::{CallResult, Error, ErrorKind, Options, Retriever, Upstream};

/// Number of requests that can wait for the coordinator before senders block.
const REQUEST_QUEUE_DEPTH: usize = 64;

type Responder = oneshot::Sender<Reply>;

/// Owns the cached snapshot and keeps it fresh.
///
/// The coordinator is never used directly. [`Coordinator::start`] spawns its
/// event loop and hands back a [`Headlines`] handle through which the cache is
/// read. The loop ends once every handle has been dropped.
///
/// Timeline of a cache entry, with `refresh_after < expire_after`:
///
/// ```text
/// refresh done     refresh_after             expire_after
///      |----------------|-------------------------|
///      serve snapshot   serve snapshot,           drop snapshot,
///                       background refresh        start over
/// ```
pub struct Coordinator<U> {
    machine: CacheMachine,
    retriever: Retriever<U>,
    required: usize,
    clock: Clock,
    spawner: Spawner,
    refresh_after: Duration,
    expire_after: Duration,
    requests: mpsc::Receiver<Responder>,
    pending: Option<oneshot::Receiver<CallResult<Snapshot>>>,
    expire_timer: Option<Delay>,
    refresh_timer: Option<Delay>,
}

impl<U: Upstream> Coordinator<U> {
    /// Starts the coordinator and its first refresh cycle.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use anyspawn::Spawner;
    /// use headliner::{CallResult, Coordinator, Options, Upstream};
    /// use tick::Clock;
    ///
    /// # async fn example(upstream: impl Upstream) -> CallResult<()> {
    /// let headlines = Coordinator::start(upstream, &Options::default(), Clock::new_tokio(), Spawner::new_tokio());
    ///
    /// // Waits for the first refresh, then answers from the cache.
    /// let items = headlines.current().await?;
    /// println!("{} items", items.len());
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn start(upstream: U, options: &Options, clock: Clock, spawner: Spawner) -> Headlines {
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);

        let coordinator = Self {
            machine: CacheMachine::default(),
            retriever: Retriever::new(upstream, options, clock.clone(), spawner.clone()),
            required: options.get_required_count(),
            clock,
            spawner: spawner.clone(),
            refresh_after: options.get_refresh_after(),
            expire_after: options.get_expire_after(),
            requests: rx,
            pending: None,
            expire_timer: None,
            refresh_timer: None,
        };
        drop(spawner.spawn(coordinator.run()));

        Headlines { requests: tx }
    }

    async fn run(mut self) {
        let effects = self.machine.start();
        self.apply(effects, None);

        loop {
            let intake = self.machine.accepts_requests();
            let mut responder = None;

            // Timers come before requests so that they are armed before a
            // request is answered.
            let event = tokio::select! {
                biased;

                Some(outcome) = OptionFuture::from(self.pending.as_mut()), if self.pending.is_some() => {
                    self.pending = None;
                    Event::RefreshCompleted(outcome.unwrap_or_else(|lost| Err(Error::caused_by(ErrorKind::Unavailable, lost))))
                }
                Some(()) = OptionFuture::from(self.expire_timer.as_mut()), if self.expire_timer.is_some() => {
                    self.expire_timer = None;
                    Event::ExpireTimerFired
                }
                Some(()) = OptionFuture::from(self.refresh_timer.as_mut()), if self.refresh_timer.is_some() => {
                    self.refresh_timer = None;
                    Event::RefreshTimerFired
                }
                request = self.requests.recv(), if intake => {
                    let Some(request) = request else {
                        break;
                    };
                    responder = Some(request);
                    Event::RequestArrived
                }
                else => break,
            };

            log_event(&event);
            let effects = self.machine.handle(event);
            self.apply(effects, responder);
        }

        tracing::debug!(state = ?self.machine.state(), "coordinator stopped");
    }

    fn apply(&mut self, effects: Effects, mut responder: Option<Responder>) {
        for effect in effects {
            match effect {
                Effect::StartRefresh => self.start_refresh(),
                Effect::ArmTimers => {
                    self.expire_timer = Some(self.clock.delay(self.expire_after));
                    self.refresh_timer = Some(self.clock.delay(self.refresh_after));
                }
                Effect::DisarmTimers => {
                    self.expire_timer = None;
                    self.refresh_timer = None;
                }
                Effect::Reply(reply) => {
                    if let Some(responder) = responder.take() {
                        // The requester may have given up waiting.
                        let _ = responder.send(reply);
                    }
                }
            }
        }
    }

    fn start_refresh(&mut self) {
        let (mut tx, rx) = oneshot::channel();
        let retriever = self.retriever.clone();
        let required = self.required;

        drop(self.spawner.spawn(async move {
            tokio::select! {
                outcome = retriever.refresh(required) => {
                    let _ = tx.send(outcome.map(Snapshot::from));
                }
                () = tx.closed() => {
                    tracing::debug!("refresh cycle superseded");
                }
            }
        }));

        // Replacing the receiver orphans any refresh still running.
        self.pending = Some(rx);
        tracing::debug!(state = ?self.machine.state(), "refresh cycle started");
    }
}

impl<U> fmt::Debug for Coordinator<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("state", &self.machine.state())
            .field("required", &self.required)
            .field("refresh_after", &self.refresh_after)
            .field("expire_after", &self.expire_after)
            .finish_non_exhaustive()
    }
}

fn log_event(event: &Event) {
    match event {
        Event::RefreshCompleted(Ok(items)) => tracing::info!(items = items.len(), "cache refreshed"),
        Event::RefreshCompleted(Err(error)) => tracing::warn!(%error, "cache refresh failed"),
        Event::ExpireTimerFired => tracing::info!("cache expired"),
        Event::RefreshTimerFired => tracing::info!("refresh timer fired"),
        Event::RequestArrived => tracing::debug!("request served"),
    }
}

/// A cheap, cloneable handle to a running [`Coordinator`].
#[derive(Debug, Clone)]
pub struct Headlines {
    requests: mpsc::Sender<Responder>,
}

impl Headlines {
    /// Returns the cached snapshot, waiting for the first refresh if needed.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`ErrorKind::Unavailable`] if the most recent
    /// refresh failed or the coordinator is no longer running.
    pub async fn current(&self) -> CallResult<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(tx)
            .await
            .map_err(|closed| Error::caused_by(ErrorKind::Unavailable, closed.to_string()))?;

        match rx.await {
            Ok(Reply::Items(items)) => Ok(items),
            Ok(Reply::Unavailable) => Err(Error::unavailable()),
            Err(lost) => Err(Error::caused_by(ErrorKind::Unavailable, lost)),
        }
    }
}
