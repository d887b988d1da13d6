// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use smallvec::{SmallVec, smallvec};

use crate::{CallResult, DisplayItem};

/// An immutable, shareable result of one refresh cycle.
pub type Snapshot = Arc<[DisplayItem]>;

/// The observable state of the cache.
///
/// | State             | Entry   | Refresh running | Requests      |
/// |-------------------|---------|-----------------|---------------|
/// | `Empty`           | none    | no              | wait          |
/// | `Loading`         | none    | yes             | wait          |
/// | `Valid`           | valid   | no              | served        |
/// | `StaleRefreshing` | valid   | yes             | served        |
/// | `Error`           | none    | either          | unavailable   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CacheState {
    /// Nothing cached and no refresh running.
    Empty,
    /// Nothing cached and a refresh is running.
    Loading,
    /// A valid snapshot is cached.
    Valid,
    /// A valid snapshot is cached while its replacement is being retrieved.
    StaleRefreshing,
    /// The last refresh failed.
    Error,
}

#[derive(Debug)]
pub(crate) enum Event {
    RefreshCompleted(CallResult<Snapshot>),
    RequestArrived,
    ExpireTimerFired,
    RefreshTimerFired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    Items(Snapshot),
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Effect {
    /// Launch a new refresh cycle, superseding any running one.
    StartRefresh,
    /// (Re)arm both the expire and the refresh timer.
    ArmTimers,
    DisarmTimers,
    /// Answer the request that caused the event.
    Reply(Reply),
}

pub(crate) type Effects = SmallVec<[Effect; 2]>;

#[derive(Debug, Default)]
struct CacheEntry {
    items: Option<Snapshot>,
}

/// The pure transition logic of the cache coordinator.
///
/// The machine owns no timers and no tasks. It consumes one [`Event`] at a
/// time and tells its driver what to do through [`Effect`]s.
#[derive(Debug, Default)]
pub(crate) struct CacheMachine {
    entry: CacheEntry,
    failed: bool,
    refreshing: bool,
}

impl CacheMachine {
    /// Kicks off the first refresh.
    pub(crate) fn start(&mut self) -> Effects {
        self.refreshing = true;
        smallvec![Effect::StartRefresh]
    }

    /// Requests are only taken in when they can be answered immediately.
    pub(crate) fn accepts_requests(&self) -> bool {
        self.entry.items.is_some() || self.failed
    }

    pub(crate) fn state(&self) -> CacheState {
        match (&self.entry.items, self.failed, self.refreshing) {
            (Some(_), _, false) => CacheState::Valid,
            (Some(_), _, true) => CacheState::StaleRefreshing,
            (None, true, _) => CacheState::Error,
            (None, false, false) => CacheState::Empty,
            (None, false, true) => CacheState::Loading,
        }
    }

    pub(crate) fn handle(&mut self, event: Event) -> Effects {
        match event {
            Event::RefreshCompleted(Ok(items)) => {
                self.entry.items = Some(items);
                self.failed = false;
                self.refreshing = false;
                smallvec![Effect::ArmTimers]
            }
            Event::RefreshCompleted(Err(_)) => {
                self.entry.items = None;
                self.failed = true;
                self.refreshing = false;
                smallvec![Effect::ArmTimers]
            }
            Event::RequestArrived => match (&self.entry.items, self.failed) {
                (Some(items), _) => smallvec![Effect::Reply(Reply::Items(Arc::clone(items)))],
                (None, true) => smallvec![Effect::Reply(Reply::Unavailable)],
                // Not reachable while the driver honors `accepts_requests`.
                (None, false) => SmallVec::new(),
            },
            Event::ExpireTimerFired => {
                self.entry.items = None;
                self.failed = false;
                self.refreshing = true;
                smallvec![Effect::DisarmTimers, Effect::StartRefresh]
            }
            Event::RefreshTimerFired if self.refreshing => SmallVec::new(),
            Event::RefreshTimerFired => {
                self.refreshing = true;
                smallvec![Effect::StartRefresh]
            }
        }
    }
}
