// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A scriptable in-memory upstream shared by the integration tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use headliner::{CallResult, DisplayItem, Error, Options, Record, RemoteId, Upstream};
use tokio::sync::Semaphore;

/// Options with small, deterministic settings: no racing and a small pool.
pub fn options(required: usize) -> Options {
    Options::default()
        .required_count(required)
        .workers(2)
        .list_replicas(1)
        .record_replicas(1)
        .refresh_after(Duration::from_secs(600))
        .expire_after(Duration::from_secs(900))
}

/// Lets every runnable task make progress on a current-thread runtime.
pub async fn settle() {
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }
}

pub fn ids(items: &[DisplayItem]) -> Vec<u64> {
    items.iter().map(|item| item.id.0).collect()
}

#[derive(Debug)]
struct State {
    ids: Mutex<Vec<RemoteId>>,
    failing: Mutex<HashSet<RemoteId>>,
    jobs: Mutex<HashSet<RemoteId>>,
    fail_list: AtomicBool,
    list_gate: Option<Semaphore>,
    scramble: AtomicBool,
    list_calls: AtomicUsize,
    record_calls: AtomicUsize,
}

/// An [`Upstream`] whose ranking and record outcomes are set by the test.
///
/// Every ID resolves to a qualifying story unless it is marked as failing
/// or as a job. Clones share their state.
#[derive(Debug, Clone)]
pub struct FakeUpstream {
    state: Arc<State>,
}

impl FakeUpstream {
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        Self::build(ids, None)
    }

    /// List fetches block until [`release_list`](Self::release_list) is called, once per fetch.
    pub fn gated(ids: impl IntoIterator<Item = u64>) -> Self {
        Self::build(ids, Some(Semaphore::new(0)))
    }

    fn build(ids: impl IntoIterator<Item = u64>, list_gate: Option<Semaphore>) -> Self {
        Self {
            state: Arc::new(State {
                ids: Mutex::new(ids.into_iter().map(RemoteId).collect()),
                failing: Mutex::default(),
                jobs: Mutex::default(),
                fail_list: AtomicBool::new(false),
                list_gate,
                scramble: AtomicBool::new(false),
                list_calls: AtomicUsize::new(0),
                record_calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn failing(self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.state.failing.lock().unwrap().extend(ids.into_iter().map(RemoteId));
        self
    }

    pub fn jobs(self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.state.jobs.lock().unwrap().extend(ids.into_iter().map(RemoteId));
        self
    }

    /// Makes record fetches finish in an order unrelated to their rank.
    pub fn scrambled(self) -> Self {
        self.state.scramble.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_ids(&self, ids: impl IntoIterator<Item = u64>) {
        *self.state.ids.lock().unwrap() = ids.into_iter().map(RemoteId).collect();
    }

    pub fn fail_list(&self, fail: bool) {
        self.state.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn release_list(&self) {
        self.state.list_gate.as_ref().expect("upstream is not gated").add_permits(1);
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    pub fn record_calls(&self) -> usize {
        self.state.record_calls.load(Ordering::SeqCst)
    }

    /// Number of live clones, including the one owned by the system under test.
    pub fn handles(&self) -> usize {
        Arc::strong_count(&self.state)
    }
}

impl Upstream for FakeUpstream {
    async fn top_ids(&self) -> CallResult<Vec<RemoteId>> {
        self.state.list_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.state.list_gate {
            gate.acquire().await.expect("gate is never closed").forget();
        }

        if self.state.fail_list.load(Ordering::SeqCst) {
            return Err(Error::upstream("list unavailable"));
        }

        Ok(self.state.ids.lock().unwrap().clone())
    }

    async fn record(&self, id: RemoteId) -> CallResult<Record> {
        self.state.record_calls.fetch_add(1, Ordering::SeqCst);

        if self.state.scramble.load(Ordering::SeqCst) {
            for _ in 0..(id.0 * 7) % 5 {
                tokio::task::yield_now().await;
            }
        }

        if self.state.failing.lock().unwrap().contains(&id) {
            return Err(Error::upstream(format!("record {id} unavailable")));
        }

        let kind = if self.state.jobs.lock().unwrap().contains(&id) { "job" } else { "story" };

        Ok(Record {
            id,
            by: Some("tester".to_owned()),
            title: Some(format!("Story {id}")),
            kind: kind.to_owned(),
            url: Some(format!("https://www.example.com/{id}")),
            ..Record::default()
        })
    }
}
