// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashMap;

use tokio::sync::mpsc;

use super::stop::StopSource;
use super::workers::Resolved;
use crate::{CallResult, DisplayItem, Record, RemoteId};

/// Tracks which ranked IDs are resolved and how many of them qualify.
///
/// Completion is judged on the resolved prefix of the ranking only: an item
/// counts once every ID ranked above it has been resolved, so a slow
/// high-ranked ID holds back completion even when plenty of lower-ranked
/// items have already qualified.
#[derive(Debug)]
pub(crate) struct RankTracker<'a> {
    required: usize,
    ranked: &'a [RemoteId],
    // `true` if the ID resolved to a qualifying record.
    resolved: HashMap<RemoteId, bool>,
    records: HashMap<RemoteId, Record>,
}

impl<'a> RankTracker<'a> {
    pub(crate) fn new(required: usize, ranked: &'a [RemoteId]) -> Self {
        Self {
            required,
            ranked,
            resolved: HashMap::with_capacity(ranked.len()),
            records: HashMap::new(),
        }
    }

    /// Folds one outcome in and reports whether enough is known to finish.
    ///
    /// Only the first outcome per ID is kept.
    pub(crate) fn observe(&mut self, id: RemoteId, outcome: CallResult<Record>) -> bool {
        if !self.resolved.contains_key(&id) {
            match outcome {
                Ok(record) if record.qualifies() => {
                    self.resolved.insert(id, true);
                    self.records.insert(id, record);
                }
                Ok(record) => {
                    tracing::trace!(%id, kind = %record.kind, "record does not qualify");
                    self.resolved.insert(id, false);
                }
                Err(error) => {
                    tracing::debug!(%id, %error, "record could not be resolved");
                    self.resolved.insert(id, false);
                }
            }
        }

        self.is_complete()
    }

    /// Returns `true` once the resolved prefix holds `required` qualifying items.
    pub(crate) fn is_complete(&self) -> bool {
        let mut qualifying = 0;
        for id in self.ranked {
            if qualifying >= self.required {
                break;
            }
            match self.resolved.get(id) {
                None => break,
                Some(true) => qualifying += 1,
                Some(false) => {}
            }
        }

        qualifying >= self.required
    }

    /// Returns up to `required` qualifying items in rank order.
    pub(crate) fn into_items(mut self) -> Vec<DisplayItem> {
        self.ranked
            .iter()
            .filter_map(|id| self.records.remove(id))
            .take(self.required)
            .map(DisplayItem::new)
            .collect()
    }
}

/// Consumes resolver outcomes until the top `required` items are known.
///
/// Raises `stop` before returning so that the ID stream and the resolver pool
/// wind down. If `results` closes first, whatever qualified is returned, which
/// may be fewer than `required` items.
pub(crate) async fn aggregate(
    required: usize,
    ranked: &[RemoteId],
    mut results: mpsc::Receiver<Resolved>,
    stop: StopSource,
) -> Vec<DisplayItem> {
    let mut tracker = RankTracker::new(required, ranked);

    if !tracker.is_complete() {
        while let Some((id, outcome)) = results.recv().await {
            if tracker.observe(id, outcome) {
                break;
            }
        }
    }

    stop.stop();
    tracker.into_items()
}
