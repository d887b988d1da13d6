// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Top-stories retrieval with racing remote calls and a self-refreshing cache.
//!
//! This crate fetches a ranked list of record IDs from a remote API, resolves
//! the IDs concurrently, keeps the highest ranked records that qualify for
//! display and serves them from an in-memory snapshot that is refreshed in the
//! background.
//!
//! The building blocks are:
//!
//! - [`Racer`] issues several identical calls at once and keeps the first
//!   outcome, retrying the whole group if none arrives in time.
//! - [`Retriever`] runs one refresh cycle: it streams the ranked IDs to a pool
//!   of resolver workers and folds their outcomes back into rank order,
//!   stopping the pool as soon as the top items are known.
//! - [`Coordinator`] owns the cache. It serves the current [`Snapshot`],
//!   starts a background refresh once the snapshot ages, and drops it once it
//!   expires. Reads go through the cloneable [`Headlines`] handle.
//!
//! The remote API itself is abstracted by the [`Upstream`] trait.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use anyspawn::Spawner;
//! use headliner::{CallResult, Coordinator, Error, Options, Record, RemoteId, Upstream};
//! use tick::Clock;
//!
//! struct Static;
//!
//! impl Upstream for Static {
//!     async fn top_ids(&self) -> CallResult<Vec<RemoteId>> {
//!         Ok(vec![RemoteId(1), RemoteId(2)])
//!     }
//!
//!     async fn record(&self, id: RemoteId) -> CallResult<Record> {
//!         Ok(Record {
//!             id,
//!             kind: "story".to_string(),
//!             title: Some(format!("Story {id}")),
//!             url: Some(format!("https://www.example.com/{id}")),
//!             ..Record::default()
//!         })
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Error> {
//! let options = Options::default().required_count(2).refresh_after(Duration::from_secs(60));
//! let headlines = Coordinator::start(Static, &options, Clock::new_tokio(), Spawner::new_tokio());
//!
//! let items = headlines.current().await?;
//! assert_eq!(items.len(), 2);
//! assert_eq!(items[0].host, "example.com");
//! # Ok(())
//! # }
//! ```

mod coordinator;
mod error;
mod options;
mod pipeline;
mod race;
mod record;
mod refresh;
mod upstream;

pub use coordinator::{Coordinator, Headlines, Snapshot};
pub use error::{CallResult, Error, ErrorKind};
pub use options::{
    DEFAULT_EXPIRE_AFTER, DEFAULT_LIST_REPLICAS, DEFAULT_RACE_TIMEOUT, DEFAULT_RECORD_REPLICAS, DEFAULT_REFRESH_AFTER,
    DEFAULT_REQUIRED_COUNT, DEFAULT_WORKERS, Options,
};
pub use race::Racer;
pub use record::{DisplayItem, Record, RemoteId};
pub use refresh::Retriever;
pub use upstream::Upstream;
