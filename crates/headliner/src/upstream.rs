// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The remote API collaborator.
//!
//! [`Upstream`] is the only seam through which the crate talks to the remote
//! service. Implementations are expected to perform exactly one remote call per
//! invocation; the crate decides how many invocations to race.

use crate::{CallResult, Record, RemoteId};

/// A remote API that publishes a ranked list of IDs and resolves each ID to a record.
///
/// Implement this trait to plug in a concrete remote service. Both methods
/// are invoked concurrently from many tasks, so implementations must be
/// cheap to share and their futures must be `Send`.
///
/// # Example
///
/// ```
/// use headliner::{CallResult, Error, Record, RemoteId, Upstream};
///
/// struct Fixed;
///
/// impl Upstream for Fixed {
///     async fn top_ids(&self) -> CallResult<Vec<RemoteId>> {
///         Ok(vec![RemoteId(1)])
///     }
///
///     async fn record(&self, id: RemoteId) -> CallResult<Record> {
///         Err(Error::upstream(format!("no record {id}")))
///     }
/// }
/// ```
pub trait Upstream: Send + Sync + 'static {
    /// Fetches the ranked list of record IDs, best first.
    fn top_ids(&self) -> impl Future<Output = CallResult<Vec<RemoteId>>> + Send;

    /// Fetches the record identified by `id`.
    fn record(&self, id: RemoteId) -> impl Future<Output = CallResult<Record>> + Send;
}
