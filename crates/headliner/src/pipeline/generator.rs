// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use anyspawn::Spawner;
use async_channel::Receiver;

use super::stop::StopToken;
use crate::RemoteId;

/// Feeds `ids` into a rendezvous-sized channel in rank order.
///
/// Each ID is offered until a worker takes it or the stop signal is raised.
/// The channel is closed once the list is exhausted, the signal is raised, or
/// every receiver is gone.
pub(crate) fn generate(spawner: &Spawner, ids: Arc<[RemoteId]>, mut stop: StopToken) -> Receiver<RemoteId> {
    let (tx, rx) = async_channel::bounded(1);

    // Detached; the producer winds down on its own.
    drop(spawner.spawn(async move {
        for &id in ids.iter() {
            tokio::select! {
                biased;

                () = stop.stopped() => {
                    tracing::trace!(%id, "ID stream stopped");
                    return;
                }
                sent = tx.send(id) => {
                    if sent.is_err() {
                        return;
                    }
                }
            }
        }
    }));

    rx
}
