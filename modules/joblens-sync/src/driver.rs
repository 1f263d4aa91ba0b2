use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use joblens_common::FilterCriteria;

use crate::fetch::FetchOrchestrator;
use crate::filters::FilterWatcher;

/// Drive the orchestrator from stabilized filter changes.
///
/// Fetches once for the current snapshot, then once per distinct stabilized
/// snapshot after that. Distinctness is criteria equality — a wakeup that
/// carries the same snapshot does not refetch. Ends when the owning
/// `FilterState` is dropped.
pub fn spawn_filter_driver(
    mut watcher: FilterWatcher,
    fetcher: Arc<FetchOrchestrator>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last: FilterCriteria = watcher.snapshot();
        fetcher.reset_and_fetch(&last).await;
        while let Some(snapshot) = watcher.changed().await {
            if snapshot == last {
                continue;
            }
            last = snapshot.clone();
            fetcher.reset_and_fetch(&snapshot).await;
        }
        debug!("filter driver stopped");
    })
}
