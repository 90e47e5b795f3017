//! Computation of the weekly progress. The flow of a run is:
//!  - Load the [entities::Checkpoint] holding everything tracked before its week.
//!  - Fetch time entries from the checkpoint week until now (or the end of the current week).
//!  - Aggregate them into [aggregate::WeekProgress] and persist the checkpoint for the next run.

pub mod aggregate;
pub mod checkpoint;
pub mod entities;

use anyhow::{Context, Result};
use aggregate::{aggregate, FetchWindow, WeekProgress};
use checkpoint::{CheckpointOrigin, CheckpointStore, LoadedCheckpoint};
use entities::Checkpoint;
use tracing::{info, instrument};

use crate::{settings::Settings, toggl::EntrySource, utils::clock::Clock};

/// Result of a single run together with the values it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRun {
    pub checkpoint: Checkpoint,
    pub checkpoint_origin: CheckpointOrigin,
    pub window: FetchWindow,
    pub entry_count: usize,
    pub progress: WeekProgress,
}

/// Executes a run. The checkpoint is only updated after entries were fetched and aggregated
/// successfully. In verbose mode the checkpoint and the fetch window are printed before fetching.
#[instrument(skip_all)]
pub async fn compute_progress(
    settings: &Settings,
    source: &impl EntrySource,
    store: &impl CheckpointStore,
    clock: &impl Clock,
) -> Result<ProgressRun> {
    let LoadedCheckpoint { checkpoint, origin } = store.load();
    if settings.verbose {
        println!("{}", checkpoint_message(&checkpoint, &origin));
    }
    let now = clock.time();
    let window = FetchWindow::compute(settings, &checkpoint, now);
    info!("Fetching time entries from {} to {}", window.start, window.end);
    if settings.verbose {
        println!("{}", fetch_window_message(&window));
    }

    let entries = source
        .fetch(window.start, window.end)
        .await
        .context("Error fetching time entries")?;

    let progress = aggregate(settings, &checkpoint, &entries, now)?;
    store.save(progress.next_checkpoint)?;

    Ok(ProgressRun {
        checkpoint,
        checkpoint_origin: origin,
        window,
        entry_count: entries.len(),
        progress,
    })
}

fn checkpoint_message(checkpoint: &Checkpoint, origin: &CheckpointOrigin) -> String {
    match origin {
        CheckpointOrigin::Stored => format!(
            "Found cache file, using start date: {} and seconds tracked before: {}",
            checkpoint.week_start, checkpoint.accumulated_seconds
        ),
        CheckpointOrigin::Missing => format!(
            "No cache file found, using default start date: {}",
            checkpoint.week_start
        ),
        CheckpointOrigin::Unreadable(reason) => format!(
            "Error reading cache file: {reason}. Using default start date: {}",
            checkpoint.week_start
        ),
    }
}

fn fetch_window_message(window: &FetchWindow) -> String {
    format!(
        "Fetching time entries from {} to {}",
        window.start.date_naive(),
        window.end.date_naive()
    )
}
