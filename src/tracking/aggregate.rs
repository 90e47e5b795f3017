use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::{
    settings::Settings,
    utils::{
        percentage::{done_percentage, Percentage},
        time::{
            elapsed_hours_since, midnight_in, next_week_start, seconds_to_hours, start_of_week,
            week_start_of, weeks_between,
        },
    },
};

use super::entities::{Checkpoint, TimeEntry};

/// Range of time entries that need to be fetched for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FetchWindow {
    /// Entries are fetched from the checkpoint week onwards, everything before is already
    /// accumulated in the checkpoint. Week boundaries are UTC midnights.
    pub fn compute(settings: &Settings, checkpoint: &Checkpoint, now: DateTime<Utc>) -> Self {
        let start = midnight_in(checkpoint.week_start, &Utc);
        let end = if settings.fetch_until_end_of_week {
            midnight_in(next_week_start(start_of_week(&now)), &Utc)
        } else {
            now
        };
        Self { start, end }
    }
}

/// Finished seconds split by the week they started in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekSums {
    pub before_this_week: i64,
    pub this_week: i64,
}

/// Splits finished entries into the ones that started before `this_week_start` and the rest.
/// The week of an entry is taken in the offset its start was reported with.
pub fn partition_seconds<'a>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
    this_week_start: NaiveDate,
) -> WeekSums {
    entries
        .into_iter()
        .fold(WeekSums::default(), |mut sums, entry| {
            let seconds = entry.finished_seconds();
            if start_of_week(&entry.start) >= this_week_start {
                sums.this_week += seconds;
            } else {
                sums.before_this_week += seconds;
            }
            sums
        })
}

/// Hours elapsed on all entries that are still running.
pub fn running_hours<'a>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
    now: DateTime<Utc>,
    zone: &Tz,
) -> f64 {
    entries
        .into_iter()
        .filter(|entry| entry.is_running())
        .map(|entry| elapsed_hours_since(&entry.start, &now, zone))
        .sum()
}

/// Everything that is known about the progress of the current week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekProgress {
    pub this_week_start: NaiveDate,
    /// Week from which the target is counted.
    pub target_start_week: NaiveDate,
    pub weeks: i64,
    pub hours_per_week: f64,
    pub target_hours: f64,
    /// Tracked hours since the start including carry over, but without running entries.
    pub finished_hours: f64,
    pub running_hours: f64,
    pub total_tracked_hours: f64,
    pub tracked_this_week: f64,
    pub still_to_do: f64,
    pub done_this_week: f64,
    /// Hours done this week that were already covered by previous weeks.
    pub overtime: f64,
    pub percent_done: Percentage,
    /// Checkpoint to persist for the next run. Its seconds are never scaled by the crime factor,
    /// so repeated runs don't compound it.
    pub next_checkpoint: Checkpoint,
}

/// Computes the progress of the current week from the `entries` fetched for the window of
/// `checkpoint`.
pub fn aggregate(
    settings: &Settings,
    checkpoint: &Checkpoint,
    entries: &[TimeEntry],
    now: DateTime<Utc>,
) -> Result<WeekProgress> {
    let this_week_start = start_of_week(&now);
    let next_monday = next_week_start(this_week_start);

    let sums = partition_seconds(entries, this_week_start);
    let seconds_before_this_week = sums.before_this_week as f64 + checkpoint.accumulated_seconds;
    let next_checkpoint = Checkpoint::new(this_week_start, seconds_before_this_week);

    let scaled_before_this_week = seconds_before_this_week * settings.crime_factor;
    let finished_hours =
        seconds_to_hours(scaled_before_this_week + sums.this_week as f64) + settings.carry_over;

    let running_hours = running_hours(entries, now, &settings.timezone);
    let total_tracked_hours = finished_hours + running_hours;
    let tracked_this_week = seconds_to_hours(sums.this_week as f64) + running_hours;

    // Once history was accumulated the checkpoint week no longer marks the beginning of the
    // target, the configured start date does.
    let target_start_week = if checkpoint.has_history() {
        week_start_of(settings.start_date)
    } else {
        week_start_of(checkpoint.week_start)
    };
    let weeks = weeks_between(target_start_week, next_monday)?;
    let target_hours = weeks as f64 * settings.hours_per_week;

    let still_to_do = target_hours - total_tracked_hours;
    let done_this_week = settings.hours_per_week - still_to_do;
    let overtime = done_this_week - tracked_this_week;
    let percent_done = done_percentage(still_to_do, settings.hours_per_week);

    Ok(WeekProgress {
        this_week_start,
        target_start_week,
        weeks,
        hours_per_week: settings.hours_per_week,
        target_hours,
        finished_hours,
        running_hours,
        total_tracked_hours,
        tracked_this_week,
        still_to_do,
        done_this_week,
        overtime,
        percent_done,
        next_checkpoint,
    })
}
