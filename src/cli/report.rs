use std::fmt::Write;

use crate::{tracking::aggregate::WeekProgress, utils::time::format_hours};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRow {
    Entry { label: String, value: String },
    /// Horizontal rule spanning the whole table.
    Separator,
}

impl ReportRow {
    pub fn entry(label: impl Into<String>, value: impl ToString) -> Self {
        Self::Entry {
            label: label.into(),
            value: value.to_string(),
        }
    }
}

/// Rows of the final report, in the order they are printed.
pub fn progress_rows(progress: &WeekProgress) -> Vec<ReportRow> {
    vec![
        ReportRow::entry("Tracked this week", format_hours(progress.tracked_this_week)),
        ReportRow::entry("Previous overtime", format_hours(progress.overtime)),
        ReportRow::entry("Done this week", format_hours(progress.done_this_week)),
        ReportRow::entry("Target hours", format_hours(progress.hours_per_week)),
        ReportRow::Separator,
        ReportRow::entry("Still to do", format_hours(progress.still_to_do)),
        ReportRow::entry("Done of this week", progress.percent_done),
    ]
}

/// Renders `label: value` lines with all values aligned on their right edge.
pub fn render_aligned(rows: &[ReportRow]) -> String {
    let entries = || {
        rows.iter().filter_map(|row| match row {
            ReportRow::Entry { label, value } => Some((label.chars().count(), value.chars().count())),
            ReportRow::Separator => None,
        })
    };
    let max_label = entries().map(|(label, _)| label).max().unwrap_or(0);
    let max_value = entries().map(|(_, value)| value).max().unwrap_or(0);

    let mut output = String::new();
    for row in rows {
        match row {
            ReportRow::Entry { label, value } => {
                let spaces = 1 + max_label - label.chars().count() + max_value
                    - value.chars().count();
                // Writing into a String can't fail
                let _ = writeln!(output, "{label}:{}{value}", " ".repeat(spaces));
            }
            ReportRow::Separator => {
                output.push_str(&"-".repeat(2 + max_label + max_value));
                output.push('\n');
            }
        }
    }
    output
}
