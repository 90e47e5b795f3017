//! Tracks progress towards a weekly target of work hours. Time entries come from Toggl Track,
//! everything tracked before the current week is accumulated into a small checkpoint file so that
//! only recent entries have to be fetched on every run.
//!

pub mod cli;
pub mod settings;
pub mod toggl;
pub mod tracking;
pub mod utils;
