//! Typed settings of the application. They are read once from a TOML file and stay immutable for
//! the rest of the run.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;

pub const SETTINGS_FILE_NAME: &str = "settings.toml";
pub const CHECKPOINT_FILE_NAME: &str = "checkpoint";
pub const API_TOKEN_ENV: &str = "TOGGL_API_TOKEN";

pub const DEFAULT_API_URL: &str = "https://api.track.toggl.com/api/v9";
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub api_token: String,
    /// First day that counts towards the target.
    #[serde(rename = "START_DATE_STRING")]
    pub start_date: NaiveDate,
    #[serde(default = "default_hours_per_week")]
    pub hours_per_week: f64,
    /// Hours from before `start_date`. Negative values mean overtime, positive ones undertime.
    #[serde(default)]
    pub carry_over: f64,
    /// Fetch entries until the end of the current week instead of until now. Useful for entries
    /// planned ahead, like vacations.
    #[serde(default = "default_true")]
    pub fetch_until_end_of_week: bool,
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(rename = "V", default)]
    pub verbose: bool,
    #[serde(default = "default_time_format")]
    pub time_format: String,
    /// Multiplier for everything tracked before the current week.
    #[serde(default = "default_crime_factor")]
    pub crime_factor: f64,
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_hours_per_week() -> f64 {
    30.
}

fn default_true() -> bool {
    true
}

fn default_timezone() -> Tz {
    Tz::UTC
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.into()
}

fn default_crime_factor() -> f64 {
    1.
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

impl Settings {
    /// Reads settings from `path`. The API token from the environment takes precedence over the
    /// one in the file.
    pub fn load(path: &Path) -> Result<Settings> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {path:?}"))?;
        let mut settings = Self::parse(&content)
            .with_context(|| format!("Invalid settings in {path:?}"))?;
        if let Ok(token) = std::env::var(API_TOKEN_ENV) {
            settings.api_token = token;
        }
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Settings> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !self.hours_per_week.is_finite() || self.hours_per_week < 0. {
            bail!("HOURS_PER_WEEK must be a non-negative number, got {}", self.hours_per_week);
        }
        if !self.crime_factor.is_finite() {
            bail!("CRIME_FACTOR must be a finite number, got {}", self.crime_factor);
        }
        if !self.carry_over.is_finite() {
            bail!("CARRY_OVER must be a finite number, got {}", self.carry_over);
        }
        Ok(())
    }

    /// Location of the checkpoint file. Relative to `application_dir` unless configured.
    pub fn checkpoint_path(&self, application_dir: &Path) -> PathBuf {
        self.cache_file
            .clone()
            .unwrap_or_else(|| application_dir.join(CHECKPOINT_FILE_NAME))
    }
}

/// Template written by `init`.
pub const SETTINGS_TEMPLATE: &str = r#"# Toggl API token. Can also be provided through the TOGGL_API_TOKEN environment variable
API_TOKEN = "<your api token goes here>"

# Date from which to start counting hours, in format 'YYYY-MM-DD'
START_DATE_STRING = "2023-03-01"

# Target hours per week
HOURS_PER_WEEK = 30

# Hours to carry over from before the start date (negative: overtime, positive: undertime)
CARRY_OVER = 0.0

# Fetch time entries until the end of the week (true) or only until now (false).
# Useful if you have entries in the future, like vacations
FETCH_UNTIL_END_OF_WEEK = true

# Toggl data comes in UTC and is converted into this zone for bucketing into weeks
TIMEZONE = "Europe/Berlin"

# Verbose output
V = false

# Format of timestamps in Toggl responses (you shouldn't need to change this)
TIME_FORMAT = "%Y-%m-%dT%H:%M:%S%z"

# Multiply hours tracked before the current week with this factor
CRIME_FACTOR = 1.0
"#;
