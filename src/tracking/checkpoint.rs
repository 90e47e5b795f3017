use std::{io::ErrorKind, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::utils::time::{date_to_string, week_start_of, DATE_FORMAT};

use super::entities::Checkpoint;

/// Where a loaded [Checkpoint] came from.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckpointOrigin {
    Stored,
    /// Nothing was persisted yet, the default checkpoint is used.
    Missing,
    /// The persisted checkpoint couldn't be read, the default checkpoint is used.
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCheckpoint {
    pub checkpoint: Checkpoint,
    pub origin: CheckpointOrigin,
}

impl LoadedCheckpoint {
    pub fn stored(checkpoint: Checkpoint) -> Self {
        Self {
            checkpoint,
            origin: CheckpointOrigin::Stored,
        }
    }
}

/// Interface for persisting the [Checkpoint] between runs.
#[cfg_attr(test, mockall::automock)]
pub trait CheckpointStore {
    /// Returns the persisted checkpoint or a default one. Never fails, broken checkpoints are
    /// logged and replaced by the default.
    fn load(&self) -> LoadedCheckpoint;

    fn save(&self, checkpoint: Checkpoint) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Stores the checkpoint as a plain text file with 2 lines: the week start date and the
/// accumulated seconds.
pub struct FileCheckpointStore {
    path: PathBuf,
    default_start: NaiveDate,
}

impl FileCheckpointStore {
    /// `default_start` is the configured start date. The default checkpoint starts at the Monday
    /// of its week.
    pub fn new(path: PathBuf, default_start: NaiveDate) -> Self {
        Self {
            path,
            default_start,
        }
    }

    fn default_checkpoint(&self) -> Checkpoint {
        Checkpoint::empty(week_start_of(self.default_start))
    }

    fn read(&self) -> Result<Checkpoint> {
        let content = std::fs::read_to_string(&self.path)?;
        parse_checkpoint(&content)
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self) -> LoadedCheckpoint {
        match self.read() {
            Ok(checkpoint) => {
                debug!("Loaded checkpoint {checkpoint:?} from {:?}", self.path);
                LoadedCheckpoint::stored(checkpoint)
            }
            Err(e) => {
                let not_found = e
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|e| e.kind() == ErrorKind::NotFound);
                let origin = if not_found {
                    debug!("No checkpoint at {:?}", self.path);
                    CheckpointOrigin::Missing
                } else {
                    warn!("Ignoring unreadable checkpoint {:?}: {e:?}", self.path);
                    CheckpointOrigin::Unreadable(format!("{e:#}"))
                };
                LoadedCheckpoint {
                    checkpoint: self.default_checkpoint(),
                    origin,
                }
            }
        }
    }

    fn save(&self, checkpoint: Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, format_checkpoint(&checkpoint))
            .with_context(|| format!("Failed to write checkpoint into {:?}", self.path))?;
        info!("Saved checkpoint {checkpoint:?}");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(_) => {
                info!("Removed checkpoint {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {:?}", self.path)),
        }
    }
}

fn format_checkpoint(checkpoint: &Checkpoint) -> String {
    format!(
        "{}\n{:?}",
        date_to_string(checkpoint.week_start),
        checkpoint.accumulated_seconds
    )
}

fn parse_checkpoint(content: &str) -> Result<Checkpoint> {
    let mut lines = content.lines();
    let date = lines
        .next()
        .ok_or_else(|| anyhow!("Checkpoint is empty"))?
        .trim();
    let seconds = lines
        .next()
        .ok_or_else(|| anyhow!("Checkpoint has no seconds line"))?
        .trim();

    let week_start = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .with_context(|| format!("Invalid checkpoint date {date:?}"))?;
    let accumulated_seconds = seconds
        .parse::<f64>()
        .with_context(|| format!("Invalid checkpoint seconds {seconds:?}"))?;
    if !accumulated_seconds.is_finite() {
        return Err(anyhow!("Checkpoint seconds must be finite, got {seconds}"));
    }

    Ok(Checkpoint::new(week_start, accumulated_seconds))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_file_gives_default() -> Result<()> {
        let dir = tempdir()?;
        // 2023-03-01 is a Wednesday
        let store = FileCheckpointStore::new(dir.path().join("checkpoint"), date(2023, 3, 1));

        let loaded = store.load();

        assert_eq!(loaded.checkpoint, Checkpoint::new(date(2023, 2, 27), 0.));
        assert_eq!(loaded.origin, CheckpointOrigin::Missing);
        Ok(())
    }

    #[test]
    fn save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let store = FileCheckpointStore::new(dir.path().join("checkpoint"), date(2023, 3, 1));

        for seconds in [0., 3600., 1234567.125, 0.1 + 0.2] {
            let saved = Checkpoint::new(date(2023, 4, 3), seconds);
            store.save(saved)?;
            assert_eq!(store.load(), LoadedCheckpoint::stored(saved));
        }
        Ok(())
    }

    #[test]
    fn save_replaces_content() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("checkpoint");
        let store = FileCheckpointStore::new(path.clone(), date(2023, 3, 1));

        store.save(Checkpoint::new(date(2023, 4, 3), 7200.))?;
        store.save(Checkpoint::new(date(2023, 4, 10), 10800.))?;

        assert_eq!(std::fs::read_to_string(path)?, "2023-04-10\n10800.0");
        Ok(())
    }

    #[test]
    fn corrupted_file_gives_default() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("checkpoint");
        let store = FileCheckpointStore::new(path.clone(), date(2023, 3, 6));

        for content in ["", "2023-04-03", "garbage\n12.0", "2023-04-03\nmany", "2023-04-03\nNaN"] {
            std::fs::write(&path, content)?;
            let loaded = store.load();
            assert_eq!(loaded.checkpoint, Checkpoint::new(date(2023, 3, 6), 0.));
            assert!(
                matches!(loaded.origin, CheckpointOrigin::Unreadable(_)),
                "{content:?} gave {:?}",
                loaded.origin
            );
        }
        Ok(())
    }

    #[test]
    fn reads_files_written_with_integer_seconds() -> Result<()> {
        let checkpoint = parse_checkpoint("2023-04-03\n5400\n")?;
        assert_eq!(checkpoint, Checkpoint::new(date(2023, 4, 3), 5400.));
        Ok(())
    }

    #[test]
    fn clear_is_idempotent() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("checkpoint");
        let store = FileCheckpointStore::new(path.clone(), date(2023, 3, 1));

        store.save(Checkpoint::new(date(2023, 4, 3), 60.))?;
        store.clear()?;
        assert!(!path.exists());
        assert_eq!(store.load().origin, CheckpointOrigin::Missing);
        store.clear()?;
        Ok(())
    }
}
