pub mod report;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use report::{progress_rows, render_aligned};
use tracing::{info, level_filters::LevelFilter};

use crate::{
    settings::{Settings, SETTINGS_FILE_NAME, SETTINGS_TEMPLATE},
    toggl::client::TogglClient,
    tracking::{
        checkpoint::{CheckpointStore, FileCheckpointStore},
        compute_progress, ProgressRun,
    },
    utils::{
        clock::DefaultClock, dir::create_application_default_path, logging::enable_logging,
        time::{format_hours, next_week_start},
    },
};

#[derive(Parser, Debug)]
#[command(name = "weekly-target", version, long_about = None)]
#[command(about = "Shows how many hours are left to reach the weekly target", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(
        long,
        global = true,
        help = "Settings file. By default settings.toml in $XDG_STATE_HOME/weekly-target or $HOME/.local/state/weekly-target"
    )]
    config: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Print intermediate values of the computation")]
    verbose: bool,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Print progress of the current week. This is the default command")]
    Report,
    #[command(about = "Write a settings template")]
    Init {
        #[arg(long, help = "Overwrite existing settings")]
        force: bool,
    },
    #[command(about = "Forget accumulated history, so that the next report sums everything since the start date")]
    Reset,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = create_application_default_path()?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&app_dir.join("logs"), logging_level, args.log)?;

    let settings_path = args
        .config
        .clone()
        .unwrap_or_else(|| app_dir.join(SETTINGS_FILE_NAME));

    match args.commands.unwrap_or(Commands::Report) {
        Commands::Init { force } => write_template(&settings_path, force),
        Commands::Reset => {
            let settings = Settings::load(&settings_path)?;
            checkpoint_store(&settings, &app_dir).clear()?;
            println!("Cache cleared");
            Ok(())
        }
        Commands::Report => {
            let mut settings = Settings::load(&settings_path)?;
            settings.verbose |= args.verbose;
            print_report(&settings, &app_dir).await
        }
    }
}

fn checkpoint_store(settings: &Settings, app_dir: &Path) -> FileCheckpointStore {
    FileCheckpointStore::new(settings.checkpoint_path(app_dir), settings.start_date)
}

fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("Settings already exist at {path:?}. Use --force to overwrite them");
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, SETTINGS_TEMPLATE)?;
    info!("Wrote settings template into {path:?}");
    println!("Settings written to {}", path.display());
    Ok(())
}

async fn print_report(settings: &Settings, app_dir: &Path) -> Result<()> {
    let source = TogglClient::from_settings(settings)?;
    let store = checkpoint_store(settings, app_dir);

    let run = compute_progress(settings, &source, &store, &DefaultClock).await?;

    if settings.verbose {
        print_diagnostics(settings, &run);
    }
    print!("{}", render_aligned(&progress_rows(&run.progress)));
    Ok(())
}

fn print_diagnostics(settings: &Settings, run: &ProgressRun) {
    let progress = &run.progress;
    let next_monday = next_week_start(progress.this_week_start);
    println!("Fetched {} time entries", run.entry_count);
    println!(
        "Weeks between start monday ({}) and next monday ({next_monday}): {} weeks",
        progress.target_start_week, progress.weeks
    );
    println!(
        "Target hours for {} weeks à {} hours per week: {} hours",
        progress.weeks, settings.hours_per_week, progress.target_hours
    );
    println!("########################");
    println!(
        "Tracked hours since {}: {}",
        run.checkpoint.week_start,
        format_hours(progress.finished_hours)
    );
    if progress.running_hours != 0. {
        println!("Current duration: {}", format_hours(progress.running_hours));
        println!(
            "Tracked hours (including current duration): {}",
            format_hours(progress.total_tracked_hours)
        );
    }
    println!("########################");
}
