//! LaunchDeck - config-driven application launcher
//!
//! Reads `<name>.conf` next to the launcher, keeps generated app icons in
//! `.<name>/`, and lists or starts the configured apps.

mod cli;
mod events;
mod panels;
mod services;

use clap::Parser;
use cli::{Cli, Commands};
use deck_conf::{ConfError, LauncherConfig, LauncherPaths, read_config};
use deck_icons::{FreshnessSignal, RefreshOutcome};
use log::{debug, error, warn};
use panels::app_list;
use services::{icons, launch};
use std::error::Error;
use std::process::ExitCode;

/// Exit status when the configuration is missing or invalid.
const EXIT_CONFIG_INVALID: u8 = 4;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.downcast_ref::<ConfError>().is_some() => {
            error!("Configuration invalid: {}", e);
            eprintln!("Configuration invalid: {}", e);
            ExitCode::from(EXIT_CONFIG_INVALID)
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let paths = match &cli.conf {
        Some(conf) => LauncherPaths::from_conf(conf),
        None => LauncherPaths::from_current_exe()?,
    };
    debug!("Launcher layout: {:?}", paths);

    let config = read_config(&paths.conf_path)?;

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => list(&paths, &config),
        Commands::Refresh { force } => refresh(&paths, &config, force),
        Commands::Status => status(&paths, &config),
        Commands::Launch { index } => {
            let app = index
                .checked_sub(1)
                .and_then(|i| config.apps.get(i))
                .ok_or_else(|| format!("no app number {} (1-{})", index, config.apps.len()))?;
            launch::launch(&paths, app)?;
            Ok(())
        }
    }
}

fn list(paths: &LauncherPaths, config: &LauncherConfig) -> Result<(), Box<dyn Error>> {
    let (engine, rx) = icons::create_engine(paths);

    // Icon failures only cost a row its icon
    if let Err(report) = icons::refresh(&engine, &rx, paths, config) {
        warn!("{}", report);
    }

    let rows = app_list::build_rows(paths, config, &engine);
    let window_icon = engine.window_icon(&config.window_icon);
    print!(
        "{}",
        app_list::render(&config.title, window_icon.as_deref(), &rows)
    );
    Ok(())
}

fn refresh(
    paths: &LauncherPaths,
    config: &LauncherConfig,
    force: bool,
) -> Result<(), Box<dyn Error>> {
    let (engine, rx) = icons::create_engine(paths);
    if force {
        engine.invalidate()?;
    }

    match icons::refresh(&engine, &rx, paths, config) {
        Ok(RefreshOutcome::UpToDate) => println!("Icon cache is up to date."),
        Ok(RefreshOutcome::Refreshed {
            converted,
            signal_saved,
        }) => {
            println!("Generated {} icons.", converted);
            if !signal_saved {
                println!("Cache metadata could not be saved; the next run will re-check.");
            }
        }
        Err(report) => println!("{}", report),
    }
    Ok(())
}

fn status(paths: &LauncherPaths, config: &LauncherConfig) -> Result<(), Box<dyn Error>> {
    let (engine, _rx) = icons::create_engine(paths);
    let work = engine.worklist(&config.apps, &config.window_icon);
    let stored = engine.store().read_signal();
    let current = FreshnessSignal::of_file(&paths.conf_path);

    println!("Launcher:    {}", paths.name);
    println!("Config:      {}", paths.conf_path.display());
    println!("Cache:       {}", engine.store().dir().display());
    println!("Config time: {}", format_signal(Some(current)));
    println!("Cached for:  {}", format_signal(stored));
    println!(
        "State:       {}",
        if stored == Some(current) { "current" } else { "stale" }
    );

    let missing = engine.missing(&work);
    println!("Icons:       {} expected, {} missing", work.len(), missing.len());
    for path in missing {
        println!("  missing {}", path.display());
    }
    Ok(())
}

fn format_signal(signal: Option<FreshnessSignal>) -> String {
    let Some(signal) = signal else {
        return "never".to_string();
    };

    let secs = signal.as_secs();
    let nanos = (secs.fract() * 1e9) as u32;
    chrono::DateTime::from_timestamp(secs.trunc() as i64, nanos)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| format!("{}", secs))
}
