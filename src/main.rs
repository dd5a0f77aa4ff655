use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use dutrail::cli::{BrowseArgs, Cli, Command, HistoryArgs, RecordArgs};
use dutrail::config::Config;
use dutrail::logging::{self, LogTarget};
use dutrail::platform::{self, MountTable};
use dutrail::recorder::Recorder;
use dutrail::report::{self, history::HistoryReport, ReportOptions};
use dutrail::store::Store;
use dutrail::util;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("could not load configuration")?;

    match cli.command {
        Command::Record(args) => record(&config, args),
        Command::Browse(args) => browse(&config, args),
        Command::History(args) => history(&config, args),
    }
}

fn open_store(config: &Config) -> Result<Store> {
    Store::open(&config.db_path)
        .with_context(|| format!("could not open snapshot store {}", config.db_path.display()))
}

/// Explicit path, or the working directory when none was given.
fn resolve_start(path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p,
        None => std::env::current_dir().context("could not read current directory")?,
    };
    path.canonicalize()
        .with_context(|| format!("could not resolve {}", path.display()))
}

fn record(config: &Config, args: RecordArgs) -> Result<()> {
    logging::init(args.verbose, config.log_level.as_deref(), LogTarget::Stderr)?;

    let targets = if args.paths.is_empty() {
        vec![std::env::current_dir().context("could not read current directory")?]
    } else {
        args.paths
    };

    let store = open_store(config)?;
    let recorder = Recorder::new(&store, MountTable::load());
    let result = recorder.run(&targets).context("recording failed")?;

    if !platform::is_unattended() {
        report::print(
            &result,
            &ReportOptions {
                json: args.json,
                verbose: args.verbose,
            },
        );
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn browse(config: &Config, args: BrowseArgs) -> Result<()> {
    use dutrail::browse::{ui, Navigator};

    let store = open_store(config)?;
    let target = if args.verbose {
        LogTarget::File(config.log_path())
    } else {
        LogTarget::Sink
    };
    logging::init(args.verbose, config.log_level.as_deref(), target)?;

    let start = resolve_start(args.path)?;

    // real sizes are applied from the terminal before the first draw
    let navigator = Navigator::new(store, start, 1, 1);
    ui::run(navigator).context("terminal error")?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn browse(_config: &Config, _args: BrowseArgs) -> Result<()> {
    anyhow::bail!("this build of dutrail was compiled without the `tui` feature")
}

fn history(config: &Config, args: HistoryArgs) -> Result<()> {
    logging::init(false, config.log_level.as_deref(), LogTarget::Stderr)?;

    let cwd = std::env::current_dir().context("could not read current directory")?;
    let key = path_key(&platform::lookup_path(&args.path, &cwd));

    let store = open_store(config)?;
    let points = match args.since.as_deref() {
        Some(since) => {
            let window = humantime::parse_duration(since)
                .with_context(|| format!("invalid --since duration '{since}'"))?;
            let window = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
            store.history_since(&key, util::now_timestamp().saturating_sub(window))
        }
        None => store.history(&key),
    }
    .with_context(|| format!("could not read history for {key}"))?;

    let report = HistoryReport::new(key, points);
    if args.json {
        println!("{}", report::json::render(&report));
    } else {
        print!("{}", report::history::render(&report));
    }

    Ok(())
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
