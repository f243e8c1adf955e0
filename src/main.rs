//! dirtally - directory tree statistics.
//!
//! Usage:
//!   dirtally --dir PATH [--dir PATH ...]      Scan trees
//!   dirtally --group-dir PATH                 Scan each subdirectory of PATH separately
//!   dirtally --roots roots.json               Scan roots listed in a JSON file
//!   dirtally --patterns rules.txt --dir PATH  Also report entries matching rules
//!   dirtally --help                           Show help

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use clap::Parser;
use color_eyre::eyre::{Context, Result, bail};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use dirtally_core::DEFAULT_LONG_PATH_THRESHOLD;
use dirtally_pattern::{PatternFileLoader, PatternSet};
use dirtally_scan::{ScanConfig, ScanOrchestrator, ScanProgress, ScanReport, ScanRoot, Tag};

#[derive(Parser)]
#[command(
    name = "dirtally",
    version,
    about = "Tally size, age, extension and pattern statistics for directory trees",
    long_about = "dirtally walks one or more directory trees and reports, per root, total \
                  size, file and directory counts, the largest file, overly long paths, \
                  unreadable directories, per-extension totals, created/modified age \
                  histograms and entries matching user-supplied patterns.\n\n\
                  Results are written as JSON."
)]
struct Cli {
    /// Directory to scan as one tree (repeatable)
    #[arg(short = 'd', long = "dir", value_name = "PATH")]
    dirs: Vec<PathBuf>,

    /// Directory whose immediate subdirectories are scanned as separate roots (repeatable)
    #[arg(short = 'g', long = "group-dir", value_name = "PATH")]
    group_dirs: Vec<PathBuf>,

    /// JSON file with a list of roots ({"path", "expand_children", "tags"})
    #[arg(long = "roots", value_name = "FILE")]
    roots_file: Option<PathBuf>,

    /// Tag attached to every --dir and --group-dir root (repeatable)
    #[arg(short = 't', long = "tag", value_name = "NAME=VALUE")]
    tags: Vec<Tag>,

    /// Pattern rule file
    #[arg(short = 'p', long, value_name = "FILE")]
    patterns: Option<PathBuf>,

    /// Report paths longer than this many characters
    #[arg(short = 'l', long = "long-path", default_value_t = DEFAULT_LONG_PATH_THRESHOLD)]
    long_path: usize,

    /// Skip the created/modified age histograms
    #[arg(long)]
    no_age: bool,

    /// Skip the per-extension table
    #[arg(long)]
    no_extensions: bool,

    /// Only files matched by a pattern feed the extension table
    #[arg(long)]
    extensions_matched_only: bool,

    /// Descend through symbolic links to directories
    #[arg(long)]
    follow_symlinks: bool,

    /// Roots scanned concurrently (0 = one per CPU)
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,

    /// Output file (defaults to stdout); written atomically
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write compact instead of pretty-printed JSON
    #[arg(long)]
    compact: bool,

    /// Log progress while scanning
    #[arg(long)]
    progress: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();

    let config = ScanConfig::builder()
        .long_path_threshold(cli.long_path)
        .age_analysis(!cli.no_age)
        .extension_analysis(!cli.no_extensions)
        .extensions_for_matches_only(cli.extensions_matched_only)
        .follow_symlinks(cli.follow_symlinks)
        .threads(cli.threads)
        .build()
        .context("Invalid configuration")?;

    let roots = collect_roots(&cli)?;

    let patterns = match &cli.patterns {
        Some(path) => PatternFileLoader::load(path)
            .with_context(|| format!("Invalid pattern file {}", path.display()))?,
        None => PatternSet::new(),
    };

    let orchestrator = ScanOrchestrator::new(config, patterns).context("Invalid configuration")?;
    let progress_logger = cli
        .progress
        .then(|| spawn_progress_logger(orchestrator.subscribe()));

    let reports = orchestrator.run(&roots).context("Scan failed")?;

    // Dropping the orchestrator closes the progress channel.
    drop(orchestrator);
    if let Some(handle) = progress_logger {
        if handle.join().is_err() {
            warn!("progress logger thread panicked");
        }
    }

    let json = if cli.compact {
        serde_json::to_string(&reports)?
    } else {
        serde_json::to_string_pretty(&reports)?
    };

    match &cli.output {
        Some(path) => {
            write_atomically(path, json.as_bytes())?;
            print_summary(&reports);
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Install the stderr log subscriber, filtered by `DIRTALLY_LOG`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("DIRTALLY_LOG").unwrap_or_else(|_| EnvFilter::new("dirtally=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Gather roots from the roots file and the command line, in that order.
fn collect_roots(cli: &Cli) -> Result<Vec<ScanRoot>> {
    let mut roots = Vec::new();

    if let Some(path) = &cli.roots_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read roots file {}", path.display()))?;
        let listed: Vec<ScanRoot> = serde_json::from_str(&text)
            .with_context(|| format!("Invalid roots file {}", path.display()))?;
        roots.extend(listed);
    }

    roots.extend(cli.dirs.iter().map(|path| ScanRoot {
        path: path.clone(),
        expand_children: false,
        tags: cli.tags.clone(),
    }));
    roots.extend(cli.group_dirs.iter().map(|path| ScanRoot {
        path: path.clone(),
        expand_children: true,
        tags: cli.tags.clone(),
    }));

    if roots.is_empty() {
        bail!("Nothing to scan: pass --dir, --group-dir or --roots");
    }
    for root in &roots {
        root.validate().context("Invalid root")?;
    }

    Ok(roots)
}

/// Log progress snapshots until the channel closes.
fn spawn_progress_logger(mut rx: broadcast::Receiver<ScanProgress>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        loop {
            match rx.blocking_recv() {
                Ok(progress) => info!(
                    root = %progress.root.display(),
                    files = progress.files_scanned,
                    dirs = progress.dirs_scanned,
                    bytes = progress.bytes_scanned,
                    failures = progress.failures,
                    files_per_sec = progress.files_per_second() as u64,
                    finished = progress.finished,
                    "progress"
                ),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Write `contents` to a temporary file beside `path`, then rename it over
/// `path`. A failure leaves any existing file untouched.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Cannot create temporary file in {}", dir.display()))?;
    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .with_context(|| format!("Cannot write {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("Cannot replace {}", path.display()))?;
    Ok(())
}

/// Print a one-line summary per root.
fn print_summary(reports: &[ScanReport]) {
    for report in reports {
        let unreadable = if report.has_failures() {
            format!(", {} unreadable", report.failed_directories.len())
        } else {
            String::new()
        };
        eprintln!(
            " {} - {} in {} files, {} directories{} ({})",
            report.root.path.display(),
            format_size(report.total_size),
            report.file_count,
            report.directory_count,
            unreadable,
            report.scan_duration
        );
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
