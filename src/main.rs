//! cachesweep - Find, measure and remove cache folders.
//!
//! Usage:
//!   cachesweep [PATH]                    Scan for cache folders (50 MiB and up)
//!   cachesweep scan [PATH] -m 1MB        Scan with a custom threshold
//!   cachesweep favorites list            Show favorite paths
//!   cachesweep favorites add <PATH>      Mark a path as favorite
//!   cachesweep clean <PATH>...           Remove folders
//!   cachesweep clean --all-found <PATH>  Remove every cache folder a scan finds
//!   cachesweep --help                    Show help

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail, eyre};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cachesweep_favorites::{FavoritesStore, default_favorites_path};
use cachesweep_ops::{RemovalEvent, RemovalOptions, RemovalSummary, start_removal};
use cachesweep_scan::{
    CacheScanner, CancellationToken, ScanConfig, ScanEvent, ScanSummary, directory_size,
};

/// Default threshold, matching the interactive front end.
const DEFAULT_MIN_SIZE: &str = "50MB";

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "cachesweep=warn";

#[derive(Parser)]
#[command(
    name = "cachesweep",
    version,
    about = "Find, measure and remove cache folders",
    long_about = "cachesweep finds directories whose name contains \"cache\", measures them, \
                  and lets you remove the ones you do not need.\n\n\
                  Paths marked as favorites are flagged in scan results and can be protected \
                  from removal."
)]
struct Cli {
    /// Path to scan (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Favorites document to use instead of the per-user default
    #[arg(long, global = true, env = "CACHESWEEP_FAVORITES")]
    favorites_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory tree for cache folders
    Scan {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Minimum folder size to report (e.g., "0", "512KB", "50MB", "1GB")
        #[arg(short, long, default_value = DEFAULT_MIN_SIZE)]
        min_size: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Print each directory as it is visited (to stderr)
        #[arg(short, long)]
        progress: bool,

        /// Also list existing favorites the scan did not report
        #[arg(long)]
        with_favorites: bool,
    },

    /// Manage favorite paths
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Remove folders
    Clean {
        /// Folders to remove
        #[arg(required_unless_present = "all_found", conflicts_with = "all_found")]
        paths: Vec<PathBuf>,

        /// Scan this directory and remove every cache folder found
        #[arg(long, value_name = "ROOT")]
        all_found: Option<PathBuf>,

        /// Minimum folder size to remove with --all-found
        #[arg(short, long, default_value = DEFAULT_MIN_SIZE)]
        min_size: String,

        /// Move to the trash instead of deleting permanently
        #[arg(long)]
        trash: bool,

        /// Leave favorite paths in place
        #[arg(long)]
        skip_favorites: bool,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorite paths
    List {
        /// Measure each existing favorite
        #[arg(short, long)]
        sizes: bool,
    },
    /// Mark a path as favorite
    Add { path: PathBuf },
    /// Remove a path from the favorites
    Remove { path: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One scan result as shown to the user.
#[derive(Debug, Serialize)]
struct ScanRow {
    path: PathBuf,
    size_bytes: u64,
    favorite: bool,
}

#[derive(Debug, Serialize)]
struct ScanReport {
    root: PathBuf,
    min_size_bytes: u64,
    folders: Vec<ScanRow>,
    /// Existing favorites that were not among `folders`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    other_favorites: Vec<PathBuf>,
    summary: ScanSummary,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let favorites = open_favorites(cli.favorites_file);
    let favorites = favorites.as_ref();

    match cli.command {
        Some(Command::Scan {
            path,
            min_size,
            format,
            progress,
            with_favorites,
        }) => {
            run_scan(&path, &min_size, format, progress, with_favorites, favorites).await?;
        }
        Some(Command::Favorites { action }) => {
            run_favorites(action, require_favorites(favorites)?).await?;
        }
        Some(Command::Clean {
            paths,
            all_found,
            min_size,
            trash,
            skip_favorites,
        }) => {
            run_clean(paths, all_found, &min_size, trash, skip_favorites, favorites).await?;
        }
        None => {
            run_scan(
                &cli.path,
                DEFAULT_MIN_SIZE,
                OutputFormat::Text,
                false,
                false,
                favorites,
            )
            .await?;
        }
    }

    Ok(())
}

/// Install a stderr subscriber filtered by `RUST_LOG`.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Open the favorites store, or `None` when there is nowhere to keep it.
fn open_favorites(override_path: Option<PathBuf>) -> Option<FavoritesStore> {
    let path = match override_path.or_else(default_favorites_path) {
        Some(path) => path,
        None => {
            tracing::warn!("no application data directory; favorites are unavailable");
            return None;
        }
    };
    tracing::debug!(path = %path.display(), "using favorites file");
    Some(FavoritesStore::open(path))
}

fn require_favorites(favorites: Option<&FavoritesStore>) -> Result<&FavoritesStore> {
    favorites.ok_or_else(|| eyre!("No application data directory; use --favorites-file"))
}

fn scan_config(path: &Path, min_size: &str) -> Result<ScanConfig> {
    ScanConfig::builder()
        .root(path)
        .min_size_bytes(parse_size(min_size)?)
        .build()
        .context("Invalid scan configuration")
}

/// Run a scan to completion and return its matches, largest first.
///
/// Ctrl-C cancels the scan; the rows found so far are still returned.
async fn collect_scan(
    config: ScanConfig,
    show_progress: bool,
    favorites: Option<&FavoritesStore>,
) -> Result<(Vec<ScanRow>, ScanSummary)> {
    let mut handle = CacheScanner::new(config).spawn(CancellationToken::new())?;

    let token = handle.cancellation_token().clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling...");
            token.cancel();
        }
    });

    let mut rows = Vec::new();
    let mut summary = ScanSummary::default();

    while let Some(event) = handle.recv().await {
        match event {
            ScanEvent::Progress(dir) => {
                if show_progress {
                    eprintln!("Scanning: {}", dir.display());
                }
            }
            ScanEvent::Found(info) => {
                let favorite = favorites.is_some_and(|f| f.is_favorite(&info.path));
                rows.push(ScanRow {
                    path: info.path,
                    size_bytes: info.size_bytes,
                    favorite,
                });
            }
            ScanEvent::Finished(s) => summary = s,
        }
    }

    interrupt.abort();
    rows.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));

    Ok((rows, summary))
}

/// Favorites that still exist on disk but are not among `rows`.
fn other_favorites(favorites: Option<&FavoritesStore>, rows: &[ScanRow]) -> Vec<PathBuf> {
    let Some(favorites) = favorites else {
        return Vec::new();
    };
    favorites
        .list()
        .into_iter()
        .map(PathBuf::from)
        .filter(|path| path.exists() && !rows.iter().any(|row| &row.path == path))
        .collect()
}

/// Scan a tree and print the cache folders found.
async fn run_scan(
    path: &Path,
    min_size: &str,
    format: OutputFormat,
    show_progress: bool,
    with_favorites: bool,
    favorites: Option<&FavoritesStore>,
) -> Result<()> {
    let config = scan_config(path, min_size)?;
    let min_size_bytes = config.min_size_bytes;

    if !path.is_dir() {
        eprintln!("{} is not a directory; nothing to scan.", path.display());
    } else {
        eprintln!("Scanning {}...", path.display());
    }

    let (rows, summary) = collect_scan(config, show_progress, favorites).await?;
    let other_favorites = if with_favorites {
        other_favorites(favorites, &rows)
    } else {
        Vec::new()
    };

    let report = ScanReport {
        root: path.to_path_buf(),
        min_size_bytes,
        folders: rows,
        other_favorites,
        summary,
    };

    match format {
        OutputFormat::Text => print_scan_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn print_scan_report(report: &ScanReport) {
    println!();
    println!("{}", "─".repeat(70));
    println!(
        " Cache folders under {} (min {})",
        report.root.display(),
        format_size(report.min_size_bytes)
    );
    println!("{}", "─".repeat(70));
    println!();

    if report.folders.is_empty() {
        println!(" No cache folders found.");
    } else {
        for row in &report.folders {
            println!(
                " {} {:>10}  {}",
                if row.favorite { "★" } else { "☆" },
                format_size(row.size_bytes),
                row.path.display()
            );
        }
    }

    if !report.other_favorites.is_empty() {
        println!();
        println!(" Other favorites:");
        for path in &report.other_favorites {
            println!(" ★ {:>10}  {}", "-", path.display());
        }
    }

    let summary = &report.summary;
    println!();
    println!(
        " {} folders, {} total, scanned in {:.2}s",
        summary.found,
        format_size(summary.bytes_found),
        summary.duration.as_secs_f64()
    );
    if !summary.skipped.is_empty() {
        println!(" {} entries could not be read", summary.skipped.len());
    }
    if summary.cancelled {
        println!(" Scan was cancelled; results are incomplete.");
    }
}

/// Handle `favorites` subcommands.
async fn run_favorites(action: FavoritesAction, favorites: &FavoritesStore) -> Result<()> {
    match action {
        FavoritesAction::List { sizes } => {
            let list = favorites.list();
            if list.is_empty() {
                println!("No favorites ({}).", favorites.path().display());
                return Ok(());
            }

            let sized = tokio::task::spawn_blocking(move || {
                let cancel = CancellationToken::new();
                list.into_iter()
                    .map(|p| {
                        let path = PathBuf::from(&p);
                        let size = (sizes && path.is_dir()).then(|| directory_size(&path, &cancel));
                        (p, path.exists(), size)
                    })
                    .collect::<Vec<_>>()
            })
            .await?;

            for (path, exists, size) in sized {
                let size = size.map(format_size).unwrap_or_default();
                let marker = if exists { "★" } else { "✗" };
                println!(" {} {:>10}  {}", marker, size, path);
            }
        }
        FavoritesAction::Add { path } => {
            let path = resolve_path(&path);
            if favorites.add_favorite(&path)? {
                println!("Added {}", path.display());
            } else {
                println!("{} is already a favorite", path.display());
            }
        }
        FavoritesAction::Remove { path } => {
            let path = resolve_path(&path);
            if favorites.remove_favorite(&path)? {
                println!("Removed {}", path.display());
            } else {
                println!("{} is not a favorite", path.display());
            }
        }
    }

    Ok(())
}

/// Remove folders and report each outcome.
async fn run_clean(
    paths: Vec<PathBuf>,
    all_found: Option<PathBuf>,
    min_size: &str,
    trash: bool,
    skip_favorites: bool,
    favorites: Option<&FavoritesStore>,
) -> Result<()> {
    let protected = if skip_favorites {
        Some(require_favorites(favorites)?)
    } else {
        None
    };
    let options = RemovalOptions { use_trash: trash };

    let summary = match all_found {
        Some(root) => {
            eprintln!("Scanning {}...", root.display());
            clean_all_found(scan_config(&root, min_size)?, protected, options).await?
        }
        None => clean_paths(paths, protected, options).await?,
    };

    if summary.failed > 0 {
        bail!("{} folder(s) could not be removed", summary.failed);
    }
    Ok(())
}

/// Remove the given paths, leaving members of `protected` in place.
async fn clean_paths(
    paths: Vec<PathBuf>,
    protected: Option<&FavoritesStore>,
    options: RemovalOptions,
) -> Result<RemovalSummary> {
    let targets: Vec<PathBuf> = paths
        .iter()
        .map(|path| resolve_path(path))
        .filter(|path| !is_protected(path, protected))
        .collect();

    let items = tokio::task::spawn_blocking(move || {
        let cancel = CancellationToken::new();
        targets
            .into_iter()
            .map(|p| {
                let size = directory_size(&p, &cancel);
                (p, size)
            })
            .collect::<Vec<_>>()
    })
    .await?;

    Ok(remove_and_report(items, options).await)
}

/// Scan with `config` and remove every folder it reports.
///
/// Sizes come from the scan. A cancelled scan removes nothing.
async fn clean_all_found(
    config: ScanConfig,
    protected: Option<&FavoritesStore>,
    options: RemovalOptions,
) -> Result<RemovalSummary> {
    let (rows, summary) = collect_scan(config, false, protected).await?;
    if summary.cancelled {
        bail!("Scan was cancelled; nothing was removed");
    }

    let items = rows
        .into_iter()
        .filter(|row| !is_protected(&row.path, protected))
        .map(|row| (row.path, row.size_bytes))
        .collect();

    Ok(remove_and_report(items, options).await)
}

fn is_protected(path: &Path, protected: Option<&FavoritesStore>) -> bool {
    let skip = protected.is_some_and(|f| f.is_favorite(path));
    if skip {
        println!(" skipped  {} (favorite)", path.display());
    }
    skip
}

async fn remove_and_report(items: Vec<(PathBuf, u64)>, options: RemovalOptions) -> RemovalSummary {
    let mut rx = start_removal(items, options);
    let mut summary = RemovalSummary::default();

    while let Some(event) = rx.recv().await {
        match event {
            RemovalEvent::Progress(_) => {}
            RemovalEvent::Removed(outcome) => {
                if outcome.success {
                    println!(
                        " removed  {} ({})",
                        outcome.path.display(),
                        format_size(outcome.size_bytes)
                    );
                } else {
                    let reason = outcome.error.map(|e| e.message).unwrap_or_default();
                    println!(" failed   {}: {}", outcome.path.display(), reason);
                }
            }
            RemovalEvent::Complete(done) => {
                println!();
                println!("{}", done.summary());
                summary = done;
            }
        }
    }

    summary
}

/// Absolute form of `path` without resolving links or adding a verbatim prefix.
fn resolve_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a size string (e.g., "0", "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();

    let (digits, multiplier) = if let Some(n) = s.strip_suffix("GB").or_else(|| s.strip_suffix('G')) {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB").or_else(|| s.strip_suffix('M')) {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB").or_else(|| s.strip_suffix('K')) {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };

    let num: f64 = digits
        .trim()
        .parse()
        .with_context(|| format!("Invalid size: {s}"))?;
    if !num.is_finite() {
        bail!("Size must be a finite number: {s}");
    }
    if num < 0.0 {
        bail!("Size cannot be negative: {s}");
    }

    Ok((num * multiplier as f64) as u64)
}
