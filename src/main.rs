//! projsim - Find near-duplicate projects in a directory of submissions.
//!
//! Usage:
//!   projsim compare PARENT    Compare every project pair and print the matrix
//!   projsim projects PARENT   List discovered projects and their files
//!   projsim --help            Show help

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use projsim_analyze::{MatrixBuilder, MatrixConfig, MatrixReport};
use projsim_core::{DiscoveryConfig, DiscoveryMode, FileRules};
use projsim_scan::{Discovery, ProjectFinder};

#[derive(Parser)]
#[command(
    name = "projsim",
    version,
    about = "Find near-duplicate projects by pairwise file similarity",
    long_about = "projsim treats every subdirectory of PARENT as a candidate project, \
                  locates its root, and scores every pair of projects by the content \
                  and timestamps of the files they share."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare every pair of projects
    Compare {
        /// Directory containing one subdirectory per project
        parent: PathBuf,

        /// How project roots are located
        #[arg(short, long, default_value = "marker")]
        mode: ModeArg,

        /// Flag pairs scoring above this percentage (defaults depend on mode)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// TOML file overriding the file filtering rules
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Worker threads for comparison (0 = one per core)
        #[arg(short = 'j', long, default_value = "0")]
        threads: usize,
    },

    /// List discovered projects and their files
    Projects {
        /// Directory containing one subdirectory per project
        parent: PathBuf,

        /// How project roots are located
        #[arg(short, long, default_value = "marker")]
        mode: ModeArg,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// TOML file overriding the file filtering rules
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Root holds pom.xml / build.gradle
    Marker,
    /// Root holds the first HTML page
    Markup,
}

impl From<ModeArg> for DiscoveryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Marker => DiscoveryMode::Marker,
            ModeArg::Markup => DiscoveryMode::Markup,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Compare {
            parent,
            mode,
            threshold,
            format,
            rules,
            threads,
        } => {
            let mode = DiscoveryMode::from(mode);
            let threshold = threshold.unwrap_or_else(|| mode.default_threshold());
            run_compare(&parent, mode, rules.as_deref(), threshold, threads, format)?;
        }
        Command::Projects {
            parent,
            mode,
            format,
            rules,
        } => {
            run_projects(&parent, mode.into(), rules.as_deref(), format)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load filtering rules, falling back to the defaults for missing keys.
fn load_rules(path: Option<&Path>) -> Result<FileRules> {
    let Some(path) = path else {
        return Ok(FileRules::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    let rules: FileRules = toml::from_str(&text)
        .with_context(|| format!("Invalid rules file {}", path.display()))?;
    debug!(path = %path.display(), "Loaded rules file");
    Ok(rules.normalized())
}

/// Discover the projects under `parent`.
fn discover(parent: &Path, mode: DiscoveryMode, rules: Option<&Path>) -> Result<Discovery> {
    let config = DiscoveryConfig::builder()
        .parent(parent)
        .mode(mode)
        .rules(load_rules(rules)?)
        .build()
        .context("Invalid discovery configuration")?;

    eprintln!("Discovering {} projects in {}...", mode, parent.display());

    let discovery = ProjectFinder::new()
        .discover(&config)
        .context("Discovery failed")?;

    eprintln!(
        "Found {} project(s) among {} candidate(s) in {:.2}s",
        discovery.projects.len(),
        discovery.candidates,
        discovery.duration.as_secs_f64()
    );
    if discovery.has_warnings() {
        eprintln!("{} warning(s) during discovery", discovery.warnings.len());
    }

    Ok(discovery)
}

/// Discover projects and print their similarity matrix.
fn run_compare(
    parent: &Path,
    mode: DiscoveryMode,
    rules: Option<&Path>,
    threshold: f64,
    threads: usize,
    format: OutputFormat,
) -> Result<()> {
    let discovery = discover(parent, mode, rules)?;

    let config = MatrixConfig::builder()
        .threads(threads)
        .build()
        .context("Invalid matrix configuration")?;
    let builder = MatrixBuilder::with_config(config);

    let progress = std::io::stderr().is_terminal().then(|| {
        let mut rx = builder.subscribe();
        std::thread::spawn(move || {
            let mut shown = 0;
            loop {
                match rx.blocking_recv() {
                    Ok(update) => {
                        shown = shown.max(update.pairs_compared);
                        eprint!(
                            "\rCompared {}/{} pairs ({:.1} pairs/s)",
                            shown,
                            update.total_pairs,
                            update.pairs_per_second()
                        );
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            if shown > 0 {
                eprintln!();
            }
        })
    });

    let report = builder.build(&discovery.projects);
    drop(builder);
    if let Some(handle) = progress {
        let _ = handle.join();
    }

    match format {
        OutputFormat::Text => print_report(&report, threshold),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Print the matrix grid followed by the flagged pairs.
fn print_report(report: &MatrixReport, threshold: f64) {
    let matrix = &report.matrix;

    println!();
    println!("{}", "─".repeat(70));
    println!(
        " Similarity Matrix ({} projects, {} pairs, {:.2}s)",
        matrix.len(),
        report.pairs.len(),
        report.duration.as_secs_f64()
    );
    println!("{}", "─".repeat(70));
    println!();

    if matrix.is_empty() {
        println!(" No projects found.");
        return;
    }

    let width = matrix
        .names()
        .iter()
        .map(|n| n.len())
        .max()
        .unwrap_or(0)
        .min(24);

    print!(" {:<width$}", "", width = width);
    for j in 0..matrix.len() {
        print!(" {:>8}", format!("[{}]", j + 1));
    }
    println!();

    for (i, name) in matrix.names().iter().enumerate() {
        print!(" {:<width$}", truncate(name, width), width = width);
        for (j, score) in matrix.row(i).unwrap_or_default().iter().enumerate() {
            let flag = if i != j && *score > threshold { "*" } else { " " };
            print!(" {:>7.2}{}", score, flag);
        }
        println!("  [{}]", i + 1);
    }
    println!();

    let flagged = report.pairs_above(threshold);
    if flagged.is_empty() {
        println!(" No pairs above {:.2}%.", threshold);
    } else {
        println!(" Pairs above {:.2}%:", threshold);
        for pair in flagged {
            let note = if pair.is_exact_copy { "  (exact copy)" } else { "" };
            println!(
                "   {:>7.2}%  {} <-> {}{}",
                pair.similarity_percentage, pair.first, pair.second, note
            );
        }
    }

    if !report.warnings.is_empty() {
        println!();
        println!("{} warning(s) during comparison", report.warnings.len());
    }
}

/// Discover projects and list them.
fn run_projects(
    parent: &Path,
    mode: DiscoveryMode,
    rules: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let discovery = discover(parent, mode, rules)?;

    match format {
        OutputFormat::Text => {
            println!();
            for project in &discovery.projects {
                println!("{}", "─".repeat(70));
                println!(
                    " {} - {} files, {}",
                    project.name,
                    project.file_count(),
                    format_size(project.total_size())
                );
                println!(" root: {}", project.root.display());
                println!("{}", "─".repeat(70));
                for file in project.files.values() {
                    println!(
                        "   {:<40} {:>10}  created {}  modified {}",
                        truncate(&file.relative_path, 40),
                        format_size(file.size),
                        format_time(file.timestamps.created),
                        format_time(file.timestamps.modified)
                    );
                }
                println!();
            }

            for warning in &discovery.warnings {
                println!(" warning: {}: {}", warning.path.display(), warning.message);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&discovery)?);
        }
    }

    Ok(())
}

/// Format a timestamp in local time.
fn format_time(time: Option<SystemTime>) -> String {
    match time {
        Some(time) => DateTime::<Local>::from(time)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "unknown".to_string(),
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
