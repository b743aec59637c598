//! fanscan - concurrent recursive filename scanner
//!
//! Entry point for the CLI application.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use fanscan::{FanscanError, Results};
use tracing::error;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Find files (and optionally directories) whose names match a pattern.
#[derive(Parser, Debug)]
#[command(
    name = "fanscan",
    version,
    about = "Concurrent recursive filename scanner",
    long_about = "Walks a directory tree in parallel and prints every path whose name matches \
                  one of the given patterns, followed by scan statistics.\n\n\
                  Patterns are DOS-style wildcards (* and ?) matched case-insensitively \
                  against the whole file name, or regular expressions with --regex.",
    after_help = "EXAMPLES:\n    \
        fanscan '*.log'\n    \
        fanscan -p /var '*.log' '*.gz'\n    \
        fanscan -r -p ~/src '^test_.*\\.rs$'\n    \
        fanscan -d -p /srv '*/backup*' -s"
)]
struct Cli {
    /// Patterns to match (wildcards unless --regex)
    #[arg(value_name = "PATTERN", required = true)]
    patterns: Vec<String>,

    /// Treat patterns as regular expressions
    #[arg(short, long)]
    regex: bool,

    /// Match and report directories too (patterns then see full paths)
    #[arg(short = 'd', long)]
    include_dirs: bool,

    /// Don't print statistics after the matches
    #[arg(short = 's', long)]
    no_stats: bool,

    /// Directory to scan
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    path: PathBuf,

    /// Number of worker threads
    #[arg(
        short,
        long,
        env = "FANSCAN_THREADS",
        default_value_t = fanscan::num_cpus(),
        value_name = "NUM"
    )]
    threads: usize,

    /// Matched paths per output write
    #[arg(
        long,
        env = "FANSCAN_BATCH_SIZE",
        default_value_t = fanscan::sink::DEFAULT_BATCH_SIZE,
        value_name = "NUM"
    )]
    batch_size: usize,

    /// Log skipped directories and timing to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version land here too and are not failures
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    setup_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let outcome = fanscan::search()
        .root(&cli.path)
        .patterns(cli.patterns)
        .regex(cli.regex)
        .include_dirs(cli.include_dirs)
        .threads(cli.threads)
        .batch_size(cli.batch_size)
        .output(io::stdout())
        .run();

    let results = match outcome {
        Ok(results) => results,
        // Reader went away (e.g. piped into `head`); nothing left to say
        Err(FanscanError::Output(e)) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("search of {} failed", cli.path.display())))
        }
    };

    if !cli.no_stats {
        let printed = print_summary(&mut io::stdout().lock(), &results);
        quiet_broken_pipe(printed).context("failed to print statistics")?;
    }

    Ok(())
}

/// A reader that went away (e.g. `| head`) is not an error worth reporting.
fn quiet_broken_pipe(res: io::Result<()>) -> io::Result<()> {
    match res {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn print_summary(out: &mut impl Write, results: &Results) -> io::Result<()> {
    let s = &results.stats;

    writeln!(out)?;
    writeln!(out, "Files scanned:       {}", s.files_scanned)?;
    writeln!(out, "Directories scanned: {}", s.directories_scanned)?;
    writeln!(out, "Bytes scanned:       {}", s.total_bytes_scanned)?;
    writeln!(out, "Matches:             {}", s.match_count)?;
    writeln!(out, "Matched bytes:       {}", s.match_bytes_total)?;
    if s.directories_skipped > 0 {
        writeln!(out, "Directories skipped: {}", s.directories_skipped)?;
    }
    writeln!(
        out,
        "Elapsed:             {:.3}s ({} entries/s)",
        results.timing.duration.as_secs_f64(),
        results.timing.entries_per_sec
    )?;
    out.flush()
}

fn setup_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), verbose))
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// `RUST_LOG` (or `warn`), with `fanscan=debug` layered on top for `-v`.
fn log_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    let mut filter = rust_log
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    if verbose {
        if let Ok(directive) = "fanscan=debug".parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}
