//! utf8-range CLI: validate files, generate test corpora, run benchmarks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod bench;
mod generators;
mod validate;

#[derive(Debug, Parser)]
#[command(name = "utf8-range")]
#[command(about = "Range-table UTF-8 validation toolkit", long_about = None)]
#[command(version)]
struct Cli {
    /// Log diagnostics to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate files (or stdin) for UTF-8 compliance
    Validate(validate::ValidateArgs),
    /// Generate synthetic UTF-8 text for benchmarking and testing
    Generate(GenerateArgs),
    /// Benchmark every available backend against core::str::from_utf8
    Bench(BenchArgs),
}

/// Generate synthetic UTF-8 text
#[derive(Debug, Parser)]
struct GenerateArgs {
    /// Size of text to generate (supports b, kb, mb, gb - case insensitive)
    /// Examples: 1024, 1kb, 512MB, 2Gb
    #[arg(value_parser = parse_size)]
    size: usize,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text pattern to generate
    #[arg(short, long, default_value = "mixed")]
    pattern: PatternArg,

    /// Random seed for reproducible generation
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PatternArg {
    /// Pure ASCII prose
    Ascii,
    /// Latin words with accents (2-byte sequences)
    Latin,
    /// Chinese/Japanese/Korean (3-byte sequences)
    Cjk,
    /// Emoji (4-byte sequences)
    Emoji,
    /// Prose with occasional non-ASCII (default)
    Mixed,
    /// Uniform mix of 1-4 byte sequences
    AllLengths,
    /// Log lines, mostly ASCII
    LogFile,
    /// Invalid: a 3-byte sequence cut short
    Truncated,
    /// Invalid: an encoded UTF-16 surrogate
    Surrogate,
    /// Invalid: an overlong 3-byte encoding
    Overlong,
    /// Invalid: a code point above U+10FFFF
    OutOfRange,
}

impl From<PatternArg> for generators::Utf8Pattern {
    fn from(arg: PatternArg) -> Self {
        use generators::Utf8Pattern as P;
        match arg {
            PatternArg::Ascii => P::Ascii,
            PatternArg::Latin => P::Latin,
            PatternArg::Cjk => P::Cjk,
            PatternArg::Emoji => P::Emoji,
            PatternArg::Mixed => P::Mixed,
            PatternArg::AllLengths => P::AllLengths,
            PatternArg::LogFile => P::LogFile,
            PatternArg::Truncated => P::Truncated,
            PatternArg::Surrogate => P::Surrogate,
            PatternArg::Overlong => P::Overlong,
            PatternArg::OutOfRange => P::OutOfRange,
        }
    }
}

/// Benchmark validation throughput
#[derive(Debug, Parser)]
struct BenchArgs {
    /// Input sizes to benchmark (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "1kb,64kb,1mb,16mb")]
    sizes: Vec<String>,

    /// Patterns to benchmark (comma separated, defaults to every valid pattern)
    #[arg(long, value_delimiter = ',')]
    patterns: Vec<PatternArg>,

    /// Warmup runs per measurement
    #[arg(long, default_value = "1")]
    warmup: usize,

    /// Timed runs per measurement (the median is reported)
    #[arg(long, default_value = "5")]
    runs: usize,

    /// Stream results as JSON lines to this file
    #[arg(long)]
    jsonl: Option<PathBuf>,

    /// Write a markdown summary to this file
    #[arg(long)]
    markdown: Option<PathBuf>,
}

/// Parse size string like "1mb", "512KB", "2GB", "1024" (case insensitive)
fn parse_size(s: &str) -> Result<usize, String> {
    let s = s.trim().to_lowercase();

    if let Ok(bytes) = s.parse::<usize>() {
        return Ok(bytes);
    }

    let (num_str, unit) = if let Some(n) = s.strip_suffix("gb") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("mb") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("kb") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('b') {
        (n, 1)
    } else {
        return Err(format!(
            "Invalid size format: '{}'. Use format like '1mb', '512KB', or '1024'",
            s
        ));
    };

    num_str
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(unit))
        .ok_or_else(|| format!("Invalid number in size: '{}'", s))
}

/// Minimal stderr sink for the `log` facade.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => return,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Validate(args) => {
            let code = validate::run(args)?;
            std::process::exit(code);
        }
        Command::Generate(args) => {
            let text = generators::generate_utf8(args.size, args.pattern.into(), args.seed);

            match args.output {
                Some(path) => {
                    std::fs::write(&path, &text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("✓ Wrote {} bytes to {}", text.len(), path.display());
                }
                None => {
                    use std::io::Write;
                    let stdout = std::io::stdout();
                    let mut lock = stdout.lock();
                    lock.write_all(&text).context("Failed to write to stdout")?;
                    lock.flush()?;
                }
            }
            Ok(())
        }
        Command::Bench(args) => {
            let defaults = bench::BenchConfig::default();
            let sizes = args
                .sizes
                .iter()
                .map(|s| parse_size(s).map(|bytes| (s.clone(), bytes)))
                .collect::<Result<Vec<_>, _>>()
                .map_err(anyhow::Error::msg)?;
            let patterns = if args.patterns.is_empty() {
                defaults.patterns
            } else {
                args.patterns.into_iter().map(Into::into).collect()
            };
            let config = bench::BenchConfig {
                patterns,
                sizes,
                warmup_runs: args.warmup,
                benchmark_runs: args.runs.max(1),
            };
            bench::run_benchmark(&config, args.jsonl.as_deref(), args.markdown.as_deref())?;
            Ok(())
        }
    }
}
