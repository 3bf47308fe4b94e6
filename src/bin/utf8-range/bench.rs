//! UTF-8 validation benchmarking module.
//!
//! Generates each pattern in memory and times every backend available on
//! this CPU, plus `core::str::from_utf8` as the baseline.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use utf8_range::text::range::{validate_with, Backend};

use crate::generators::{generate_utf8, Utf8Pattern};

/// Benchmark result for a single measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub pattern: String,
    pub size: String,
    pub bytes: u64,
    pub implementation: String,
    /// Range backend, absent for the `std` baseline
    pub backend: Option<Backend>,
    pub valid: bool,
    pub wall_time_ms: f64,
    pub throughput_mib_s: f64,
}

/// Configuration for the benchmark
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub patterns: Vec<Utf8Pattern>,
    /// (label, bytes)
    pub sizes: Vec<(String, usize)>,
    pub warmup_runs: usize,
    pub benchmark_runs: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            patterns: Utf8Pattern::VALID.to_vec(),
            sizes: vec![
                ("1kb".into(), 1024),
                ("64kb".into(), 64 * 1024),
                ("1mb".into(), 1024 * 1024),
                ("16mb".into(), 16 * 1024 * 1024),
            ],
            warmup_runs: 1,
            benchmark_runs: 5,
        }
    }
}

/// One validator under test.
#[derive(Debug, Clone, Copy)]
enum Implementation {
    Range(Backend),
    Std,
}

impl Implementation {
    fn all_available() -> Vec<Self> {
        Backend::ALL
            .into_iter()
            .filter(|b| b.is_available())
            .map(Implementation::Range)
            .chain(std::iter::once(Implementation::Std))
            .collect()
    }

    fn name(self) -> String {
        match self {
            Implementation::Range(b) => b.name().to_string(),
            Implementation::Std => "std".to_string(),
        }
    }

    #[inline]
    fn validate(self, data: &[u8]) -> bool {
        match self {
            Implementation::Range(b) => validate_with(b, data).is_ok(),
            Implementation::Std => core::str::from_utf8(data).is_ok(),
        }
    }
}

/// Run the UTF-8 benchmark suite
pub fn run_benchmark(
    config: &BenchConfig,
    output_jsonl: Option<&Path>,
    output_md: Option<&Path>,
) -> Result<Vec<BenchmarkResult>> {
    let mut results = Vec::new();

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::SeqCst);
        eprintln!("\nInterrupted! Writing partial results...");
    })
    .context("Failed to set Ctrl+C handler")?;

    let implementations = Implementation::all_available();

    eprintln!("Running UTF-8 validation benchmark suite...");
    eprintln!(
        "  Implementations: {}",
        implementations
            .iter()
            .map(|i| i.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!("  Detected backend: {}", Backend::detect());
    eprintln!("  Warmup runs: {}", config.warmup_runs);
    eprintln!("  Benchmark runs: {}", config.benchmark_runs);
    eprintln!();

    let mut jsonl_file = output_jsonl
        .map(|p| {
            std::fs::File::create(p).with_context(|| format!("Failed to create {}", p.display()))
        })
        .transpose()?;

    'outer: for &pattern in &config.patterns {
        for (label, bytes) in &config.sizes {
            let data = generate_utf8(*bytes, pattern, Some(0x5EED));
            log::debug!("generated {} {} ({} bytes)", pattern.name(), label, data.len());

            for &implementation in &implementations {
                if interrupted.load(Ordering::SeqCst) {
                    break 'outer;
                }

                eprint!(
                    "  {:<12} {:>6} {:<9} ",
                    pattern.name(),
                    label,
                    implementation.name()
                );
                std::io::stderr().flush()?;

                let result = measure(implementation, &data, pattern, label, config);
                eprintln!(
                    "{:>10.3}ms {:>10.1} MiB/s{}",
                    result.wall_time_ms,
                    result.throughput_mib_s,
                    if result.valid { "" } else { " [INVALID]" }
                );

                if let Some(ref mut f) = jsonl_file {
                    serde_json::to_writer(&mut *f, &result)?;
                    writeln!(f)?;
                    f.flush()?;
                }

                results.push(result);
            }
        }
    }

    if let Some(md_path) = output_md {
        write_markdown_summary(&results, md_path)?;
    }

    eprintln!();
    eprintln!("Completed {} measurements", results.len());

    Ok(results)
}

fn measure(
    implementation: Implementation,
    data: &[u8],
    pattern: Utf8Pattern,
    label: &str,
    config: &BenchConfig,
) -> BenchmarkResult {
    for _ in 0..config.warmup_runs {
        std::hint::black_box(implementation.validate(std::hint::black_box(data)));
    }

    let mut times = Vec::with_capacity(config.benchmark_runs);
    let mut valid = false;
    for _ in 0..config.benchmark_runs {
        let start = Instant::now();
        valid = std::hint::black_box(implementation.validate(std::hint::black_box(data)));
        times.push(start.elapsed().as_secs_f64() * 1000.0);
    }
    let median = median_ms(&mut times);

    BenchmarkResult {
        pattern: pattern.name().to_string(),
        size: label.to_string(),
        bytes: data.len() as u64,
        implementation: implementation.name(),
        backend: match implementation {
            Implementation::Range(b) => Some(b),
            Implementation::Std => None,
        },
        valid,
        wall_time_ms: median,
        throughput_mib_s: throughput_mib_s(data.len(), median),
    }
}

fn median_ms(times: &mut [f64]) -> f64 {
    if times.is_empty() {
        return 0.0;
    }
    times.sort_by(f64::total_cmp);
    times[times.len() / 2]
}

fn throughput_mib_s(bytes: usize, ms: f64) -> f64 {
    if ms <= 0.0 {
        return f64::INFINITY;
    }
    (bytes as f64 / (1024.0 * 1024.0)) / (ms / 1000.0)
}

/// Write markdown summary: one table per pattern, one column per
/// implementation.
fn write_markdown_summary(results: &[BenchmarkResult], path: &Path) -> Result<()> {
    std::fs::write(path, markdown_summary(results))
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn markdown_summary(results: &[BenchmarkResult]) -> String {
    let mut md = String::new();

    md.push_str("# UTF-8 Validation Benchmark Results\n\n");
    md.push_str("Throughput in MiB/s (median of runs).\n\n");

    let mut implementations: Vec<&str> = Vec::new();
    for r in results {
        if !implementations.contains(&r.implementation.as_str()) {
            implementations.push(&r.implementation);
        }
    }

    let mut patterns: Vec<&str> = Vec::new();
    for r in results {
        if !patterns.contains(&r.pattern.as_str()) {
            patterns.push(&r.pattern);
        }
    }

    for pattern in patterns {
        md.push_str(&format!("## {}\n\n", pattern));
        md.push_str("| Size |");
        for i in &implementations {
            md.push_str(&format!(" {} |", i));
        }
        md.push_str("\n|------|");
        for _ in &implementations {
            md.push_str("------|");
        }
        md.push('\n');

        let mut sizes: Vec<&str> = Vec::new();
        for r in results.iter().filter(|r| r.pattern == pattern) {
            if !sizes.contains(&r.size.as_str()) {
                sizes.push(&r.size);
            }
        }

        for size in sizes {
            md.push_str(&format!("| {} |", size));
            for i in &implementations {
                match results
                    .iter()
                    .find(|r| r.pattern == pattern && r.size == size && r.implementation == *i)
                {
                    Some(r) => md.push_str(&format!(" {:.1} |", r.throughput_mib_s)),
                    None => md.push_str(" - |"),
                }
            }
            md.push('\n');
        }
        md.push('\n');
    }

    md
}
