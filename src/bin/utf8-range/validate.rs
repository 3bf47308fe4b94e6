//! CLI handler for the `validate` command.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use utf8_range::text::range::{validate_with, Backend};
use utf8_range::text::utf8::{validate_utf8_scalar, Utf8Error, Utf8ErrorKind};

/// Validate text files for UTF-8 compliance.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Input files to validate (reads from stdin if none provided)
    #[arg(trailing_var_arg = true)]
    pub files: Vec<PathBuf>,

    /// Quiet mode: exit code only, no output
    #[arg(short, long)]
    pub quiet: bool,

    /// Force color output even when not a TTY
    #[arg(short = 'C', long = "color")]
    pub color: bool,

    /// Disable color output
    #[arg(short = 'M', long = "no-color")]
    pub no_color: bool,

    /// Memory-map files instead of reading them
    #[arg(long)]
    pub mmap: bool,

    /// Validation backend
    #[arg(long, default_value = "auto")]
    pub backend: BackendArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackendArg {
    /// Best backend for this CPU
    Auto,
    /// Scalar state machine
    Scalar,
    /// Portable lane emulation
    Portable,
    /// x86_64 SSSE3
    Ssse3,
    /// aarch64 NEON
    Neon,
}

impl BackendArg {
    fn resolve(self) -> Backend {
        match self {
            Self::Auto => Backend::detect(),
            Self::Scalar => Backend::Scalar,
            Self::Portable => Backend::Portable,
            Self::Ssse3 => Backend::Ssse3,
            Self::Neon => Backend::Neon,
        }
    }
}

/// Exit codes for the validate command.
pub mod exit_codes {
    /// UTF-8 is valid.
    pub const SUCCESS: i32 = 0;
    /// UTF-8 is invalid (validation error).
    pub const INVALID: i32 = 1;
    /// I/O error (file not found, permission denied, etc.).
    pub const IO_ERROR: i32 = 2;
}

mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const ERROR: &str = "\x1b[1;31m";
    pub const LOCATION: &str = "\x1b[1;34m";
    pub const LINE_NUM: &str = "\x1b[0;34m";
    pub const CARET: &str = "\x1b[1;32m";
    pub const MESSAGE: &str = "\x1b[0;33m";
}

/// Color scheme that can be disabled.
struct ColorScheme {
    error: &'static str,
    location: &'static str,
    line_num: &'static str,
    caret: &'static str,
    message: &'static str,
    reset: &'static str,
}

impl ColorScheme {
    fn new(use_color: bool) -> Self {
        if use_color {
            Self {
                error: colors::ERROR,
                location: colors::LOCATION,
                line_num: colors::LINE_NUM,
                caret: colors::CARET,
                message: colors::MESSAGE,
                reset: colors::RESET,
            }
        } else {
            Self {
                error: "",
                location: "",
                line_num: "",
                caret: "",
                message: "",
                reset: "",
            }
        }
    }
}

/// Bytes of one input, either owned or mapped.
enum Input {
    Owned(Vec<u8>),
    Mapped(memmap2::Mmap),
}

impl std::ops::Deref for Input {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Input::Owned(v) => v,
            Input::Mapped(m) => m,
        }
    }
}

fn load(path: &Path, mmap: bool) -> io::Result<Input> {
    if mmap {
        let file = File::open(path)?;
        // SAFETY: the map is read-only and dropped before the command returns;
        // concurrent truncation by another process is outside our control
        let map = unsafe { memmap2::Mmap::map(&file)? };
        Ok(Input::Mapped(map))
    } else {
        fs::read(path).map(Input::Owned)
    }
}

/// Run the validate command.
pub fn run(args: ValidateArgs) -> Result<i32> {
    let use_color = if args.no_color {
        false
    } else if args.color {
        true
    } else {
        atty::is(atty::Stream::Stderr)
    };
    let scheme = ColorScheme::new(use_color);

    let backend = args.backend.resolve();
    if !backend.is_available() {
        log::warn!("{} backend unavailable on this CPU, using portable", backend);
    }
    log::debug!("validating with {} backend", backend);

    if args.files.is_empty() {
        let mut input = Vec::new();
        io::stdin()
            .read_to_end(&mut input)
            .context("failed to read from stdin")?;

        return Ok(validate_input(&input, None, backend, &args, &scheme));
    }

    let mut any_invalid = false;
    let mut any_io_error = false;

    for path in &args.files {
        match load(path, args.mmap) {
            Ok(input) => {
                let filename = path.to_string_lossy();
                let code = validate_input(&input, Some(&filename), backend, &args, &scheme);
                if code == exit_codes::INVALID {
                    any_invalid = true;
                }
            }
            Err(e) => {
                any_io_error = true;
                if !args.quiet {
                    eprintln!(
                        "{}error{}: {}: {}",
                        scheme.error,
                        scheme.reset,
                        path.display(),
                        e
                    );
                }
            }
        }
    }

    Ok(if any_io_error {
        exit_codes::IO_ERROR
    } else if any_invalid {
        exit_codes::INVALID
    } else {
        exit_codes::SUCCESS
    })
}

/// Validate a single input and print errors.
fn validate_input(
    input: &[u8],
    filename: Option<&str>,
    backend: Backend,
    args: &ValidateArgs,
    scheme: &ColorScheme,
) -> i32 {
    if validate_with(backend, input).is_ok() {
        return exit_codes::SUCCESS;
    }
    if args.quiet {
        return exit_codes::INVALID;
    }

    match validate_utf8_scalar(input) {
        Err(err) => print_error(&err, input, filename, scheme),
        Ok(()) => {
            log::warn!("{} backend rejected input the scalar scan accepts", backend);
            eprintln!(
                "{}error{}: {}: invalid UTF-8 encoding",
                scheme.error,
                scheme.reset,
                filename.unwrap_or("<stdin>")
            );
        }
    }
    exit_codes::INVALID
}

/// Print a rustc-style report with the offending line and a caret.
fn print_error(err: &Utf8Error, input: &[u8], filename: Option<&str>, scheme: &ColorScheme) {
    eprintln!(
        "{}error{}: {}",
        scheme.error,
        scheme.reset,
        describe(err.kind, input.get(err.offset).copied())
    );

    eprintln!(
        "  {}--> {}:{}:{}{}",
        scheme.location,
        filename.unwrap_or("<stdin>"),
        err.line,
        err.column,
        scheme.reset
    );

    let snippet = error_snippet(input, err.offset, err.column);
    let line_num_width = err.line.to_string().len().max(3);
    let blank_padding = " ".repeat(line_num_width + 2);

    eprintln!("{}{}|{}", blank_padding, scheme.line_num, scheme.reset);
    eprintln!(
        " {}{:>width$}{} {}|{} {}",
        scheme.line_num,
        err.line,
        scheme.reset,
        scheme.line_num,
        scheme.reset,
        snippet.line_content,
        width = line_num_width
    );
    eprintln!(
        "{}{}|{} {}{}^{}{}",
        blank_padding,
        scheme.line_num,
        scheme.reset,
        " ".repeat(snippet.caret_offset),
        scheme.caret,
        scheme.reset,
        hint(err.kind)
            .map(|h| format!(" {}{}{}", scheme.message, h, scheme.reset))
            .unwrap_or_default()
    );
    eprintln!();
}

fn describe(kind: Utf8ErrorKind, byte: Option<u8>) -> String {
    match (kind, byte) {
        (Utf8ErrorKind::InvalidLeadByte | Utf8ErrorKind::InvalidContinuationByte, Some(b)) => {
            format!("{} (byte 0x{:02X})", kind, b)
        }
        (Utf8ErrorKind::TruncatedSequence, _) => format!("{} at end of input", kind),
        _ => kind.to_string(),
    }
}

fn hint(kind: Utf8ErrorKind) -> Option<&'static str> {
    match kind {
        Utf8ErrorKind::InvalidLeadByte => Some("bytes 0x80-0xBF are continuation bytes"),
        Utf8ErrorKind::InvalidContinuationByte => Some("expected byte 0x80-0xBF"),
        Utf8ErrorKind::OverlongEncoding => Some("use shortest possible encoding"),
        Utf8ErrorKind::SurrogateCodepoint => Some("U+D800-U+DFFF are reserved for UTF-16"),
        Utf8ErrorKind::OutOfRangeCodepoint => Some("maximum is U+10FFFF"),
        Utf8ErrorKind::TruncatedSequence => None,
    }
}

/// The line containing an error, ready for display.
#[derive(Debug, PartialEq)]
struct ErrorSnippet {
    line_content: String,
    /// Display columns before the caret.
    caret_offset: usize,
}

const MAX_SNIPPET_CHARS: usize = 80;

/// Extract the line around `offset`, lossily decoded and clipped to
/// [`MAX_SNIPPET_CHARS`] characters around the error.
fn error_snippet(input: &[u8], offset: usize, column: usize) -> ErrorSnippet {
    let line_start = offset + 1 - column;
    let line_end = input[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(input.len(), |i| offset + i);

    let before = String::from_utf8_lossy(&input[line_start..offset]);
    let rest = String::from_utf8_lossy(&input[offset..line_end]);
    let chars: Vec<char> = before.chars().chain(rest.chars()).collect();
    let error_col = before.chars().count();

    if chars.len() <= MAX_SNIPPET_CHARS {
        return ErrorSnippet {
            line_content: chars.into_iter().collect(),
            caret_offset: error_col,
        };
    }

    let start = error_col
        .saturating_sub(MAX_SNIPPET_CHARS / 2)
        .min(chars.len() - MAX_SNIPPET_CHARS);
    let end = start + MAX_SNIPPET_CHARS;

    let mut line_content = String::new();
    let mut caret_offset = error_col - start;
    if start > 0 {
        line_content.push_str("...");
        caret_offset += 3;
    }
    line_content.extend(&chars[start..end]);
    if end < chars.len() {
        line_content.push_str("...");
    }

    ErrorSnippet {
        line_content,
        caret_offset,
    }
}
