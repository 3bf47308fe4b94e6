//! UTF-8 text generators for benchmarking and testing.
//!
//! Valid patterns always produce exactly `target_size` bytes of well-formed
//! UTF-8. Invalid patterns embed one bad sequence in mixed text, starting
//! in the last lane of a 32-byte block so it straddles two blocks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use utf8_range::text::range::BLOCK_SIZE;

/// Pattern types for UTF-8 text generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Pattern {
    /// Pure ASCII (7-bit, single-byte sequences)
    Ascii,
    /// Latin words with diacritics (2-byte sequences)
    Latin,
    /// Chinese/Japanese/Korean (3-byte sequences)
    Cjk,
    /// Emoji and symbols (4-byte sequences)
    Emoji,
    /// Mixed realistic content (prose with occasional non-ASCII)
    Mixed,
    /// Uniform mix of all sequence lengths (1-4 bytes)
    AllLengths,
    /// Log file style (mostly ASCII with timestamps and occasional unicode)
    LogFile,
    /// `E2 82` followed by a non-continuation byte
    Truncated,
    /// `ED A0 80` (U+D800)
    Surrogate,
    /// `E0 9F 80` (U+07C0 in three bytes)
    Overlong,
    /// `F4 90 80 80` (U+110000)
    OutOfRange,
}

impl Utf8Pattern {
    /// Every pattern that produces valid UTF-8.
    pub const VALID: [Utf8Pattern; 7] = [
        Utf8Pattern::Ascii,
        Utf8Pattern::Latin,
        Utf8Pattern::Cjk,
        Utf8Pattern::Emoji,
        Utf8Pattern::Mixed,
        Utf8Pattern::AllLengths,
        Utf8Pattern::LogFile,
    ];

    /// Every pattern that produces invalid UTF-8.
    pub const INVALID: [Utf8Pattern; 4] = [
        Utf8Pattern::Truncated,
        Utf8Pattern::Surrogate,
        Utf8Pattern::Overlong,
        Utf8Pattern::OutOfRange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Latin => "latin",
            Self::Cjk => "cjk",
            Self::Emoji => "emoji",
            Self::Mixed => "mixed",
            Self::AllLengths => "all_lengths",
            Self::LogFile => "log_file",
            Self::Truncated => "truncated",
            Self::Surrogate => "surrogate",
            Self::Overlong => "overlong",
            Self::OutOfRange => "out_of_range",
        }
    }

    /// The bad sequence embedded by an invalid pattern.
    fn corruption(self) -> Option<&'static [u8]> {
        match self {
            Self::Truncated => Some(&[0xE2, 0x82]),
            Self::Surrogate => Some(&[0xED, 0xA0, 0x80]),
            Self::Overlong => Some(&[0xE0, 0x9F, 0x80]),
            Self::OutOfRange => Some(&[0xF4, 0x90, 0x80, 0x80]),
            _ => None,
        }
    }
}

/// Generate UTF-8 text of `target_size` bytes.
///
/// Invalid patterns grow to fit their bad sequence when `target_size` is
/// smaller than it.
pub fn generate_utf8(target_size: usize, pattern: Utf8Pattern, seed: Option<u64>) -> Vec<u8> {
    if let Some(bad) = pattern.corruption() {
        return generate_invalid(target_size, bad, seed);
    }

    let mut picker = Picker::new(seed);
    match pattern {
        Utf8Pattern::Ascii => fill_words(target_size, ASCII_SENTENCES, &mut picker),
        Utf8Pattern::Latin => fill_words(target_size, LATIN_WORDS, &mut picker),
        Utf8Pattern::Cjk => fill_words(target_size, CJK_PHRASES, &mut picker),
        Utf8Pattern::Emoji => fill_chars(target_size, EMOJI, &mut picker),
        Utf8Pattern::AllLengths => fill_chars(target_size, ALL_LENGTHS, &mut picker),
        Utf8Pattern::LogFile => generate_log_file(target_size, &mut picker),
        _ => fill_words(target_size, MIXED_WORDS, &mut picker),
    }
}

/// Offset of the bad sequence: the last lane of the block nearest the
/// middle, or as late as still fits.
pub fn corruption_offset(target_size: usize, len: usize) -> usize {
    let at = (target_size / 2 / BLOCK_SIZE) * BLOCK_SIZE + BLOCK_SIZE - 1;
    if at + len <= target_size {
        at
    } else {
        target_size.saturating_sub(len)
    }
}

fn generate_invalid(target_size: usize, bad: &[u8], seed: Option<u64>) -> Vec<u8> {
    let target_size = target_size.max(bad.len());
    let at = corruption_offset(target_size, bad.len());
    let tail = target_size - at - bad.len();

    let mut result = generate_utf8(at, Utf8Pattern::Mixed, seed);
    result.extend_from_slice(bad);
    result.extend(generate_utf8(
        tail,
        Utf8Pattern::Mixed,
        seed.map(|s| s.wrapping_add(1)),
    ));
    result
}

/// Seeded choice, or round robin without a seed.
struct Picker {
    rng: Option<ChaCha8Rng>,
    counter: usize,
}

impl Picker {
    fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seed.map(ChaCha8Rng::seed_from_u64),
            counter: 0,
        }
    }

    fn index(&mut self, len: usize) -> usize {
        self.counter += 1;
        match self.rng.as_mut() {
            Some(r) => r.gen_range(0..len),
            None => self.counter % len,
        }
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.index(items.len())]
    }
}

/// Pad with ASCII spaces to exactly `target_size` bytes.
fn pad(mut result: Vec<u8>, target_size: usize) -> Vec<u8> {
    result.resize(target_size, b' ');
    result
}

/// Words separated by spaces, wrapped near 80 columns. Only whole words
/// are written.
fn fill_words(target_size: usize, words: &[&str], picker: &mut Picker) -> Vec<u8> {
    let mut result = Vec::with_capacity(target_size);
    let mut line_len = 0;

    loop {
        let word = picker.pick(words);
        let sep: &[u8] = match line_len {
            0 => b"",
            n if n + word.len() >= 80 => b"\n",
            _ => b" ",
        };
        if result.len() + sep.len() + word.len() > target_size {
            break;
        }
        result.extend_from_slice(sep);
        if sep == b"\n" {
            line_len = 0;
        } else {
            line_len += sep.len();
        }
        result.extend_from_slice(word.as_bytes());
        line_len += word.len();
    }

    pad(result, target_size)
}

/// Back-to-back characters with no separator.
fn fill_chars(target_size: usize, chars: &[&str], picker: &mut Picker) -> Vec<u8> {
    let mut result = Vec::with_capacity(target_size);
    loop {
        let ch = picker.pick(chars);
        if result.len() + ch.len() > target_size {
            break;
        }
        result.extend_from_slice(ch.as_bytes());
    }
    pad(result, target_size)
}

fn generate_log_file(target_size: usize, picker: &mut Picker) -> Vec<u8> {
    let mut result = Vec::with_capacity(target_size);
    let (mut hour, mut minute, mut second, mut ms) = (8u32, 0u32, 0u32, 0u32);

    loop {
        let line = format!(
            "2024-03-{:02} {:02}:{:02}:{:02}.{:03} {} [{}] {}\n",
            11 + hour / 24,
            hour % 24,
            minute,
            second,
            ms,
            picker.pick(LOG_LEVELS),
            picker.pick(LOG_COMPONENTS),
            picker.pick(LOG_MESSAGES),
        );
        if result.len() + line.len() > target_size {
            break;
        }
        result.extend_from_slice(line.as_bytes());

        ms += 1 + picker.index(499) as u32;
        second += ms / 1000;
        ms %= 1000;
        minute += second / 60;
        second %= 60;
        hour += minute / 60;
        minute %= 60;
    }

    pad(result, target_size)
}

const ASCII_SENTENCES: &[&str] = &[
    "The quick brown fox jumps over the lazy dog.",
    "Pack my box with five dozen liquor jugs.",
    "How vexingly quick daft zebras jump!",
    "The five boxing wizards jump quickly.",
    "Sphinx of black quartz, judge my vow.",
    "Two driven jocks help fax my big quiz.",
    "A wizard's job is to vex chumps quickly in fog.",
];

const LATIN_WORDS: &[&str] = &[
    "café", "résumé", "naïve", "über", "fiancée", "cliché", "décor", "élite", "façade",
    "jalapeño", "piñata", "señor", "mañana", "Ångström", "smörgåsbord", "Müller", "Größe",
    "Köln", "Zürich", "Ærø", "Malmö", "Øresund", "Łódź", "Kraków", "Wrocław", "Ελλάδα",
    "Москва", "привет",
];

const CJK_PHRASES: &[&str] = &[
    "日本語", "こんにちは", "東京", "中文", "你好世界", "北京", "한국어", "안녕하세요",
    "서울", "漢字", "ありがとう", "谢谢", "감사합니다",
];

const EMOJI: &[&str] = &[
    "😀", "😃", "😄", "😁", "😆", "😅", "🤣", "😂", "🙂", "🙃", "😉", "😊", "🎉", "🚀", "🌍",
    "💻", "🔥", "𝄞", "𝔸", "𐀀", "\u{10FFFF}",
];

const ALL_LENGTHS: &[&str] = &[
    "a", "Z", "7", "~", "é", "ß", "Ω", "ж", "\u{7FF}", "€", "日", "한", "\u{800}",
    "\u{D7FF}", "\u{E000}", "\u{FFFD}", "🎉", "🚀", "\u{10000}", "\u{10FFFF}",
];

const MIXED_WORDS: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "and", "then", "some",
    "more", "plain", "words", "café", "naïve", "Zürich", "日本", "🎉", "€100", "→",
];

const LOG_LEVELS: &[&str] = &["INFO", "INFO", "INFO", "DEBUG", "WARN", "ERROR"];

const LOG_COMPONENTS: &[&str] = &["http", "db", "auth", "cache", "worker", "scheduler"];

const LOG_MESSAGES: &[&str] = &[
    "request completed in 12ms",
    "connection pool exhausted, retrying",
    "user 'müller' logged in",
    "cache miss for key=用户:42",
    "job finished ✓",
    "upstream returned 503",
    "rate limit reached for 192.168.0.7",
    "payload contained emoji 🎉, stored as-is",
];
