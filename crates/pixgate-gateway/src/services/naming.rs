//! Filename validation and unique object naming

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::Rng;
use unicode_normalization::UnicodeNormalization;

/// Image extensions accepted by the gateway (compared lower-cased)
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Base name used when sanitizing leaves nothing behind
const FALLBACK_BASE_NAME: &str = "image";

/// Inclusive bounds of the random suffix
pub const SUFFIX_MIN: u16 = 1000;
pub const SUFFIX_MAX: u16 = 9999;

/// Source of unix timestamps for generated names
pub trait Clock: Send + Sync {
    fn unix_timestamp(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock frozen at a given timestamp
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> i64 {
        self.0
    }
}

/// Source of the numeric suffix appended to generated names
pub trait SuffixSource: Send + Sync {
    /// A value in `SUFFIX_MIN..=SUFFIX_MAX`
    fn next_suffix(&self) -> u16;
}

/// Uniformly random suffix
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn next_suffix(&self) -> u16 {
        rand::thread_rng().gen_range(SUFFIX_MIN..=SUFFIX_MAX)
    }
}

/// Replays a fixed list of suffixes, wrapping around at the end
#[derive(Debug)]
pub struct SequenceSuffix {
    values: Vec<u16>,
    next: AtomicUsize,
}

impl SequenceSuffix {
    /// Panics if `values` is empty
    pub fn new(values: Vec<u16>) -> Self {
        assert!(!values.is_empty(), "SequenceSuffix needs at least one value");
        Self {
            values,
            next: AtomicUsize::new(0),
        }
    }
}

impl SuffixSource for SequenceSuffix {
    fn next_suffix(&self) -> u16 {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.values.len();
        self.values[index]
    }
}

/// Lower-cased text after the last `.`, or `None` if there is no `.`
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_lowercase())
}

/// Whether `filename` carries one of the allowed image extensions
pub fn is_allowed_filename(filename: &str) -> bool {
    file_extension(filename)
        .is_some_and(|extension| ALLOWED_EXTENSIONS.contains(&extension.as_str()))
}

/// Make a base name safe to use as a storage path segment.
///
/// The name is NFKD-decomposed and folded to ASCII, so accented letters keep
/// their base letter and other non-ASCII characters are dropped. Path
/// separators and whitespace runs become a single `_`, anything outside
/// `[A-Za-z0-9_.-]` is removed and leading/trailing `.`/`_` are trimmed.
pub fn sanitize_base_name(name: &str) -> String {
    let spaced: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Builds `{base}-{unix_ts}-{suffix}.{ext}` names
#[derive(Clone)]
pub struct NameGenerator {
    clock: Arc<dyn Clock>,
    suffix: Arc<dyn SuffixSource>,
}

impl NameGenerator {
    pub fn new(clock: Arc<dyn Clock>, suffix: Arc<dyn SuffixSource>) -> Self {
        Self { clock, suffix }
    }

    /// Derive a fresh storage name for `filename`.
    /// Returns `None` when the filename has no extension.
    pub fn unique_name(&self, filename: &str) -> Option<String> {
        let (base, extension) = filename.rsplit_once('.')?;

        let mut safe_base = sanitize_base_name(base);
        if safe_base.is_empty() {
            safe_base = FALLBACK_BASE_NAME.to_string();
        }

        Some(format!(
            "{}-{}-{}.{}",
            safe_base,
            self.clock.unix_timestamp(),
            self.suffix.next_suffix(),
            extension.to_lowercase()
        ))
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomSuffix))
    }
}
