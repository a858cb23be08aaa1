//! Ordered regular-expression lists read from `include-rpm`/`exclude-rpm`.
//!
//! One pattern per line. Blank lines and lines starting with `#` are
//! ignored. A pattern matches a name when it matches at the start of the
//! name, so `python3.*` matches `python3-six-1.0.rpm` but not
//! `mypython3.rpm`.

use regex::Regex;
use std::fs;
use std::path::Path;

/// Patterns loaded from a single file, in file order.
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    patterns: Vec<Regex>,
}

impl PatternList {
    /// Load patterns from `path`.
    ///
    /// A missing or unreadable file yields an empty list. Lines that do not
    /// compile as regular expressions are skipped with a warning.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                tracing::debug!("no pattern list at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse pattern text that has already been read.
    pub fn parse(content: &str) -> Self {
        let patterns = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| match anchored(line) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("ignoring invalid pattern '{}': {}", line, e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    /// True when at least one pattern was loaded.
    pub fn is_populated(&self) -> bool {
        !self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True when any pattern matches the start of `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(name))
    }
}

/// Compile `pattern` so it only matches at the start of the input.
fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\A(?:{})", pattern))
}
