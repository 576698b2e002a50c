//! Properties file codec
//!
//! Reads the flat `key=value` format used by Gradle projects for
//! `local.properties`, `key.properties` and `gradle.properties`:
//!
//! - `#` and `!` start comment lines, blank lines are ignored
//! - the key ends at the first unescaped `=`, `:` or whitespace
//! - a line ending in an odd number of backslashes continues on the next line
//! - `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes are decoded in keys and values
//! - the last occurrence of a duplicated key wins
//!
//! Entries that cannot be represented are skipped and reported through
//! [`Properties::malformed`] rather than failing the whole file.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Why an entry was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// The line has a separator but nothing before it
    #[error("entry has an empty key")]
    EmptyKey,
    /// A `\u` escape not followed by four hex digits, or an unpaired surrogate
    #[error("invalid unicode escape")]
    InvalidUnicodeEscape,
}

/// A skipped entry and the line it started on (1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEntry {
    pub line: usize,
    pub reason: MalformedReason,
}

/// Ordered string-to-string map parsed from a properties file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
    malformed: Vec<MalformedEntry>,
}

impl Properties {
    /// Create an empty set of properties
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a properties file.
    ///
    /// Opening and reading happen in one step, so a missing file shows up as
    /// an [`io::ErrorKind::NotFound`] error rather than through a separate
    /// existence check.
    pub fn load(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let properties = Self::from_bytes(&bytes);
        tracing::debug!(
            path = %path.display(),
            entries = properties.len(),
            skipped = properties.malformed.len(),
            "loaded properties file"
        );
        Ok(properties)
    }

    /// Parse raw file content, decoding it as UTF-8 and falling back to
    /// ISO-8859-1 when the bytes are not valid UTF-8
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::parse(&decode(bytes))
    }

    /// Parse properties text
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut properties = Self::new();

        for (line, logical) in logical_lines(text) {
            match parse_entry(&logical) {
                Ok((key, value)) => properties.set(key, value),
                Err(reason) => {
                    tracing::warn!(line, %reason, "skipping malformed properties entry");
                    properties.malformed.push(MalformedEntry { line, reason });
                }
            }
        }

        properties
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the key is present, even with an empty value
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a value, keeping the position of the first insertion
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries were parsed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries that were skipped while parsing
    pub fn malformed(&self) -> &[MalformedEntry] {
        &self.malformed
    }
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Join natural lines into logical lines, dropping blanks and comments.
/// Yields the 1-based number of the first natural line of each entry.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (index, raw) in normalized.split('\n').enumerate() {
        let trimmed = raw.trim_start_matches(is_blank);

        if current.is_none() && (trimmed.is_empty() || trimmed.starts_with(['#', '!'])) {
            continue;
        }

        let trailing = trimmed.chars().rev().take_while(|&c| c == '\\').count();
        let continues = trailing % 2 == 1;
        let content = if continues {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };

        let (_, buf) = current.get_or_insert_with(|| (index + 1, String::new()));
        buf.push_str(content);

        if !continues {
            lines.extend(current.take());
        }
    }

    // A continuation on the last line still ends the entry
    lines.extend(current);
    lines
}

fn parse_entry(line: &str) -> Result<(String, String), MalformedReason> {
    let chars: Vec<char> = line.chars().collect();
    let mut key_len = 0;
    let mut value_start = chars.len();
    let mut has_separator = false;
    let mut preceding_backslash = false;

    while key_len < chars.len() {
        let c = chars[key_len];
        if !preceding_backslash && (c == '=' || c == ':') {
            value_start = key_len + 1;
            has_separator = true;
            break;
        }
        if !preceding_backslash && is_blank(c) {
            value_start = key_len + 1;
            break;
        }
        preceding_backslash = c == '\\' && !preceding_backslash;
        key_len += 1;
    }

    while value_start < chars.len() {
        let c = chars[value_start];
        if !is_blank(c) {
            if !has_separator && (c == '=' || c == ':') {
                has_separator = true;
            } else {
                break;
            }
        }
        value_start += 1;
    }

    if key_len == 0 {
        return Err(MalformedReason::EmptyKey);
    }

    let key = unescape(&chars[..key_len])?;
    let value = unescape(&chars[value_start.min(chars.len())..])?;
    Ok((key, value))
}

fn unescape(chars: &[char]) -> Result<String, MalformedReason> {
    let mut units: Vec<u16> = Vec::with_capacity(chars.len());
    let mut iter = chars.iter().copied();
    let mut buf = [0u16; 2];

    while let Some(c) = iter.next() {
        let decoded = if c == '\\' {
            match iter.next() {
                Some('u') => {
                    let hex: String = iter.by_ref().take(4).collect();
                    if hex.len() != 4 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                        return Err(MalformedReason::InvalidUnicodeEscape);
                    }
                    let unit = u16::from_str_radix(&hex, 16)
                        .map_err(|_| MalformedReason::InvalidUnicodeEscape)?;
                    units.push(unit);
                    continue;
                }
                Some('t') => '\t',
                Some('n') => '\n',
                Some('r') => '\r',
                Some('f') => '\x0c',
                Some(other) => other,
                None => break,
            }
        } else {
            c
        };
        units.extend_from_slice(decoded.encode_utf16(&mut buf));
    }

    String::from_utf16(&units).map_err(|_| MalformedReason::InvalidUnicodeEscape)
}
