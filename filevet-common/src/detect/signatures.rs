//! Magic-number signature table and matcher
//!
//! The table is built once into process-wide read-only state and never
//! mutated afterwards, so it is safe to share across any number of
//! concurrent detection calls without locking.

use once_cell::sync::Lazy;

use super::{Detection, MatchSource};

/// Generic text classification for unmatched printable content
pub const TEXT_PLAIN: &str = "text/plain";

/// Fallback classification for unmatched binary content
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A registered magic-number signature.
///
/// An entry matches when any one of its alternative byte prefixes equals
/// the buffer contents at the declared offset. Ties between matching
/// entries are broken by descending priority, then by longest matched
/// pattern (more specific wins).
#[derive(Debug)]
pub struct Signature {
    /// Alternative byte prefixes; any one matching counts as a match
    patterns: &'static [&'static [u8]],
    /// Byte offset at which patterns are compared
    offset: usize,
    /// Additional `(offset, pattern)` that must also match, for container
    /// formats whose format tag sits after the chunk header (RIFF/WAVE)
    trailer: Option<(usize, &'static [u8])>,
    /// MIME type reported on match
    mime_type: &'static str,
    /// Tie-breaker when several signatures match; higher wins
    priority: u8,
    /// Compare ASCII case-insensitively, for text markers like `<html`
    case_insensitive: bool,
}

impl Signature {
    const fn new(
        patterns: &'static [&'static [u8]],
        mime_type: &'static str,
        priority: u8,
    ) -> Self {
        Self {
            patterns,
            offset: 0,
            trailer: None,
            mime_type,
            priority,
            case_insensitive: false,
        }
    }

    const fn container(
        patterns: &'static [&'static [u8]],
        trailer_offset: usize,
        trailer_pattern: &'static [u8],
        mime_type: &'static str,
        priority: u8,
    ) -> Self {
        Self {
            patterns,
            offset: 0,
            trailer: Some((trailer_offset, trailer_pattern)),
            mime_type,
            priority,
            case_insensitive: false,
        }
    }

    const fn text_marker(
        patterns: &'static [&'static [u8]],
        mime_type: &'static str,
        priority: u8,
    ) -> Self {
        Self {
            patterns,
            offset: 0,
            trailer: None,
            mime_type,
            priority,
            case_insensitive: true,
        }
    }

    /// Total matched pattern length, or `None` when no alternative matches
    /// or the trailer requirement fails
    fn matched_len(&self, buffer: &[u8]) -> Option<usize> {
        let window = buffer.get(self.offset..)?;
        let primary = self.patterns.iter().copied().find_map(|pattern| {
            let head = window.get(..pattern.len())?;
            let hit = if self.case_insensitive {
                head.eq_ignore_ascii_case(pattern)
            } else {
                head == pattern
            };
            hit.then_some(pattern.len())
        })?;

        match self.trailer {
            None => Some(primary),
            Some((offset, pattern)) => {
                let tail = buffer.get(offset..offset + pattern.len())?;
                (tail == pattern).then_some(primary + pattern.len())
            }
        }
    }
}

/// Registered signatures, loaded once at first use.
///
/// Coverage is intentionally modest: the formats a file-upload boundary
/// actually sees, not a full MIME database.
static SIGNATURES: Lazy<Vec<Signature>> = Lazy::new(|| {
    vec![
        Signature::new(&[b"%PDF-"], "application/pdf", 100),
        Signature::new(&[b"\x89PNG\r\n\x1a\n"], "image/png", 100),
        Signature::new(&[b"\xFF\xD8\xFF"], "image/jpeg", 100),
        Signature::new(&[b"GIF87a", b"GIF89a"], "image/gif", 100),
        Signature::new(&[b"PK\x03\x04"], "application/zip", 90),
        Signature::new(&[b"\x1F\x8B"], "application/gzip", 90),
        Signature::new(&[b"fLaC"], "audio/flac", 90),
        Signature::new(&[b"OggS"], "audio/ogg", 90),
        Signature::new(&[b"ID3"], "audio/mpeg", 80),
        // RIFF containers carry the format tag after the chunk size; both
        // the RIFF marker and the tag must match
        Signature::container(&[b"RIFF"], 8, b"WAVE", "audio/wav", 90),
        Signature::new(&[b"<?xml"], "application/xml", 70),
        Signature::text_marker(&[b"<html", b"<!DOCTYPE html"], "text/html", 70),
        // Single-byte markers rank below every real magic number
        Signature::new(&[b"{", b"["], "application/json", 10),
    ]
});

/// Match a buffer's leading bytes against the signature table.
///
/// Never fails: zero matches resolve to `text/plain` when the buffer is
/// printable text, `application/octet-stream` otherwise.
pub fn detect(buffer: &[u8]) -> Detection {
    let best = SIGNATURES
        .iter()
        .filter_map(|sig| sig.matched_len(buffer).map(|len| (sig, len)))
        .max_by_key(|(sig, len)| (sig.priority, *len));

    if let Some((sig, _)) = best {
        return Detection {
            mime_type: sig.mime_type,
            source: MatchSource::Signature,
        };
    }

    if is_text(buffer) {
        Detection {
            mime_type: TEXT_PLAIN,
            source: MatchSource::Fallback,
        }
    } else {
        Detection {
            mime_type: OCTET_STREAM,
            source: MatchSource::Fallback,
        }
    }
}

/// Check whether a buffer is printable text (UTF-8, no control bytes
/// beyond tab/newline/carriage-return). Empty buffers are not text.
fn is_text(buffer: &[u8]) -> bool {
    if buffer.is_empty() {
        return false;
    }
    match std::str::from_utf8(buffer) {
        Ok(text) => !text
            .chars()
            .any(|c| c.is_control() && c != '\t' && c != '\n' && c != '\r'),
        Err(_) => false,
    }
}
