//! Content-type detection engine
//!
//! Layered strategy: binary magic-number signature matching first, then a
//! statistical CSV-structure heuristic for ambiguous text content. The
//! engine is pure: no I/O, no shared mutable state, and every input yields
//! a terminal verdict rather than an error.

pub mod csv;
pub mod signatures;

use serde::Serialize;
use tracing::debug;

use crate::config::HeuristicThresholds;

pub use csv::{analyze_csv, CsvStats};
pub use signatures::detect;

/// MIME types accepted as CSV without consulting the heuristic
pub const CSV_MIME_TYPES: &[&str] = &[
    "text/csv",
    "application/csv",
    "text/comma-separated-values",
];

/// Where a classification verdict came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    /// Leading bytes matched a registered signature
    Signature,
    /// The CSV structure heuristic upgraded a generic text classification
    Heuristic,
    /// No signature matched; classified by the text/binary fallback
    Fallback,
}

/// Result of a single signature-matching pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// Detected MIME type
    pub mime_type: &'static str,
    /// How the type was determined
    pub source: MatchSource,
}

/// Externally visible outcome of one classification call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Whether the content is acceptable as CSV
    pub success: bool,
    /// Detected MIME type, reported on success and failure alike
    pub mime_type: String,
    /// Human-readable reason for the verdict
    pub message: String,
}

impl ValidationReport {
    fn csv(mime_type: &str) -> Self {
        Self {
            success: true,
            mime_type: mime_type.to_string(),
            message: "File is a valid CSV".to_string(),
        }
    }

    fn not_csv(mime_type: &str) -> Self {
        Self {
            success: false,
            mime_type: mime_type.to_string(),
            message: format!("File is not a valid CSV (detected {})", mime_type),
        }
    }
}

/// Classify a buffer and decide whether it is acceptable as CSV.
///
/// A concrete non-CSV signature match (PDF, JPEG, ...) fails immediately;
/// the text heuristic is consulted only for generic text or unmatched
/// content, and its positive verdict is authoritative once invoked.
/// Never panics or errors: every input yields a terminal report.
pub fn classify(
    buffer: &[u8],
    filename_hint: Option<&str>,
    thresholds: &HeuristicThresholds,
) -> ValidationReport {
    let detection = resolve_detection(buffer, filename_hint, thresholds);

    if CSV_MIME_TYPES.contains(&detection.mime_type) {
        ValidationReport::csv(detection.mime_type)
    } else {
        ValidationReport::not_csv(detection.mime_type)
    }
}

/// Resolve the final detection for a buffer, consulting the CSV heuristic
/// when the signature pass could not commit to a concrete type
fn resolve_detection(
    buffer: &[u8],
    filename_hint: Option<&str>,
    thresholds: &HeuristicThresholds,
) -> Detection {
    let detection = signatures::detect(buffer);
    debug!(
        mime_type = detection.mime_type,
        source = ?detection.source,
        size = buffer.len(),
        "signature detection"
    );

    if CSV_MIME_TYPES.contains(&detection.mime_type) {
        return detection;
    }

    let heuristic_eligible = matches!(
        detection.mime_type,
        signatures::TEXT_PLAIN | signatures::OCTET_STREAM
    ) && detection.source == MatchSource::Fallback;

    if heuristic_eligible {
        if let Ok(text) = std::str::from_utf8(buffer) {
            if csv::analyze_csv(text, filename_hint, thresholds) {
                debug!("heuristic upgraded classification to text/csv");
                return Detection {
                    mime_type: "text/csv",
                    source: MatchSource::Heuristic,
                };
            }
        } else {
            // Undecodable bytes are conclusive evidence against CSV
            debug!("buffer is not valid UTF-8, skipping CSV analysis");
        }
    }

    detection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> HeuristicThresholds {
        HeuristicThresholds::default()
    }

    #[test]
    fn test_csv_text_with_filename_hint() {
        let buffer = b"name,age,city\nJohn,30,New York\nJane,25,Los Angeles";
        let report = classify(buffer, Some("example.csv"), &thresholds());
        assert!(report.success);
        assert_eq!(report.mime_type, "text/csv");
    }

    #[test]
    fn test_csv_text_without_filename_hint() {
        let buffer = b"a,b,c\n1,2,3\n4,5,6";
        let report = classify(buffer, None, &thresholds());
        assert!(report.success);
        assert_eq!(report.mime_type, "text/csv");
    }

    #[test]
    fn test_pdf_fails_without_heuristic() {
        // %PDF- followed by arbitrary content, including CSV-looking text
        // that the heuristic must never get to see
        let buffer = b"%PDF-1.4\na,b,c\n1,2,3\n4,5,6";
        let report = classify(buffer, Some("fake.csv"), &thresholds());
        assert!(!report.success);
        assert_eq!(report.mime_type, "application/pdf");
    }

    #[test]
    fn test_jpeg_fails() {
        let report = classify(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00], None, &thresholds());
        assert!(!report.success);
        assert_eq!(report.mime_type, "image/jpeg");
    }

    #[test]
    fn test_prose_fails_as_text_plain() {
        let buffer = b"This is a paragraph of prose.\nIt has lines, but no structure.\nNothing tabular here.";
        let report = classify(buffer, None, &thresholds());
        assert!(!report.success);
        assert_eq!(report.mime_type, "text/plain");
    }

    #[test]
    fn test_empty_buffer_fails_closed() {
        let report = classify(b"", None, &thresholds());
        assert!(!report.success);
        assert_eq!(report.mime_type, "application/octet-stream");
    }

    #[test]
    fn test_invalid_utf8_fails_closed() {
        let report = classify(&[0xC3, 0x28, 0x00, 0xFF], Some("data.csv"), &thresholds());
        assert!(!report.success);
        assert_eq!(report.mime_type, "application/octet-stream");
    }

    #[test]
    fn test_classify_is_idempotent() {
        let buffer = b"name,age\nJohn,30\nJane,25";
        let first = classify(buffer, Some("people.csv"), &thresholds());
        let second = classify(buffer, Some("people.csv"), &thresholds());
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_signature_blocks_heuristic() {
        // Brace-led text is committed to JSON before the heuristic runs
        let buffer = b"{\"a\": 1}\nx,y\n1,2";
        let report = classify(buffer, Some("data.csv"), &thresholds());
        assert!(!report.success);
        assert_eq!(report.mime_type, "application/json");
    }

    #[test]
    fn test_failure_message_names_detected_type() {
        let report = classify(b"%PDF-1.4", None, &thresholds());
        assert!(report.message.contains("application/pdf"));
    }

    #[test]
    fn test_csv_with_wave_bytes_at_offset_eight() {
        // A WAVE tag at offset 8 without a RIFF marker must not pull the
        // buffer out of the heuristic path
        let buffer = b"id,name,WAVES,amount\n1,Bob,WxA,2\n2,Ann,WyB,3";
        let report = classify(buffer, Some("data.csv"), &thresholds());
        assert!(report.success);
        assert_eq!(report.mime_type, "text/csv");
    }

    #[test]
    fn test_heuristic_upgrade_carries_heuristic_source() {
        let buffer = b"a,b,c\n1,2,3\n4,5,6";
        let detection = resolve_detection(buffer, None, &thresholds());
        assert_eq!(
            detection,
            Detection {
                mime_type: "text/csv",
                source: MatchSource::Heuristic,
            }
        );
    }

    #[test]
    fn test_signature_match_keeps_signature_source() {
        let detection = resolve_detection(b"%PDF-1.4", None, &thresholds());
        assert_eq!(detection.mime_type, "application/pdf");
        assert_eq!(detection.source, MatchSource::Signature);
    }
}
