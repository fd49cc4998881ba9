//! CSV structure heuristic
//!
//! Scores ambiguous text content against structural criteria: how many
//! lines carry commas, and how consistently their comma counts match the
//! header line. Filename and keyword hints only corroborate; they never
//! rescue content that fails the structural checks outright.

use tracing::debug;

use crate::config::HeuristicThresholds;

/// Header tokens that suggest tabular content, scanned in the lowercased
/// head of the buffer
const CSV_KEYWORDS: &[&str] = &["name,", "id,", "date,", ",value", ",count", ",amount"];

/// How many characters of the content head are scanned for keyword tokens
const KEYWORD_SCAN_LEN: usize = 200;

/// Per-analysis statistics over the non-empty lines of a text buffer.
///
/// Invariants: `uniform_rows <= comma_lines <= total_lines`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvStats {
    /// Count of non-empty lines
    pub total_lines: usize,
    /// Lines containing at least one comma
    pub comma_lines: usize,
    /// Comma lines whose comma count equals the header's
    pub uniform_rows: usize,
    /// Comma count of line 0
    pub header_commas: usize,
    /// A recognized CSV keyword token appears in the content head
    pub has_keyword: bool,
    /// The filename hint ends in `.csv`
    pub csv_extension: bool,
}

impl CsvStats {
    /// Compute statistics for one analysis pass. Purely observational;
    /// the verdict is taken in [`analyze_csv`].
    pub fn compute(text: &str, filename_hint: Option<&str>) -> Self {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let header_commas = lines.first().map(|line| count_commas(line)).unwrap_or(0);

        let mut comma_lines = 0;
        let mut uniform_rows = 0;
        for line in &lines {
            let commas = count_commas(line);
            if commas > 0 {
                comma_lines += 1;
                if commas == header_commas {
                    uniform_rows += 1;
                }
            }
        }

        let head: String = text
            .chars()
            .take(KEYWORD_SCAN_LEN)
            .collect::<String>()
            .to_lowercase();
        let has_keyword = CSV_KEYWORDS.iter().any(|keyword| head.contains(keyword));

        let csv_extension = filename_hint
            .map(|name| name.to_lowercase().ends_with(".csv"))
            .unwrap_or(false);

        Self {
            total_lines: lines.len(),
            comma_lines,
            uniform_rows,
            header_commas,
            has_keyword,
            csv_extension,
        }
    }

    /// Fraction of non-empty lines containing at least one comma
    pub fn comma_ratio(&self) -> f64 {
        if self.total_lines == 0 {
            return 0.0;
        }
        self.comma_lines as f64 / self.total_lines as f64
    }

    /// Fraction of comma lines whose comma count matches the header
    pub fn uniform_ratio(&self) -> f64 {
        if self.comma_lines == 0 {
            return 0.0;
        }
        self.uniform_rows as f64 / self.comma_lines as f64
    }
}

fn count_commas(line: &str) -> usize {
    line.bytes().filter(|b| *b == b',').count()
}

/// Decide whether `text` is structurally CSV.
///
/// Fail closed: too few rows, a comma-less header, or ratios below the
/// cutoffs all resolve to `false`. A `.csv` filename hint relaxes the
/// ratio cutoffs by a small band but never overrides the row and header
/// guards.
pub fn analyze_csv(
    text: &str,
    filename_hint: Option<&str>,
    thresholds: &HeuristicThresholds,
) -> bool {
    let stats = CsvStats::compute(text, filename_hint);

    if stats.total_lines < thresholds.min_rows {
        debug!(
            total_lines = stats.total_lines,
            min_rows = thresholds.min_rows,
            "too few rows for CSV analysis"
        );
        return false;
    }

    // A CSV needs at least two fields, i.e. one separator in the header
    if stats.header_commas == 0 {
        debug!("header line has no commas, not CSV");
        return false;
    }

    let comma_ratio = stats.comma_ratio();
    let uniform_ratio = stats.uniform_ratio();

    let structural = comma_ratio >= thresholds.min_comma_ratio
        && uniform_ratio >= thresholds.min_uniform_ratio;

    let borderline = stats.csv_extension
        && comma_ratio >= thresholds.borderline_comma_ratio
        && uniform_ratio >= thresholds.borderline_uniform_ratio;

    let verdict = structural || borderline;

    debug!(
        total_lines = stats.total_lines,
        comma_lines = stats.comma_lines,
        uniform_rows = stats.uniform_rows,
        header_commas = stats.header_commas,
        comma_ratio,
        uniform_ratio,
        extension_hint = stats.csv_extension,
        keyword_hint = stats.has_keyword,
        verdict,
        "CSV structure analysis"
    );

    if verdict && stats.has_keyword {
        debug!("header keyword tokens corroborate the CSV verdict");
    }

    verdict
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> HeuristicThresholds {
        HeuristicThresholds::default()
    }

    #[test]
    fn test_uniform_csv_accepted() {
        let text = "name,age,city\nJohn,30,New York\nJane,25,Los Angeles";
        assert!(analyze_csv(text, None, &thresholds()));
    }

    #[test]
    fn test_single_line_prose_rejected() {
        // Incidental commas in one line of prose must not read as CSV
        let text = "The quick, brown fox jumps, over the lazy dog.";
        assert!(!analyze_csv(text, None, &thresholds()));
    }

    #[test]
    fn test_commaless_header_rejected() {
        let text = "just a heading\na,b,c\nd,e,f";
        assert!(!analyze_csv(text, None, &thresholds()));
    }

    #[test]
    fn test_prose_below_comma_ratio_rejected() {
        // 2 of 5 lines carry commas: comma ratio 0.4, well under 0.80
        let text = "First sentence, with a comma.\n\
                    A line without any.\n\
                    Another plain line.\n\
                    Also plain.\n\
                    Last one, trailing clause.";
        assert!(!analyze_csv(text, None, &thresholds()));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        // Every line has commas but counts disagree with the header:
        // uniform ratio 1/4 = 0.25, under 0.70
        let text = "a,b,c\n1,2\n3,4,5,6\nx,y,z,w,q";
        assert!(!analyze_csv(text, None, &thresholds()));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let text = "\n\na,b\n1,2\n\n3,4\n\n";
        assert!(analyze_csv(text, None, &thresholds()));
    }

    #[test]
    fn test_extension_rescues_borderline_ratios() {
        // 3 of 4 lines carry commas: comma ratio 0.75 fails the 0.80
        // cutoff but sits inside the borderline band
        let text = "a,b,c\n1,2,3\nnotes without commas\n4,5,6";
        assert!(!analyze_csv(text, None, &thresholds()));
        assert!(analyze_csv(text, Some("report.CSV"), &thresholds()));
    }

    #[test]
    fn test_extension_never_rescues_commaless_header() {
        let text = "heading\nbody line\nanother line";
        assert!(!analyze_csv(text, Some("data.csv"), &thresholds()));
    }

    #[test]
    fn test_extension_never_rescues_outright_failure() {
        // Comma ratio 0.25 is below even the borderline band
        let text = "a,b\nplain\nplain\nplain";
        assert!(!analyze_csv(text, Some("data.csv"), &thresholds()));
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(!analyze_csv("", None, &thresholds()));
        assert!(!analyze_csv("\n\n\n", None, &thresholds()));
    }

    #[test]
    fn test_stats_invariants() {
        let text = "a,b,c\n1,2\nplain line\n3,4,5";
        let stats = CsvStats::compute(text, Some("mixed.csv"));
        assert_eq!(stats.total_lines, 4);
        assert_eq!(stats.comma_lines, 3);
        assert_eq!(stats.uniform_rows, 2);
        assert_eq!(stats.header_commas, 2);
        assert!(stats.uniform_rows <= stats.comma_lines);
        assert!(stats.comma_lines <= stats.total_lines);
        assert!(stats.csv_extension);
    }

    #[test]
    fn test_keyword_detection() {
        let stats = CsvStats::compute("name,age\nJohn,30", None);
        assert!(stats.has_keyword);

        let stats = CsvStats::compute("alpha,beta\n1,2", None);
        assert!(!stats.has_keyword);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "a,b,c\r\n1,2,3\r\n4,5,6\r\n";
        assert!(analyze_csv(text, None, &thresholds()));
    }
}
