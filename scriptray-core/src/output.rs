//! Output classification.
//!
//! Decides how captured output is presented: a short notification for small
//! output, a scrollable read-only view for big output.

use crate::executor::ExecutionResult;

/// Default character threshold.
pub const DEFAULT_CHAR_THRESHOLD: usize = 120;

/// Default line threshold.
pub const DEFAULT_LINE_THRESHOLD: usize = 4;

/// How a run's output should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Transient, auto-dismissing notification.
    Small,
    /// Scrollable, read-only text view.
    Big,
}

/// Size limits separating small from big output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputThresholds {
    /// Output with at least this many characters is big.
    pub chars: usize,
    /// Output with more than this many lines is big.
    pub lines: usize,
}

impl Default for OutputThresholds {
    fn default() -> Self {
        Self {
            chars: DEFAULT_CHAR_THRESHOLD,
            lines: DEFAULT_LINE_THRESHOLD,
        }
    }
}

impl OutputThresholds {
    /// Classify output of `char_count` characters over `line_count` lines.
    pub fn classify(&self, char_count: usize, line_count: usize) -> OutputKind {
        if char_count >= self.chars || line_count > self.lines {
            OutputKind::Big
        } else {
            OutputKind::Small
        }
    }
}

/// Pick the presentation for a finished run, if any.
///
/// Nothing is shown when capture was off, the run failed, or the script
/// printed nothing.
pub fn classify_result(
    result: &ExecutionResult,
    captured: bool,
    thresholds: OutputThresholds,
) -> Option<OutputKind> {
    if !captured || !result.success || result.is_empty() {
        return None;
    }
    Some(thresholds.classify(result.text.chars().count(), result.line_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: &str, line_count: usize) -> ExecutionResult {
        ExecutionResult {
            text: text.to_string(),
            line_count,
            success: true,
            error_message: None,
            exit_code: Some(0),
        }
    }

    #[test]
    fn test_default_thresholds() {
        let t = OutputThresholds::default();
        assert_eq!(t.chars, 120);
        assert_eq!(t.lines, 4);
    }

    #[test]
    fn test_classify_boundaries() {
        let t = OutputThresholds::default();
        assert_eq!(t.classify(119, 4), OutputKind::Small);
        assert_eq!(t.classify(120, 1), OutputKind::Big);
        assert_eq!(t.classify(10, 5), OutputKind::Big);
        assert_eq!(t.classify(0, 0), OutputKind::Small);
    }

    #[test]
    fn test_classify_result_counts_characters_not_bytes() {
        let t = OutputThresholds { chars: 5, lines: 10 };
        // Four characters, seven bytes.
        let r = result("ééé\n", 1);
        assert_eq!(classify_result(&r, true, t), Some(OutputKind::Small));
    }

    #[test]
    fn test_classify_result_line_threshold() {
        let text = "a\nb\nc\nd\ne\n";
        let r = result(text, 5);
        assert_eq!(
            classify_result(&r, true, OutputThresholds::default()),
            Some(OutputKind::Big)
        );
    }

    #[test]
    fn test_nothing_shown_without_capture_or_output() {
        let t = OutputThresholds::default();
        assert_eq!(classify_result(&result("hi\n", 1), false, t), None);
        assert_eq!(classify_result(&result("", 0), true, t), None);

        let mut failed = result("", 0);
        failed.success = false;
        failed.error_message = Some("boom".to_string());
        assert_eq!(classify_result(&failed, true, t), None);
    }
}
