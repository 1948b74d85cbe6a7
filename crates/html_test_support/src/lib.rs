//! Shared helpers for render-tree and serializer tests.

pub mod fixture;
pub mod frame_snapshot;

pub use crate::fixture::{
    CaseExpectation, SERIALIZE_FIXTURE_FORMAT_V1, SerializeCase, load_serialize_cases,
    parse_serialize_cases,
};
pub use crate::frame_snapshot::frame_lines;

use std::fmt::Write;

/// Escapes control characters and quotes so a value fits on one snapshot line.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Human-readable report of the first differing line, with two lines of
/// context on either side. Empty when both sides are equal.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    fn line(side: &[String], idx: usize) -> &str {
        side.get(idx).map_or("<missing>", String::as_str)
    }

    let max = expected.len().max(actual.len());

    let Some(first) = (0..max).find(|&i| line(expected, i) != line(actual, i)) else {
        return String::new();
    };

    let mut out = String::new();
    let start = first.saturating_sub(2);
    let end = (first + 3).min(max);
    let _ = writeln!(
        &mut out,
        "first mismatch at line {} (showing {}..={}):",
        first + 1,
        start + 1,
        end
    );
    for idx in start..end {
        let marker = if idx == first { ">" } else { " " };
        let _ = writeln!(&mut out, "{marker} {:>4}  expected: {}", idx + 1, line(expected, idx));
        let _ = writeln!(&mut out, "{marker} {:>4}    actual: {}", idx + 1, line(actual, idx));
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn escape_text_keeps_line_single() {
        assert_eq!(escape_text("a\"b\nc\u{1}"), "a\\\"b\\nc\\u{01}");
    }

    #[test]
    fn equal_inputs_have_no_diff() {
        let a = lines(&["x", "y"]);
        assert!(diff_lines(&a, &a).is_empty());
    }

    #[test]
    fn diff_points_at_first_mismatch() {
        let report = diff_lines(&lines(&["a", "b", "c"]), &lines(&["a", "B"]));
        assert!(report.starts_with("first mismatch at line 2"), "{report}");
        assert!(report.contains(">    2  expected: b"), "{report}");
        assert!(report.contains("     3    actual: <missing>"), "{report}");
        assert!(report.contains("expected 3 lines, actual 2 lines"), "{report}");
    }
}
