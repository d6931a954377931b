//! Edit-script diff between two text revisions.
//!
//! Produces an order-stable sequence of `equal` / `delete` / `insert` spans
//! using a standard longest-common-subsequence diff over characters, with a
//! common prefix/suffix trim in front so the quadratic core only sees the
//! changed middle. Deterministic for a given input pair: no randomness, no
//! locale-dependent collation, just `char` equality.
//!
//! Identical inputs produce exactly one `equal` span covering the whole
//! string (including two empty inputs); `diff("", text)` produces a single
//! `insert` span. Callers never need to special-case either.

use serde::Serialize;
use std::fmt;

/// Kind of a diff span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOp {
    /// Text present in both revisions.
    Equal,
    /// Text only in the old revision.
    Delete,
    /// Text only in the new revision.
    Insert,
}

/// One contiguous run of a single operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffSpan {
    /// The operation.
    pub op: DiffOp,
    /// The text the operation covers.
    pub text: String,
}

impl DiffSpan {
    fn new(op: DiffOp, text: impl Into<String>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }
}

impl fmt::Display for DiffSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            DiffOp::Equal => write!(f, "{}", self.text),
            DiffOp::Delete => write!(f, "[-{}-]", self.text),
            DiffOp::Insert => write!(f, "{{+{}+}}", self.text),
        }
    }
}

/// An edit script turning one revision into another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diff {
    spans: Vec<DiffSpan>,
}

impl Diff {
    /// The spans, in order. Adjacent spans never share an operation.
    #[must_use]
    pub fn spans(&self) -> &[DiffSpan] {
        &self.spans
    }

    /// Whether the two inputs were identical.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self.spans.as_slice(), [DiffSpan { op: DiffOp::Equal, .. }])
    }

    /// Reassemble the old revision (equal + delete spans).
    #[must_use]
    pub fn old_text(&self) -> String {
        self.spans
            .iter()
            .filter(|span| span.op != DiffOp::Insert)
            .map(|span| span.text.as_str())
            .collect()
    }

    /// Reassemble the new revision (equal + insert spans).
    #[must_use]
    pub fn new_text(&self) -> String {
        self.spans
            .iter()
            .filter(|span| span.op != DiffOp::Delete)
            .map(|span| span.text.as_str())
            .collect()
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.spans {
            write!(f, "{span}")?;
        }
        Ok(())
    }
}

/// Compute the edit script from `old` to `new`.
#[must_use]
pub fn diff(old: &str, new: &str) -> Diff {
    if old == new {
        return Diff {
            spans: vec![DiffSpan::new(DiffOp::Equal, old)],
        };
    }

    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();

    // Trim the shared prefix and suffix; only the changed middle pays for
    // the quadratic LCS table.
    let prefix = old_chars
        .iter()
        .zip(&new_chars)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old_chars[prefix..]
        .iter()
        .rev()
        .zip(new_chars[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old_chars[prefix..old_chars.len() - suffix];
    let new_mid = &new_chars[prefix..new_chars.len() - suffix];

    let mut spans = Vec::new();
    if prefix > 0 {
        spans.push(DiffSpan::new(
            DiffOp::Equal,
            old_chars[..prefix].iter().collect::<String>(),
        ));
    }
    spans.extend(lcs_spans(old_mid, new_mid));
    if suffix > 0 {
        spans.push(DiffSpan::new(
            DiffOp::Equal,
            old_chars[old_chars.len() - suffix..].iter().collect::<String>(),
        ));
    }

    Diff {
        spans: coalesce(spans),
    }
}

/// Classic LCS dynamic program over the changed middle, emitting spans by
/// backtracking from the full table.
fn lcs_spans(old: &[char], new: &[char]) -> Vec<DiffSpan> {
    let (m, n) = (old.len(), new.len());
    if m == 0 && n == 0 {
        return Vec::new();
    }
    if m == 0 {
        return vec![DiffSpan::new(DiffOp::Insert, new.iter().collect::<String>())];
    }
    if n == 0 {
        return vec![DiffSpan::new(DiffOp::Delete, old.iter().collect::<String>())];
    }

    // lcs[i][j] = LCS length of old[i..] and new[j..].
    let mut lcs = vec![vec![0_usize; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    // Walk the table forward. On a tie, prefer consuming from `old` first
    // so deletes print before inserts at the same position — a fixed,
    // input-independent policy.
    let mut spans: Vec<DiffSpan> = Vec::new();
    let mut push = |op: DiffOp, c: char| match spans.last_mut() {
        Some(span) if span.op == op => span.text.push(c),
        _ => spans.push(DiffSpan::new(op, c.to_string())),
    };

    let (mut i, mut j) = (0, 0);
    while i < m && j < n {
        if old[i] == new[j] {
            push(DiffOp::Equal, old[i]);
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            push(DiffOp::Delete, old[i]);
            i += 1;
        } else {
            push(DiffOp::Insert, new[j]);
            j += 1;
        }
    }
    while i < m {
        push(DiffOp::Delete, old[i]);
        i += 1;
    }
    while j < n {
        push(DiffOp::Insert, new[j]);
        j += 1;
    }

    spans
}

/// Merge adjacent spans that share an operation.
fn coalesce(spans: Vec<DiffSpan>) -> Vec<DiffSpan> {
    let mut merged: Vec<DiffSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if last.op == span.op => last.text.push_str(&span.text),
            _ => merged.push(span),
        }
    }
    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(d: &Diff) -> Vec<(DiffOp, &str)> {
        d.spans().iter().map(|s| (s.op, s.text.as_str())).collect()
    }

    // === Identity and empty laws ===

    #[test]
    fn identical_inputs_single_equal_span() {
        let d = diff("same text", "same text");
        assert_eq!(ops(&d), vec![(DiffOp::Equal, "same text")]);
        assert!(d.is_identity());
    }

    #[test]
    fn both_empty_single_equal_span() {
        let d = diff("", "");
        assert_eq!(ops(&d), vec![(DiffOp::Equal, "")]);
        assert!(d.is_identity());
    }

    #[test]
    fn empty_to_text_single_insert() {
        let d = diff("", "abc");
        assert_eq!(ops(&d), vec![(DiffOp::Insert, "abc")]);
    }

    #[test]
    fn text_to_empty_single_delete() {
        let d = diff("abc", "");
        assert_eq!(ops(&d), vec![(DiffOp::Delete, "abc")]);
    }

    // === Edit scripts ===

    #[test]
    fn replacement_in_the_middle() {
        let d = diff("the cat sat", "the dog sat");
        assert_eq!(
            ops(&d),
            vec![
                (DiffOp::Equal, "the "),
                (DiffOp::Delete, "cat"),
                (DiffOp::Insert, "dog"),
                (DiffOp::Equal, " sat"),
            ]
        );
    }

    #[test]
    fn append_only() {
        let d = diff("hello", "hello world");
        assert_eq!(
            ops(&d),
            vec![(DiffOp::Equal, "hello"), (DiffOp::Insert, " world")]
        );
    }

    #[test]
    fn prepend_only() {
        let d = diff("world", "hello world");
        assert_eq!(
            ops(&d),
            vec![(DiffOp::Insert, "hello "), (DiffOp::Equal, "world")]
        );
    }

    #[test]
    fn disjoint_inputs() {
        let d = diff("aaa", "bbb");
        assert_eq!(
            ops(&d),
            vec![(DiffOp::Delete, "aaa"), (DiffOp::Insert, "bbb")]
        );
    }

    // === Structural invariants ===

    #[test]
    fn adjacent_spans_never_share_an_op() {
        let cases = [
            ("the cat sat", "the dog sat"),
            ("abcabc", "abcxabc"),
            ("", "x"),
            ("mississippi", "dissipate"),
        ];
        for (old, new) in cases {
            let d = diff(old, new);
            for pair in d.spans().windows(2) {
                assert_ne!(pair[0].op, pair[1].op, "uncoalesced spans for {old:?}→{new:?}");
            }
        }
    }

    #[test]
    fn spans_reassemble_both_sides() {
        let cases = [
            ("the cat sat", "the dog sat"),
            ("", "abc"),
            ("abc", ""),
            ("mississippi", "dissipate"),
            ("line one\nline two\n", "line one\nline 2\n"),
        ];
        for (old, new) in cases {
            let d = diff(old, new);
            assert_eq!(d.old_text(), old);
            assert_eq!(d.new_text(), new);
        }
    }

    #[test]
    fn deterministic_across_calls() {
        let a = diff("mississippi", "dissipate");
        let b = diff("mississippi", "dissipate");
        assert_eq!(a, b);
    }

    #[test]
    fn multibyte_characters_stay_intact() {
        let d = diff("héllo 🎉", "héllo 🎊");
        assert_eq!(d.old_text(), "héllo 🎉");
        assert_eq!(d.new_text(), "héllo 🎊");
        assert_eq!(d.spans()[0], DiffSpan::new(DiffOp::Equal, "héllo "));
    }

    #[test]
    fn display_marks_edits_inline() {
        let d = diff("the cat sat", "the dog sat");
        assert_eq!(d.to_string(), "the [-cat-]{+dog+} sat");
    }
}
