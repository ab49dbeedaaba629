//! Approximate substring matching.
//!
//! Finds the substring of a text with the fewest edits to a pattern
//! (insertions, deletions, substitutions, adjacent transpositions), with the
//! match free to start and end anywhere in the text. The score is
//! `errors / pattern_len`, so 0.0 is an exact occurrence and 1.0 means
//! nothing lines up.

use serde::{Deserialize, Serialize};

/// Character range in a field, start inclusive, end exclusive, counted in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Approximate {
    pub errors: usize,
    pub score: f64,
    pub spans: Vec<Span>,
}

/// Single-char case folding so that char offsets stay aligned with the source text.
pub fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

pub fn fold_str(s: &str) -> Vec<char> {
    s.chars().map(fold).collect()
}

/// Best approximate occurrence of `pattern` (already folded) in `text`.
pub fn approximate_find(pattern: &[char], text: &str) -> Option<Approximate> {
    let m = pattern.len();
    if m == 0 {
        return None;
    }
    let t = fold_str(text);
    let n = t.len();
    let width = n + 1;

    // dp[i * width + j]: edits to align pattern[..i] with some text suffix ending at j
    let mut dp = vec![0usize; (m + 1) * width];
    for i in 1..=m {
        dp[i * width] = i;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = usize::from(pattern[i - 1] != t[j - 1]);
            let mut best = (dp[(i - 1) * width + j] + 1)
                .min(dp[i * width + j - 1] + 1)
                .min(dp[(i - 1) * width + j - 1] + cost);
            if transposed(pattern, &t, i, j) {
                best = best.min(dp[(i - 2) * width + j - 2] + 1);
            }
            dp[i * width + j] = best;
        }
    }

    let (end, errors) = (0..=n)
        .map(|j| (j, dp[m * width + j]))
        .min_by_key(|&(j, errors)| (errors, j))?;

    let spans = trace_spans(&dp, width, pattern, &t, end);
    Some(Approximate {
        errors,
        score: errors as f64 / m as f64,
        spans,
    })
}

fn transposed(pattern: &[char], text: &[char], i: usize, j: usize) -> bool {
    i > 1 && j > 1 && pattern[i - 1] == text[j - 2] && pattern[i - 2] == text[j - 1]
}

/// Walk the table back from the best end column and collect the text
/// positions that line up with pattern characters.
fn trace_spans(dp: &[usize], width: usize, pattern: &[char], text: &[char], end: usize) -> Vec<Span> {
    let mut matched = vec![false; text.len()];
    let (mut i, mut j) = (pattern.len(), end);

    while i > 0 {
        let here = dp[i * width + j];
        if j > 0 {
            let cost = usize::from(pattern[i - 1] != text[j - 1]);
            if here == dp[(i - 1) * width + j - 1] + cost {
                if cost == 0 {
                    matched[j - 1] = true;
                }
                i -= 1;
                j -= 1;
                continue;
            }
            if transposed(pattern, text, i, j) && here == dp[(i - 2) * width + j - 2] + 1 {
                matched[j - 1] = true;
                matched[j - 2] = true;
                i -= 2;
                j -= 2;
                continue;
            }
        }
        if here == dp[(i - 1) * width + j] + 1 {
            i -= 1;
        } else {
            j -= 1;
        }
    }

    let mut spans: Vec<Span> = Vec::new();
    for (pos, hit) in matched.into_iter().enumerate() {
        if !hit {
            continue;
        }
        match spans.last_mut() {
            Some(last) if last.end == pos => last.end = pos + 1,
            _ => spans.push(Span { start: pos, end: pos + 1 }),
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(pattern: &str, text: &str) -> Approximate {
        approximate_find(&fold_str(pattern), text).expect("non-empty pattern")
    }

    #[test]
    fn exact_occurrence_scores_zero() {
        let hit = find("notif", "Email Notifications");
        assert_eq!(hit.errors, 0);
        assert_eq!(hit.score, 0.0);
        assert_eq!(hit.spans, vec![Span { start: 6, end: 11 }]);
    }

    #[test]
    fn transposition_costs_one_edit() {
        let hit = find("emial", "Email Notifications");
        assert_eq!(hit.errors, 1);
        assert!((hit.score - 0.2).abs() < 1e-9);
        assert_eq!(hit.spans, vec![Span { start: 0, end: 5 }]);
    }

    #[test]
    fn substitutions_and_deletions_count() {
        assert_eq!(find("smtq", "SMTP host").errors, 1);
        assert_eq!(find("pasword", "password policy").errors, 1);
        assert_eq!(find("bourbon", "session").errors, 5);
    }

    #[test]
    fn empty_text_costs_whole_pattern() {
        let hit = find("abc", "");
        assert_eq!(hit.errors, 3);
        assert!(hit.spans.is_empty());
    }

    #[test]
    fn empty_pattern_never_matches() {
        assert!(approximate_find(&[], "anything").is_none());
    }

    #[test]
    fn offsets_are_in_chars() {
        let hit = find("slàinte", "Club motto: Slàinte mhath");
        assert_eq!(hit.errors, 0);
        assert_eq!(hit.spans, vec![Span { start: 12, end: 19 }]);
    }
}
