// ABOUTME: Similar-request heuristic used at creation time
// ABOUTME: Blends token Jaccard overlap with a normalized edit-distance ratio

use crate::types::SimilarRequest;
use std::collections::HashSet;

/// A candidate to compare against: id, title, and the opening comment body.
#[derive(Debug, Clone)]
pub struct RequestSummary {
    pub request_id: String,
    pub title: String,
    pub body: String,
}

fn token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Jaccard similarity over whitespace tokens.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let set_a = token_set(a);
    let set_b = token_set(b);
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

/// Similarity as `1 - levenshtein / max_len`, case-insensitive.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let distance = levenshtein(&a, &b);
    let max_len = a.chars().count().max(b.chars().count());
    1.0 - distance as f64 / max_len as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Score one candidate against a new request. Titles dominate; bodies
/// contribute through token overlap only.
fn score(candidate: &RequestSummary, title: &str, body: &str) -> f64 {
    let title_score = jaccard_similarity(&candidate.title, title)
        .max(edit_similarity(&candidate.title, title));
    let body_score = jaccard_similarity(&candidate.body, body);
    title_score * 0.7 + body_score * 0.3
}

/// Find existing requests similar to a proposed new one.
///
/// Returns at most `max_results` candidates scoring at or above `threshold`,
/// best first.
pub fn find_similar(
    candidates: &[RequestSummary],
    title: &str,
    body: &str,
    threshold: f64,
    max_results: usize,
) -> Vec<SimilarRequest> {
    let mut scored: Vec<SimilarRequest> = candidates
        .iter()
        .map(|c| SimilarRequest {
            request_id: c.request_id.clone(),
            title: c.title.clone(),
            score: score(c, title, body),
        })
        .filter(|s| s.score >= threshold)
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(max_results);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, title: &str, body: &str) -> RequestSummary {
        RequestSummary {
            request_id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_identical_titles_score_high() {
        let candidates = vec![candidate("req-1", "Dark mode support", "please add dark mode")];
        let results = find_similar(&candidates, "Dark mode support", "dark mode please", 0.6, 5);
        assert_eq!(results.len(), 1);
        assert!(results[0].score > 0.8);
    }

    #[test]
    fn test_unrelated_titles_fall_below_threshold() {
        let candidates = vec![candidate("req-1", "Export to PDF", "pdf export")];
        let results = find_similar(&candidates, "Fix login crash", "app crashes on login", 0.6, 5);
        assert!(results.is_empty());
    }

    #[test]
    fn test_results_are_sorted_and_capped() {
        let candidates = vec![
            candidate("req-1", "Dark mode", "dark theme"),
            candidate("req-2", "Dark mode support", "dark mode everywhere"),
            candidate("req-3", "Darker mode", "dark"),
        ];
        let results = find_similar(&candidates, "Dark mode support", "dark mode", 0.1, 2);
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[0].request_id, "req-2");
    }

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn test_jaccard_ignores_punctuation_and_case() {
        assert!(jaccard_similarity("Fix the Login!", "fix the login") > 0.99);
    }
}
