//! Word-level fuzzy matching on a 0-100 scale.
//!
//! `ratio` is the normalized indel similarity: `200 * lcs / (len_a + len_b)`,
//! so one dropped or added character on a short word still scores high
//! ("fruity" vs "fruit" = 90.9) while unrelated words stay low.

use regex::Regex;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("static regex"));

pub const DEFAULT_THRESHOLD: f32 = 85.0;

/// Lower-cased word-boundary tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

/// Similarity in `[0, 100]`. Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(&a, &b) as f32 / total as f32
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            row[j + 1] = if ca == cb { prev[j] + 1 } else { row[j].max(prev[j + 1]) };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    threshold: f32,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD }
    }
}

impl FuzzyMatcher {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// `token` is expected lower-cased (see [`tokenize`]); `term` is folded here.
    pub fn is_match(&self, token: &str, term: &str) -> bool {
        ratio(token, &term.to_lowercase()) >= self.threshold
    }

    pub fn count_matches(&self, tokens: &[String], term: &str) -> usize {
        let term = term.to_lowercase();
        tokens.iter().filter(|t| ratio(t, &term) >= self.threshold).count()
    }

    pub fn contains(&self, tokens: &[String], term: &str) -> bool {
        let term = term.to_lowercase();
        tokens.iter().any(|t| ratio(t, &term) >= self.threshold)
    }
}
