// src/matcher.rs
//! Term-vs-description matching.
//!
//! Both sides are normalized first. A normalized term contained in the
//! normalized candidate is an immediate hit; otherwise a gestalt
//! (Ratcliff/Obershelp) similarity ratio over characters decides, so that
//! "cp2" and "cp ii" style variants still line up.

use std::collections::HashMap;

use serde::Deserialize;

use crate::normalize::normalize;

pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.55;

/// Fuzzy matcher with a tunable acceptance threshold in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Matcher {
    pub threshold: f64,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl Matcher {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Normalize both sides and decide whether `term` describes `candidate`.
    pub fn matches(&self, term: &str, candidate: &str) -> bool {
        self.matches_normalized(&normalize(term), &normalize(candidate))
    }

    /// Same decision for inputs that are already in normalized form.
    pub fn matches_normalized(&self, term: &str, candidate: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        if candidate.contains(term) {
            return true;
        }
        similarity_ratio(term, candidate) >= self.threshold
    }
}

/// Match with the default threshold.
pub fn matches(term: &str, candidate: &str) -> bool {
    Matcher::default().matches(term, candidate)
}

/// Similarity in [0, 1]: `2 * M / (len(a) + len(b))` where `M` is the total
/// size of the recursively found longest common blocks. Two empty strings
/// are identical (1.0).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matched_chars(&a, &b);
    2.0 * matched as f64 / total as f64
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`, earliest in `a`
/// (then in `b`) on ties. Returns `(i, j, size)`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // run length of the block ending at (i - 1, j), keyed by j
    let mut prev: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|pj| prev.get(&pj))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        prev = next;
    }

    (best_i, best_j, best_k)
}
