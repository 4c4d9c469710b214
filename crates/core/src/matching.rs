//! Keyword matching against catalog text.
//!
//! Text is compared after [`normalize`]: lowercase with Spanish diacritics
//! folded, so `Inflación`, `INFLACION` and `inflacion` are the same word.
//! Fuzzy matching scores tokens with the Ratcliff/Obershelp ratio, the same
//! measure used by `difflib`-style close-match lookups.

use crate::config::MatchMode;

/// Lowercase and strip the diacritics that show up in Spanish catalog text.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Split already-normalized text into alphanumeric words.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// Ratcliff/Obershelp similarity: `2 * M / T` where `M` counts characters in
/// matching blocks and `T` is the combined length. Returns a value in `0..=1`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, len) = longest_common_run(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..start_a], &b[..start_b])
        + matching_chars(&a[start_a + len..], &b[start_b + len..])
}

/// Longest common contiguous run as `(start_in_a, start_in_b, len)`.
/// Ties resolve to the earliest run in `a`.
fn longest_common_run(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for i in 0..a.len() {
        let mut cur = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                let run = prev[j] + 1;
                cur[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        prev = cur;
    }
    best
}

/// Keyword predicate configured from [`MatchMode`] and a similarity cutoff.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    mode: MatchMode,
    cutoff: f64,
}

impl Matcher {
    pub fn new(mode: MatchMode, cutoff: f64) -> Self {
        Self { mode, cutoff }
    }

    /// Whether `keyword` matches `text`. Both sides must already be normalized.
    ///
    /// A keyword of several words fuzzy-matches when every one of its words is
    /// close to some word of `text`.
    pub fn matches(&self, keyword: &str, text: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return false;
        }
        if text.contains(keyword) {
            return true;
        }
        match self.mode {
            MatchMode::Substring => false,
            MatchMode::Fuzzy => tokens(keyword).all(|word| {
                tokens(text).any(|candidate| similarity(word, candidate) >= self.cutoff)
            }),
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MatchMode::Fuzzy, 0.65)
    }
}
