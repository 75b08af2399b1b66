//! Text helpers shared by the search engine and the tutor.

/// Canonical graph key for free text: `"Binary Search Tree"` -> `binary_search_tree`.
pub fn normalize_key(text: &str) -> String {
    let mut key = text
        .trim()
        .to_lowercase()
        .replace(|c: char| matches!(c, ' ' | '-' | '/'), "_");
    while key.contains("__") {
        key = key.replace("__", "_");
    }
    key
}

/// Case-insensitive similarity in `[0, 1]`, 0 when either side is empty.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    SequenceMatcher::new(&a.to_lowercase(), &b.to_lowercase()).ratio()
}

/// Ratcliff/Obershelp matcher over characters: repeatedly take the longest
/// common block and recurse on both sides of it. No junk heuristics.
pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        Self {
            a: a.chars().collect(),
            b: b.chars().collect(),
        }
    }

    /// `2 * M / T`, M matched characters, T total characters of both inputs.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * self.matching_characters() as f64 / total as f64
    }

    pub fn matching_characters(&self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, size) = self.longest_match(alo, ahi, blo, bhi);
            if size == 0 {
                continue;
            }
            matched += size;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + size < ahi && j + size < bhi {
                pending.push((i + size, ahi, j + size, bhi));
            }
        }

        matched
    }

    /// Longest common block in `a[alo..ahi]` x `b[blo..bhi]`. Ties go to the
    /// block starting earliest in `a`, then earliest in `b`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
        if alo >= ahi || blo >= bhi {
            return (best_i, best_j, best_size);
        }

        // run[k + 1] = 匹配長度，結尾於 b[blo + k]
        let width = bhi - blo + 1;
        let mut previous = vec![0usize; width];
        let mut current = vec![0usize; width];

        for i in alo..ahi {
            for j in blo..bhi {
                let slot = j - blo + 1;
                if self.a[i] == self.b[j] {
                    let size = previous[slot - 1] + 1;
                    current[slot] = size;
                    if size > best_size {
                        best_i = i + 1 - size;
                        best_j = j + 1 - size;
                        best_size = size;
                    }
                } else {
                    current[slot] = 0;
                }
            }
            std::mem::swap(&mut previous, &mut current);
        }

        (best_i, best_j, best_size)
    }
}

/// Candidates scoring at least `cutoff` against `word`, best first (ties by
/// candidate descending), at most `limit`.
pub fn close_matches<'a, I>(word: &str, candidates: I, limit: usize, cutoff: f64) -> Vec<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    if limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(&str, f64)> = candidates
        .into_iter()
        .map(|candidate| (candidate, SequenceMatcher::new(candidate, word).ratio()))
        .filter(|(_, score)| *score >= cutoff)
        .collect();

    scored.sort_by(|(ka, sa), (kb, sb)| sb.total_cmp(sa).then_with(|| kb.cmp(ka)));
    scored.truncate(limit);
    scored
}

/// Excerpt of `text` around the first case-insensitive occurrence of `query`,
/// `width` characters on each side. Without a hit, the first `2 * width`
/// characters followed by `...`.
pub fn snippet(text: &str, query: &str, width: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let Some(idx) = find_case_insensitive(&chars, query) else {
        let head: String = chars.iter().take(width * 2).collect();
        return format!("{}...", head);
    };

    let query_len = query.chars().count();
    let start = idx.saturating_sub(width);
    let end = (idx + query_len + width).min(chars.len());

    let mut out = String::new();
    if start > 0 {
        out.push_str("...");
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push_str("...");
    }
    out
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Character index of the first match, comparing char by char after folding.
fn find_case_insensitive(haystack: &[char], needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().map(fold).collect();
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }

    (0..=haystack.len() - needle.len()).find(|&start| {
        haystack[start..start + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(&h, &n)| fold(h) == n)
    })
}
