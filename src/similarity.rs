//! Textual similarity scoring via greedy block matching.
//!
//! [`ratio`] reproduces the classic sequence-matcher definition: repeatedly
//! find the longest matching contiguous block between the two inputs, recurse
//! on the unmatched remainders on either side, sum the matched character
//! count `M`, and return `2*M / T` where `T` is the combined length. Ties
//! between equally long blocks go to the earliest start in the left string,
//! then the earliest in the right.
//!
//! Inputs are compared as sequences of Unicode scalar values. Callers decide
//! about case normalization.

use std::collections::HashMap;

/// Second-sequence length from which the popular-element heuristic kicks in.
const AUTOJUNK_THRESHOLD: usize = 200;

/// A matching block: `a[a..a+size] == b[b..b+size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a: usize,
    b: usize,
    size: usize,
}

/// Similarity ratio in `[0, 1]` between two strings.
///
/// Returns 1.0 when both strings are empty.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched: usize = matching_blocks(&a, &b).iter().map(|blk| blk.size).sum();
    2.0 * matched as f64 / total as f64
}

struct BlockMatcher<'s> {
    a: &'s [char],
    b: &'s [char],
    /// Indices in `b` of every element, ascending. Popular elements of long
    /// second sequences are dropped so they never seed a block; they still
    /// participate when a found block is extended at its ends.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'s> BlockMatcher<'s> {
    fn new(a: &'s [char], b: &'s [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &ch) in b.iter().enumerate() {
            b2j.entry(ch).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_THRESHOLD {
            let cutoff = b.len() / 100 + 1;
            b2j.retain(|_, indices| indices.len() <= cutoff);
        }
        Self { a, b, b2j }
    }

    /// Longest matching block within `a[alo..ahi]` and `b[blo..bhi]`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let mut besti = alo;
        let mut bestj = blo;
        let mut bestsize = 0usize;

        // j2len[j] = length of the longest match ending at a[i] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut newj2len: HashMap<usize, usize> = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = match j.checked_sub(1) {
                        Some(prev) => j2len.get(&prev).copied().unwrap_or(0) + 1,
                        None => 1,
                    };
                    newj2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = newj2len;
        }

        // Extend over elements the index skipped (popular ones in long
        // second sequences never seed a block but may border one).
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        Block {
            a: besti,
            b: bestj,
            size: bestsize,
        }
    }
}

/// All matching blocks between `a` and `b`, ordered by position, with
/// adjacent blocks merged.
fn matching_blocks(a: &[char], b: &[char]) -> Vec<Block> {
    let matcher = BlockMatcher::new(a, b);
    let mut queue = vec![(0usize, a.len(), 0usize, b.len())];
    let mut blocks = Vec::new();

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let block = matcher.find_longest_match(alo, ahi, blo, bhi);
        if block.size == 0 {
            continue;
        }
        if alo < block.a && blo < block.b {
            queue.push((alo, block.a, blo, block.b));
        }
        if block.a + block.size < ahi && block.b + block.size < bhi {
            queue.push((block.a + block.size, ahi, block.b + block.size, bhi));
        }
        blocks.push(block);
    }

    blocks.sort_by_key(|blk| (blk.a, blk.b));

    let mut merged: Vec<Block> = Vec::new();
    for block in blocks {
        if let Some(last) = merged.last_mut() {
            if last.a + last.size == block.a && last.b + last.size == block.b {
                last.size += block.size;
                continue;
            }
        }
        merged.push(block);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn identical_strings_score_one() {
        assert!(close(ratio("a cat sitting on a mat", "a cat sitting on a mat"), 1.0));
    }

    #[test]
    fn both_empty_score_one() {
        assert!(close(ratio("", ""), 1.0));
    }

    #[test]
    fn empty_against_nonempty_scores_zero() {
        assert!(close(ratio("an answer", ""), 0.0));
        assert!(close(ratio("", "a reference"), 0.0));
    }

    #[test]
    fn trailing_period_pair() {
        // 22 matched chars over 23 + 22 total
        let r = ratio("a cat sitting on a mat.", "a cat sitting on a mat");
        assert!(close(r, 44.0 / 45.0));
    }

    #[test]
    fn classic_ratio_values() {
        // Reference values from the standard sequence-matcher definition.
        assert!(close(ratio("abcd", "bcde"), 6.0 / 8.0));
        assert!(close(ratio("private", "pirate"), 10.0 / 13.0));
        assert!(close(ratio(" abcd", "abcd abcd"), 10.0 / 14.0));
    }

    #[test]
    fn ties_favor_earliest_block() {
        // "ab" matches at offsets 0 and 2 of the left string; the block at
        // offset 0 wins and nothing else matches.
        assert!(close(ratio("abab", "ab"), 4.0 / 6.0));
    }

    #[test]
    fn long_identical_strings_survive_popularity_filter() {
        // Every char is "popular" at this length, so matches come entirely
        // from the end-extension step.
        let s = "ab".repeat(120);
        assert!(close(ratio(&s, &s), 1.0));
    }

    #[test]
    fn stays_in_unit_interval_on_prose() {
        let a = "the quick brown fox jumps over the lazy dog. ".repeat(8);
        let b = "a quick brown fox leaped over some lazy dogs near the riverbank.";
        let r = ratio(&a, &b);
        assert!((0.0..=1.0).contains(&r));
        assert!(r > 0.1);
    }

    #[test]
    fn repeated_long_reference_drops_to_zero() {
        // With a second sequence this long every character is popular, and
        // these two share no block that the end-extension step can reach.
        let a = "the quick brown fox jumps over the lazy dog. ".repeat(8);
        let b = "a quick brown fox leaped over some lazy dogs near the riverbank. ".repeat(5);
        assert!(close(ratio(&a, &b), 0.0));
    }
}
