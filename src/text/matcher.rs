//! Longest-matching-blocks sequence matcher.
//!
//! Alignment-based comparison in the Ratcliff/Obershelp family: recursively
//! find the longest contiguous matching block, then match the pieces to its
//! left and right. The similarity ratio is `2*M / T` where `M` is the total
//! matched length and `T` the combined input length, so identical sequences
//! score 1.0 and small insertions or deletions stay close to it — unlike a
//! raw edit distance, which penalizes length differences linearly.
//!
//! Elements occurring in more than 1% of a sequence of 200+ elements are
//! excluded from anchoring new matches (they may still extend one). Without
//! this, ubiquitous elements such as spaces in source text drag the search
//! toward quadratic behavior on large inputs.

use std::collections::HashMap;
use std::hash::Hash;

/// Kind of edit an opcode describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// `a[a_start..a_end]` equals `b[b_start..b_end]`.
    Equal,
    /// `a[a_start..a_end]` should be replaced by `b[b_start..b_end]`.
    Replace,
    /// `a[a_start..a_end]` should be deleted.
    Delete,
    /// `b[b_start..b_end]` should be inserted at `a_start`.
    Insert,
}

/// One edit operation turning `a` into `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// What to do with the spanned ranges.
    pub tag: Tag,
    /// Start of the range in `a`.
    pub a_start: usize,
    /// End (exclusive) of the range in `a`.
    pub a_end: usize,
    /// Start of the range in `b`.
    pub b_start: usize,
    /// End (exclusive) of the range in `b`.
    pub b_end: usize,
}

/// A maximal run of equal elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    /// Start of the run in `a`.
    pub a_start: usize,
    /// Start of the run in `b`.
    pub b_start: usize,
    /// Run length.
    pub len: usize,
}

/// Sequence matcher over two element slices.
///
/// Deterministic for any pair of inputs; no randomized state.
pub struct SequenceMatcher<'a, T: Eq + Hash> {
    a: &'a [T],
    b: &'a [T],
    /// Positions of each element of `b`, minus over-popular elements.
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    /// Length threshold above which the popularity heuristic activates.
    const POPULARITY_MIN_LEN: usize = 200;

    /// Creates a matcher for the pair `(a, b)`.
    #[must_use]
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, elem) in b.iter().enumerate() {
            b2j.entry(elem).or_default().push(j);
        }

        // Drop elements too common to anchor a useful match.
        if b.len() >= Self::POPULARITY_MIN_LEN {
            let popularity_cutoff = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= popularity_cutoff);
        }

        Self { a, b, b2j }
    }

    /// Finds the longest matching block within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Of all maximal blocks, returns the one starting earliest in `a` and,
    /// among those, earliest in `b`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let mut best_i = alo;
        let mut best_j = blo;
        let mut best_size = 0usize;

        // j2len[j] = length of the longest match ending at a[i-1], b[j].
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    new_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Extend over equal elements the popularity filter kept out of b2j.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        MatchingBlock {
            a_start: best_i,
            b_start: best_j,
            len: best_size,
        }
    }

    /// Returns all maximal matching blocks, in order, ending with a
    /// zero-length sentinel at `(a.len(), b.len())`.
    #[must_use]
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        // Iterative divide-and-conquer; an explicit queue avoids deep
        // recursion on pathological inputs.
        let mut queue = vec![(0usize, self.a.len(), 0usize, self.b.len())];
        let mut raw = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);
            if block.len > 0 {
                if alo < block.a_start && blo < block.b_start {
                    queue.push((alo, block.a_start, blo, block.b_start));
                }
                if block.a_start + block.len < ahi && block.b_start + block.len < bhi {
                    queue.push((block.a_start + block.len, ahi, block.b_start + block.len, bhi));
                }
                raw.push(block);
            }
        }
        raw.sort_by_key(|blk| (blk.a_start, blk.b_start));

        // Merge adjacent blocks so consumers see maximal runs.
        let mut merged: Vec<MatchingBlock> = Vec::with_capacity(raw.len() + 1);
        for block in raw {
            match merged.last_mut() {
                Some(prev)
                    if prev.a_start + prev.len == block.a_start
                        && prev.b_start + prev.len == block.b_start =>
                {
                    prev.len += block.len;
                },
                _ => merged.push(block),
            }
        }

        merged.push(MatchingBlock {
            a_start: self.a.len(),
            b_start: self.b.len(),
            len: 0,
        });
        merged
    }

    /// Returns the edit script turning `a` into `b`.
    #[must_use]
    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut opcodes = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);

        for block in self.matching_blocks() {
            let tag = match (i < block.a_start, j < block.b_start) {
                (true, true) => Some(Tag::Replace),
                (true, false) => Some(Tag::Delete),
                (false, true) => Some(Tag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                opcodes.push(Opcode {
                    tag,
                    a_start: i,
                    a_end: block.a_start,
                    b_start: j,
                    b_end: block.b_start,
                });
            }
            i = block.a_start + block.len;
            j = block.b_start + block.len;
            if block.len > 0 {
                opcodes.push(Opcode {
                    tag: Tag::Equal,
                    a_start: block.a_start,
                    a_end: i,
                    b_start: block.b_start,
                    b_end: j,
                });
            }
        }
        opcodes
    }

    /// Similarity ratio `2*M / T` in `[0, 1]`.
    ///
    /// 1.0 means the sequences are identical; two sequences with no common
    /// elements score 0.0. Empty-vs-empty is defined as 1.0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        let matches: usize = self
            .matching_blocks()
            .iter()
            .map(|block| block.len)
            .sum();
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * matches as f64 / total as f64
    }
}
