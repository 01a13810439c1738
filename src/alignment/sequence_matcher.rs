//! Ratcliff/Obershelp matching over token sequences.
//!
//! Behaviour follows Python's `difflib.SequenceMatcher` with no junk
//! predicate: the longest matching block is found first and the procedure
//! recurses on both sides of it, so long equal runs win over scattered
//! single-token matches.

use std::collections::{HashMap, HashSet};

use crate::config::AlignerConfig;
use crate::types::{EditTag, Opcode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

pub struct SequenceMatcher<'s> {
    a: &'s [String],
    b: &'s [String],
    b2j: HashMap<&'s str, Vec<usize>>,
}

impl<'s> SequenceMatcher<'s> {
    /// `a` is the STT side and `b` the reference side; `Insert` opcodes
    /// therefore describe reference-only tokens.
    pub fn new(a: &'s [String], b: &'s [String], autojunk: bool) -> Self {
        let mut b2j: HashMap<&str, Vec<usize>> = HashMap::new();
        for (j, token) in b.iter().enumerate() {
            b2j.entry(token.as_str()).or_default().push(j);
        }

        if autojunk && b.len() >= AlignerConfig::AUTOJUNK_MIN_LEN {
            let ntest = b.len() / 100 + 1;
            let popular: HashSet<&str> = b2j
                .iter()
                .filter(|(_, idxs)| idxs.len() > ntest)
                .map(|(token, _)| *token)
                .collect();
            if !popular.is_empty() {
                tracing::debug!(
                    popular_tokens = popular.len(),
                    reference_len = b.len(),
                    "sequence matcher: ignoring popular tokens when seeding matches"
                );
            }
            b2j.retain(|token, _| !popular.contains(token));
        }

        Self { a, b, b2j }
    }

    /// Longest block with `a[i..i+k] == b[j..j+k]` inside the given window.
    /// Ties go to the earliest start in `a`, then in `b`.
    pub fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> MatchingBlock {
        let (a, b) = (self.a, self.b);
        let mut best_i = alo;
        let mut best_j = blo;
        let mut best_size = 0usize;

        // j2len[j] = length of the match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for (i, token) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(token.as_str()) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
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

        // Popular tokens never seed a match but may still extend one, even
        // the empty match at (alo, blo) left when nothing seeded.
        while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && a[best_i + best_size] == b[best_j + best_size]
        {
            best_size += 1;
        }

        MatchingBlock {
            a: best_i,
            b: best_j,
            size: best_size,
        }
    }

    /// Non-adjacent matching blocks in order, terminated by a zero-size
    /// sentinel at `(len(a), len(b))`.
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0usize, la, 0usize, lb)];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);
            if block.size == 0 {
                continue;
            }
            blocks.push(block);
            if alo < block.a && blo < block.b {
                queue.push((alo, block.a, blo, block.b));
            }
            if block.a + block.size < ahi && block.b + block.size < bhi {
                queue.push((block.a + block.size, ahi, block.b + block.size, bhi));
            }
        }
        blocks.sort_by_key(|block| (block.a, block.b, block.size));

        let mut merged: Vec<MatchingBlock> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match merged.last_mut() {
                Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged.push(MatchingBlock {
            a: la,
            b: lb,
            size: 0,
        });
        merged
    }

    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut i = 0usize;
        let mut j = 0usize;
        let mut opcodes = Vec::new();

        for block in self.matching_blocks() {
            let tag = if i < block.a && j < block.b {
                Some(EditTag::Replace)
            } else if i < block.a {
                Some(EditTag::Delete)
            } else if j < block.b {
                Some(EditTag::Insert)
            } else {
                None
            };
            if let Some(tag) = tag {
                opcodes.push(Opcode::new(tag, i..block.a, j..block.b));
            }
            i = block.a + block.size;
            j = block.b + block.size;
            if block.size > 0 {
                opcodes.push(Opcode::new(EditTag::Equal, block.a..i, block.b..j));
            }
        }
        opcodes
    }
}
