//! Greedy, order-preserving chunk packer.
//!
//! Units are appended to the current chunk in input order. When the next
//! piece would push the chunk over the ceiling the chunk is sealed and a new
//! one starts with that piece. A unit that alone exceeds the ceiling is cut
//! into line groups by proportional striding and each group goes through the
//! same seal-on-overflow rule, so a fragment may share a chunk with whatever
//! budget the previous unit left over.
//!
//! The packer never reorders and never drops content: concatenating the
//! chunks' contents reproduces the concatenated unit bodies byte for byte.
//! The only chunk allowed over the ceiling is one holding a single line that
//! by itself costs more than the ceiling, since there is nothing left to cut.

use std::sync::Arc;

use tracing::debug;

use super::base::TokenCounter;
use crate::types::{Chunk, ChunkPiece, Unit};

/// Packs units into budget-bounded chunks.
pub struct ChunkPacker {
    counter: Arc<dyn TokenCounter>,
    max_cost: usize,
}

impl ChunkPacker {
    /// Create a packer. A zero ceiling is raised to one.
    pub fn new(counter: Arc<dyn TokenCounter>, max_cost: usize) -> Self {
        Self {
            counter,
            max_cost: max_cost.max(1),
        }
    }

    pub fn max_cost(&self) -> usize {
        self.max_cost
    }

    /// Cost of arbitrary text under this packer's counter.
    pub fn cost(&self, text: &str) -> usize {
        self.counter.count_tokens(text)
    }

    /// Pack units into chunks.
    pub fn pack(&self, units: &[Unit]) -> Vec<Chunk> {
        let mut state = PackState::new(self.max_cost);

        for unit in units {
            let cost = self.counter.count_tokens(&unit.body);
            if cost <= self.max_cost {
                state.add(ChunkPiece {
                    label: unit.label.clone(),
                    text: unit.body.clone(),
                    cost,
                    fragment: None,
                });
                continue;
            }

            let fragments = self.fragment(&unit.body);
            let total = fragments.len();
            debug!(
                label = %unit.label,
                cost,
                max_cost = self.max_cost,
                fragments = total,
                "Splitting oversized unit"
            );
            for (i, (text, cost)) in fragments.into_iter().enumerate() {
                state.add(ChunkPiece {
                    label: unit.label.clone(),
                    text,
                    cost,
                    fragment: Some((i + 1, total)),
                });
            }
        }

        state.finish()
    }

    /// Cut text into consecutive line groups, each within the ceiling unless
    /// it is a single line.
    fn fragment(&self, text: &str) -> Vec<(String, usize)> {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut out = Vec::new();
        self.split_lines(&lines, &mut out);
        out
    }

    fn split_lines(&self, lines: &[&str], out: &mut Vec<(String, usize)>) {
        let text = lines.concat();
        let cost = self.counter.count_tokens(&text);
        if cost <= self.max_cost || lines.len() <= 1 {
            out.push((text, cost));
            return;
        }

        // cost > max_cost, so at least two groups and stride < lines.len()
        let target = cost.div_ceil(self.max_cost);
        let stride = (lines.len() / target).max(1);
        for group in lines.chunks(stride) {
            self.split_lines(group, out);
        }
    }
}

/// Running state of a single packing pass.
struct PackState {
    max_cost: usize,
    current: Chunk,
    sealed: Vec<Chunk>,
}

impl PackState {
    fn new(max_cost: usize) -> Self {
        Self {
            max_cost,
            current: Chunk::new(0),
            sealed: Vec::new(),
        }
    }

    fn add(&mut self, piece: ChunkPiece) {
        if !self.current.is_empty() && self.current.cost + piece.cost > self.max_cost {
            self.seal();
        }
        self.current.push(piece);

        // an unsplittable line over the ceiling travels alone
        if self.current.cost > self.max_cost {
            self.seal();
        }
    }

    fn seal(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let next = Chunk::new(self.sealed.len() + 1);
        self.sealed.push(std::mem::replace(&mut self.current, next));
    }

    fn finish(mut self) -> Vec<Chunk> {
        self.seal();
        self.sealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunkers::base::CharCounter;
    use pretty_assertions::assert_eq;

    /// Half a cost unit per line, so 1000 lines cost 500.
    struct HalfLineCounter;

    impl TokenCounter for HalfLineCounter {
        fn count_tokens(&self, text: &str) -> usize {
            text.matches('\n').count() / 2
        }

        fn name(&self) -> &'static str {
            "half-line"
        }
    }

    fn packer(max_cost: usize) -> ChunkPacker {
        ChunkPacker::new(Arc::new(CharCounter), max_cost)
    }

    fn concat_chunks(chunks: &[Chunk]) -> String {
        chunks.iter().map(Chunk::content).collect()
    }

    fn concat_units(units: &[Unit]) -> String {
        units.iter().map(|u| u.body.as_str()).collect()
    }

    #[test]
    fn test_zero_units() {
        assert!(packer(100).pack(&[]).is_empty());
    }

    #[test]
    fn test_all_units_fit_one_chunk() {
        let units = vec![Unit::new("a", "aaa"), Unit::new("b", "bbb")];
        let chunks = packer(100).pack(&units);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].cost, 6);
        assert_eq!(chunks[0].labels(), vec!["a", "b"]);
    }

    #[test]
    fn test_greedy_seal_on_overflow() {
        let units = vec![
            Unit::new("unit1", "x".repeat(40)),
            Unit::new("unit2", "y".repeat(40)),
            Unit::new("unit3", "z".repeat(40)),
        ];
        let chunks = packer(100).pack(&units);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].labels(), vec!["unit1", "unit2"]);
        assert_eq!(chunks[0].cost, 80);
        assert_eq!(chunks[1].labels(), vec!["unit3"]);
        assert_eq!(chunks[1].cost, 40);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn test_oversized_unit_split_by_stride() {
        let body = "line\n".repeat(1000);
        let units = vec![Unit::new("big.rs", body.clone())];
        let packer = ChunkPacker::new(Arc::new(HalfLineCounter), 100);

        let chunks = packer.pack(&units);

        assert_eq!(chunks.len(), 5);
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(chunk.cost <= 100);
            assert_eq!(chunk.pieces.len(), 1);
            assert_eq!(chunk.pieces[0].fragment, Some((i + 1, 5)));
        }
        assert_eq!(concat_chunks(&chunks), body);
    }

    #[test]
    fn test_fragment_uses_leftover_budget() {
        let units = vec![
            Unit::new("small", "s".repeat(30)),
            Unit::new("big", format!("{}\n", "b".repeat(49)).repeat(5)),
        ];
        let chunks = packer(100).pack(&units);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].labels(), vec!["small", "big (part 1/5)"]);
        assert_eq!(chunks[0].cost, 80);
        assert_eq!(chunks[1].cost, 100);
        assert_eq!(chunks[2].cost, 100);
        assert_eq!(concat_chunks(&chunks), concat_units(&units));
    }

    #[test]
    fn test_uneven_lines_are_split_again() {
        // one long line in the middle makes the first stride group too big
        let mut body = String::new();
        for _ in 0..4 {
            body.push_str("short\n");
        }
        body.push_str(&format!("{}\n", "l".repeat(90)));
        for _ in 0..4 {
            body.push_str("short\n");
        }
        let units = vec![Unit::new("uneven", body.clone())];

        let chunks = packer(100).pack(&units);

        for chunk in &chunks {
            assert!(chunk.cost <= 100, "chunk {} costs {}", chunk.index, chunk.cost);
        }
        assert_eq!(concat_chunks(&chunks), body);
    }

    #[test]
    fn test_single_line_over_ceiling_is_emitted_alone() {
        let units = vec![
            Unit::new("before", "a".repeat(10)),
            Unit::new("minified.js", "m".repeat(250)),
            Unit::new("after", "c".repeat(10)),
        ];
        let chunks = packer(100).pack(&units);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].pieces.len(), 1);
        assert_eq!(chunks[1].cost, 250);
        assert_eq!(chunks[1].pieces[0].fragment, Some((1, 1)));
        assert_eq!(chunks[2].labels(), vec!["after"]);
        assert_eq!(concat_chunks(&chunks), concat_units(&units));
    }

    #[test]
    fn test_zero_cost_unit_is_kept() {
        let units = vec![
            Unit::new("a", "x".repeat(100)),
            Unit::new("empty", ""),
            Unit::new("b", "y"),
        ];
        let chunks = packer(100).pack(&units);

        let labels: Vec<String> = chunks.iter().flat_map(Chunk::labels).collect();
        assert_eq!(labels, vec!["a", "empty", "b"]);
        assert_eq!(chunks[0].labels(), vec!["a", "empty"]);
    }

    #[test]
    fn test_completeness_and_ceiling_across_budgets() {
        let units: Vec<Unit> = (0..12)
            .map(|i| {
                let line = format!("fn item_{i}() {{ {} }}\n", "z".repeat(i * 3));
                Unit::new(format!("src/f{i}.rs"), line.repeat(i + 1))
            })
            .collect();
        let expected = concat_units(&units);

        for max_cost in [1, 7, 25, 64, 100, 333, 10_000] {
            let chunks = packer(max_cost).pack(&units);
            assert_eq!(concat_chunks(&chunks), expected, "max_cost {max_cost}");

            for chunk in &chunks {
                if chunk.cost > max_cost {
                    // only an unsplittable single line may exceed the ceiling
                    assert_eq!(chunk.pieces.len(), 1);
                    assert!(chunk.pieces[0].text.trim_end_matches('\n').lines().count() <= 1);
                }
            }
            let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
            assert_eq!(indices, (0..chunks.len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_zero_ceiling_is_raised() {
        assert_eq!(packer(0).max_cost(), 1);
    }
}
