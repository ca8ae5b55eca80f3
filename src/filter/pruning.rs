//! Density-pruning content filter
//!
//! Scores each block from its word count and link density and discards
//! blocks below the cut line. Two modes:
//!
//! - `fixed`: the configured threshold is the cut line as-is
//! - `dynamic`: the cut line is scaled to the densest block on the page,
//!   so sparse pages are not pruned to nothing and dense pages are pruned
//!   harder

use crate::config::PruningMode;
use crate::filter::{ContentFilter, TextBlock};

/// Word count at which a block earns half of the maximum length score
const LENGTH_MIDPOINT: f64 = 20.0;

pub struct PruningFilter {
    threshold: f64,
    mode: PruningMode,
    min_words_per_block: usize,
}

impl PruningFilter {
    pub fn new(threshold: f64, mode: PruningMode, min_words_per_block: usize) -> Self {
        Self {
            threshold,
            mode,
            min_words_per_block,
        }
    }

    /// Density score in `[0.0, 1.0)`: long blocks of non-link text score
    /// high, short or link-heavy blocks score low. Headings get a small
    /// boost so section titles survive alongside their bodies.
    fn score(block: &TextBlock) -> f64 {
        let words = block.word_count() as f64;
        let length_score = words / (words + LENGTH_MIDPOINT);
        let base = (1.0 - block.link_density()) * length_score;

        if block.tag.starts_with('h') {
            (base + 0.2).min(0.99)
        } else {
            base
        }
    }

    /// The effective cut line for a page's score distribution
    fn cut_line(&self, scores: &[f64]) -> f64 {
        match self.mode {
            PruningMode::Fixed => self.threshold,
            PruningMode::Dynamic => {
                let max_score = scores.iter().cloned().fold(0.0, f64::max);
                self.threshold * max_score
            }
        }
    }
}

impl ContentFilter for PruningFilter {
    fn filter_blocks(&self, blocks: &[TextBlock]) -> Vec<TextBlock> {
        if blocks.is_empty() {
            return Vec::new();
        }

        let scores: Vec<f64> = blocks.iter().map(Self::score).collect();
        let cut = self.cut_line(&scores);

        blocks
            .iter()
            .zip(scores.iter())
            .filter(|(block, score)| {
                block.word_count() >= self.min_words_per_block && **score >= cut
            })
            .map(|(block, _)| block.clone())
            .collect()
    }
}
