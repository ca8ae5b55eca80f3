//! Query-relevance content filter
//!
//! BM25-style scoring of content blocks against a user query. The page's
//! blocks form the scoring corpus; blocks under the configured threshold
//! are discarded.

use crate::filter::{ContentFilter, TextBlock};
use std::collections::HashMap;

const K1: f64 = 1.2;
const B: f64 = 0.75;

pub struct Bm25Filter {
    query_terms: Vec<String>,
    threshold: f64,
}

impl Bm25Filter {
    pub fn new(query: &str, threshold: f64) -> Self {
        Self {
            query_terms: tokenize(query),
            threshold,
        }
    }
}

/// Lowercased alphanumeric tokens
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

impl ContentFilter for Bm25Filter {
    fn filter_blocks(&self, blocks: &[TextBlock]) -> Vec<TextBlock> {
        if blocks.is_empty() || self.query_terms.is_empty() {
            return Vec::new();
        }

        let tokenized: Vec<Vec<String>> = blocks.iter().map(|b| tokenize(&b.text)).collect();
        let total_blocks = tokenized.len() as f64;
        let avg_len =
            tokenized.iter().map(|t| t.len()).sum::<usize>() as f64 / total_blocks.max(1.0);

        // Document frequency per query term
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for term in &self.query_terms {
            let df = tokenized
                .iter()
                .filter(|tokens| tokens.iter().any(|t| t == term))
                .count();
            doc_freq.insert(term.as_str(), df);
        }

        blocks
            .iter()
            .zip(tokenized.iter())
            .filter(|(_, tokens)| {
                let len = tokens.len() as f64;
                let mut score = 0.0;

                for term in &self.query_terms {
                    let tf = tokens.iter().filter(|t| *t == term).count() as f64;
                    if tf == 0.0 {
                        continue;
                    }

                    let df = doc_freq[term.as_str()] as f64;
                    let idf = ((total_blocks - df + 0.5) / (df + 0.5) + 1.0).ln();
                    let norm = tf * (K1 + 1.0) / (tf + K1 * (1.0 - B + B * len / avg_len.max(1.0)));
                    score += idf * norm;
                }

                score >= self.threshold
            })
            .map(|(block, _)| block.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevant_block_kept_irrelevant_dropped() {
        let filter = Bm25Filter::new("pricing", 0.1);
        let blocks = vec![
            TextBlock::new("p", "Our pricing starts at ten dollars per month"),
            TextBlock::new("p", "The weather today is sunny with light wind"),
            TextBlock::new("p", "See the pricing page for enterprise pricing tiers"),
        ];

        let kept = filter.filter_blocks(&blocks);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|b| b.text.contains("pricing")));
    }

    #[test]
    fn test_threshold_discards_weak_matches() {
        // With an unreachable threshold nothing survives.
        let filter = Bm25Filter::new("pricing", 1e6);
        let blocks = vec![TextBlock::new("p", "pricing pricing pricing")];
        assert!(filter.filter_blocks(&blocks).is_empty());
    }

    #[test]
    fn test_multi_term_query() {
        let filter = Bm25Filter::new("install guide", 0.1);
        let blocks = vec![
            TextBlock::new("p", "Follow the install guide to set up the tool"),
            TextBlock::new("p", "Completely unrelated paragraph about birds"),
        ];

        let kept = filter.filter_blocks(&blocks);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].text.contains("install"));
    }

    #[test]
    fn test_tokenize_is_case_insensitive() {
        let filter = Bm25Filter::new("PRICING", 0.1);
        let blocks = vec![TextBlock::new("p", "pricing information and plan details")];
        assert_eq!(filter.filter_blocks(&blocks).len(), 1);
    }

    #[test]
    fn test_empty_query_keeps_nothing() {
        let filter = Bm25Filter::new("", 0.1);
        let blocks = vec![TextBlock::new("p", "some content here")];
        assert!(filter.filter_blocks(&blocks).is_empty());
    }
}
