//! Frequency counting with deterministic ranking.

use serde::Serialize;
use std::collections::HashMap;

/// A name with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCount {
    pub name: String,
    pub count: usize,
}

impl RankedCount {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Counts occurrences and remembers the order keys were first seen.
///
/// Ranking sorts by descending count; equal counts keep first-seen order.
#[derive(Debug, Clone, Default)]
pub struct FrequencyCounter {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str) {
        self.add_n(key, 1);
    }

    pub fn add_n(&mut self, key: &str, n: usize) {
        match self.counts.get_mut(key) {
            Some(count) => *count += n,
            None => {
                self.order.push(key.to_string());
                self.counts.insert(key.to_string(), n);
            }
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Distinct keys seen.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// All keys, most frequent first.
    pub fn into_ranked(self) -> Vec<RankedCount> {
        let FrequencyCounter { order, mut counts } = self;
        let mut ranked: Vec<RankedCount> = order
            .into_iter()
            .map(|name| {
                let count = counts.remove(&name).unwrap_or(0);
                RankedCount { name, count }
            })
            .collect();
        // Stable sort keeps first-seen order among ties
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    /// At most `n` keys, most frequent first.
    pub fn top(self, n: usize) -> Vec<RankedCount> {
        let mut ranked = self.into_ranked();
        ranked.truncate(n);
        ranked
    }
}
