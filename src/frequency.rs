// Frequency analysis of ciphertext blocks.
//
// Blocks are counted in order of first appearance and then stably sorted by
// count, so blocks with equal counts keep their discovery order. That order
// is arbitrary but deterministic.

use std::collections::HashMap;
use std::hash::Hash;

use num_bigint::BigUint;

use crate::Ciphertext;

// English letter frequencies in percent, most frequent first.
pub const ENGLISH_LETTER_FREQUENCIES: [(char, f64); 26] = [
    ('E', 12.70),
    ('T', 9.06),
    ('A', 8.17),
    ('O', 7.51),
    ('I', 6.97),
    ('N', 6.75),
    ('S', 6.33),
    ('H', 6.09),
    ('R', 5.99),
    ('D', 4.25),
    ('L', 4.03),
    ('C', 2.78),
    ('U', 2.76),
    ('M', 2.41),
    ('W', 2.36),
    ('F', 2.23),
    ('G', 2.02),
    ('Y', 1.99),
    ('P', 1.93),
    ('B', 1.49),
    ('V', 0.98),
    ('K', 0.77),
    ('J', 0.15),
    ('X', 0.15),
    ('Q', 0.10),
    ('Z', 0.07),
];

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyEntry {
    pub block: BigUint,
    pub count: usize,
    /// Share of all blocks, rounded to two decimal places.
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    /// The `k` most frequent entries, or fewer if the table is shorter.
    pub fn top(&self, k: usize) -> &[FrequencyEntry] {
        &self.entries[..k.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NgramEntry {
    pub blocks: Vec<BigUint>,
    pub count: usize,
    pub percentage: f64,
}

impl NgramEntry {
    /// The blocks joined with commas, e.g. `"103,50"`.
    pub fn label(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Percentage of each distinct block among all blocks, most frequent first.
///
/// Passthrough characters are ignored. A ciphertext with no blocks gives an
/// empty table.
pub fn frequency_table(ciphertext: &Ciphertext) -> FrequencyTable {
    let total = ciphertext.block_count();
    if total == 0 {
        return FrequencyTable::default();
    }

    let entries = rank_by_count(ciphertext.blocks())
        .into_iter()
        .map(|(block, count)| FrequencyEntry {
            block: block.clone(),
            count,
            percentage: percentage(count, total),
        })
        .collect();
    FrequencyTable { entries }
}

/// Frequencies of runs of `n` consecutive blocks, most frequent first.
///
/// Windows never span a passthrough character. Returns nothing when `n` is
/// zero or no run is long enough.
pub fn ngram_table(ciphertext: &Ciphertext, n: usize) -> Vec<NgramEntry> {
    if n == 0 {
        return Vec::new();
    }

    let runs = ciphertext.block_runs();
    let windows = runs.iter().flat_map(|run| run.windows(n));
    let total = windows.clone().count();
    if total == 0 {
        return Vec::new();
    }

    rank_by_count(windows)
        .into_iter()
        .map(|(window, count)| NgramEntry {
            blocks: window.iter().map(|&block| block.clone()).collect(),
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

fn rank_by_count<K: Hash + Eq + Clone>(items: impl Iterator<Item = K>) -> Vec<(K, usize)> {
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut ranked: Vec<(K, usize)> = Vec::new();
    for item in items {
        match index.get(&item) {
            Some(&idx) => ranked[idx].1 += 1,
            None => {
                index.insert(item.clone(), ranked.len());
                ranked.push((item, 1));
            }
        }
    }
    // Stable, so ties stay in discovery order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn percentage(count: usize, total: usize) -> f64 {
    let raw = count as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}
