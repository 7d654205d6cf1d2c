use std::{collections::HashMap, fmt::Display};

use serde::Serialize;

/// Bytes of code per language, as reported for a single repository.
pub type LanguageBytes = HashMap<String, u64>;

/// Share of a language across the sampled repositories.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LanguageStat {
    /// The language name.
    pub name: String,

    /// Total bytes across the sampled repositories.
    pub bytes: u64,

    /// Rounded share of the sampled total, in `[0, 100]`.
    pub percentage: u8,
}

impl LanguageStat {
    /// Creates a new `LanguageStat` instance.
    pub fn new(name: &str, bytes: u64, percentage: u8) -> Self {
        Self {
            name: name.to_string(),
            bytes,
            percentage,
        }
    }

    /// Merges per-repository breakdowns and keeps the `top` languages by bytes.
    ///
    /// Languages are ordered by bytes descending, then by name. An empty or all-zero
    /// breakdown yields no statistics.
    pub fn aggregate(breakdowns: Vec<LanguageBytes>, top: usize) -> Vec<LanguageStat> {
        let merged = merge_language_bytes(breakdowns);
        let total_bytes = merged
            .values()
            .fold(0u64, |total, bytes| total.saturating_add(*bytes));
        if total_bytes == 0 {
            return vec![];
        }

        let mut stats = merged
            .into_iter()
            .map(|(name, bytes)| LanguageStat {
                percentage: percentage_of(bytes, total_bytes),
                name,
                bytes,
            })
            .collect::<Vec<_>>();
        stats.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));
        stats.truncate(top);

        stats
    }
}

impl Display for LanguageStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}% ({} bytes)", self.name, self.percentage, self.bytes)
    }
}

/// Sums bytes per language name across breakdowns, saturating at `u64::MAX`.
pub fn merge_language_bytes(breakdowns: Vec<LanguageBytes>) -> LanguageBytes {
    let mut merged = LanguageBytes::new();
    for breakdown in breakdowns {
        for (language, bytes) in breakdown {
            let total = merged.entry(language).or_default();
            *total = total.saturating_add(bytes);
        }
    }

    merged
}

fn percentage_of(bytes: u64, total_bytes: u64) -> u8 {
    let ratio = bytes as f64 / total_bytes as f64 * 100.0;

    ratio.round().clamp(0.0, 100.0) as u8
}
