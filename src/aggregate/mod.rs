//! Per-country peer tally
//!
//! Every peer fed through the pipeline lands in exactly one place: a country
//! count or the unresolved list. [`Aggregator`] is the only way to mutate the
//! tally; the finished [`Aggregate`] is read-only.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::enrich::Enrichment;
use crate::models::CountryCode;

/// Final result of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    counts: BTreeMap<CountryCode, u64>,
    unresolved: Vec<Vec<String>>,
}

/// One slice of a summarized aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryShare {
    pub label: String,
    pub count: u64,
}

impl Aggregate {
    pub const OTHER_LABEL: &'static str = "other";

    pub fn counts(&self) -> &BTreeMap<CountryCode, u64> {
        &self.counts
    }

    /// Address lists of peers that resolved nowhere, in processing order
    pub fn unresolved(&self) -> &[Vec<String>] {
        &self.unresolved
    }

    pub fn count_for(&self, country: &CountryCode) -> u64 {
        self.counts.get(country).copied().unwrap_or(0)
    }

    pub fn resolved_peers(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of peers that contributed to this aggregate
    pub fn total_peers(&self) -> u64 {
        self.resolved_peers() + self.unresolved.len() as u64
    }

    /// Percentage of resolved peers that `count` represents
    pub fn share_of_resolved(&self, count: u64) -> f64 {
        match self.resolved_peers() {
            0 => 0.0,
            resolved => count as f64 * 100.0 / resolved as f64,
        }
    }

    /// Group countries below `threshold` peers into a single `other` share.
    ///
    /// Shares are ordered by count, largest first; ties break on the label.
    pub fn summarize(&self, threshold: u64) -> Vec<CountryShare> {
        let mut other = 0;
        let mut shares: Vec<CountryShare> = Vec::new();

        for (country, &count) in &self.counts {
            if count < threshold {
                other += count;
            } else {
                shares.push(CountryShare {
                    label: country.to_string(),
                    count,
                });
            }
        }

        if other > 0 {
            shares.push(CountryShare {
                label: Self::OTHER_LABEL.to_string(),
                count: other,
            });
        }

        shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        shares
    }
}

/// Mutable builder for an [`Aggregate`].
///
/// Not synchronized: parallel runs give each worker its own aggregator and
/// [`merge`](Self::merge) the results.
#[derive(Debug, Default)]
pub struct Aggregator {
    aggregate: Aggregate,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_country(&mut self, country: CountryCode) {
        debug_assert!(!country.is_unknown(), "unknown is not a country");
        *self.aggregate.counts.entry(country).or_insert(0) += 1;
    }

    pub fn record_unresolved(&mut self, addresses: Vec<String>) {
        self.aggregate.unresolved.push(addresses);
    }

    /// Route an enrichment outcome to the matching record operation
    pub fn record(&mut self, enrichment: Enrichment) {
        match enrichment {
            Enrichment::Country(country) => self.record_country(country),
            Enrichment::Unresolved(addresses) => self.record_unresolved(addresses),
        }
    }

    /// Fold a partial aggregate in. Its unresolved entries go after ours.
    pub fn merge(&mut self, other: Aggregate) {
        for (country, count) in other.counts {
            *self.aggregate.counts.entry(country).or_insert(0) += count;
        }
        self.aggregate.unresolved.extend(other.unresolved);
    }

    pub fn finish(self) -> Aggregate {
        self.aggregate
    }
}
