//! Normalized proportion maps.
//!
//! [`Proportions`] is the shared rebalancing engine behind mixture, solution
//! and material constituents: an owned, insertion-ordered map from a key to
//! its fractional share. After every mutation the values sum to 1 and each
//! value lies in (0, 1]. The sum is maintained by construction, each
//! mutation applying one exact ratio to the surviving entries, not by a
//! trailing renormalization pass.

use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Error type for proportion arguments.
#[derive(Debug, thiserror::Error)]
pub enum ProportionError {
    #[error("proportion out of range: {0}")]
    OutOfRange(f64),
    #[error("no positive weights to normalize")]
    Empty,
}

fn check(proportion: f64) -> Result<(), ProportionError> {
    if proportion.is_finite() && proportion > 0.0 {
        Ok(())
    } else {
        Err(ProportionError::OutOfRange(proportion))
    }
}

/// An owned map of keys to fractional shares, kept normalized to sum 1.
///
/// The map is owned outright by its container and replaced wholesale on each
/// mutation; cloning yields a fully independent copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proportions<K: Hash + Eq> {
    entries: IndexMap<K, f64>,
}

impl<K: Hash + Eq> Default for Proportions<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq> Proportions<K> {
    /// The empty container, the "nothing yet" state.
    pub fn new() -> Self {
        Proportions {
            entries: IndexMap::new(),
        }
    }

    /// Builds a container from arbitrary positive weights, scaled to sum 1.
    /// Duplicate keys merge by addition before scaling.
    pub fn normalized(
        weights: impl IntoIterator<Item = (K, f64)>,
    ) -> Result<Self, ProportionError> {
        let mut entries: IndexMap<K, f64> = IndexMap::new();
        for (key, weight) in weights {
            check(weight)?;
            *entries.entry(key).or_insert(0.0) += weight;
        }
        let total: f64 = entries.values().sum();
        if entries.is_empty() || total <= 0.0 {
            return Err(ProportionError::Empty);
        }
        for value in entries.values_mut() {
            *value /= total;
        }
        Ok(Proportions { entries })
    }

    /// Sets `key`'s share to `proportion`, rebalancing every other entry.
    ///
    /// A share of 1 or more, or a container with no other entries, replaces
    /// the whole container with `{key: 1}`. Otherwise the other entries are
    /// scaled by `(1 - proportion) / (1 - previous)` so the sum stays exactly
    /// 1 (for a new key, `previous` is 0 and the ratio is `1 - proportion`).
    pub fn set(&mut self, key: K, proportion: f64) -> Result<(), ProportionError> {
        check(proportion)?;
        let previous = self.entries.get(&key).copied().unwrap_or(0.0);
        let has_others = self.entries.len() > if previous > 0.0 { 1 } else { 0 };
        if proportion >= 1.0 || !has_others {
            self.entries.clear();
            self.entries.insert(key, 1.0);
            return Ok(());
        }
        let ratio = (1.0 - proportion) / (1.0 - previous);
        for (existing, value) in self.entries.iter_mut() {
            if *existing != key {
                *value *= ratio;
            }
        }
        self.entries.insert(key, proportion);
        Ok(())
    }

    /// Sets a batch of shares with one aggregate rebalance rather than
    /// per-item iteration; repeated ratio application compounds rounding
    /// error across a large batch.
    pub fn set_many(
        &mut self,
        pairs: impl IntoIterator<Item = (K, f64)>,
    ) -> Result<(), ProportionError> {
        let mut batch: IndexMap<K, f64> = IndexMap::new();
        for (key, proportion) in pairs {
            check(proportion)?;
            *batch.entry(key).or_insert(0.0) += proportion;
        }
        if batch.is_empty() {
            return Ok(());
        }

        let incoming: f64 = batch.values().sum();
        let displaced: f64 = batch
            .keys()
            .filter_map(|key| self.entries.get(key))
            .sum();
        let survivors = self
            .entries
            .keys()
            .any(|key| !batch.contains_key(key));

        if incoming >= 1.0 || !survivors {
            // The batch takes the whole container; rescale it to sum 1.
            self.entries.clear();
            for (key, proportion) in batch {
                self.entries.insert(key, proportion / incoming);
            }
            return Ok(());
        }

        let ratio = (1.0 - incoming) / (1.0 - displaced);
        for (existing, value) in self.entries.iter_mut() {
            if !batch.contains_key(existing) {
                *value *= ratio;
            }
        }
        for (key, proportion) in batch {
            self.entries.insert(key, proportion);
        }
        Ok(())
    }

    /// Removes `key`, scaling the survivors by `1 / (1 - removed)`.
    /// Returns the removed share, if the key was present.
    pub fn remove(&mut self, key: &K) -> Option<f64> {
        let removed = self.entries.shift_remove(key)?;
        self.rescale_after_removal(removed);
        Some(removed)
    }

    /// Removes every entry matching the predicate, rebalancing once for the
    /// aggregate removed share. Returns the number of entries removed.
    pub fn remove_by(&mut self, mut predicate: impl FnMut(&K, f64) -> bool) -> usize {
        let before = self.entries.len();
        let mut removed_total = 0.0;
        self.entries.retain(|key, value| {
            if predicate(key, *value) {
                removed_total += *value;
                false
            } else {
                true
            }
        });
        let removed = before - self.entries.len();
        if removed > 0 {
            self.rescale_after_removal(removed_total);
        }
        removed
    }

    fn rescale_after_removal(&mut self, removed: f64) {
        // A removed share of 0 (or an emptied container) needs no rescale;
        // the guard also keeps 1/(1 - removed) away from division by zero.
        if self.entries.is_empty() || removed <= 0.0 || removed >= 1.0 {
            return;
        }
        let ratio = 1.0 / (1.0 - removed);
        for value in self.entries.values_mut() {
            *value *= ratio;
        }
    }

    /// The share held by `key`, 0 when absent.
    pub fn proportion(&self, key: &K) -> f64 {
        self.entries.get(key).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Current sum of shares; 1 whenever the container is non-empty.
    pub fn sum(&self) -> f64 {
        self.entries.values().sum()
    }

    /// The key with the largest share, ties broken by insertion order.
    pub fn dominant(&self) -> Option<&K> {
        self.entries
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k)
    }
}

impl<K: Hash + Eq> FromIterator<(K, f64)> for Proportions<K> {
    /// Collects via repeated [`Proportions::set`]; invalid shares are
    /// skipped. Prefer [`Proportions::normalized`] when weights are
    /// arbitrary.
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut proportions = Proportions::new();
        for (key, value) in iter {
            let _ = proportions.set(key, value);
        }
        proportions
    }
}
