//! Owned cache of curve sets keyed by chart identity.
//!
//! Detection and dataset loading are comparatively expensive; lookups
//! are not. The cache holds finished [`ChartCurves`] per chart key
//! (file path, scan id, whatever the caller uses) with no staleness
//! tracking. Callers re-insert after re-detection.

use crate::types::ChartCurves;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CurveSetCache {
    entries: HashMap<String, ChartCurves>,
}

impl CurveSetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores curves under the key, returning the displaced entry.
    pub fn insert(&mut self, key: impl Into<String>, curves: ChartCurves) -> Option<ChartCurves> {
        self.entries.insert(key.into(), curves)
    }

    pub fn get(&self, key: &str) -> Option<&ChartCurves> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn evict(&mut self, key: &str) -> Option<ChartCurves> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
