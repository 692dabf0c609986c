//! Engineered feature set.
//!
//! Produced once per record by the feature engineer in `hemaguard-core`.
//! Holds every raw marker plus the derived indices, with optional markers
//! already defaulted, so it can be laid out as a fixed-width vector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::markers;
use crate::record::Gender;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineeredFeatures {
    values: BTreeMap<String, f64>,
    gender: Option<Gender>,
}

impl EngineeredFeatures {
    /// Wrap an already-complete feature map.
    pub fn new(values: BTreeMap<String, f64>, gender: Option<Gender>) -> Self {
        Self { values, gender }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn hgb(&self) -> f64 {
        self.get(markers::HGB).unwrap_or_default()
    }

    pub fn rdw(&self) -> f64 {
        self.get(markers::RDW).unwrap_or_default()
    }

    pub fn mentzer_index(&self) -> f64 {
        self.get(markers::MENTZER_INDEX).unwrap_or_default()
    }

    /// Lay the features out in `order`.
    ///
    /// Names this set does not carry are emitted as 0.0, the same alignment
    /// the model was validated with.
    pub fn vector<S: AsRef<str>>(&self, order: &[S]) -> Vec<f64> {
        order
            .iter()
            .map(|name| self.get(name.as_ref()).unwrap_or(0.0))
            .collect()
    }

    /// Iterate all features in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
