//! Patient input types.
//!
//! A `PatientRecord` is the raw input to the pipeline: marker name → value.
//! Values that are not finite numbers never enter the map, so "absent" and
//! "non-numeric" are the same state. Nothing is filled with zero here; that
//! is the feature engineer's job.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HemaError, HemaResult};

/// Patient sex as it affects the anemia threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Resolve one of the raw encodings found across clinical datasets.
    ///
    /// Accepts `M`, `0`, `MALE` and `F`, `1`, `FEMALE`, case-insensitively and
    /// ignoring surrounding whitespace. Numeric cells written by a CSV
    /// round-trip (`0.0`, `1.0`) resolve the same way. Anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw.trim().to_ascii_uppercase();
        match cleaned.as_str() {
            "M" | "0" | "MALE" => Some(Self::Male),
            "F" | "1" | "FEMALE" => Some(Self::Female),
            other => match other.parse::<f64>() {
                Ok(v) if v == 0.0 => Some(Self::Male),
                Ok(v) if v == 1.0 => Some(Self::Female),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// One patient's lab panel.
///
/// Built once and never mutated afterwards: the builder methods consume the
/// record and return a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    markers: BTreeMap<String, f64>,
    gender: Option<Gender>,
}

impl PatientRecord {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numeric marker. Non-finite values are dropped (treated as absent).
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        if value.is_finite() {
            self.markers.insert(name.into(), value);
        }
        self
    }

    /// Add a marker from its raw text form, coercing to `f64`.
    ///
    /// Empty or non-numeric text leaves the marker absent.
    pub fn with_raw(self, name: impl Into<String>, raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) => self.with(name, value),
            Err(_) => self,
        }
    }

    /// Set the patient's gender.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Build a record from raw `name → text` pairs.
    ///
    /// A `Gender` entry is resolved through [`Gender::parse`]; every other
    /// entry is coerced to a number or dropped.
    pub fn from_raw<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs.into_iter().fold(Self::new(), |record, (name, raw)| {
            let name = name.trim();
            if name == crate::markers::GENDER {
                match Gender::parse(raw) {
                    Some(g) => record.with_gender(g),
                    None => record,
                }
            } else {
                record.with_raw(name, raw)
            }
        })
    }

    /// The value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.markers.get(name).copied()
    }

    /// The value of `name`, or `InvalidRecord` when it is absent.
    pub fn require(&self, name: &str) -> HemaResult<f64> {
        self.get(name).ok_or_else(|| {
            HemaError::invalid_record(format!("required marker '{}' is missing or non-numeric", name))
        })
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    /// Iterate present markers in name order.
    pub fn markers(&self) -> impl Iterator<Item = (&str, f64)> {
        self.markers.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
