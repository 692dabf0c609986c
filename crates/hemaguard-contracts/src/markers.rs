//! Canonical lab-marker column names.
//!
//! These strings are the schema shared by the normalizer, the feature
//! engineer, the model manifest, and CSV output. They match the column names
//! the reference model was trained on, including the `%` suffixes.

pub const HGB: &str = "HGB";
pub const RBC: &str = "RBC";
pub const MCV: &str = "MCV";
pub const MCH: &str = "MCH";
pub const MCHC: &str = "MCHC";
pub const RDW: &str = "RDW";
pub const HCT: &str = "HCT";
pub const WBC: &str = "WBC";
pub const PLT: &str = "PLT";
pub const MPV: &str = "MPV";
pub const GENDER: &str = "Gender";

pub const LYMPHOCYTE_PCT: &str = "LY%";
pub const MONOCYTE_PCT: &str = "MO%";
pub const NEUTROPHIL_PCT: &str = "NE%";
pub const EOSINOPHIL_PCT: &str = "EO%";
pub const BASOPHIL_PCT: &str = "BA%";

pub const IS_SMOKER: &str = "is_smoker";
pub const IS_ATHLETE: &str = "is_athlete";

/// Derived `MCV / RBC` ratio.
pub const MENTZER_INDEX: &str = "Mentzer_Index";

/// Ground-truth anemia label column produced by batch preparation.
pub const TARGET: &str = "Target";
/// Risk tier column produced by training-data preparation.
pub const RISK_SCORE: &str = "Risk_Score";
/// Emergency flag column produced by training-data preparation.
pub const IS_EMERGENCY: &str = "Is_Emergency";

/// Markers without which no features can be engineered.
pub const REQUIRED_MARKERS: [&str; 3] = [HGB, RBC, MCV];

/// The "clinical core five" entered on the single-patient form.
pub const CORE_MARKERS: [&str; 5] = [HGB, RBC, MCV, MCH, RDW];

/// Optional features that default to 0.0 when unknown.
pub const DEFAULTED_FEATURES: [&str; 10] = [
    IS_SMOKER,
    IS_ATHLETE,
    LYMPHOCYTE_PCT,
    MONOCYTE_PCT,
    NEUTROPHIL_PCT,
    EOSINOPHIL_PCT,
    BASOPHIL_PCT,
    MPV,
    WBC,
    RDW,
];
