use strum::{Display, EnumString};

/// Classification of an estimated body-fat percentage against the
/// sex-specific obesity threshold (25% male, 32% female).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyFatCategory {
    #[strum(serialize = "obese")]
    #[cfg_attr(feature = "serde", serde(rename = "obese"))]
    Obese,
    #[strum(serialize = "normal/manage")]
    #[cfg_attr(feature = "serde", serde(rename = "normal/manage"))]
    NormalManage,
}

/// Weight band corresponding to a normal BMI (18.5-23.0) at a given height.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightRange {
    pub min_kg: f64,
    pub max_kg: f64,
}

/// Metrics derived from a [`Measurement`](crate::measurement::Measurement).
/// Recomputed on demand, never cached or persisted on their own.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedMetrics {
    pub bmi: f64,
    pub bmr_kcal: i32,
    pub body_fat_pct: f64,
    pub body_fat_category: BodyFatCategory,
    pub calories_kcal: i32,
    pub standard_weight_range: WeightRange,
}

/// Display-only reference captions shown next to the metric cards.
/// Static literals keyed by sex, not computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReferenceBands {
    pub bmi: &'static str,
    pub bmr_kcal: &'static str,
    pub body_fat_pct: &'static str,
}
