use std::str::FromStr;

use vitalog_model::{
    measurement::{ActivityLevel, Measurement, Sex},
    metrics::{BodyFatCategory, DerivedMetrics, ReferenceBands, WeightRange},
};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid activity level: {0:?}")]
    InvalidActivityLevel(String),
}

type Result<T> = std::result::Result<T, Error>;

const NORMAL_BMI_MIN: f64 = 18.5;
const NORMAL_BMI_MAX: f64 = 23.0;

/// Derive health metrics from a single measurement.
///
/// Pure and deterministic: identical inputs yield bit-identical outputs.
/// Inputs are assumed valid (weight and height positive, age at least 1);
/// range checking is the caller's job.
pub fn compute(m: &Measurement) -> DerivedMetrics {
    let height_m = m.height_m();
    let bmi = round2(m.weight_kg / (height_m * height_m));

    // Mifflin-St Jeor. Kept unrounded until the final truncation so the
    // calorie estimate works from the raw value.
    let sex_offset = match m.sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    let bmr = 10.0 * m.weight_kg + 6.25 * m.height_cm - 5.0 * m.age as f64 + sex_offset;

    // Deurenberg estimate, computed from the already-rounded BMI.
    let fat_offset = match m.sex {
        Sex::Male => 16.2,
        Sex::Female => 5.4,
    };
    let body_fat_pct = round1(1.20 * bmi + 0.23 * m.age as f64 - fat_offset);

    let obesity_threshold = match m.sex {
        Sex::Male => 25.0,
        Sex::Female => 32.0,
    };
    let body_fat_category = if body_fat_pct >= obesity_threshold {
        BodyFatCategory::Obese
    } else {
        BodyFatCategory::NormalManage
    };

    let calories_kcal = (bmr * m.activity.multiplier()).floor() as i32;

    let standard_weight_range = WeightRange {
        min_kg: round1(NORMAL_BMI_MIN * height_m * height_m),
        max_kg: round1(NORMAL_BMI_MAX * height_m * height_m),
    };

    DerivedMetrics {
        bmi,
        bmr_kcal: bmr as i32,
        body_fat_pct,
        body_fat_category,
        calories_kcal,
        standard_weight_range,
    }
}

/// Same as [`compute`], but takes the activity level as the raw key from a
/// form submission. An unmapped key fails with
/// [`Error::InvalidActivityLevel`] and produces no partial output.
pub fn compute_for_key(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    sex: Sex,
    activity_key: &str,
) -> Result<DerivedMetrics> {
    let activity = ActivityLevel::from_str(activity_key)
        .map_err(|_| Error::InvalidActivityLevel(activity_key.to_owned()))?;
    Ok(compute(&Measurement::new(
        weight_kg, height_cm, age, sex, activity,
    )))
}

/// Display-only reference captions for the metric cards. Static lookup
/// keyed by sex, not computed.
pub fn reference_bands(sex: Sex) -> ReferenceBands {
    match sex {
        Sex::Male => ReferenceBands {
            bmi: "18.5-23.0",
            bmr_kcal: "1500-1800",
            body_fat_pct: "15-25%",
        },
        Sex::Female => ReferenceBands {
            bmi: "18.5-23.0",
            bmr_kcal: "1200-1500",
            body_fat_pct: "20-32%",
        },
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
