use chrono::NaiveDate;

use crate::metrics::{BodyFatCategory, DerivedMetrics};

/// One persisted measurement event, as stored in the table file.
/// Columns: date, name, weight, BMI, BMR, body-fat %, body-fat
/// category, recommended calories.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub date: NaiveDate,
    pub name: String,
    pub weight_kg: f64,
    pub bmi: f64,
    pub bmr_kcal: i32,
    pub body_fat_pct: f64,
    pub body_fat_category: BodyFatCategory,
    pub calories_kcal: i32,
}

impl Record {
    pub fn new(date: NaiveDate, name: String, weight_kg: f64, metrics: &DerivedMetrics) -> Self {
        Self {
            date,
            name,
            weight_kg,
            bmi: metrics.bmi,
            bmr_kcal: metrics.bmr_kcal,
            body_fat_pct: metrics.body_fat_pct,
            body_fat_category: metrics.body_fat_category,
            calories_kcal: metrics.calories_kcal,
        }
    }
}
