use strum::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    VeryActive,
}

impl ActivityLevel {
    /// Scalar applied to BMR to estimate total daily energy expenditure.
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::VeryActive => 1.725,
        }
    }
}

/// A single set of body measurements, constructed fresh per computation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub sex: Sex,
    pub activity: ActivityLevel,
}

impl Measurement {
    pub fn new(weight_kg: f64, height_cm: f64, age: u32, sex: Sex, activity: ActivityLevel) -> Self {
        Self {
            weight_kg,
            height_cm,
            age,
            sex,
            activity,
        }
    }

    pub fn height_m(&self) -> f64 {
        self.height_cm / 100.0
    }
}
