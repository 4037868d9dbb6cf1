//! Metabolic calculator.
//!
//! Maps body metrics to BMI, BMR (Mifflin-St Jeor), TDEE, a BMI band, a
//! dietary goal and the daily calorie target. Inputs are assumed valid;
//! raw user text goes through [`parse_profile_fields`] first.

use crate::{BmiCategory, Error, Goal, MetabolicConfig, Result, Sex, UserProfile};
use serde::Serialize;

/// Everything derived from a profile, recomputed on every read
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetabolicReport {
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub bmr: f64,
    pub tdee: f64,
    pub goal: Goal,
    pub calorie_target: i32,
}

/// Body Mass Index in kg/m²
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Basal Metabolic Rate (Mifflin-St Jeor)
pub fn bmr(weight_kg: f64, height_cm: f64, age_years: u32, sex: Sex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years);
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 24.9 {
        BmiCategory::Normal
    } else if bmi < 29.9 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Pick a dietary goal from BMI
///
/// Lean men below BMI 22 are pushed towards bulking even inside the
/// normal band.
pub fn classify_goal(bmi: f64, sex: Sex) -> Goal {
    let goal = if bmi < 18.5 {
        Goal::Bulking
    } else if bmi > 25.0 {
        Goal::Cutting
    } else {
        Goal::Maintenance
    };

    if bmi < 22.0 && sex == Sex::Male {
        Goal::Bulking
    } else {
        goal
    }
}

/// Compute the full report for a profile
pub fn calculate(profile: &UserProfile, config: &MetabolicConfig) -> MetabolicReport {
    let bmi = bmi(profile.weight_kg, profile.height_cm);
    let bmr = bmr(profile.weight_kg, profile.height_cm, profile.age_years, profile.sex);
    let tdee = bmr * config.activity_factor + config.activity_offset_kcal;
    let goal = classify_goal(bmi, profile.sex);

    let base = tdee.round() as i32;
    let calorie_target = match goal {
        Goal::Bulking => base + config.goal_adjustment_kcal,
        Goal::Cutting => base - config.goal_adjustment_kcal,
        Goal::Maintenance => base,
    };

    tracing::debug!(
        "Metabolic report: bmi {:.1}, bmr {:.0}, tdee {:.0}, goal {}",
        bmi,
        bmr,
        tdee,
        goal
    );

    MetabolicReport {
        bmi,
        bmi_category: classify_bmi(bmi),
        bmr,
        tdee,
        goal,
        calorie_target,
    }
}

/// Parse the raw weight/height/age fields of the profile forms
///
/// Empty, unparseable or non-positive values are rejected with
/// [`Error::Validation`].
pub fn parse_profile_fields(weight: &str, height: &str, age: &str) -> Result<(f64, f64, u32)> {
    let weight_kg = parse_positive("weight", weight)?;
    let height_cm = parse_positive("height", height)?;

    let age = age.trim();
    if age.is_empty() {
        return Err(Error::Validation("age is required".into()));
    }
    let age_years: u32 = age
        .parse()
        .map_err(|_| Error::Validation(format!("age is not a whole number: {}", age)))?;
    if age_years == 0 {
        return Err(Error::Validation("age must be positive".into()));
    }

    Ok((weight_kg, height_cm, age_years))
}

fn parse_positive(field: &str, raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| Error::Validation(format!("{} is not a number: {}", field, raw)))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Validation(format!("{} must be positive", field)));
    }
    Ok(value)
}

impl UserProfile {
    /// Build a profile from raw form fields
    pub fn from_fields(weight: &str, height: &str, age: &str, sex: Sex) -> Result<Self> {
        let (weight_kg, height_cm, age_years) = parse_profile_fields(weight, height, age)?;
        Ok(Self {
            weight_kg,
            height_cm,
            age_years,
            sex,
            setup_done: false,
        })
    }

    /// Check the numeric preconditions of [`calculate`]
    pub fn validate(&self) -> Result<()> {
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(Error::Validation("weight must be positive".into()));
        }
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(Error::Validation("height must be positive".into()));
        }
        if self.age_years == 0 {
            return Err(Error::Validation("age must be positive".into()));
        }
        Ok(())
    }
}
