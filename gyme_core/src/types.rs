//! Core domain types for gyme.
//!
//! This module defines the records shared by the computations and the
//! persistence layer:
//! - The user profile and its derived classifications
//! - Workouts in the weekly checklist
//! - Recorded runs and their GPS path
//! - Meals and body-weight history

use chrono::{DateTime, Datelike, Local, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

// ============================================================================
// Profile Types
// ============================================================================

/// Biological sex, used by the BMR formula
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            other => Err(Error::Validation(format!("unknown sex: {}", other))),
        }
    }
}

/// Body metrics entered during onboarding and edited from the profile screen
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: u32,
    pub sex: Sex,
    #[serde(default)]
    pub setup_done: bool,
}

/// Dietary goal derived from BMI
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Bulking,
    Cutting,
    Maintenance,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Goal::Bulking => "Bulking",
            Goal::Cutting => "Cutting",
            Goal::Maintenance => "Maintenance",
        };
        f.write_str(s)
    }
}

impl FromStr for Goal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bulking" | "bulk" => Ok(Goal::Bulking),
            "cutting" | "cut" => Ok(Goal::Cutting),
            "maintenance" | "maintain" => Ok(Goal::Maintenance),
            other => Err(Error::Validation(format!("unknown goal: {}", other))),
        }
    }
}

/// BMI band
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Workout Types
// ============================================================================

/// Day label a workout is scheduled on
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn from_chrono(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }

    /// The current day in the local timezone
    pub fn today() -> Self {
        Self::from_chrono(Local::now().weekday())
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for DayOfWeek {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mon" | "monday" => Ok(DayOfWeek::Monday),
            "tue" | "tuesday" => Ok(DayOfWeek::Tuesday),
            "wed" | "wednesday" => Ok(DayOfWeek::Wednesday),
            "thu" | "thursday" => Ok(DayOfWeek::Thursday),
            "fri" | "friday" => Ok(DayOfWeek::Friday),
            "sat" | "saturday" => Ok(DayOfWeek::Saturday),
            "sun" | "sunday" => Ok(DayOfWeek::Sunday),
            other => Err(Error::Validation(format!("unknown day: {}", other))),
        }
    }
}

/// An exercise in the weekly checklist
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub day: DayOfWeek,
    pub exercise_name: String,
    pub muscle_group: String,
    pub sets: String,
    pub reps: String,
    pub instructions: String,
    pub image_url: String,
    #[serde(default)]
    pub completed: bool,
    /// Last working weight the user recorded for this exercise
    #[serde(default)]
    pub weight_kg: f64,
}

// ============================================================================
// Run Types
// ============================================================================

/// A latitude/longitude pair, serialized as `[lat, lon]`
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[0],
            lon: pair[1],
        }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.lat, point.lon]
    }
}

/// A completed, persisted run
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunHistory {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub distance_km: f64,
    pub duration_ms: i64,
    pub calories_burned: i32,
    pub avg_pace: String,
    #[serde(default)]
    pub path: Vec<GeoPoint>,
}

// ============================================================================
// Meal Types
// ============================================================================

/// Meal slot within a day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Position of the slot when listing a day's meals
    pub fn order(&self) -> u8 {
        match self {
            MealType::Breakfast => 1,
            MealType::Lunch => 2,
            MealType::Dinner => 3,
            MealType::Snack => 4,
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A planned or logged meal entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    pub id: Uuid,
    /// Display name, including the computed portion
    pub name: String,
    pub calories: i32,
    pub protein_g: i32,
    pub meal_type: MealType,
    pub eaten_at: DateTime<Utc>,
}

// ============================================================================
// Weight History
// ============================================================================

/// One body-weight measurement, used for the trend series
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub weight_kg: f64,
}
