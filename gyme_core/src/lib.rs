#![forbid(unsafe_code)]

//! Core domain model and business logic for the gyme fitness tracker.
//!
//! This crate provides:
//! - Domain types (profile, workouts, runs, meals, weight history)
//! - Metabolic calculator (BMI, BMR, TDEE, goal, calorie target)
//! - GPS run accumulator
//! - Meal plan generator
//! - Persistence (profile file, JSONL record tables, CSV export)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod metabolic;
pub mod tracker;
pub mod meal_plan;
pub mod catalog;
pub mod lock;
pub mod table;
pub mod store;
pub mod profile;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, DataConfig, MealConfig, MetabolicConfig, ProfileDefaults, TrackingConfig};
pub use metabolic::{calculate, MetabolicReport};
pub use tracker::{FixOutcome, GpsFix, LocationPermission, RunAccumulator, RunSnapshot};
pub use meal_plan::{generate_meal_plan, DailyIntake};
pub use catalog::default_program;
pub use table::{Record, Table};
pub use store::{NewWorkout, Store};
pub use profile::ProfileEdit;
pub use export::{export_runs_csv, export_weights_csv};
