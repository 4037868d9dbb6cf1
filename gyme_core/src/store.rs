//! Local data store.
//!
//! A [`Store`] owns the data directory: the profile document and one
//! [`Table`] per record type. It is constructed explicitly and handed to
//! whatever needs it.

use crate::catalog::{self, DEFAULT_IMAGE_URL};
use crate::meal_plan::sort_by_meal_type;
use crate::table::Table;
use crate::{DayOfWeek, Error, Meal, Result, RunHistory, WeightEntry, Workout};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const PROFILE_FILE: &str = "profile.json";
const WORKOUTS_FILE: &str = "workouts.jsonl";
const RUNS_FILE: &str = "runs.jsonl";
const MEALS_FILE: &str = "meals.jsonl";
const WEIGHTS_FILE: &str = "weights.jsonl";

/// Handle to all persisted data under one directory
#[derive(Clone, Debug)]
pub struct Store {
    data_dir: PathBuf,
    workouts: Table<Workout>,
    runs: Table<RunHistory>,
    meals: Table<Meal>,
    weights: Table<WeightEntry>,
}

/// Fields of the "add workout" form
#[derive(Clone, Debug, Default)]
pub struct NewWorkout {
    pub exercise_name: String,
    pub muscle_group: String,
    pub sets: String,
    pub reps: String,
    pub image_url: String,
}

impl Store {
    /// Open a store rooted at `data_dir`; files are created lazily
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            workouts: Table::new(data_dir.join(WORKOUTS_FILE)),
            runs: Table::new(data_dir.join(RUNS_FILE)),
            meals: Table::new(data_dir.join(MEALS_FILE)),
            weights: Table::new(data_dir.join(WEIGHTS_FILE)),
            data_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join(PROFILE_FILE)
    }

    pub fn workouts(&self) -> &Table<Workout> {
        &self.workouts
    }

    pub fn runs(&self) -> &Table<RunHistory> {
        &self.runs
    }

    pub fn meals(&self) -> &Table<Meal> {
        &self.meals
    }

    pub fn weights(&self) -> &Table<WeightEntry> {
        &self.weights
    }

    // ------------------------------------------------------------------
    // Workouts
    // ------------------------------------------------------------------

    /// Seed the default program into an empty workout table
    ///
    /// Returns how many workouts were inserted.
    pub fn seed_if_empty(&self) -> Result<usize> {
        if self.workouts.count()? > 0 {
            return Ok(0);
        }

        let program = catalog::default_program();
        for problem in catalog::validate_program(program) {
            tracing::warn!("Default program: {}", problem);
        }

        let seeded: Vec<Workout> = program
            .iter()
            .map(|entry| entry.to_workout())
            .collect();
        self.workouts.append_all(&seeded)?;

        tracing::info!("Seeded {} default workouts", seeded.len());
        Ok(seeded.len())
    }

    pub fn workouts_for_day(&self, day: DayOfWeek) -> Result<Vec<Workout>> {
        Ok(self
            .workouts
            .read_all()?
            .into_iter()
            .filter(|w| w.day == day)
            .collect())
    }

    /// Add a user-defined exercise on `day`
    ///
    /// Name and muscle group are required.
    pub fn add_custom_workout(&self, new: &NewWorkout, day: DayOfWeek) -> Result<Workout> {
        let name = new.exercise_name.trim();
        let muscle = new.muscle_group.trim();
        if name.is_empty() || muscle.is_empty() {
            return Err(Error::Validation(
                "exercise name and muscle group are required".into(),
            ));
        }

        let image_url = match new.image_url.trim() {
            "" => DEFAULT_IMAGE_URL.to_string(),
            url => url.to_string(),
        };

        let workout = Workout {
            id: Uuid::new_v4(),
            day,
            exercise_name: name.to_string(),
            muscle_group: muscle.to_string(),
            sets: format!("{} Sets", new.sets.trim()),
            reps: format!("{} Reps", new.reps.trim()),
            instructions: "Custom extra workout.".into(),
            image_url,
            completed: false,
            weight_kg: 0.0,
        };

        self.workouts.append(&workout)?;
        tracing::info!("Added custom workout '{}' on {}", workout.exercise_name, day);
        Ok(workout)
    }

    /// Tick or untick a checklist item
    pub fn set_completed(&self, id: Uuid, completed: bool) -> Result<Workout> {
        self.workouts.update(id, |w| {
            w.completed = completed;
            Ok(())
        })
    }

    /// Record the working weight used for an exercise
    pub fn update_weight(&self, id: Uuid, weight_kg: f64) -> Result<Workout> {
        if !(weight_kg.is_finite() && weight_kg >= 0.0) {
            return Err(Error::Validation(format!(
                "weight must be zero or more, got {}",
                weight_kg
            )));
        }
        self.workouts.update(id, |w| {
            w.weight_kg = weight_kg;
            Ok(())
        })
    }

    /// Untick every workout; returns how many were ticked
    pub fn reset_checklist(&self) -> Result<usize> {
        let mut reset = 0;
        self.workouts.rewrite(|workouts| {
            for w in workouts.iter_mut().filter(|w| w.completed) {
                w.completed = false;
                reset += 1;
            }
            Ok(())
        })?;
        Ok(reset)
    }

    pub fn delete_workout(&self, id: Uuid) -> Result<()> {
        self.workouts.remove(id)
    }

    // ------------------------------------------------------------------
    // Runs
    // ------------------------------------------------------------------

    pub fn save_run(&self, run: &RunHistory) -> Result<()> {
        self.runs.append(run)
    }

    /// All runs, newest first
    pub fn list_runs(&self) -> Result<Vec<RunHistory>> {
        let mut runs = self.runs.read_all()?;
        runs.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(runs)
    }

    pub fn get_run(&self, id: Uuid) -> Result<RunHistory> {
        self.runs
            .find(id)?
            .ok_or_else(|| Error::NotFound(format!("run {}", id)))
    }

    pub fn delete_run(&self, id: Uuid) -> Result<()> {
        self.runs.remove(id)
    }

    // ------------------------------------------------------------------
    // Meals
    // ------------------------------------------------------------------

    /// Meals with `start <= eaten_at < end`, in slot order
    pub fn meals_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Meal>> {
        let mut meals: Vec<Meal> = self
            .meals
            .read_all()?
            .into_iter()
            .filter(|m| m.eaten_at >= start && m.eaten_at < end)
            .collect();
        sort_by_meal_type(&mut meals);
        Ok(meals)
    }

    pub fn meals_for_day(&self, date: NaiveDate) -> Result<Vec<Meal>> {
        let (start, end) = day_bounds(date);
        self.meals_between(start, end)
    }

    pub fn log_meal(&self, meal: &Meal) -> Result<()> {
        self.meals.append(meal)
    }

    /// Replace the meals of `date` with a freshly generated plan
    ///
    /// Clearing and inserting happen in one locked rewrite.
    pub fn regenerate_day(&self, date: NaiveDate, plan: &[Meal]) -> Result<usize> {
        let (start, end) = day_bounds(date);
        let mut cleared = 0;
        self.meals.rewrite(|meals| {
            let before = meals.len();
            meals.retain(|m| !(m.eaten_at >= start && m.eaten_at < end));
            cleared = before - meals.len();
            meals.extend_from_slice(plan);
            Ok(())
        })?;

        tracing::info!(
            "Regenerated meals for {}: cleared {}, inserted {}",
            date,
            cleared,
            plan.len()
        );
        Ok(cleared)
    }

    pub fn delete_meal(&self, id: Uuid) -> Result<()> {
        self.meals.remove(id)
    }

    // ------------------------------------------------------------------
    // Weight history
    // ------------------------------------------------------------------

    /// Weight history, oldest first (chart order)
    pub fn weight_trend(&self) -> Result<Vec<WeightEntry>> {
        let mut entries = self.weights.read_all()?;
        entries.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
        Ok(entries)
    }

    pub fn latest_weight(&self) -> Result<Option<f64>> {
        Ok(self.weight_trend()?.last().map(|e| e.weight_kg))
    }
}

/// UTC bounds of a local calendar day, as a half-open range
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN);
    let end = start + Duration::days(1);
    (local_to_utc(start), local_to_utc(end))
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}
