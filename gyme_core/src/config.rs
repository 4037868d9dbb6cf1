//! Configuration file support for gyme.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/gyme/config.toml`.
//! Every policy threshold used by the tracker, the metabolic calculator and
//! the meal planner lives here so it can be tuned without a rebuild.

use crate::{Error, Result, Sex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub metabolic: MetabolicConfig,

    #[serde(default)]
    pub meals: MealConfig,

    #[serde(default)]
    pub profile: ProfileDefaults,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// GPS noise filter and run scoring parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Fixes with a larger accuracy radius are dropped
    #[serde(default = "default_max_accuracy_m")]
    pub max_accuracy_m: f64,

    /// Fixes closer than this to the last accepted point are dropped
    #[serde(default = "default_min_movement_m")]
    pub min_movement_m: f64,

    /// Sessions at or below this distance are discarded on stop
    #[serde(default = "default_min_session_km")]
    pub min_session_km: f64,

    /// kcal burned per km per kg of body weight
    #[serde(default = "default_calories_per_km_kg")]
    pub calories_per_km_kg: f64,

    /// Pace is only reported once the distance exceeds this
    #[serde(default = "default_pace_min_distance_km")]
    pub pace_min_distance_km: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_accuracy_m: default_max_accuracy_m(),
            min_movement_m: default_min_movement_m(),
            min_session_km: default_min_session_km(),
            calories_per_km_kg: default_calories_per_km_kg(),
            pace_min_distance_km: default_pace_min_distance_km(),
        }
    }
}

/// Energy expenditure parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetabolicConfig {
    #[serde(default = "default_activity_factor")]
    pub activity_factor: f64,

    #[serde(default = "default_activity_offset_kcal")]
    pub activity_offset_kcal: f64,

    /// Surplus for bulking, deficit for cutting
    #[serde(default = "default_goal_adjustment_kcal")]
    pub goal_adjustment_kcal: i32,
}

impl Default for MetabolicConfig {
    fn default() -> Self {
        Self {
            activity_factor: default_activity_factor(),
            activity_offset_kcal: default_activity_offset_kcal(),
            goal_adjustment_kcal: default_goal_adjustment_kcal(),
        }
    }
}

/// Snack allocation thresholds for the meal planner
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MealConfig {
    /// Leftover calories above this are split across two snacks
    #[serde(default = "default_split_snack_above_kcal")]
    pub split_snack_above_kcal: i32,

    /// Leftover calories at or below this get no snack
    #[serde(default = "default_min_snack_kcal")]
    pub min_snack_kcal: i32,
}

impl Default for MealConfig {
    fn default() -> Self {
        Self {
            split_snack_above_kcal: default_split_snack_above_kcal(),
            min_snack_kcal: default_min_snack_kcal(),
        }
    }
}

/// Body metrics assumed before the user has completed onboarding
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileDefaults {
    #[serde(default = "default_weight_kg")]
    pub weight_kg: f64,

    #[serde(default = "default_height_cm")]
    pub height_cm: f64,

    #[serde(default = "default_age_years")]
    pub age_years: u32,

    #[serde(default = "default_sex")]
    pub sex: Sex,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            weight_kg: default_weight_kg(),
            height_cm: default_height_cm(),
            age_years: default_age_years(),
            sex: default_sex(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("gyme")
}

fn default_max_accuracy_m() -> f64 {
    30.0
}

fn default_min_movement_m() -> f64 {
    3.0
}

fn default_min_session_km() -> f64 {
    0.05
}

fn default_calories_per_km_kg() -> f64 {
    1.036
}

fn default_pace_min_distance_km() -> f64 {
    0.05
}

fn default_activity_factor() -> f64 {
    1.55
}

fn default_activity_offset_kcal() -> f64 {
    300.0
}

fn default_goal_adjustment_kcal() -> i32 {
    500
}

fn default_split_snack_above_kcal() -> i32 {
    400
}

fn default_min_snack_kcal() -> i32 {
    50
}

fn default_weight_kg() -> f64 {
    60.0
}

fn default_height_cm() -> f64 {
    170.0
}

fn default_age_years() -> u32 {
    20
}

fn default_sex() -> Sex {
    Sex::Male
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("gyme").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject thresholds that would make the computations meaningless
    pub fn validate(&self) -> Result<()> {
        let t = &self.tracking;
        let positive = [
            ("tracking.max_accuracy_m", t.max_accuracy_m),
            ("tracking.calories_per_km_kg", t.calories_per_km_kg),
            ("metabolic.activity_factor", self.metabolic.activity_factor),
            ("profile.weight_kg", self.profile.weight_kg),
            ("profile.height_cm", self.profile.height_cm),
        ];
        for (key, value) in positive {
            if !(value > 0.0) {
                return Err(Error::Config(format!("{} must be positive, got {}", key, value)));
            }
        }

        let non_negative = [
            ("tracking.min_movement_m", t.min_movement_m),
            ("tracking.min_session_km", t.min_session_km),
            ("tracking.pace_min_distance_km", t.pace_min_distance_km),
        ];
        for (key, value) in non_negative {
            if value < 0.0 || value.is_nan() {
                return Err(Error::Config(format!("{} must not be negative, got {}", key, value)));
            }
        }

        if self.meals.min_snack_kcal < 0
            || self.meals.split_snack_above_kcal < self.meals.min_snack_kcal
        {
            return Err(Error::Config(format!(
                "meal snack thresholds out of order: min {} / split {}",
                self.meals.min_snack_kcal, self.meals.split_snack_above_kcal
            )));
        }

        Ok(())
    }
}
