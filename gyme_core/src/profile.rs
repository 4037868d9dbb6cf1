//! User profile persistence with file locking.
//!
//! The profile is a small key-value document. Loading never fails on a
//! missing or corrupt file; the configured defaults are used instead.

use crate::lock::FileLock;
use crate::metabolic::{self, MetabolicReport};
use crate::{Config, Error, ProfileDefaults, Result, Store, UserProfile, WeightEntry};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

impl From<&ProfileDefaults> for UserProfile {
    fn from(defaults: &ProfileDefaults) -> Self {
        Self {
            weight_kg: defaults.weight_kg,
            height_cm: defaults.height_cm,
            age_years: defaults.age_years,
            sex: defaults.sex,
            setup_done: false,
        }
    }
}

impl UserProfile {
    /// Load the profile from a file with shared locking
    ///
    /// Returns the defaults if the file doesn't exist or can't be parsed.
    pub fn load(path: &Path, defaults: &ProfileDefaults) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No profile file found, using defaults");
            return Ok(defaults.into());
        }

        let _lock = match FileLock::shared(path) {
            Ok(lock) => lock,
            Err(e) => {
                tracing::warn!("Unable to lock profile {:?}: {}. Using defaults.", path, e);
                return Ok(defaults.into());
            }
        };

        Ok(Self::read_or_default(path, defaults))
    }

    /// Save the profile atomically (temp file, fsync, rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let _lock = FileLock::exclusive(path)?;
        self.write_atomic(path)
    }

    /// Load, modify and save the profile under one exclusive lock
    pub fn update<F>(path: &Path, defaults: &ProfileDefaults, f: F) -> Result<Self>
    where
        F: FnOnce(&mut UserProfile) -> Result<()>,
    {
        let _lock = FileLock::exclusive(path)?;
        let mut profile = Self::read_or_default(path, defaults);
        f(&mut profile)?;
        profile.write_atomic(path)?;
        Ok(profile)
    }

    // Callers hold the profile lock
    fn read_or_default(path: &Path, defaults: &ProfileDefaults) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return defaults.into(),
            Err(e) => {
                tracing::warn!("Failed to read profile {:?}: {}. Using defaults.", path, e);
                return defaults.into();
            }
        };

        match serde_json::from_str::<UserProfile>(&contents) {
            Ok(profile) => {
                tracing::debug!("Loaded profile from {:?}", path);
                profile
            }
            Err(e) => {
                tracing::warn!("Failed to parse profile {:?}: {}. Using defaults.", path, e);
                defaults.into()
            }
        }
    }

    fn write_atomic(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "profile path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved profile to {:?}", path);
        Ok(())
    }
}

/// Optional field changes from the profile edit form
#[derive(Clone, Debug, Default)]
pub struct ProfileEdit {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age_years: Option<u32>,
}

impl Store {
    pub fn load_profile(&self, config: &Config) -> Result<UserProfile> {
        UserProfile::load(&self.profile_path(), &config.profile)
    }

    /// Complete onboarding
    ///
    /// Marks setup as done and starts the weight history with the
    /// entered weight.
    pub fn onboard(&self, mut profile: UserProfile) -> Result<UserProfile> {
        profile.validate()?;
        profile.setup_done = true;
        profile.save(&self.profile_path())?;
        self.record_weight(profile.weight_kg, Utc::now())?;
        tracing::info!("Profile set up: {:.1} kg, {:.0} cm", profile.weight_kg, profile.height_cm);
        Ok(profile)
    }

    /// Apply an edit; a weight change is also appended to the weight history
    pub fn edit_profile(&self, edit: &ProfileEdit, config: &Config) -> Result<UserProfile> {
        let mut weight_changed = None;

        let profile = UserProfile::update(&self.profile_path(), &config.profile, |profile| {
            if let Some(weight_kg) = edit.weight_kg {
                if weight_kg != profile.weight_kg {
                    weight_changed = Some(weight_kg);
                }
                profile.weight_kg = weight_kg;
            }
            if let Some(height_cm) = edit.height_cm {
                profile.height_cm = height_cm;
            }
            if let Some(age_years) = edit.age_years {
                profile.age_years = age_years;
            }
            profile.validate()
        })?;

        if let Some(weight_kg) = weight_changed {
            self.record_weight(weight_kg, Utc::now())?;
        }

        Ok(profile)
    }

    /// Derived figures, always recomputed from the stored profile
    pub fn metabolic_report(&self, config: &Config) -> Result<MetabolicReport> {
        let profile = self.load_profile(config)?;
        Ok(metabolic::calculate(&profile, &config.metabolic))
    }

    /// Log a measured weight: it becomes the profile weight and a history entry
    pub fn log_weight(&self, weight_kg: f64, at: DateTime<Utc>, config: &Config) -> Result<WeightEntry> {
        UserProfile::update(&self.profile_path(), &config.profile, |profile| {
            profile.weight_kg = weight_kg;
            profile.validate()
        })?;
        self.record_weight(weight_kg, at)
    }

    /// Append a history entry without touching the profile
    pub fn record_weight(&self, weight_kg: f64, at: DateTime<Utc>) -> Result<WeightEntry> {
        if !(weight_kg.is_finite() && weight_kg > 0.0) {
            return Err(Error::Validation(format!("weight must be positive, got {}", weight_kg)));
        }
        let entry = WeightEntry {
            id: Uuid::new_v4(),
            recorded_at: at,
            weight_kg,
        };
        self.weights().append(&entry)?;
        Ok(entry)
    }
}
