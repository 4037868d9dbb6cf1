//! Run tracking.
//!
//! [`RunAccumulator`] folds a stream of GPS fixes into distance, pace,
//! calories and the path polyline. Low-accuracy fixes and fixes that barely
//! moved are treated as noise and dropped. One accumulator covers one
//! tracking session.

use crate::{Error, GeoPoint, Result, RunHistory, TrackingConfig};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use uuid::Uuid;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine)
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// A single location reading from the device
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GpsFix {
    pub lat: f64,
    pub lon: f64,
    /// Accuracy radius in meters, absent when the provider did not report one
    #[serde(default)]
    pub accuracy_m: Option<f64>,
    pub at: DateTime<Utc>,
}

impl GpsFix {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Whether the app may read device location
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocationPermission {
    Granted,
    Denied,
}

/// Why a fix was dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    LowAccuracy,
    TooClose,
}

/// Result of feeding one fix to the accumulator
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FixOutcome {
    /// First accepted point, starts the path
    Started,
    /// Accepted, with the distance it added in meters
    Moved(f64),
    Rejected(RejectReason),
}

/// Live values for display while a session runs
#[derive(Clone, Debug, PartialEq)]
pub struct RunSnapshot {
    pub elapsed: Duration,
    pub distance_km: f64,
    pub calories: i32,
    pub pace_min_per_km: Option<f64>,
}

/// Running state of one tracking session
#[derive(Clone, Debug)]
pub struct RunAccumulator {
    config: TrackingConfig,
    weight_kg: f64,
    started_at: DateTime<Utc>,
    last_point: Option<GeoPoint>,
    distance_km: f64,
    calories: i32,
    pace_min_per_km: Option<f64>,
    path: Vec<GeoPoint>,
}

impl RunAccumulator {
    /// Start a session
    ///
    /// Without location permission tracking cannot begin; the caller
    /// surfaces [`Error::PermissionDenied`] to the user and does not retry.
    pub fn start(
        permission: LocationPermission,
        weight_kg: f64,
        started_at: DateTime<Utc>,
        config: &TrackingConfig,
    ) -> Result<Self> {
        if permission == LocationPermission::Denied {
            tracing::warn!("Location permission denied, run tracking not started");
            return Err(Error::PermissionDenied);
        }
        if !(weight_kg.is_finite() && weight_kg > 0.0) {
            return Err(Error::Validation(format!(
                "body weight must be positive, got {}",
                weight_kg
            )));
        }

        tracing::info!("Run tracking started at {}", started_at);
        Ok(Self {
            config: config.clone(),
            weight_kg,
            started_at,
            last_point: None,
            distance_km: 0.0,
            calories: 0,
            pace_min_per_km: None,
            path: Vec::new(),
        })
    }

    /// Feed one fix
    pub fn push(&mut self, fix: &GpsFix) -> FixOutcome {
        match fix.accuracy_m {
            Some(accuracy) if accuracy <= self.config.max_accuracy_m => {}
            _ => {
                tracing::debug!("Dropping fix with accuracy {:?}", fix.accuracy_m);
                return FixOutcome::Rejected(RejectReason::LowAccuracy);
            }
        }

        let point = fix.point();
        let Some(last) = self.last_point else {
            self.last_point = Some(point);
            self.path.push(point);
            return FixOutcome::Started;
        };

        let delta_m = haversine_m(last, point);
        if delta_m < self.config.min_movement_m {
            tracing::debug!("Dropping fix {:.2} m from last point", delta_m);
            return FixOutcome::Rejected(RejectReason::TooClose);
        }

        self.distance_km += delta_m / 1000.0;
        self.last_point = Some(point);
        self.path.push(point);
        self.calories =
            (self.distance_km * self.weight_kg * self.config.calories_per_km_kg) as i32;

        if self.distance_km > self.config.pace_min_distance_km {
            let elapsed_min = elapsed_minutes(fix.at - self.started_at);
            self.pace_min_per_km = Some(elapsed_min / self.distance_km);
        }

        FixOutcome::Moved(delta_m)
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn calories(&self) -> i32 {
        self.calories
    }

    pub fn pace_min_per_km(&self) -> Option<f64> {
        self.pace_min_per_km
    }

    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> RunSnapshot {
        RunSnapshot {
            elapsed: self.elapsed(now),
            distance_km: self.distance_km,
            calories: self.calories,
            pace_min_per_km: self.pace_min_per_km,
        }
    }

    /// Stop the session
    ///
    /// Returns `None` when the run is too short to keep.
    pub fn finish(self, ended_at: DateTime<Utc>) -> Option<RunHistory> {
        let duration = self.elapsed(ended_at);

        if self.distance_km <= self.config.min_session_km {
            tracing::info!(
                "Discarding run of {:.3} km (minimum {:.3} km)",
                self.distance_km,
                self.config.min_session_km
            );
            return None;
        }

        let pace = self
            .pace_min_per_km
            .unwrap_or_else(|| elapsed_minutes(duration) / self.distance_km);

        tracing::info!(
            "Run finished: {:.2} km, {} kcal, {} points",
            self.distance_km,
            self.calories,
            self.path.len()
        );

        Some(RunHistory {
            id: Uuid::new_v4(),
            recorded_at: ended_at,
            distance_km: self.distance_km,
            duration_ms: duration.num_milliseconds(),
            calories_burned: self.calories,
            avg_pace: format_pace(pace),
            path: self.path,
        })
    }
}

fn elapsed_minutes(elapsed: Duration) -> f64 {
    elapsed.num_milliseconds().max(0) as f64 / 60_000.0
}

/// Format minutes-per-km as `m:ss /km`
pub fn format_pace(min_per_km: f64) -> String {
    if !min_per_km.is_finite() || min_per_km < 0.0 {
        return "-:-- /km".into();
    }
    let total_seconds = (min_per_km * 60.0).round() as i64;
    format!("{}:{:02} /km", total_seconds / 60, total_seconds % 60)
}

/// Format a duration in milliseconds as `hh:mm:ss`
pub fn format_duration(ms: i64) -> String {
    let seconds = ms.max(0) / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

/// Serialize a path as a JSON array of `[lat, lon]` pairs
pub fn encode_path(path: &[GeoPoint]) -> Result<String> {
    Ok(serde_json::to_string(path)?)
}

/// Decode a path stored by [`encode_path`]
pub fn decode_path(encoded: &str) -> Result<Vec<GeoPoint>> {
    if encoded.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(encoded)?)
}

/// Read GPS fixes from a JSON Lines file
///
/// Corrupt lines are skipped with a warning. Fixes must be in time order;
/// a fix older than its predecessor is a [`Error::Tracking`] error.
pub fn read_fixes(path: &Path) -> Result<Vec<GpsFix>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut fixes = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<GpsFix>(&line) {
            Ok(fix) => {
                if let Some(prev) = fixes.last().map(|f: &GpsFix| f.at) {
                    if fix.at < prev {
                        return Err(Error::Tracking(format!(
                            "fix at line {} is older than the one before it",
                            line_num + 1
                        )));
                    }
                }
                fixes.push(fix);
            }
            Err(e) => {
                tracing::warn!("Failed to parse fix at line {}: {}", line_num + 1, e);
            }
        }
    }

    tracing::debug!("Read {} fixes from {:?}", fixes.len(), path);
    Ok(fixes)
}
