//! Reference pace estimation
//!
//! Turns one known effort (a race or time trial) into an estimated one-hour
//! threshold pace using a fixed distance-correction table. The further the
//! reference race, the slower its pace relative to the one-hour pace, so
//! long races get factors below 1 and short races factors above 1.

use serde::{Deserialize, Serialize};

use crate::models::Activity;

/// Standard race distances (km) and their correction factors, ascending
pub const DISTANCE_FACTORS: [(f64, f64); 5] = [
  (5.0, 1.05),
  (10.0, 1.03),
  (15.0, 1.00),
  (21.1, 0.98),
  (42.2, 0.95),
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaceError {
  #[error("Invalid reference effort: {0}")]
  InvalidReference(String),
}

/// ---------------------------------------------------------------------------
/// Pace / Speed Conversions
/// ---------------------------------------------------------------------------

/// km/h -> min/km; undefined for non-positive or non-finite speed
pub fn pace_from_speed(speed_kmh: f64) -> Option<f64> {
  if speed_kmh.is_finite() && speed_kmh > 0.0 {
    Some(60.0 / speed_kmh)
  } else {
    None
  }
}

/// min/km -> km/h
pub fn speed_from_pace(pace_min_per_km: f64) -> Option<f64> {
  if pace_min_per_km.is_finite() && pace_min_per_km > 0.0 {
    Some(60.0 / pace_min_per_km)
  } else {
    None
  }
}

/// "m:ss" entry -> decimal minutes per km
pub fn pace_from_parts(minutes: u32, seconds: u32) -> f64 {
  minutes as f64 + seconds as f64 / 60.0
}

/// Decimal pace split into whole minutes and rounded seconds (5.5 -> 5:30)
pub fn split_pace(pace_min_per_km: f64) -> (u32, u32) {
  let total_seconds = (pace_min_per_km.max(0.0) * 60.0).round() as u32;
  (total_seconds / 60, total_seconds % 60)
}

/// ---------------------------------------------------------------------------
/// Reference Effort
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ReferenceSource {
  /// Fastest race found in the analysed activities
  Detected { activity_id: i64 },
  Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEffort {
  pub pace_min_per_km: f64,
  pub distance_km: f64,
  pub source: ReferenceSource,
}

impl ReferenceEffort {
  /// Race/time-trial activity with the highest average speed, if any
  pub fn detect(activities: &[Activity]) -> Option<Self> {
    let mut best: Option<(&Activity, f64)> = None;

    for activity in activities.iter().filter(|a| a.is_race()) {
      let Some(pace) = activity.pace_min_per_km() else {
        continue;
      };
      // strict comparison keeps the first of equally fast races
      if best.map_or(true, |(_, best_pace)| pace < best_pace) {
        best = Some((activity, pace));
      }
    }

    best.map(|(activity, pace)| Self {
      pace_min_per_km: pace,
      distance_km: activity.distance_km,
      source: ReferenceSource::Detected {
        activity_id: activity.activity_id,
      },
    })
  }

  pub fn manual(entry: &ManualReference) -> Result<Self, PaceError> {
    let pace = entry.pace_min_per_km();
    if pace <= 0.0 {
      return Err(PaceError::InvalidReference("pace must be positive".into()));
    }
    if !(entry.distance_km.is_finite() && entry.distance_km > 0.0) {
      return Err(PaceError::InvalidReference(format!(
        "distance must be positive, got {}",
        entry.distance_km
      )));
    }

    Ok(Self {
      pace_min_per_km: pace,
      distance_km: entry.distance_km,
      source: ReferenceSource::Manual,
    })
  }
}

/// A pace typed in as minutes + seconds per km over a nominal distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualReference {
  pub minutes: u32,
  pub seconds: u32,
  pub distance_km: f64,
}

impl ManualReference {
  pub fn pace_min_per_km(&self) -> f64 {
    pace_from_parts(self.minutes, self.seconds)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
  #[default]
  Detected,
  Manual,
}

/// Which reference to use, plus the manual entry if the user gave one
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceChoice {
  pub mode: ReferenceMode,
  pub manual: Option<ManualReference>,
}

impl ReferenceChoice {
  /// Resolve against the analysed activities; the preferred source falls back
  /// to the other one when unavailable. `Ok(None)` means no reference at all.
  ///
  /// The manual entry is only validated in manual mode. As a fallback for
  /// detection an invalid entry counts as absent.
  pub fn resolve(&self, activities: &[Activity]) -> Result<Option<ReferenceEffort>, PaceError> {
    let manual = self.manual.as_ref().map(ReferenceEffort::manual);

    match self.mode {
      ReferenceMode::Detected => Ok(
        ReferenceEffort::detect(activities).or_else(|| manual.and_then(Result::ok)),
      ),
      ReferenceMode::Manual => match manual {
        Some(entry) => entry.map(Some),
        None => Ok(ReferenceEffort::detect(activities)),
      },
    }
  }
}

/// ---------------------------------------------------------------------------
/// Threshold Pace
/// ---------------------------------------------------------------------------

/// Estimated pace sustainable for about one hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPace {
  pub reference: ReferenceEffort,
  pub standard_distance_km: f64,
  pub factor: f64,
  pub pace_min_per_km: f64,
}

impl ThresholdPace {
  pub fn estimate(reference: ReferenceEffort) -> Self {
    let (standard_distance_km, factor) = closest_standard_distance(reference.distance_km);
    Self {
      reference,
      standard_distance_km,
      factor,
      pace_min_per_km: reference.pace_min_per_km * factor,
    }
  }
}

/// Closest table entry by absolute difference; ties resolve to the shorter distance
pub fn closest_standard_distance(distance_km: f64) -> (f64, f64) {
  let mut best = DISTANCE_FACTORS[0];
  for entry in DISTANCE_FACTORS.iter().skip(1) {
    if (entry.0 - distance_km).abs() < (best.0 - distance_km).abs() {
      best = *entry;
    }
  }
  best
}
