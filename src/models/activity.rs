use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::WeekBucket;

/// Strava tags race efforts on runs with `workout_type = 1`
pub const RACE_WORKOUT_TYPE: i64 = 1;

// ---------------------------------------------------------------------------
/// Workout Kind: ordinary session vs race effort
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
  Ordinary,
  RaceOrTimeTrial,
}

impl WorkoutKind {
  pub fn from_code(code: i64) -> Self {
    if code == RACE_WORKOUT_TYPE {
      Self::RaceOrTimeTrial
    } else {
      Self::Ordinary
    }
  }
}

impl std::fmt::Display for WorkoutKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Ordinary => write!(f, "ordinary"),
      Self::RaceOrTimeTrial => write!(f, "race_or_time_trial"),
    }
  }
}

impl std::str::FromStr for WorkoutKind {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "ordinary" => Ok(Self::Ordinary),
      "race_or_time_trial" => Ok(Self::RaceOrTimeTrial),
      _ => Err(format!("Unknown workout kind: {}", s)),
    }
  }
}

// ---------------------------------------------------------------------------
/// Activity: normalized unit record
// ---------------------------------------------------------------------------

/// One activity in consistent units (km, minutes, km/h, local time).
///
/// Optional measures stay `None` when the source did not report them; a zero
/// here always means the source reported zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
  pub activity_id: i64,
  pub athlete_id: i64,
  pub name: String,
  /// Broad category ("Run", "Hike", "Ride")
  pub sport: String,
  /// Finer sub-type ("TrailRun", "VirtualRide")
  pub sport_type: String,
  pub workout_kind: Option<WorkoutKind>,
  pub start_local: NaiveDateTime,
  pub distance_km: f64,
  pub moving_time_min: f64,
  pub elapsed_time_min: f64,
  pub elevation_gain_m: Option<f64>,
  pub average_speed_kmh: Option<f64>,
  pub max_speed_kmh: Option<f64>,
  pub average_heartrate: Option<f64>,
  pub max_heartrate: Option<f64>,
  pub elev_high_m: Option<f64>,
  pub elev_low_m: Option<f64>,
  pub average_temp_c: Option<f64>,
}

impl Activity {
  pub fn local_date(&self) -> NaiveDate {
    self.start_local.date()
  }

  pub fn week(&self) -> WeekBucket {
    WeekBucket::from_date(self.local_date())
  }

  pub fn is_race(&self) -> bool {
    self.workout_kind == Some(WorkoutKind::RaceOrTimeTrial)
  }

  /// Pace in min/km, `None` when speed is missing or not positive
  pub fn pace_min_per_km(&self) -> Option<f64> {
    self.average_speed_kmh.and_then(crate::pace::pace_from_speed)
  }
}
