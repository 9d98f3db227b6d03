//! Activity normalization
//!
//! Maps raw Strava summaries (meters, seconds, m/s) onto `Activity`
//! (km, minutes, km/h). Optional measures pass through untouched.

use chrono::{DateTime, NaiveDateTime};

use crate::models::{Activity, RawActivity, WorkoutKind};

const METERS_PER_KM: f64 = 1000.0;
const SECONDS_PER_MINUTE: f64 = 60.0;
const MPS_TO_KMH: f64 = 3.6;

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
  #[error("Activity {id:?} is missing required field `{field}`")]
  MissingRequiredField { id: Option<i64>, field: &'static str },

  #[error("Activity {id:?} has invalid `{field}`: {reason}")]
  InvalidField {
    id: Option<i64>,
    field: &'static str,
    reason: String,
  },
}

/// Normalize a single record
pub fn normalize_activity(raw: &RawActivity) -> Result<Activity, NormalizeError> {
  let id = raw.id;
  let missing = |field: &'static str| NormalizeError::MissingRequiredField { id, field };

  let activity_id = raw.id.ok_or_else(|| missing("id"))?;
  let athlete_id = raw
    .athlete
    .as_ref()
    .and_then(|a| a.id)
    .ok_or_else(|| missing("athlete.id"))?;
  let name = raw.name.clone().ok_or_else(|| missing("name"))?;
  let sport = raw.sport.clone().ok_or_else(|| missing("type"))?;
  let start_raw = raw
    .start_date_local
    .as_deref()
    .ok_or_else(|| missing("start_date_local"))?;
  let distance_m = raw.distance.ok_or_else(|| missing("distance"))?;
  let moving_s = raw.moving_time.ok_or_else(|| missing("moving_time"))?;
  let elapsed_s = raw.elapsed_time.ok_or_else(|| missing("elapsed_time"))?;

  let start_local = parse_local_timestamp(start_raw).ok_or_else(|| NormalizeError::InvalidField {
    id,
    field: "start_date_local",
    reason: format!("unrecognised timestamp {:?}", start_raw),
  })?;

  for (field, value) in [
    ("distance", distance_m),
    ("moving_time", moving_s),
    ("elapsed_time", elapsed_s),
  ] {
    if !value.is_finite() || value < 0.0 {
      return Err(NormalizeError::InvalidField {
        id,
        field,
        reason: format!("expected a non-negative number, got {}", value),
      });
    }
  }

  Ok(Activity {
    activity_id,
    athlete_id,
    name,
    sport_type: raw.sport_type.clone().unwrap_or_else(|| sport.clone()),
    sport,
    workout_kind: raw.workout_type.map(WorkoutKind::from_code),
    start_local,
    distance_km: distance_m / METERS_PER_KM,
    moving_time_min: moving_s / SECONDS_PER_MINUTE,
    elapsed_time_min: elapsed_s / SECONDS_PER_MINUTE,
    elevation_gain_m: raw.total_elevation_gain,
    average_speed_kmh: raw.average_speed.map(|v| v * MPS_TO_KMH),
    max_speed_kmh: raw.max_speed.map(|v| v * MPS_TO_KMH),
    average_heartrate: raw.average_heartrate,
    max_heartrate: raw.max_heartrate,
    elev_high_m: raw.elev_high,
    elev_low_m: raw.elev_low,
    average_temp_c: raw.average_temp,
  })
}

/// Normalize a batch, dropping (and logging) records that cannot be normalized
pub fn normalize_activities(raws: &[RawActivity]) -> Vec<Activity> {
  let mut activities = Vec::with_capacity(raws.len());
  let mut dropped = 0usize;

  for raw in raws {
    match normalize_activity(raw) {
      Ok(activity) => activities.push(activity),
      Err(e) => {
        dropped += 1;
        tracing::warn!(error = %e, "Dropping activity that could not be normalized");
      }
    }
  }

  tracing::debug!(kept = activities.len(), dropped, "Normalized activity batch");
  activities
}

/// Strava's `start_date_local` carries a misleading `Z`; the wall-clock part
/// is already local, so any offset is discarded rather than applied.
fn parse_local_timestamp(value: &str) -> Option<NaiveDateTime> {
  let value = value.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
    return Some(dt.naive_local());
  }

  let value = value.trim_end_matches('Z');
  NAIVE_TIMESTAMP_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::mock_raw_activity;
  use chrono::NaiveDate;

  #[test]
  fn test_unit_conversion() {
    let raw = mock_raw_activity(42, "2024-03-04T07:15:00Z");
    let activity = normalize_activity(&raw).unwrap();

    crate::assert_approx_eq!(activity.distance_km * 1000.0, raw.distance.unwrap(), 1e-9);
    crate::assert_approx_eq!(activity.moving_time_min * 60.0, raw.moving_time.unwrap(), 1e-9);
    crate::assert_approx_eq!(activity.elapsed_time_min * 60.0, raw.elapsed_time.unwrap(), 1e-9);
    crate::assert_approx_eq!(
      activity.average_speed_kmh.unwrap() / 3.6,
      raw.average_speed.unwrap(),
      1e-9
    );
    crate::assert_approx_eq!(activity.max_speed_kmh.unwrap() / 3.6, raw.max_speed.unwrap(), 1e-9);
  }

  #[test]
  fn test_local_timestamp_keeps_wall_clock() {
    let raw = mock_raw_activity(1, "2024-03-04T23:30:00Z");
    let activity = normalize_activity(&raw).unwrap();
    let expected = NaiveDate::from_ymd_opt(2024, 3, 4)
      .unwrap()
      .and_hms_opt(23, 30, 0)
      .unwrap();
    assert_eq!(activity.start_local, expected);

    for value in ["2024-03-04T23:30:00", "2024-03-04 23:30:00", "2024-03-04T23:30:00.000"] {
      assert_eq!(parse_local_timestamp(value), Some(expected), "{}", value);
    }
    assert_eq!(parse_local_timestamp("04/03/2024"), None);
  }

  #[test]
  fn test_optional_fields_stay_absent() {
    let mut raw = mock_raw_activity(1, "2024-03-04T07:15:00Z");
    raw.average_heartrate = None;
    raw.average_speed = None;
    raw.total_elevation_gain = Some(0.0);
    raw.workout_type = None;

    let activity = normalize_activity(&raw).unwrap();
    assert_eq!(activity.average_heartrate, None);
    assert_eq!(activity.average_speed_kmh, None);
    assert_eq!(activity.elevation_gain_m, Some(0.0));
    assert_eq!(activity.workout_kind, None);
  }

  #[test]
  fn test_race_tag_resolved_once() {
    let mut raw = mock_raw_activity(1, "2024-03-04T07:15:00Z");
    raw.workout_type = Some(1);
    assert!(normalize_activity(&raw).unwrap().is_race());

    raw.workout_type = Some(3);
    let activity = normalize_activity(&raw).unwrap();
    assert_eq!(activity.workout_kind, Some(WorkoutKind::Ordinary));
  }

  #[test]
  fn test_missing_sub_type_falls_back_to_sport() {
    let mut raw = mock_raw_activity(1, "2024-03-04T07:15:00Z");
    raw.sport_type = None;
    assert_eq!(normalize_activity(&raw).unwrap().sport_type, "Run");
  }

  #[test]
  fn test_missing_required_field_is_reported() {
    let mut raw = mock_raw_activity(9, "2024-03-04T07:15:00Z");
    raw.moving_time = None;

    assert_eq!(
      normalize_activity(&raw),
      Err(NormalizeError::MissingRequiredField {
        id: Some(9),
        field: "moving_time"
      })
    );

    let mut raw = mock_raw_activity(9, "2024-03-04T07:15:00Z");
    raw.athlete = None;
    assert!(matches!(
      normalize_activity(&raw),
      Err(NormalizeError::MissingRequiredField { field: "athlete.id", .. })
    ));
  }

  #[test]
  fn test_negative_distance_is_invalid() {
    let mut raw = mock_raw_activity(3, "2024-03-04T07:15:00Z");
    raw.distance = Some(-5.0);
    assert!(matches!(
      normalize_activity(&raw),
      Err(NormalizeError::InvalidField { field: "distance", .. })
    ));
  }

  #[test]
  fn test_elapsed_shorter_than_moving_is_kept() {
    let mut raw = mock_raw_activity(3, "2024-03-04T07:15:00Z");
    raw.moving_time = Some(3600.0);
    raw.elapsed_time = Some(3000.0);
    assert!(normalize_activity(&raw).is_ok());
  }

  #[test]
  fn test_batch_drops_only_bad_records() {
    let good = mock_raw_activity(1, "2024-03-04T07:15:00Z");
    let mut no_id = mock_raw_activity(2, "2024-03-05T07:15:00Z");
    no_id.id = None;
    let bad_date = mock_raw_activity(3, "yesterday");
    let also_good = mock_raw_activity(4, "2024-03-06T07:15:00Z");

    let activities = normalize_activities(&[good, no_id, bad_date, also_good]);
    let ids: Vec<i64> = activities.iter().map(|a| a.activity_id).collect();
    assert_eq!(ids, vec![1, 4]);
  }
}
