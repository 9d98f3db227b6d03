//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock activity factories
//! - Helper assertions

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;

use crate::models::{Activity, AthleteRef, RawActivity, WorkoutKind};

pub const TEST_ATHLETE_ID: i64 = 7;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Parse "YYYY-MM-DDTHH:MM:SS"
pub fn local_time(value: &str) -> NaiveDateTime {
  NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").expect("valid test timestamp")
}

pub fn sports(names: &[&str]) -> BTreeSet<String> {
  names.iter().map(|s| s.to_string()).collect()
}

/// A 12 km/h run (5:00 min/km) of the given distance
pub fn mock_activity(id: i64, start: &str, distance_km: f64) -> Activity {
  let moving_time_min = distance_km * 5.0;
  Activity {
    activity_id: id,
    athlete_id: TEST_ATHLETE_ID,
    name: format!("Run {}", id),
    sport: "Run".to_string(),
    sport_type: "Run".to_string(),
    workout_kind: Some(WorkoutKind::Ordinary),
    start_local: local_time(start),
    distance_km,
    moving_time_min,
    elapsed_time_min: moving_time_min,
    elevation_gain_m: Some(40.0),
    average_speed_kmh: Some(12.0),
    max_speed_kmh: Some(15.0),
    average_heartrate: Some(145.0),
    max_heartrate: Some(168.0),
    elev_high_m: None,
    elev_low_m: None,
    average_temp_c: None,
  }
}

/// A complete Strava summary in source units: 10 km in 50 minutes
pub fn mock_raw_activity(id: i64, start_date_local: &str) -> RawActivity {
  RawActivity {
    id: Some(id),
    athlete: Some(AthleteRef {
      id: Some(TEST_ATHLETE_ID),
    }),
    name: Some("Morning Run".to_string()),
    sport: Some("Run".to_string()),
    sport_type: Some("Run".to_string()),
    start_date_local: Some(start_date_local.to_string()),
    distance: Some(10_000.0),
    moving_time: Some(3000.0),
    elapsed_time: Some(3120.0),
    total_elevation_gain: Some(55.0),
    average_speed: Some(3.3333),
    max_speed: Some(4.8),
    average_heartrate: Some(148.0),
    max_heartrate: Some(171.0),
    elev_high: Some(120.0),
    elev_low: Some(65.0),
    average_temp: None,
    workout_type: Some(0),
  }
}

/// One run per ISO week on consecutive Mondays from 2024-01-01 (2024-W01)
pub fn weekly_series(distances_km: &[f64]) -> Vec<Activity> {
  let first_monday = date(2024, 1, 1);
  distances_km
    .iter()
    .enumerate()
    .map(|(i, &distance)| {
      let day = first_monday + Duration::weeks(i as i64);
      let start = format!("{}T07:00:00", day.format("%Y-%m-%d"));
      mock_activity(i as i64 + 1, &start, distance)
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::WeekBucket;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('activities', 'app_logs')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2, "Expected 2 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_weekly_series_one_run_per_week() {
    let series = weekly_series(&[10.0, 12.0, 14.0]);
    let weeks: Vec<WeekBucket> = series.iter().map(|a| a.week()).collect();
    assert_eq!(
      weeks,
      vec![
        WeekBucket { year: 2024, week: 1 },
        WeekBucket { year: 2024, week: 2 },
        WeekBucket { year: 2024, week: 3 },
      ]
    );
    assert_eq!(series[2].distance_km, 14.0);
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let activity = mock_activity(1, "2024-03-04T07:00:00", 10.0);
    assert_eq!(activity.moving_time_min, 50.0);
    assert_eq!(activity.pace_min_per_km(), Some(5.0));

    let raw = mock_raw_activity(1, "2024-03-04T07:00:00Z");
    assert!(crate::normalize::normalize_activity(&raw).is_ok());
  }
}
