use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::models::{Activity, WorkoutKind};

pub type DbPool = SqlitePool;

/// Athlete id recorded for events before anyone has authenticated
pub const ANONYMOUS_ATHLETE_ID: i64 = 0;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Failed to encode event data: {0}")]
  Encode(#[from] serde_json::Error),

  #[error("Stored activity {activity_id} is corrupt: {reason}")]
  Corrupt { activity_id: i64, reason: String },
}

/// Open the connection pool and run migrations
pub async fn initialize_db(database_url: &str) -> Result<DbPool, StoreError> {
  tracing::info!(url = %database_url, "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("Database initialized successfully");
  Ok(pool)
}

/// ---------------------------------------------------------------------------
/// Session Events
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
  AppOpen,
  DataLoad,
  DataLoadFailed,
}

impl SessionEvent {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::AppOpen => "app_open",
      Self::DataLoad => "data_load",
      Self::DataLoadFailed => "data_load_failed",
    }
  }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppLogRow {
  pub id: i64,
  pub athlete_id: i64,
  pub event_type: String,
  pub event_data: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// ---------------------------------------------------------------------------
/// Activity Store
/// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
  activity_id: i64,
  athlete_id: i64,
  name: String,
  sport: String,
  sport_type: String,
  workout_kind: Option<String>,
  start_local: NaiveDateTime,
  distance_km: f64,
  moving_time_min: f64,
  elapsed_time_min: f64,
  elevation_gain_m: Option<f64>,
  average_speed_kmh: Option<f64>,
  max_speed_kmh: Option<f64>,
  average_heartrate: Option<f64>,
  max_heartrate: Option<f64>,
  elev_high_m: Option<f64>,
  elev_low_m: Option<f64>,
  average_temp_c: Option<f64>,
}

impl TryFrom<ActivityRow> for Activity {
  type Error = StoreError;

  fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
    let workout_kind = row
      .workout_kind
      .as_deref()
      .map(str::parse::<WorkoutKind>)
      .transpose()
      .map_err(|reason| StoreError::Corrupt {
        activity_id: row.activity_id,
        reason,
      })?;

    Ok(Activity {
      activity_id: row.activity_id,
      athlete_id: row.athlete_id,
      name: row.name,
      sport: row.sport,
      sport_type: row.sport_type,
      workout_kind,
      start_local: row.start_local,
      distance_km: row.distance_km,
      moving_time_min: row.moving_time_min,
      elapsed_time_min: row.elapsed_time_min,
      elevation_gain_m: row.elevation_gain_m,
      average_speed_kmh: row.average_speed_kmh,
      max_speed_kmh: row.max_speed_kmh,
      average_heartrate: row.average_heartrate,
      max_heartrate: row.max_heartrate,
      elev_high_m: row.elev_high_m,
      elev_low_m: row.elev_low_m,
      average_temp_c: row.average_temp_c,
    })
  }
}

#[derive(Debug, Clone)]
pub struct ActivityStore {
  pool: DbPool,
}

impl ActivityStore {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &DbPool {
    &self.pool
  }

  /// Insert or replace activities keyed by `activity_id`; returns rows written
  pub async fn upsert_activities(&self, activities: &[Activity]) -> Result<u64, StoreError> {
    let mut tx = self.pool.begin().await?;
    let mut written = 0u64;

    for activity in activities {
      let result = sqlx::query(
        r#"
        INSERT INTO activities (
          activity_id, athlete_id, name, sport, sport_type, workout_kind,
          start_local, distance_km, moving_time_min, elapsed_time_min,
          elevation_gain_m, average_speed_kmh, max_speed_kmh,
          average_heartrate, max_heartrate, elev_high_m, elev_low_m,
          average_temp_c, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
        ON CONFLICT(activity_id) DO UPDATE SET
          athlete_id = excluded.athlete_id,
          name = excluded.name,
          sport = excluded.sport,
          sport_type = excluded.sport_type,
          workout_kind = excluded.workout_kind,
          start_local = excluded.start_local,
          distance_km = excluded.distance_km,
          moving_time_min = excluded.moving_time_min,
          elapsed_time_min = excluded.elapsed_time_min,
          elevation_gain_m = excluded.elevation_gain_m,
          average_speed_kmh = excluded.average_speed_kmh,
          max_speed_kmh = excluded.max_speed_kmh,
          average_heartrate = excluded.average_heartrate,
          max_heartrate = excluded.max_heartrate,
          elev_high_m = excluded.elev_high_m,
          elev_low_m = excluded.elev_low_m,
          average_temp_c = excluded.average_temp_c,
          updated_at = excluded.updated_at
        "#,
      )
      .bind(activity.activity_id)
      .bind(activity.athlete_id)
      .bind(&activity.name)
      .bind(&activity.sport)
      .bind(&activity.sport_type)
      .bind(activity.workout_kind.map(|k| k.to_string()))
      .bind(activity.start_local)
      .bind(activity.distance_km)
      .bind(activity.moving_time_min)
      .bind(activity.elapsed_time_min)
      .bind(activity.elevation_gain_m)
      .bind(activity.average_speed_kmh)
      .bind(activity.max_speed_kmh)
      .bind(activity.average_heartrate)
      .bind(activity.max_heartrate)
      .bind(activity.elev_high_m)
      .bind(activity.elev_low_m)
      .bind(activity.average_temp_c)
      .bind(Utc::now())
      .execute(&mut *tx)
      .await?;

      written += result.rows_affected();
    }

    tx.commit().await?;
    tracing::debug!(written, "Upserted activities");
    Ok(written)
  }

  /// All stored activities of one athlete, oldest first
  pub async fn load_activities(&self, athlete_id: i64) -> Result<Vec<Activity>, StoreError> {
    let rows = sqlx::query_as::<_, ActivityRow>(
      r#"
      SELECT activity_id, athlete_id, name, sport, sport_type, workout_kind,
             start_local, distance_km, moving_time_min, elapsed_time_min,
             elevation_gain_m, average_speed_kmh, max_speed_kmh,
             average_heartrate, max_heartrate, elev_high_m, elev_low_m,
             average_temp_c
      FROM activities
      WHERE athlete_id = ?1
      ORDER BY start_local ASC, activity_id ASC
      "#,
    )
    .bind(athlete_id)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(Activity::try_from).collect()
  }

  /// Record a session event; a missing athlete is stored as 0
  pub async fn log_session_event(
    &self,
    athlete_id: Option<i64>,
    event: SessionEvent,
    event_data: Option<serde_json::Value>,
  ) -> Result<(), StoreError> {
    let payload = event_data.map(|v| serde_json::to_string(&v)).transpose()?;

    sqlx::query(
      r#"
      INSERT INTO app_logs (athlete_id, event_type, event_data, created_at)
      VALUES (?1, ?2, ?3, ?4)
      "#,
    )
    .bind(athlete_id.unwrap_or(ANONYMOUS_ATHLETE_ID))
    .bind(event.as_str())
    .bind(payload)
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  /// Most recent events first
  pub async fn recent_events(&self, limit: i64) -> Result<Vec<AppLogRow>, StoreError> {
    let rows = sqlx::query_as::<_, AppLogRow>(
      "SELECT id, athlete_id, event_type, event_data, created_at FROM app_logs ORDER BY id DESC LIMIT ?1",
    )
    .bind(limit)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows)
  }
}
