//! Fetch, normalize and store activities, recording session events
//!
//! This is the only place the activity source and the store meet; once it
//! returns, analysis runs purely in memory over `AnalysisSession`.

use serde::Serialize;

use crate::db::{ActivityStore, SessionEvent, StoreError};
use crate::normalize::normalize_activities;
use crate::session::AnalysisSession;
use crate::strava::{StravaClient, StravaError};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
  #[error(transparent)]
  Strava(#[from] StravaError),

  #[error(transparent)]
  Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncResult {
  pub total_fetched: usize,
  pub normalized: usize,
  /// Raw records rejected by the normalizer
  pub dropped: usize,
  pub stored: u64,
  pub hit_daily_limit: bool,
}

/// Sync all activities from Strava into the store.
///
/// Logging an event never fails the sync; a failed write is only traced.
pub async fn sync_activities(
  client: &mut StravaClient,
  store: &ActivityStore,
  access_token: &str,
  athlete_id: Option<i64>,
) -> Result<SyncResult, SyncError> {
  let fetched = match client.fetch_all_activities(access_token).await {
    Ok(fetched) => fetched,
    Err(e) => {
      record(
        store,
        athlete_id,
        SessionEvent::DataLoadFailed,
        serde_json::json!({ "error": e.to_string() }),
      )
      .await;
      return Err(e.into());
    }
  };

  let activities = normalize_activities(&fetched.activities);
  let stored = store.upsert_activities(&activities).await?;

  let result = SyncResult {
    total_fetched: fetched.activities.len(),
    normalized: activities.len(),
    dropped: fetched.activities.len() - activities.len(),
    stored,
    hit_daily_limit: fetched.hit_daily_limit,
  };

  record(
    store,
    athlete_id,
    SessionEvent::DataLoad,
    serde_json::json!({
      "activities": result.normalized,
      "dropped": result.dropped,
      "hit_daily_limit": result.hit_daily_limit,
    }),
  )
  .await;

  tracing::info!(
    fetched = result.total_fetched,
    stored = result.stored,
    dropped = result.dropped,
    "Strava sync complete"
  );
  Ok(result)
}

/// Start an analysis session over an athlete's stored activities
pub async fn load_session(store: &ActivityStore, athlete_id: i64) -> Result<AnalysisSession, StoreError> {
  let activities = store.load_activities(athlete_id).await?;
  tracing::debug!(athlete_id, count = activities.len(), "Loaded activities for analysis");
  Ok(AnalysisSession::new(activities))
}

async fn record(store: &ActivityStore, athlete_id: Option<i64>, event: SessionEvent, data: serde_json::Value) {
  if let Err(e) = store.log_session_event(athlete_id, event, Some(data)).await {
    tracing::warn!(event = event.as_str(), error = %e, "Failed to log session event");
  }
}
