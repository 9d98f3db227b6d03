//! Training-load analytics over Strava activities.
//!
//! Raw activity summaries are normalized into consistent units, filtered to a
//! local-date window, bucketed into ISO weeks and analysed for volume
//! progression, session frequency and pace-based intensity. The analytics
//! modules are synchronous and pure; `strava`, `db` and `sync` do the I/O
//! that has to finish before analysis starts.

pub mod analysis;
pub mod config;
pub mod db;
pub mod filter;
pub mod frequency;
pub mod intensity;
pub mod models;
pub mod normalize;
pub mod pace;
pub mod session;
pub mod strava;
pub mod summary;
pub mod sync;
pub mod volume;
pub mod weekly;

#[cfg(test)]
mod test_utils;

pub use analysis::{AnalysisParams, AnalysisReport, IntensityOutcome};
pub use config::{AppConfig, ConfigError};
pub use db::{initialize_db, ActivityStore, SessionEvent, StoreError};
pub use filter::ActivityFilter;
pub use models::{Activity, RawActivity, WeekBucket, WorkoutKind};
pub use normalize::{normalize_activities, normalize_activity, NormalizeError};
pub use pace::{ManualReference, ReferenceChoice, ReferenceMode, ThresholdPace};
pub use session::AnalysisSession;
pub use strava::{RateLimiter, StravaClient, StravaError};
pub use sync::{load_session, sync_activities, SyncError, SyncResult};
