//! Weekly aggregation
//!
//! Groups activities into ISO weeks and computes per-week totals, the
//! longest session and week-over-week percentage change. Weeks without
//! activities are never synthesized, so consecutive aggregates need not be
//! consecutive weeks.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{Activity, WeekBucket};

/// Long-session share of the weekly total considered healthy (percent)
pub const LONG_SESSION_SHARE_MIN: f64 = 30.0;
pub const LONG_SESSION_SHARE_MAX: f64 = 40.0;

/// Snapshot of a session referenced from aggregate tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
  pub activity_id: i64,
  pub name: String,
  pub start_local: NaiveDateTime,
  pub distance_km: f64,
  pub moving_time_min: f64,
  pub pace_min_per_km: Option<f64>,
  pub is_race: bool,
}

impl From<&Activity> for SessionSummary {
  fn from(a: &Activity) -> Self {
    Self {
      activity_id: a.activity_id,
      name: a.name.clone(),
      start_local: a.start_local,
      distance_km: a.distance_km,
      moving_time_min: a.moving_time_min,
      pace_min_per_km: a.pace_min_per_km(),
      is_race: a.is_race(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAggregate {
  pub week: WeekBucket,
  pub total_distance_km: f64,
  pub total_moving_time_min: f64,
  pub session_count: usize,
  pub longest: SessionSummary,
  /// Change vs the previous aggregate; `None` for the first week
  pub distance_pct_change: Option<f64>,
  pub time_pct_change: Option<f64>,
}

/// Aggregate activities by ISO week, ascending
pub fn aggregate_weeks(activities: &[Activity]) -> Vec<WeeklyAggregate> {
  let mut groups: BTreeMap<WeekBucket, Vec<&Activity>> = BTreeMap::new();
  for activity in activities {
    groups.entry(activity.week()).or_default().push(activity);
  }

  let mut weeks: Vec<WeeklyAggregate> = groups
    .into_iter()
    .filter_map(|(week, members)| {
      let longest = longest_session(&members)?;
      Some(WeeklyAggregate {
        week,
        total_distance_km: members.iter().map(|a| a.distance_km).sum(),
        total_moving_time_min: members.iter().map(|a| a.moving_time_min).sum(),
        session_count: members.len(),
        longest: SessionSummary::from(longest),
        distance_pct_change: None,
        time_pct_change: None,
      })
    })
    .collect();

  for i in 1..weeks.len() {
    let (prev_distance, prev_time) = (weeks[i - 1].total_distance_km, weeks[i - 1].total_moving_time_min);
    let current = &mut weeks[i];
    current.distance_pct_change = pct_change(prev_distance, current.total_distance_km);
    current.time_pct_change = pct_change(prev_time, current.total_moving_time_min);
  }

  weeks
}

/// `(current - previous) / previous * 100`; undefined when previous is zero
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
  if previous > 0.0 {
    Some((current - previous) / previous * 100.0)
  } else {
    None
  }
}

/// Longest by distance; ties go to the earliest start
fn longest_session<'a>(members: &[&'a Activity]) -> Option<&'a Activity> {
  let mut best: Option<&Activity> = None;
  for &activity in members {
    best = match best {
      None => Some(activity),
      Some(current) => {
        let longer = activity.distance_km > current.distance_km;
        let tie_but_earlier =
          activity.distance_km == current.distance_km && activity.start_local < current.start_local;
        if longer || tie_but_earlier {
          Some(activity)
        } else {
          Some(current)
        }
      }
    };
  }
  best
}

/// ---------------------------------------------------------------------------
/// Longest Session Table
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongSessionRow {
  pub week: WeekBucket,
  pub session: SessionSummary,
  pub weekly_total_km: f64,
  /// Share of the weekly total in percent
  pub share_of_week_pct: Option<f64>,
  pub within_target_share: bool,
}

/// Longest session per week among activities of the given sports
pub fn long_session_table(activities: &[Activity], sports: &BTreeSet<String>) -> Vec<LongSessionRow> {
  let relevant: Vec<Activity> = activities
    .iter()
    .filter(|a| sports.contains(&a.sport))
    .cloned()
    .collect();

  long_session_rows(&aggregate_weeks(&relevant))
}

/// Long-session rows for weeks that were already aggregated
pub fn long_session_rows(weeks: &[WeeklyAggregate]) -> Vec<LongSessionRow> {
  weeks
    .iter()
    .map(|week| {
      let share = if week.total_distance_km > 0.0 {
        Some(week.longest.distance_km / week.total_distance_km * 100.0)
      } else {
        None
      };
      LongSessionRow {
        week: week.week,
        session: week.longest.clone(),
        weekly_total_km: week.total_distance_km,
        share_of_week_pct: share,
        within_target_share: share
          .map_or(false, |s| (LONG_SESSION_SHARE_MIN..=LONG_SESSION_SHARE_MAX).contains(&s)),
      }
    })
    .collect()
}
