//! Volume progression analysis
//!
//! Classifies each week-over-week distance change and looks for recovery
//! weeks. The 6 / 15 / 20 percent thresholds drive user-facing labels and
//! must not be tuned.

use serde::{Deserialize, Serialize};

use crate::models::WeekBucket;
use crate::weekly::WeeklyAggregate;

pub const IDEAL_CHANGE_MIN_PCT: f64 = 6.0;
pub const IDEAL_CHANGE_MAX_PCT: f64 = 15.0;
/// A drop steeper than this (in percent) marks a recovery week
pub const RECOVERY_DROP_PCT: f64 = -20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionClass {
  /// |change| < 6%, not flagged as a problem
  TooSmall,
  /// 6% <= |change| <= 15%
  Ideal,
  /// |change| > 15%
  TooLarge,
}

impl ProgressionClass {
  pub fn from_pct_change(pct: f64) -> Self {
    let magnitude = pct.abs();
    if magnitude > IDEAL_CHANGE_MAX_PCT {
      Self::TooLarge
    } else if magnitude >= IDEAL_CHANGE_MIN_PCT {
      Self::Ideal
    } else {
      Self::TooSmall
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekTransition {
  /// The later week of the pair
  pub week: WeekBucket,
  pub pct_change: f64,
  pub class: ProgressionClass,
  pub is_recovery: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAnalysis {
  pub week_count: usize,
  pub transitions: Vec<WeekTransition>,
  /// Share of transitions in the ideal band; `None` without transitions
  pub pct_ideal_changes: Option<f64>,
  pub pct_too_large: Option<f64>,
  pub has_recovery: bool,
  pub recovery_weeks: usize,
  /// Weeks per recovery week; the total week count when none was found
  pub recovery_frequency: Option<f64>,
}

impl VolumeAnalysis {
  pub fn compute(weeks: &[WeeklyAggregate]) -> Self {
    let transitions: Vec<WeekTransition> = weeks
      .iter()
      .filter_map(|w| {
        w.distance_pct_change.map(|pct| WeekTransition {
          week: w.week,
          pct_change: pct,
          class: ProgressionClass::from_pct_change(pct),
          is_recovery: pct < RECOVERY_DROP_PCT,
        })
      })
      .collect();

    let share_of = |class: ProgressionClass| -> Option<f64> {
      if transitions.is_empty() {
        return None;
      }
      let count = transitions.iter().filter(|t| t.class == class).count();
      Some(count as f64 / transitions.len() as f64 * 100.0)
    };
    let pct_ideal_changes = share_of(ProgressionClass::Ideal);
    let pct_too_large = share_of(ProgressionClass::TooLarge);

    let week_count = weeks.len();
    let recovery_weeks = transitions.iter().filter(|t| t.is_recovery).count();
    let recovery_frequency = if week_count == 0 {
      None
    } else if recovery_weeks == 0 {
      Some(week_count as f64)
    } else {
      Some(week_count as f64 / recovery_weeks as f64)
    };

    Self {
      week_count,
      transitions,
      pct_ideal_changes,
      pct_too_large,
      has_recovery: recovery_weeks > 0,
      recovery_weeks,
      recovery_frequency,
    }
  }
}
