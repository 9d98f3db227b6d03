//! Time-window filter
//!
//! Selects the activities inside an inclusive local-date range whose
//! sub-type is in the allowed set. An empty set allows everything.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Activity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFilter {
  pub start: NaiveDate,
  pub end: NaiveDate,
  /// Allowed `sport_type` values; empty means all
  #[serde(default)]
  pub sport_types: BTreeSet<String>,
}

impl ActivityFilter {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
    Self {
      start,
      end,
      sport_types: BTreeSet::new(),
    }
  }

  pub fn with_sport_types<I, S>(mut self, types: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.sport_types = types.into_iter().map(Into::into).collect();
    self
  }

  pub fn matches(&self, activity: &Activity) -> bool {
    let date = activity.local_date();
    date >= self.start
      && date <= self.end
      && (self.sport_types.is_empty() || self.sport_types.contains(&activity.sport_type))
  }

  /// Matching activities in input order; `start > end` yields nothing
  pub fn apply(&self, activities: &[Activity]) -> Vec<Activity> {
    if self.start > self.end {
      return Vec::new();
    }
    activities.iter().filter(|a| self.matches(a)).cloned().collect()
  }
}
