//! Analysis session
//!
//! Holds the normalized activity set for one user session and the last
//! computed report, so re-rendering with unchanged parameters does not
//! recompute anything.

use crate::analysis::{AnalysisParams, AnalysisReport};
use crate::models::Activity;

#[derive(Debug, Default)]
pub struct AnalysisSession {
  activities: Vec<Activity>,
  cache: Option<(AnalysisParams, AnalysisReport)>,
}

impl AnalysisSession {
  pub fn new(activities: Vec<Activity>) -> Self {
    Self {
      activities,
      cache: None,
    }
  }

  pub fn activities(&self) -> &[Activity] {
    &self.activities
  }

  /// Swap in a freshly loaded activity set; drops the cached report
  pub fn replace_activities(&mut self, activities: Vec<Activity>) {
    self.activities = activities;
    self.cache = None;
  }

  /// Report for `params`, recomputed only when they differ from the last call
  pub fn analyze(&mut self, params: &AnalysisParams) -> &AnalysisReport {
    let stale = self.cache.as_ref().map_or(true, |(cached, _)| cached != params);
    if stale {
      self.cache = None;
    } else {
      tracing::debug!("Reusing cached analysis report");
    }

    let activities = &self.activities;
    let (_, report) = self
      .cache
      .get_or_insert_with(|| (params.clone(), AnalysisReport::compute(activities, params)));
    report
  }

  pub fn cached_params(&self) -> Option<&AnalysisParams> {
    self.cache.as_ref().map(|(params, _)| params)
  }
}
