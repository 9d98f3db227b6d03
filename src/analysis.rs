//! Deterministic analysis layer for activity metrics
//!
//! `AnalysisReport::compute` runs the whole pipeline over a normalized
//! activity set: filter, weekly aggregation, volume, frequency, intensity and
//! the summary verdicts. It is pure; the same inputs give the same report.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::filter::ActivityFilter;
use crate::frequency::FrequencyAnalysis;
use crate::intensity::{IntensityError, IntensityReport};
use crate::models::Activity;
use crate::pace::{ReferenceChoice, ThresholdPace};
use crate::summary::TrainingSummary;
use crate::volume::VolumeAnalysis;
use crate::weekly::{aggregate_weeks, long_session_rows, LongSessionRow, WeeklyAggregate};

pub const DEFAULT_PACE_SPORTS: [&str; 2] = ["Run", "Hike"];
pub const DEFAULT_LONG_RUN_SPORTS: [&str; 1] = ["Run"];

/// ---------------------------------------------------------------------------
/// Parameters
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
  pub filter: ActivityFilter,
  #[serde(default)]
  pub reference: ReferenceChoice,
  /// Sports whose speed is meaningful as a pace
  pub pace_sports: BTreeSet<String>,
  /// Sports considered for the longest-session table and run frequency
  pub long_run_sports: BTreeSet<String>,
}

impl AnalysisParams {
  pub fn new(filter: ActivityFilter) -> Self {
    Self {
      filter,
      reference: ReferenceChoice::default(),
      pace_sports: DEFAULT_PACE_SPORTS.iter().map(|s| s.to_string()).collect(),
      long_run_sports: DEFAULT_LONG_RUN_SPORTS.iter().map(|s| s.to_string()).collect(),
    }
  }

  /// Default reference choice with the sport sets taken from configuration
  pub fn from_config(filter: ActivityFilter, config: &AppConfig) -> Self {
    Self::new(filter)
      .with_pace_sports(config.pace_sports.clone())
      .with_long_run_sports(config.long_run_sports.clone())
  }

  pub fn with_reference(mut self, reference: ReferenceChoice) -> Self {
    self.reference = reference;
    self
  }

  pub fn with_pace_sports(mut self, sports: BTreeSet<String>) -> Self {
    self.pace_sports = sports;
    self
  }

  pub fn with_long_run_sports(mut self, sports: BTreeSet<String>) -> Self {
    self.long_run_sports = sports;
    self
  }
}

/// ---------------------------------------------------------------------------
/// Report
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntensityOutcome {
  Computed(IntensityReport),
  InsufficientData { reason: String },
}

impl IntensityOutcome {
  pub fn report(&self) -> Option<&IntensityReport> {
    match self {
      Self::Computed(report) => Some(report),
      Self::InsufficientData { .. } => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
  pub filtered_count: usize,
  pub weeks: Vec<WeeklyAggregate>,
  pub long_sessions: Vec<LongSessionRow>,
  pub volume: VolumeAnalysis,
  pub frequency: FrequencyAnalysis,
  /// Frequency over the long-run sports only
  pub run_frequency: FrequencyAnalysis,
  pub intensity: IntensityOutcome,
  pub summary: TrainingSummary,
}

impl AnalysisReport {
  pub fn compute(activities: &[Activity], params: &AnalysisParams) -> Self {
    let filtered = params.filter.apply(activities);
    tracing::debug!(
      total = activities.len(),
      filtered = filtered.len(),
      start = %params.filter.start,
      end = %params.filter.end,
      "Computing analysis report"
    );

    let weeks = aggregate_weeks(&filtered);
    let volume = VolumeAnalysis::compute(&weeks);
    let frequency = FrequencyAnalysis::from_weeks(&weeks);

    let runs: Vec<Activity> = filtered
      .iter()
      .filter(|a| params.long_run_sports.contains(&a.sport))
      .cloned()
      .collect();
    let run_weeks = aggregate_weeks(&runs);
    let run_frequency = FrequencyAnalysis::from_weeks(&run_weeks);
    let long_sessions = long_session_rows(&run_weeks);

    let intensity = intensity_outcome(&filtered, params);
    let summary = TrainingSummary::compute(
      &volume,
      &frequency,
      intensity.report().map(|r| r.easy_percentage),
    );

    Self {
      filtered_count: filtered.len(),
      weeks,
      long_sessions,
      volume,
      frequency,
      run_frequency,
      intensity,
      summary,
    }
  }
}

fn intensity_outcome(filtered: &[Activity], params: &AnalysisParams) -> IntensityOutcome {
  let reference = match params.reference.resolve(filtered) {
    Ok(Some(reference)) => reference,
    Ok(None) => {
      return IntensityOutcome::InsufficientData {
        reason: IntensityError::NoReferenceEffort.to_string(),
      }
    }
    Err(e) => {
      tracing::warn!(error = %e, "Ignoring invalid reference effort");
      return IntensityOutcome::InsufficientData { reason: e.to_string() };
    }
  };

  let threshold = ThresholdPace::estimate(reference);
  tracing::debug!(
    reference_pace = reference.pace_min_per_km,
    threshold_pace = threshold.pace_min_per_km,
    factor = threshold.factor,
    "Estimated threshold pace"
  );
  IntensityOutcome::Computed(IntensityReport::compute(filtered, threshold, &params.pace_sports))
}
