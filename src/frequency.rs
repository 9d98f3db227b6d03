//! Frequency consistency analysis over weekly session counts

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::weekly::WeeklyAggregate;

/// Coefficient of variation (percent) below which frequency counts as consistent
pub const CONSISTENT_CV_PCT: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyAnalysis {
  pub week_count: usize,
  pub mean_sessions: Option<f64>,
  /// Sample standard deviation / mean * 100; needs at least two weeks
  pub cv: Option<f64>,
  /// Most common weekly count, smallest value on ties
  pub mode_sessions: Option<usize>,
  /// Percent of weeks whose count equals the mode
  pub pct_consistent: Option<f64>,
  pub is_consistent: Option<bool>,
}

impl FrequencyAnalysis {
  pub fn from_weeks(weeks: &[WeeklyAggregate]) -> Self {
    let counts: Vec<usize> = weeks.iter().map(|w| w.session_count).collect();
    Self::compute(&counts)
  }

  pub fn compute(session_counts: &[usize]) -> Self {
    let week_count = session_counts.len();
    if week_count == 0 {
      return Self {
        week_count,
        mean_sessions: None,
        cv: None,
        mode_sessions: None,
        pct_consistent: None,
        is_consistent: None,
      };
    }

    let values: Vec<f64> = session_counts.iter().map(|&c| c as f64).collect();
    let mean = values.iter().mean();

    let cv = if week_count >= 2 && mean > 0.0 {
      Some(values.iter().std_dev() / mean * 100.0)
    } else {
      None
    };

    let mode = mode_smallest(session_counts);
    let pct_consistent = mode.map(|m| {
      let matching = session_counts.iter().filter(|&&c| c == m).count();
      matching as f64 / week_count as f64 * 100.0
    });

    Self {
      week_count,
      mean_sessions: Some(mean),
      cv,
      mode_sessions: mode,
      pct_consistent,
      is_consistent: cv.map(|cv| cv < CONSISTENT_CV_PCT),
    }
  }
}

fn mode_smallest(values: &[usize]) -> Option<usize> {
  let mut tally: BTreeMap<usize, usize> = BTreeMap::new();
  for &value in values {
    *tally.entry(value).or_default() += 1;
  }

  let mut best: Option<(usize, usize)> = None;
  for (value, count) in tally {
    // ascending scan with strict `>` keeps the smallest of tied values
    if best.map_or(true, |(_, best_count)| count > best_count) {
      best = Some((value, count));
    }
  }
  best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mode_tie_breaks_to_smallest() {
    let analysis = FrequencyAnalysis::compute(&[3, 3, 4, 4, 5]);
    assert_eq!(analysis.mode_sessions, Some(3));
    assert_eq!(analysis.pct_consistent, Some(40.0));

    assert_eq!(mode_smallest(&[5, 4, 4, 3, 3]), Some(3));
    assert_eq!(mode_smallest(&[2, 6, 6]), Some(6));
  }

  #[test]
  fn test_cv_uses_sample_std_dev() {
    // mean 4, sample variance 2/3 -> std 0.8165
    let analysis = FrequencyAnalysis::compute(&[3, 4, 5, 4]);
    assert_eq!(analysis.mean_sessions, Some(4.0));
    crate::assert_approx_eq!(analysis.cv.unwrap(), 20.412414523193153, 1e-9);
    assert_eq!(analysis.is_consistent, Some(true));
    assert_eq!(analysis.mode_sessions, Some(4));
    assert_eq!(analysis.pct_consistent, Some(50.0));
  }

  #[test]
  fn test_irregular_frequency() {
    let analysis = FrequencyAnalysis::compute(&[1, 6, 2, 7]);
    assert!(analysis.cv.unwrap() > CONSISTENT_CV_PCT);
    assert_eq!(analysis.is_consistent, Some(false));
  }

  #[test]
  fn test_constant_frequency_has_zero_cv() {
    let analysis = FrequencyAnalysis::compute(&[4, 4, 4]);
    assert_eq!(analysis.cv, Some(0.0));
    assert_eq!(analysis.pct_consistent, Some(100.0));
  }

  #[test]
  fn test_degenerate_statistics() {
    let empty = FrequencyAnalysis::compute(&[]);
    assert_eq!(empty.cv, None);
    assert_eq!(empty.mode_sessions, None);
    assert_eq!(empty.mean_sessions, None);

    let single = FrequencyAnalysis::compute(&[5]);
    assert_eq!(single.cv, None);
    assert_eq!(single.is_consistent, None);
    assert_eq!(single.mode_sessions, Some(5));
    assert_eq!(single.mean_sessions, Some(5.0));
  }
}
