//! Training summary verdicts
//!
//! Turns the volume, frequency and intensity reports into categorical
//! verdicts the dashboard maps onto its recommendation boxes.

use serde::{Deserialize, Serialize};

use crate::frequency::FrequencyAnalysis;
use crate::volume::VolumeAnalysis;

/// More than this share of too-large transitions flags the progression
pub const TOO_LARGE_SHARE_LIMIT_PCT: f64 = 50.0;
/// Recovery frequency (weeks per recovery week) is judged good within [2, 5]
pub const RECOVERY_FREQUENCY_MIN: f64 = 2.0;
pub const RECOVERY_FREQUENCY_MAX: f64 = 5.0;
/// Polarized target: 80% of sessions at low intensity
pub const POLARIZED_EASY_TARGET_PCT: f64 = 80.0;
pub const POLARIZED_TOLERANCE_PCT: f64 = 10.0;
pub const TOO_INTENSE_EASY_PCT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionVerdict {
  Gradual,
  TooVariable,
  InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryVerdict {
  Adequate,
  NotDetected,
  /// Recovery weeks closer than every two weeks: volume is not building
  Inconsistent,
  TooRare,
  InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyVerdict {
  Consistent,
  Irregular,
  InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityVerdict {
  Balanced,
  TooIntense,
  Unbalanced,
  InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
  pub progression: ProgressionVerdict,
  pub recovery: RecoveryVerdict,
  pub frequency: FrequencyVerdict,
  /// Typical weekly sessions, when frequency is consistent
  pub typical_sessions: Option<usize>,
  pub intensity: IntensityVerdict,
  /// |easy_percentage - 80|
  pub polarized_deviation: Option<f64>,
}

impl TrainingSummary {
  /// `easy_percentage` is `None` when intensity could not be classified
  pub fn compute(volume: &VolumeAnalysis, frequency: &FrequencyAnalysis, easy_percentage: Option<f64>) -> Self {
    let progression = match volume.pct_too_large {
      Some(pct) if pct > TOO_LARGE_SHARE_LIMIT_PCT => ProgressionVerdict::TooVariable,
      Some(_) => ProgressionVerdict::Gradual,
      None => ProgressionVerdict::InsufficientData,
    };

    let recovery = match volume.recovery_frequency {
      None => RecoveryVerdict::InsufficientData,
      Some(_) if !volume.has_recovery => RecoveryVerdict::NotDetected,
      Some(freq) if freq < RECOVERY_FREQUENCY_MIN => RecoveryVerdict::Inconsistent,
      Some(freq) if freq > RECOVERY_FREQUENCY_MAX => RecoveryVerdict::TooRare,
      Some(_) => RecoveryVerdict::Adequate,
    };

    let frequency_verdict = match frequency.is_consistent {
      Some(true) => FrequencyVerdict::Consistent,
      Some(false) => FrequencyVerdict::Irregular,
      None => FrequencyVerdict::InsufficientData,
    };

    let polarized_deviation = easy_percentage.map(|easy| (easy - POLARIZED_EASY_TARGET_PCT).abs());
    let intensity = match (easy_percentage, polarized_deviation) {
      (Some(_), Some(dev)) if dev <= POLARIZED_TOLERANCE_PCT => IntensityVerdict::Balanced,
      (Some(easy), Some(_)) if easy < TOO_INTENSE_EASY_PCT => IntensityVerdict::TooIntense,
      (Some(_), Some(_)) => IntensityVerdict::Unbalanced,
      _ => IntensityVerdict::InsufficientData,
    };

    Self {
      progression,
      recovery,
      frequency: frequency_verdict,
      typical_sessions: if frequency_verdict == FrequencyVerdict::Consistent {
        frequency.mode_sessions
      } else {
        None
      },
      intensity,
      polarized_deviation,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::weekly_series;
  use crate::weekly::aggregate_weeks;

  fn volume_for(distances: &[f64]) -> VolumeAnalysis {
    VolumeAnalysis::compute(&aggregate_weeks(&weekly_series(distances)))
  }

  #[test]
  fn test_progression_verdict() {
    let gradual = volume_for(&[50.0, 55.0, 60.0, 66.0]);
    let summary = TrainingSummary::compute(&gradual, &FrequencyAnalysis::compute(&[1, 1, 1, 1]), None);
    assert_eq!(summary.progression, ProgressionVerdict::Gradual);

    let jumpy = volume_for(&[20.0, 40.0, 20.0, 40.0]);
    let summary = TrainingSummary::compute(&jumpy, &FrequencyAnalysis::compute(&[1, 1, 1, 1]), None);
    assert_eq!(summary.progression, ProgressionVerdict::TooVariable);
  }

  #[test]
  fn test_recovery_verdict_bounds() {
    let freq = FrequencyAnalysis::compute(&[]);

    // 4 weeks, 1 recovery -> 4.0
    let summary = TrainingSummary::compute(&volume_for(&[100.0, 105.0, 40.0, 95.0]), &freq, None);
    assert_eq!(summary.recovery, RecoveryVerdict::Adequate);

    // 4 weeks, 2 recoveries -> 2.0, the lower bound itself is fine
    let summary = TrainingSummary::compute(&volume_for(&[100.0, 50.0, 100.0, 50.0]), &freq, None);
    assert_eq!(summary.recovery, RecoveryVerdict::Adequate);

    // 4 weeks, 3 recoveries -> 1.33
    let summary = TrainingSummary::compute(&volume_for(&[100.0, 50.0, 20.0, 10.0]), &freq, None);
    assert_eq!(summary.recovery, RecoveryVerdict::Inconsistent);

    // 6 weeks, 1 recovery -> 6.0
    let summary = TrainingSummary::compute(
      &volume_for(&[50.0, 55.0, 60.0, 66.0, 40.0, 50.0]),
      &freq,
      None,
    );
    assert_eq!(summary.recovery, RecoveryVerdict::TooRare);

    let summary = TrainingSummary::compute(&volume_for(&[50.0, 55.0]), &freq, None);
    assert_eq!(summary.recovery, RecoveryVerdict::NotDetected);

    let summary = TrainingSummary::compute(&VolumeAnalysis::compute(&[]), &freq, None);
    assert_eq!(summary.recovery, RecoveryVerdict::InsufficientData);
    assert_eq!(summary.progression, ProgressionVerdict::InsufficientData);
  }

  #[test]
  fn test_frequency_verdict() {
    let volume = volume_for(&[50.0]);
    let summary = TrainingSummary::compute(&volume, &FrequencyAnalysis::compute(&[4, 4, 5, 4]), None);
    assert_eq!(summary.frequency, FrequencyVerdict::Consistent);
    assert_eq!(summary.typical_sessions, Some(4));

    let summary = TrainingSummary::compute(&volume, &FrequencyAnalysis::compute(&[1, 6, 2, 7]), None);
    assert_eq!(summary.frequency, FrequencyVerdict::Irregular);
    assert_eq!(summary.typical_sessions, None);
  }

  #[test]
  fn test_intensity_verdict() {
    let volume = volume_for(&[50.0]);
    let freq = FrequencyAnalysis::compute(&[3]);

    let summary = TrainingSummary::compute(&volume, &freq, Some(75.0));
    assert_eq!(summary.intensity, IntensityVerdict::Balanced);
    assert_eq!(summary.polarized_deviation, Some(5.0));

    let summary = TrainingSummary::compute(&volume, &freq, Some(50.0));
    assert_eq!(summary.intensity, IntensityVerdict::TooIntense);

    let summary = TrainingSummary::compute(&volume, &freq, Some(95.0));
    assert_eq!(summary.intensity, IntensityVerdict::Unbalanced);

    let summary = TrainingSummary::compute(&volume, &freq, None);
    assert_eq!(summary.intensity, IntensityVerdict::InsufficientData);
    assert_eq!(summary.polarized_deviation, None);
  }
}
