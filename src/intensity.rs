//! Pace-based intensity classification
//!
//! Each pace-bearing activity gets an intensity index (its pace divided by
//! the threshold pace) and a zone. An index below 1 means the session was
//! faster than threshold pace.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{Activity, WeekBucket};
use crate::pace::ThresholdPace;

pub const HIGH_INDEX_MAX: f64 = 0.95;
pub const MODERATE_INDEX_MAX: f64 = 1.15;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntensityError {
  #[error("No reference effort available: no race detected and no manual pace entered")]
  NoReferenceEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityZone {
  High,
  Moderate,
  Low,
}

impl IntensityZone {
  /// First match wins: <= 0.95 High, <= 1.15 Moderate, otherwise Low
  pub fn from_index(index: f64) -> Self {
    if index <= HIGH_INDEX_MAX {
      Self::High
    } else if index <= MODERATE_INDEX_MAX {
      Self::Moderate
    } else {
      Self::Low
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::High => "high",
      Self::Moderate => "moderate",
      Self::Low => "low",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityRecord {
  pub activity_id: i64,
  pub week: WeekBucket,
  pub start_local: NaiveDateTime,
  pub pace_min_per_km: f64,
  pub intensity_index: f64,
  pub zone: IntensityZone,
}

/// Classify the pace-bearing activities of the given sports
pub fn classify(
  activities: &[Activity],
  threshold: &ThresholdPace,
  sports: &BTreeSet<String>,
) -> Vec<IntensityRecord> {
  activities
    .iter()
    .filter(|a| sports.contains(&a.sport))
    .filter_map(|a| {
      let pace = a.pace_min_per_km()?;
      let index = pace / threshold.pace_min_per_km;
      Some(IntensityRecord {
        activity_id: a.activity_id,
        week: a.week(),
        start_local: a.start_local,
        pace_min_per_km: pace,
        intensity_index: index,
        zone: IntensityZone::from_index(index),
      })
    })
    .collect()
}

/// Percent of records in the Low zone; 0.0 for no records
pub fn easy_percentage(records: &[IntensityRecord]) -> f64 {
  if records.is_empty() {
    return 0.0;
  }
  let easy = records.iter().filter(|r| r.zone == IntensityZone::Low).count();
  100.0 * easy as f64 / records.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneCounts {
  pub high: usize,
  pub moderate: usize,
  pub low: usize,
}

impl ZoneCounts {
  pub fn add(&mut self, zone: IntensityZone) {
    match zone {
      IntensityZone::High => self.high += 1,
      IntensityZone::Moderate => self.moderate += 1,
      IntensityZone::Low => self.low += 1,
    }
  }

  pub fn total(&self) -> usize {
    self.high + self.moderate + self.low
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyIntensityMix {
  pub week: WeekBucket,
  pub counts: ZoneCounts,
}

/// Zone tallies per ISO week, ascending
pub fn weekly_mix(records: &[IntensityRecord]) -> Vec<WeeklyIntensityMix> {
  let mut by_week: BTreeMap<WeekBucket, ZoneCounts> = BTreeMap::new();
  for record in records {
    by_week.entry(record.week).or_default().add(record.zone);
  }
  by_week
    .into_iter()
    .map(|(week, counts)| WeeklyIntensityMix { week, counts })
    .collect()
}

/// Full intensity output for one threshold pace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityReport {
  pub threshold: ThresholdPace,
  pub records: Vec<IntensityRecord>,
  pub totals: ZoneCounts,
  pub easy_percentage: f64,
  pub weekly: Vec<WeeklyIntensityMix>,
}

impl IntensityReport {
  pub fn compute(activities: &[Activity], threshold: ThresholdPace, sports: &BTreeSet<String>) -> Self {
    let records = classify(activities, &threshold, sports);
    let mut totals = ZoneCounts::default();
    for record in &records {
      totals.add(record.zone);
    }

    Self {
      easy_percentage: easy_percentage(&records),
      weekly: weekly_mix(&records),
      threshold,
      records,
      totals,
    }
  }
}
