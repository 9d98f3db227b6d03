use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// ISO 8601 week: weeks start Monday, week 1 holds the year's first Thursday.
///
/// Field order gives the chronological `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekBucket {
  pub year: i32,
  pub week: u32,
}

impl WeekBucket {
  pub fn from_date(date: NaiveDate) -> Self {
    let iso = date.iso_week();
    Self {
      year: iso.year(),
      week: iso.week(),
    }
  }

  /// Monday of this week
  pub fn start_date(&self) -> Option<NaiveDate> {
    NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
  }
}

impl std::fmt::Display for WeekBucket {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}-W{:02}", self.year, self.week)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_iso_week_year_boundaries() {
    // 2021-01-03 is a Sunday still belonging to 2020-W53
    assert_eq!(WeekBucket::from_date(date(2021, 1, 3)), WeekBucket { year: 2020, week: 53 });
    assert_eq!(WeekBucket::from_date(date(2021, 1, 4)), WeekBucket { year: 2021, week: 1 });
    // 2024-12-30 (Monday) already belongs to 2025-W01
    assert_eq!(WeekBucket::from_date(date(2024, 12, 30)), WeekBucket { year: 2025, week: 1 });
  }

  #[test]
  fn test_week_ordering_spans_years() {
    let late = WeekBucket { year: 2023, week: 52 };
    let early = WeekBucket { year: 2024, week: 1 };
    assert!(late < early);
  }

  #[test]
  fn test_start_date_is_monday() {
    let bucket = WeekBucket::from_date(date(2024, 3, 7));
    assert_eq!(bucket.start_date(), Some(date(2024, 3, 4)));
    assert_eq!(bucket.to_string(), "2024-W10");
  }
}
