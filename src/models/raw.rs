use serde::{Deserialize, Serialize};

/// Activity summary as returned by the Strava activities endpoint.
///
/// Every field is optional so the normalizer can tell a missing key from a
/// reported zero. Units are the source's: meters, seconds, m/s.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawActivity {
  #[serde(default)]
  pub id: Option<i64>,
  #[serde(default)]
  pub athlete: Option<AthleteRef>,
  #[serde(default)]
  pub name: Option<String>,
  /// Strava uses "type" for the broad sport and "sport_type" for the sub-type
  #[serde(rename = "type", default)]
  pub sport: Option<String>,
  #[serde(default)]
  pub sport_type: Option<String>,
  #[serde(default)]
  pub start_date_local: Option<String>,
  #[serde(default)]
  pub distance: Option<f64>,
  #[serde(default)]
  pub moving_time: Option<f64>,
  #[serde(default)]
  pub elapsed_time: Option<f64>,
  #[serde(default)]
  pub total_elevation_gain: Option<f64>,
  #[serde(default)]
  pub average_speed: Option<f64>,
  #[serde(default)]
  pub max_speed: Option<f64>,
  #[serde(default)]
  pub average_heartrate: Option<f64>,
  #[serde(default)]
  pub max_heartrate: Option<f64>,
  #[serde(default)]
  pub elev_high: Option<f64>,
  #[serde(default)]
  pub elev_low: Option<f64>,
  #[serde(default)]
  pub average_temp: Option<f64>,
  #[serde(default)]
  pub workout_type: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AthleteRef {
  #[serde(default)]
  pub id: Option<i64>,
}
