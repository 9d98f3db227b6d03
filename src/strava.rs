//! Strava activity source
//!
//! Pages through `/athlete/activities` with an already-valid access token,
//! staying inside Strava's request budget.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;

use crate::config::AppConfig;
use crate::models::RawActivity;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const RATE_WINDOW_SECONDS: i64 = 900;
const DEFAULT_RETRY_AFTER_SECONDS: u64 = 60;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StravaError {
  #[error("Invalid API base URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Strava API error ({status}): {body}")]
  Api { status: u16, body: String },

  #[error("Unexpected response payload: {0}")]
  Payload(String),

  #[error("Not authenticated with Strava")]
  NotAuthenticated,
}

/// ---------------------------------------------------------------------------
/// Rate Limiting
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
  Proceed,
  /// Window budget spent; wait this long, then start a new window
  Wait(StdDuration),
  /// Daily budget spent; stop fetching
  DailyLimitReached,
}

/// Client-side request budget: a rolling 15-minute window plus a UTC day.
///
/// Time is passed in so the budget logic stays independent of the clock.
#[derive(Debug, Clone)]
pub struct RateLimiter {
  window_limit: u32,
  daily_limit: u32,
  window_start: DateTime<Utc>,
  requests_in_window: u32,
  day: NaiveDate,
  daily_requests: u32,
}

impl RateLimiter {
  pub fn new(window_limit: u32, daily_limit: u32, now: DateTime<Utc>) -> Self {
    Self {
      window_limit,
      daily_limit,
      window_start: now,
      requests_in_window: 0,
      day: now.date_naive(),
      daily_requests: 0,
    }
  }

  pub fn check(&mut self, now: DateTime<Utc>) -> RateDecision {
    let window = Duration::seconds(RATE_WINDOW_SECONDS);
    let elapsed = now - self.window_start;

    if elapsed > window {
      self.start_window(now);
    }
    if now.date_naive() > self.day {
      self.day = now.date_naive();
      self.daily_requests = 0;
    }

    if self.daily_requests >= self.daily_limit {
      return RateDecision::DailyLimitReached;
    }
    if self.requests_in_window >= self.window_limit {
      let remaining = (window - elapsed).to_std().unwrap_or(StdDuration::ZERO);
      return RateDecision::Wait(remaining);
    }
    RateDecision::Proceed
  }

  pub fn record(&mut self) {
    self.requests_in_window += 1;
    self.daily_requests += 1;
  }

  pub fn start_window(&mut self, now: DateTime<Utc>) {
    self.window_start = now;
    self.requests_in_window = 0;
  }

  pub fn daily_requests(&self) -> u32 {
    self.daily_requests
  }
}

/// ---------------------------------------------------------------------------
/// Strava API - Activity Fetching
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchedActivities {
  pub activities: Vec<RawActivity>,
  pub requests: u32,
  /// Records on a page that did not deserialize
  pub skipped: usize,
  /// Stopped early because the daily request budget ran out
  pub hit_daily_limit: bool,
}

pub struct StravaClient {
  http: Client,
  activities_url: Url,
  per_page: u32,
  limiter: RateLimiter,
}

impl StravaClient {
  pub fn new(api_base: &str, per_page: u32, limiter: RateLimiter) -> Result<Self, StravaError> {
    let base = api_base.trim_end_matches('/');
    let activities_url = Url::parse(&format!("{}/athlete/activities", base))?;

    Ok(Self {
      http: Client::new(),
      activities_url,
      per_page,
      limiter,
    })
  }

  pub fn from_config(config: &AppConfig) -> Result<Self, StravaError> {
    let limiter = RateLimiter::new(config.window_limit, config.daily_limit, Utc::now());
    Self::new(&config.api_base, config.per_page, limiter)
  }

  /// Page through the athlete's activities until an empty page.
  ///
  /// Window limits and 429 responses are waited out; the daily limit ends the
  /// run with whatever was fetched so far.
  pub async fn fetch_all_activities(&mut self, access_token: &str) -> Result<FetchedActivities, StravaError> {
    let mut fetched = FetchedActivities::default();
    let mut page = 1u32;

    loop {
      match self.limiter.check(Utc::now()) {
        RateDecision::Proceed => {}
        RateDecision::Wait(wait) => {
          tracing::warn!(wait_secs = wait.as_secs(), "Request window exhausted, waiting");
          tokio::time::sleep(wait).await;
          self.limiter.start_window(Utc::now());
        }
        RateDecision::DailyLimitReached => {
          tracing::warn!(
            requests = self.limiter.daily_requests(),
            fetched = fetched.activities.len(),
            "Daily request limit reached, stopping"
          );
          fetched.hit_daily_limit = true;
          break;
        }
      }

      let response = self.request_page(access_token, page).await?;
      self.limiter.record();
      fetched.requests += 1;

      let status = response.status();
      if status == StatusCode::TOO_MANY_REQUESTS {
        let wait = retry_after(&response);
        tracing::warn!(page, wait_secs = wait.as_secs(), "Rate limited by Strava, retrying page");
        tokio::time::sleep(wait).await;
        continue;
      }
      if status == StatusCode::UNAUTHORIZED {
        return Err(StravaError::NotAuthenticated);
      }
      if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StravaError::Api {
          status: status.as_u16(),
          body,
        });
      }

      let records: Vec<serde_json::Value> = response
        .json()
        .await
        .map_err(|e| StravaError::Payload(e.to_string()))?;
      if records.is_empty() {
        break;
      }

      tracing::debug!(page, count = records.len(), "Fetched activity page");
      for record in records {
        match serde_json::from_value::<RawActivity>(record) {
          Ok(activity) => fetched.activities.push(activity),
          Err(e) => {
            fetched.skipped += 1;
            tracing::warn!(page, error = %e, "Skipping undecodable activity");
          }
        }
      }
      page += 1;
    }

    tracing::info!(
      activities = fetched.activities.len(),
      requests = fetched.requests,
      skipped = fetched.skipped,
      "Activity fetch finished"
    );
    Ok(fetched)
  }

  async fn request_page(&self, access_token: &str, page: u32) -> Result<reqwest::Response, StravaError> {
    let mut url = self.activities_url.clone();
    url
      .query_pairs_mut()
      .append_pair("page", &page.to_string())
      .append_pair("per_page", &self.per_page.to_string());

    let response = self
      .http
      .get(url)
      .header("Authorization", format!("Bearer {}", access_token))
      .send()
      .await?;
    Ok(response)
  }
}

fn retry_after(response: &reqwest::Response) -> StdDuration {
  let seconds = response
    .headers()
    .get(reqwest::header::RETRY_AFTER)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.trim().parse::<u64>().ok())
    .unwrap_or(DEFAULT_RETRY_AFTER_SECONDS);
  StdDuration::from_secs(seconds)
}
