use std::time::Duration;

use chrono::{DateTime, Utc};
use log::warn;
use reqwest::header::HeaderMap;

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Quota state reported by GitHub on every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: u64,
    pub reset: DateTime<Utc>,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = header_number(headers, REMAINING_HEADER)?;
        let reset = header_number(headers, RESET_HEADER)?;
        let reset = DateTime::from_timestamp(i64::try_from(reset).ok()?, 0)?;

        Some(Self { remaining, reset })
    }

    /// How long to wait before the next request, if the quota is used up.
    pub fn wait_time(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.remaining > 0 {
            return None;
        }

        Some((self.reset - now).to_std().unwrap_or(Duration::ZERO))
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Sleeps until the quota window resets when the last response used it up.
pub async fn respect_rate_limit(headers: &HeaderMap) {
    let Some(limit) = RateLimit::from_headers(headers) else {
        return;
    };
    let Some(wait) = limit.wait_time(Utc::now()) else {
        return;
    };

    warn!(
        "Rate limit exceeded. Reset time: {}. Sleeping for {:.2} minutes.",
        limit.reset.format("%Y-%m-%d %H:%M:%S"),
        wait.as_secs_f64() / 60.0
    );

    tokio::time::sleep(wait).await;
}
