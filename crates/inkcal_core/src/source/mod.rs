//! Calendar event sources and parallel fetch.
//!
//! # Responsibility
//! - Define the seam between the layout pipeline and wherever raw hub event
//!   payloads come from.
//! - Fetch every configured calendar on a bounded worker pool with retries.
//!
//! # Invariants
//! - One failing calendar never fails the whole fetch; it degrades to an
//!   empty list and a warning.
//! - The pool never runs more workers than there are sources.

pub mod file;

use crate::calendar::group::DateRange;
use crate::config::FetchConfig;
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub use file::JsonFileSource;

const MAX_FETCH_WORKERS: usize = 8;

/// Errors raised by a single source fetch.
#[derive(Debug)]
pub enum SourceError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    /// The source answered but holds nothing usable for the entity.
    Unavailable { entity_id: String, reason: String },
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "invalid source payload: {err}"),
            Self::Unavailable { entity_id, reason } => {
                write!(f, "source `{entity_id}` unavailable: {reason}")
            }
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Unavailable { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// A provider of raw hub event payloads for one calendar entity.
pub trait CalendarSource: Send + Sync {
    fn entity_id(&self) -> &str;

    /// Returns the raw events overlapping `range`.
    fn fetch(&self, range: DateRange) -> Result<Vec<Value>, SourceError>;
}

/// Exponential backoff policy applied per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_factor: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_factor: config.backoff_factor,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self
            .backoff_factor
            .saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Runs `op` until it succeeds or `policy.max_attempts` is reached.
///
/// `op` receives the 1-based attempt number; `sleep` is called between
/// attempts with the backoff delay.
pub fn retry_with_backoff<T, E, S, F>(policy: &RetryPolicy, mut sleep: S, mut op: F) -> Result<T, E>
where
    S: FnMut(Duration),
    F: FnMut(u32) -> Result<T, E>,
    E: Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => return Err(err),
            Err(err) => {
                let delay = policy.delay_for(attempt);
                debug!(
                    "event=fetch_retry module=source status=retrying attempt={} delay_ms={} error={}",
                    attempt,
                    delay.as_millis(),
                    err
                );
                sleep(delay);
                attempt += 1;
            }
        }
    }
}

fn fetch_one(source: &dyn CalendarSource, range: DateRange, policy: &RetryPolicy) -> Vec<Value> {
    match retry_with_backoff(policy, std::thread::sleep, |_| source.fetch(range)) {
        Ok(events) => events,
        Err(err) => {
            warn!(
                "event=calendar_fetch module=source status=degraded entity={} error={}",
                source.entity_id(),
                err
            );
            Vec::new()
        }
    }
}

/// Fetches every source in parallel, keyed by entity id.
///
/// Sources that keep failing after retries map to an empty list.
pub fn fetch_all(
    sources: &[Box<dyn CalendarSource>],
    range: DateRange,
    config: &FetchConfig,
) -> BTreeMap<String, Vec<Value>> {
    if sources.is_empty() {
        return BTreeMap::new();
    }
    let policy = RetryPolicy::from(config);
    let workers = config
        .max_workers
        .min(MAX_FETCH_WORKERS)
        .clamp(1, sources.len());

    let fetched: Vec<(String, Vec<Value>)> = match ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("inkcal-fetch-{index}"))
        .build()
    {
        Ok(pool) => pool.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    (
                        source.entity_id().to_string(),
                        fetch_one(source.as_ref(), range, &policy),
                    )
                })
                .collect()
        }),
        Err(err) => {
            warn!(
                "event=fetch_pool module=source status=fallback reason=sequential error={}",
                err
            );
            sources
                .iter()
                .map(|source| {
                    (
                        source.entity_id().to_string(),
                        fetch_one(source.as_ref(), range, &policy),
                    )
                })
                .collect()
        }
    };

    let total: usize = fetched.iter().map(|(_, events)| events.len()).sum();
    info!(
        "event=calendars_fetched module=source status=ok sources={} workers={} events={} range={}..{}",
        sources.len(),
        workers,
        total,
        range.start,
        range.end
    );
    fetched.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::{retry_with_backoff, RetryPolicy};
    use std::time::Duration;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            backoff_factor: 2,
            base_delay: Duration::from_secs(1),
        }
    }

    #[test]
    fn backoff_delays_grow_geometrically() {
        let policy = policy();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }

    #[test]
    fn retries_until_success() {
        let mut slept = Vec::new();
        let result: Result<u32, String> = retry_with_backoff(
            &policy(),
            |delay| slept.push(delay),
            |attempt| {
                if attempt < 3 {
                    Err(format!("attempt {attempt} failed"))
                } else {
                    Ok(attempt)
                }
            },
        );
        assert_eq!(result, Ok(3));
        assert_eq!(slept, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: Result<(), String> = retry_with_backoff(
            &policy(),
            |_| {},
            |_| {
                calls += 1;
                Err("down".to_string())
            },
        );
        assert_eq!(result, Err("down".to_string()));
        assert_eq!(calls, 3);
    }
}
