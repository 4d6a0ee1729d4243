//! In-memory sample store and ingestion normalization.
//!
//! The store is an ordered, append/replace-only sequence. A sample is
//! identified for deduplication by `(deviceId, start, end)`: re-ingesting the
//! same window replaces the measurements of the stored entry in place instead
//! of appending a duplicate. Nothing is ever removed except by [`SampleStore::reset`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::model::{
    IngestRequest, IngestResponse, IngestStatus, NewSample, Sample, SampleQuery, UNKNOWN_DEVICE,
};

/// Largest step count that fits the storage integer column.
pub const MAX_STEPS: u64 = i64::MAX as u64;

/// Ordered collection of ingested samples, oldest insertion first.
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    samples: Vec<Sample>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a persisted snapshot, keeping its order.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Insert a sample, or replace the measurements of the entry with the same window.
    ///
    /// A replaced entry keeps its id and position; only `steps`, `distance`,
    /// `calories` and `received_at` change.
    pub fn ingest(&mut self, sample: NewSample, now: DateTime<Utc>) -> IngestResponse {
        // Linear scan is fine for a single user's history.
        if let Some(existing) = self.samples.iter_mut().find(|s| s.same_window(&sample)) {
            existing.steps = sample.steps;
            existing.distance = sample.distance;
            existing.calories = sample.calories;
            existing.received_at = now;
            return IngestResponse {
                status: IngestStatus::Updated,
                id: existing.id,
            };
        }

        let id = Uuid::new_v4();
        self.samples.push(Sample {
            id,
            device_id: sample.device_id,
            model: sample.model,
            os_version: sample.os_version,
            steps: sample.steps,
            distance: sample.distance,
            calories: sample.calories,
            start: sample.start,
            end: sample.end,
            received_at: now,
        });

        IngestResponse {
            status: IngestStatus::Created,
            id,
        }
    }

    /// Filter the store without reordering it.
    ///
    /// `since` drops samples ending strictly before it; `limit` then keeps the
    /// last `limit` entries in insertion order. Values that do not parse are ignored.
    pub fn query(&self, filter: &SampleQuery) -> Vec<Sample> {
        let since = filter.since.as_deref().and_then(parse_timestamp_str);
        let limit = filter
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<usize>().ok())
            .filter(|l| *l > 0);

        let mut matching: Vec<Sample> = self
            .samples
            .iter()
            .filter(|s| since.is_none_or(|since| s.end >= since))
            .cloned()
            .collect();

        if let Some(limit) = limit {
            if matching.len() > limit {
                matching.drain(..matching.len() - limit);
            }
        }

        matching
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

/// Turn a loosely-typed ingestion envelope into a [`NewSample`].
///
/// Never fails on bad numbers or timestamps: numeric fields fall back to `0`
/// and timestamps to `now`. The only rejection is a missing sample object.
pub fn normalize(request: &IngestRequest, now: DateTime<Utc>) -> AppResult<NewSample> {
    let sample = match &request.sample {
        Some(Value::Object(sample)) => sample,
        _ => return Err(AppError::validation("request must include a sample object")),
    };

    let device = match &request.device {
        Some(Value::Object(device)) => Some(device),
        _ => None,
    };
    let device_field = |key: &str| {
        device
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_DEVICE)
            .to_string()
    };

    Ok(NewSample {
        device_id: device_field("deviceId"),
        model: device_field("model"),
        os_version: device_field("osVersion"),
        steps: (coerce_number(sample.get("steps")).round() as u64).min(MAX_STEPS),
        distance: coerce_number(sample.get("distance")),
        calories: coerce_number(sample.get("calories")),
        start: coerce_timestamp(sample.get("start"), now),
        end: coerce_timestamp(sample.get("end"), now),
    })
}

/// Read a non-negative finite number, accepting numeric strings. Anything else is `0`.
fn coerce_number(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    number.filter(|n| n.is_finite()).unwrap_or(0.0).max(0.0)
}

fn coerce_timestamp(value: Option<&Value>, now: DateTime<Utc>) -> DateTime<Utc> {
    let parsed = match value {
        Some(Value::String(s)) => parse_timestamp_str(s),
        Some(Value::Number(n)) => n.as_f64().and_then(from_epoch_millis),
        _ => None,
    };

    parsed.unwrap_or(now)
}

/// Parse a timestamp string.
///
/// Accepted, in order: RFC 3339 with an offset, an ISO 8601 date-time without
/// an offset (read as UTC), a bare `YYYY-MM-DD` date (midnight UTC), and a
/// count of epoch milliseconds.
pub fn parse_timestamp_str(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|ts| ts.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|day| day.and_time(NaiveTime::MIN).and_utc())
        })
        .or_else(|| value.parse::<f64>().ok().and_then(from_epoch_millis))
}

fn from_epoch_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis.round() as i64)
}
