//! Data models for Stepwise.
//!
//! Two groups of types live here:
//!
//! - **Stored state**: [`Sample`] and [`GoalConfig`], the only things that are
//!   ever persisted.
//! - **Derived payloads**: [`DailyTotals`], [`Insights`], [`Predictions`] and
//!   [`Summary`], recomputed from stored state on every read.
//!
//! Everything crossing the HTTP boundary uses camelCase field names, matching
//! what the mobile collector and the dashboard speak.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Device descriptor used when the collector omits one.
pub const UNKNOWN_DEVICE: &str = "unknown";

/// One motion-sensor observation window as held by the sample store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Server-generated identifier, stable across replacements.
    pub id: Uuid,

    /// Opaque identifier of the originating device.
    pub device_id: String,

    /// Device model reported by the collector.
    pub model: String,

    /// Operating system version reported by the collector.
    pub os_version: String,

    pub steps: u64,

    /// Distance in meters.
    pub distance: f64,

    pub calories: f64,

    /// Start of the observation window.
    pub start: DateTime<Utc>,

    /// End of the observation window. Determines the UTC day a sample counts toward.
    pub end: DateTime<Utc>,

    /// Server-assigned ingestion time.
    pub received_at: DateTime<Utc>,
}

impl Sample {
    /// Whether this sample shares the deduplication key `(deviceId, start, end)`.
    pub fn same_window(&self, other: &NewSample) -> bool {
        self.device_id == other.device_id && self.start == other.start && self.end == other.end
    }
}

/// A normalized sample that has not been assigned an identity yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSample {
    pub device_id: String,
    pub model: String,
    pub os_version: String,
    pub steps: u64,
    pub distance: f64,
    pub calories: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Request body for POST /samples.
///
/// Both halves are loosely typed: the collector runs on platforms with
/// inconsistent sensor APIs, so fields may be missing, null, strings or numbers.
///
/// ```json
/// {
///     "device": { "deviceId": "pixel-7", "model": "Pixel 7", "osVersion": "14" },
///     "sample": { "steps": 1200, "distance": 870.5, "calories": 52,
///                 "start": "2024-03-01T08:00:00Z", "end": "2024-03-01T08:15:00Z" }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub device: Option<Value>,

    #[serde(default)]
    pub sample: Option<Value>,
}

/// Whether an ingest appended a sample or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Created,
    Updated,
}

/// Response for POST /samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestResponse {
    pub status: IngestStatus,
    pub id: Uuid,
}

/// Query parameters for GET /samples.
///
/// Kept as raw strings; unparseable values are ignored rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleQuery {
    /// Drop samples whose `end` is strictly earlier than this timestamp.
    pub since: Option<String>,

    /// Keep only the most recently inserted `limit` samples.
    pub limit: Option<String>,
}

/// The user's daily targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    pub steps: u64,
    pub calories: f64,
}

impl GoalConfig {
    /// Whether a day's totals meet both targets.
    pub fn is_met_by(&self, totals: &DailyTotals) -> bool {
        totals.steps >= self.steps && totals.calories >= self.calories
    }
}

/// Request body for PUT /goals. A missing field keeps its current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalUpdate {
    #[serde(default)]
    pub steps: Option<Value>,

    #[serde(default)]
    pub calories: Option<Value>,
}

/// Totals for one UTC calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub steps: u64,
    pub calories: f64,
}

/// A dated daily aggregate, as reported by GET /daily and `bestDay`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub steps: u64,
    pub calories: f64,
}

impl DayRecord {
    pub fn new(date: NaiveDate, totals: DailyTotals) -> Self {
        Self {
            date,
            steps: totals.steps,
            calories: totals.calories,
        }
    }
}

/// Today's totals measured against the goals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayProgress {
    pub steps: u64,
    pub calories: f64,
    pub step_goal: u64,
    pub calorie_goal: f64,
    pub step_progress: f64,
    pub calorie_progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub days: u32,
}

/// Rolling 7-day insights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub average_steps_7d: u64,
    pub average_calories_7d: u64,

    /// Fraction of recorded days in the window meeting both goals, in `[0, 1]`.
    pub goal_compliance_rate: f64,

    /// Highest-step day across the whole history.
    pub best_day: Option<DayRecord>,
}

/// One-day-ahead forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Predictions {
    pub steps: u64,
    pub calories: u64,

    /// Number of daily aggregates that fed the regression.
    pub basis_days: usize,
}

/// Everything the dashboard shows, recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub goals: GoalConfig,
    pub today: TodayProgress,
    pub streak: Streak,
    pub insights: Insights,
    pub predictions: Predictions,
}
