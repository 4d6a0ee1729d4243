//! The tracker owns the sample store and goal configuration.
//!
//! It is the only write path to either. Every mutation holds the state lock
//! across its in-memory change and its durable write, so two mutations never
//! interleave and readers never observe a half-applied write. Reads clone a
//! snapshot under the lock and compute derived payloads outside it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::aggregation::{aggregate_daily, day_records};
use crate::error::{AppError, AppResult};
use crate::model::{
    DayRecord, GoalConfig, GoalUpdate, IngestRequest, IngestResponse, Insights, Predictions,
    Sample, SampleQuery, Summary,
};
use crate::storage::Storage;
use crate::store::{MAX_STEPS, SampleStore, normalize};
use crate::summary::compose_summary;

struct TrackerState {
    store: SampleStore,
    goals: GoalConfig,
}

/// Shared handle to the activity tracker state.
#[derive(Clone)]
pub struct Tracker {
    state: Arc<Mutex<TrackerState>>,
    storage: Storage,
}

impl Tracker {
    /// Restore the tracker from durable storage.
    ///
    /// `default_goals` is used, and persisted, when no goal configuration was saved before.
    pub async fn load(storage: Storage, default_goals: GoalConfig) -> anyhow::Result<Self> {
        let samples = storage.load_samples().await?;
        let goals = match storage.load_goals().await? {
            Some(goals) => goals,
            None => {
                storage.save_goals(&default_goals).await?;
                default_goals
            }
        };

        info!(
            samples = samples.len(),
            step_goal = goals.steps,
            calorie_goal = goals.calories,
            "Tracker state restored"
        );

        Ok(Self {
            state: Arc::new(Mutex::new(TrackerState {
                store: SampleStore::from_samples(samples),
                goals,
            })),
            storage,
        })
    }

    /// Ingest one sample envelope, persisting the whole store before returning.
    pub async fn ingest(&self, request: &IngestRequest) -> AppResult<IngestResponse> {
        let now = Utc::now();
        let sample = normalize(request, now)?;

        let mut state = self.state.lock().await;
        let response = state.store.ingest(sample, now);
        self.storage.save_samples(state.store.samples()).await?;

        debug!(
            id = %response.id,
            status = ?response.status,
            stored = state.store.len(),
            "Sample ingested"
        );
        Ok(response)
    }

    pub async fn query(&self, filter: &SampleQuery) -> Vec<Sample> {
        self.state.lock().await.store.query(filter)
    }

    /// Drop every stored sample and persist the empty store.
    pub async fn reset(&self) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.store.reset();
        self.storage.save_samples(&[]).await?;
        Ok(())
    }

    pub async fn goals(&self) -> GoalConfig {
        self.state.lock().await.goals
    }

    /// Validate and apply a goal update, returning the recomputed summary.
    ///
    /// A rejected update leaves the current goals untouched.
    pub async fn set_goals(&self, update: &GoalUpdate) -> AppResult<Summary> {
        let mut state = self.state.lock().await;
        let goals = apply_goal_update(&state.goals, update)?;

        state.goals = goals;
        self.storage.save_goals(&goals).await?;

        Ok(compose_summary(state.store.samples(), &goals, Utc::now()))
    }

    pub async fn summary(&self) -> Summary {
        let (samples, goals) = self.snapshot().await;
        compose_summary(&samples, &goals, Utc::now())
    }

    pub async fn insights(&self) -> Insights {
        self.summary().await.insights
    }

    pub async fn predictions(&self) -> Predictions {
        self.summary().await.predictions
    }

    /// Daily aggregates across the whole history, oldest first.
    pub async fn daily_history(&self) -> Vec<DayRecord> {
        let (samples, _) = self.snapshot().await;
        day_records(&aggregate_daily(&samples))
    }

    async fn snapshot(&self) -> (Vec<Sample>, GoalConfig) {
        let state = self.state.lock().await;
        (state.store.samples().to_vec(), state.goals)
    }
}

/// Merge an update into the current goals, rejecting non-positive or non-finite values.
///
/// Omitted fields keep their current value. Step goals are rounded to whole steps.
pub fn apply_goal_update(current: &GoalConfig, update: &GoalUpdate) -> AppResult<GoalConfig> {
    let steps = match &update.steps {
        None => current.steps,
        Some(value) => {
            let steps = positive_number(value)
                .map(f64::round)
                .filter(|s| *s >= 1.0)
                .ok_or_else(|| AppError::validation("steps goal must be a positive number"))?;
            if steps >= MAX_STEPS as f64 {
                return Err(AppError::validation("steps goal is too large"));
            }
            steps as u64
        }
    };

    let calories = match &update.calories {
        None => current.calories,
        Some(value) => positive_number(value)
            .ok_or_else(|| AppError::validation("calorie goal must be a positive number"))?,
    };

    Ok(GoalConfig { steps, calories })
}

fn positive_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    number.filter(|n| n.is_finite() && *n > 0.0)
}
