//! Summary composition.
//!
//! The summary is the one object every read surface returns. It is rebuilt
//! from the raw samples on every call and never cached.

use chrono::{DateTime, Utc};

use crate::aggregation::{DailyAggregates, aggregate_daily};
use crate::forecast::compute_predictions;
use crate::insights::compute_insights;
use crate::model::{GoalConfig, Sample, Streak, Summary, TodayProgress};
use crate::streak::compute_streak;

/// Build the full summary for the UTC day containing `now`.
pub fn compose_summary(samples: &[Sample], goals: &GoalConfig, now: DateTime<Utc>) -> Summary {
    let daily = aggregate_daily(samples);
    compose_from_daily(&daily, goals, now)
}

/// Build the summary from already aggregated days.
pub fn compose_from_daily(
    daily: &DailyAggregates,
    goals: &GoalConfig,
    now: DateTime<Utc>,
) -> Summary {
    let today = now.date_naive();
    let totals = daily.get(&today).copied().unwrap_or_default();

    Summary {
        goals: *goals,
        today: TodayProgress {
            steps: totals.steps,
            calories: totals.calories,
            step_goal: goals.steps,
            calorie_goal: goals.calories,
            step_progress: ratio(totals.steps as f64, goals.steps as f64),
            calorie_progress: ratio(totals.calories, goals.calories),
        },
        streak: Streak {
            days: compute_streak(daily, goals, today),
        },
        insights: compute_insights(daily, goals, today),
        predictions: compute_predictions(daily),
    }
}

fn ratio(value: f64, goal: f64) -> f64 {
    if goal > 0.0 { value / goal } else { 0.0 }
}
