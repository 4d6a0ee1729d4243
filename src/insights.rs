//! Rolling 7-day insights.
//!
//! The window covers `today - 6` through `today` (UTC). Days without any
//! samples are left out of the window entirely rather than counted as zeros,
//! both for the averages and for the compliance denominator.

use chrono::{Days, NaiveDate};

use crate::aggregation::DailyAggregates;
use crate::model::{DayRecord, GoalConfig, Insights};

/// Length of the rolling window in days, today included.
pub const WINDOW_DAYS: u64 = 7;

/// Compute averages, goal compliance and the best day.
///
/// `best_day` looks at the whole history, not only the window. When several
/// days share the highest step count the earliest one is reported.
pub fn compute_insights(
    daily: &DailyAggregates,
    goal: &GoalConfig,
    today: NaiveDate,
) -> Insights {
    let window_start = today
        .checked_sub_days(Days::new(WINDOW_DAYS - 1))
        .unwrap_or(NaiveDate::MIN);

    let window: Vec<_> = daily.range(window_start..=today).map(|(_, t)| t).collect();

    let (average_steps_7d, average_calories_7d, goal_compliance_rate) = if window.is_empty() {
        (0, 0, 0.0)
    } else {
        let count = window.len() as f64;
        let steps: f64 = window.iter().map(|t| t.steps as f64).sum();
        let calories: f64 = window.iter().map(|t| t.calories).sum();
        let met = window.iter().filter(|t| goal.is_met_by(t)).count() as f64;

        (
            (steps / count).round() as u64,
            (calories / count).round() as u64,
            met / count,
        )
    };

    let best_day = daily
        .iter()
        .fold(None::<DayRecord>, |best, (date, totals)| match best {
            Some(best) if best.steps >= totals.steps => Some(best),
            _ => Some(DayRecord::new(*date, *totals)),
        });

    Insights {
        average_steps_7d,
        average_calories_7d,
        goal_compliance_rate,
        best_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DailyTotals;

    fn goal() -> GoalConfig {
        GoalConfig {
            steps: 8000,
            calories: 400.0,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn days_ago(n: u64) -> NaiveDate {
        today() - Days::new(n)
    }

    fn totals(steps: u64, calories: f64) -> DailyTotals {
        DailyTotals { steps, calories }
    }

    #[test]
    fn test_empty_history() {
        let insights = compute_insights(&DailyAggregates::new(), &goal(), today());

        assert_eq!(insights.average_steps_7d, 0);
        assert_eq!(insights.average_calories_7d, 0);
        assert_eq!(insights.goal_compliance_rate, 0.0);
        assert!(insights.best_day.is_none());
    }

    #[test]
    fn test_averages_skip_missing_days() {
        let mut daily = DailyAggregates::new();
        daily.insert(days_ago(0), totals(9000, 450.0));
        daily.insert(days_ago(3), totals(4000, 201.0));

        let insights = compute_insights(&daily, &goal(), today());

        assert_eq!(insights.average_steps_7d, 6500);
        // 325.5 rounds away from zero
        assert_eq!(insights.average_calories_7d, 326);
        assert_eq!(insights.goal_compliance_rate, 0.5);
    }

    #[test]
    fn test_window_excludes_older_days() {
        let mut daily = DailyAggregates::new();
        daily.insert(days_ago(6), totals(1000, 100.0));
        daily.insert(days_ago(7), totals(50_000, 5000.0));

        let insights = compute_insights(&daily, &goal(), today());

        assert_eq!(insights.average_steps_7d, 1000);
        assert_eq!(insights.goal_compliance_rate, 0.0);
        // Best day still considers the whole history.
        let best = insights.best_day.unwrap();
        assert_eq!(best.date, days_ago(7));
        assert_eq!(best.steps, 50_000);
    }

    #[test]
    fn test_only_old_history_gives_zero_window() {
        let mut daily = DailyAggregates::new();
        daily.insert(days_ago(30), totals(12_000, 600.0));

        let insights = compute_insights(&daily, &goal(), today());

        assert_eq!(insights.average_steps_7d, 0);
        assert_eq!(insights.goal_compliance_rate, 0.0);
        assert!(insights.best_day.is_some());
    }

    #[test]
    fn test_compliance_rate_bounds() {
        let mut daily = DailyAggregates::new();
        for n in 0..7 {
            daily.insert(days_ago(n), totals(10_000, 500.0));
        }

        let insights = compute_insights(&daily, &goal(), today());

        assert_eq!(insights.goal_compliance_rate, 1.0);
    }

    #[test]
    fn test_best_day_tie_prefers_earliest() {
        let mut daily = DailyAggregates::new();
        daily.insert(days_ago(2), totals(7000, 1.0));
        daily.insert(days_ago(1), totals(7000, 2.0));

        let best = compute_insights(&daily, &goal(), today()).best_day.unwrap();

        assert_eq!(best.date, days_ago(2));
    }
}
