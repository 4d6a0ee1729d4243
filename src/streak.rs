//! Goal-completion streak.

use chrono::NaiveDate;

use crate::aggregation::DailyAggregates;
use crate::model::GoalConfig;

/// Count consecutive days, ending at and including `today`, that meet both goals.
///
/// The walk stops at the first day that falls short or has no aggregate, so a
/// today that has not reached its goals yet yields `0`.
pub fn compute_streak(daily: &DailyAggregates, goal: &GoalConfig, today: NaiveDate) -> u32 {
    let mut days = 0;
    let mut cursor = Some(today);

    while let Some(day) = cursor {
        match daily.get(&day) {
            Some(totals) if goal.is_met_by(totals) => {
                days += 1;
                cursor = day.pred_opt();
            }
            _ => break,
        }
    }

    days
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
        today() - chrono::Days::new(n)
    }

    fn totals(steps: u64, calories: f64) -> DailyTotals {
        DailyTotals { steps, calories }
    }

    #[test]
    fn test_three_day_streak() {
        let mut daily = DailyAggregates::new();
        daily.insert(days_ago(0), totals(9000, 450.0));
        daily.insert(days_ago(1), totals(9000, 450.0));
        daily.insert(days_ago(2), totals(9000, 450.0));
        daily.insert(days_ago(3), totals(1000, 50.0));

        assert_eq!(compute_streak(&daily, &goal(), today()), 3);
    }

    #[test]
    fn test_today_failing_breaks_streak() {
        let mut daily = DailyAggregates::new();
        daily.insert(days_ago(0), totals(100, 10.0));
        for n in 1..=5 {
            daily.insert(days_ago(n), totals(9000, 450.0));
        }

        assert_eq!(compute_streak(&daily, &goal(), today()), 0);
    }

    #[test]
    fn test_missing_today_breaks_streak() {
        let mut daily = DailyAggregates::new();
        daily.insert(days_ago(1), totals(9000, 450.0));

        assert_eq!(compute_streak(&daily, &goal(), today()), 0);
    }

    #[test]
    fn test_gap_stops_walk() {
        let mut daily = DailyAggregates::new();
        daily.insert(days_ago(0), totals(9000, 450.0));
        daily.insert(days_ago(2), totals(9000, 450.0));

        assert_eq!(compute_streak(&daily, &goal(), today()), 1);
    }

    #[test]
    fn test_steps_alone_do_not_qualify() {
        let mut daily = DailyAggregates::new();
        daily.insert(days_ago(0), totals(20_000, 399.0));

        assert_eq!(compute_streak(&daily, &goal(), today()), 0);
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(compute_streak(&DailyAggregates::new(), &goal(), today()), 0);
    }
}
