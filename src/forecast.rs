//! Next-day forecast by ordinary least squares.
//!
//! Each metric is fitted independently over the most recent daily aggregates,
//! using the position in that window as `x`. Calendar gaps between days are
//! not compensated: the forecast is for the step right after the latest day.

use crate::aggregation::DailyAggregates;
use crate::model::Predictions;

/// Maximum number of daily aggregates fed into the regression.
pub const MAX_BASIS_DAYS: usize = 14;

/// Forecast steps and calories for the day after the latest aggregate.
pub fn compute_predictions(daily: &DailyAggregates) -> Predictions {
    let skip = daily.len().saturating_sub(MAX_BASIS_DAYS);
    let window: Vec<_> = daily.values().skip(skip).collect();

    let steps: Vec<f64> = window.iter().map(|t| t.steps as f64).collect();
    let calories: Vec<f64> = window.iter().map(|t| t.calories).collect();

    Predictions {
        steps: project_next(&steps),
        calories: project_next(&calories),
        basis_days: window.len(),
    }
}

/// Fit `y = intercept + slope * x` over `x = 0..n` and evaluate at `x = n`.
///
/// The result is floored at zero and rounded to the nearest integer.
pub fn project_next(values: &[f64]) -> u64 {
    let projected = match values {
        [] => 0.0,
        [only] => *only,
        _ => {
            let (slope, intercept) = least_squares(values);
            intercept + slope * values.len() as f64
        }
    };

    projected.max(0.0).round() as u64
}

/// Return `(slope, intercept)` for the indexed series. A degenerate fit has slope `0`.
fn least_squares(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;

    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    let slope = if denominator == 0.0 {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denominator
    };
    let intercept = (sum_y - slope * sum_x) / n;

    (slope, intercept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DailyTotals;
    use chrono::{Days, NaiveDate};

    fn history(steps: &[u64]) -> DailyAggregates {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        steps
            .iter()
            .enumerate()
            .map(|(i, s)| {
                (
                    start + Days::new(i as u64),
                    DailyTotals {
                        steps: *s,
                        calories: *s as f64 / 20.0,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_no_history() {
        let predictions = compute_predictions(&DailyAggregates::new());

        assert_eq!(predictions.steps, 0);
        assert_eq!(predictions.calories, 0);
        assert_eq!(predictions.basis_days, 0);
    }

    #[test]
    fn test_single_day_is_flat() {
        let predictions = compute_predictions(&history(&[5000]));

        assert_eq!(predictions.steps, 5000);
        assert_eq!(predictions.calories, 250);
        assert_eq!(predictions.basis_days, 1);
    }

    #[test]
    fn test_linear_trend() {
        let predictions = compute_predictions(&history(&[1000, 2000, 3000]));

        assert_eq!(predictions.steps, 4000);
        assert_eq!(predictions.calories, 200);
        assert_eq!(predictions.basis_days, 3);
    }

    #[test]
    fn test_floored_at_zero() {
        let predictions = compute_predictions(&history(&[3000, 1000, 0]));

        assert_eq!(predictions.steps, 0);
    }

    #[test]
    fn test_uses_last_fourteen_days() {
        // Twenty days: six huge outliers first, then a flat run of 14.
        let mut steps = vec![1_000_000; 6];
        steps.extend(std::iter::repeat_n(4000, 14));

        let predictions = compute_predictions(&history(&steps));

        assert_eq!(predictions.basis_days, MAX_BASIS_DAYS);
        assert_eq!(predictions.steps, 4000);
    }

    #[test]
    fn test_gaps_do_not_shift_indices() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut daily = DailyAggregates::new();
        daily.insert(start, DailyTotals { steps: 1000, calories: 0.0 });
        daily.insert(start + Days::new(5), DailyTotals { steps: 2000, calories: 0.0 });

        let predictions = compute_predictions(&daily);

        assert_eq!(predictions.steps, 3000);
    }

    #[test]
    fn test_project_next_rounds() {
        assert_eq!(project_next(&[1.0, 2.0]), 3);
        assert_eq!(project_next(&[0.2, 0.4]), 1);
        assert_eq!(project_next(&[0.4]), 0);
    }
}
