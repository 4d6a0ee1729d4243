//! Daily aggregation of raw samples.
//!
//! Samples are bucketed by the UTC calendar day of their `end` timestamp.
//! Within a day, a device's readings are treated as cumulative re-reads of the
//! same counter: only the reading with the latest `end` counts for that device.
//! Readings from different devices on the same day are added together.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::model::{DailyTotals, DayRecord, Sample};

/// Daily totals keyed by UTC date, iterating oldest first.
pub type DailyAggregates = BTreeMap<NaiveDate, DailyTotals>;

/// Collapse samples into one totals record per UTC day.
///
/// Ties on `end` for the same device and day go to the sample processed last.
pub fn aggregate_daily(samples: &[Sample]) -> DailyAggregates {
    let mut latest: HashMap<(&str, NaiveDate), &Sample> = HashMap::new();

    for sample in samples {
        let key = (sample.device_id.as_str(), sample.end.date_naive());
        let newer = latest
            .get(&key)
            .is_none_or(|current| sample.end >= current.end);
        if newer {
            latest.insert(key, sample);
        }
    }

    let mut daily = DailyAggregates::new();
    for ((_, day), sample) in latest {
        let totals = daily.entry(day).or_default();
        totals.steps = totals.steps.saturating_add(sample.steps);
        totals.calories += sample.calories;
    }

    daily
}

/// Flatten aggregates into dated records, oldest first.
pub fn day_records(daily: &DailyAggregates) -> Vec<DayRecord> {
    daily
        .iter()
        .map(|(date, totals)| DayRecord::new(*date, *totals))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    pub(crate) fn sample(device: &str, end: DateTime<Utc>, steps: u64, calories: f64) -> Sample {
        Sample {
            id: Uuid::new_v4(),
            device_id: device.to_string(),
            model: "test".to_string(),
            os_version: "1".to_string(),
            steps,
            distance: 0.0,
            calories,
            start: end - chrono::Duration::minutes(15),
            end,
            received_at: end,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_empty_samples() {
        assert!(aggregate_daily(&[]).is_empty());
    }

    #[test]
    fn test_devices_are_additive() {
        let samples = vec![
            sample("watch", at(1, 9), 3000, 120.0),
            sample("phone", at(1, 10), 2000, 80.0),
        ];

        let daily = aggregate_daily(&samples);

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[&date(1)].steps, 5000);
        assert_eq!(daily[&date(1)].calories, 200.0);
    }

    #[test]
    fn test_same_device_keeps_latest_reading() {
        let samples = vec![
            sample("watch", at(1, 18), 7000, 300.0),
            sample("watch", at(1, 9), 3000, 120.0),
            sample("watch", at(1, 12), 5000, 200.0),
        ];

        let daily = aggregate_daily(&samples);

        assert_eq!(daily[&date(1)].steps, 7000);
        assert_eq!(daily[&date(1)].calories, 300.0);
    }

    #[test]
    fn test_tie_goes_to_last_processed() {
        let samples = vec![
            sample("watch", at(1, 9), 1000, 10.0),
            sample("watch", at(1, 9), 1500, 15.0),
        ];

        let daily = aggregate_daily(&samples);

        assert_eq!(daily[&date(1)].steps, 1500);
    }

    #[test]
    fn test_days_split_at_utc_midnight() {
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let samples = vec![sample("watch", late, 9000, 400.0), sample("watch", early, 50, 2.0)];

        let daily = aggregate_daily(&samples);

        assert_eq!(daily[&date(1)].steps, 9000);
        assert_eq!(daily[&date(2)].steps, 50);
    }

    #[test]
    fn test_day_records_are_chronological() {
        let samples = vec![
            sample("watch", at(3, 9), 3, 0.0),
            sample("watch", at(1, 9), 1, 0.0),
            sample("watch", at(2, 9), 2, 0.0),
        ];

        let records = day_records(&aggregate_daily(&samples));

        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(1), date(2), date(3)]);
        assert_eq!(records[2].steps, 3);
    }
}
