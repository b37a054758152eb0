//! Calendar-month grouping.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::models::{Trip, User};

/// Records created within one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    /// "YYYY-MM"
    pub label: String,
    pub count: usize,
    /// Budget summed over the bucket (0 for user sign-ups)
    pub budget: f64,
}

/// Group trips by the calendar month (UTC) of their creation date.
pub fn trips_by_month(trips: &[Trip]) -> Vec<MonthBucket> {
    bucket_by_month(trips.iter().map(|t| (t.created_at, t.budget)))
}

/// Group user sign-ups by calendar month (UTC).
pub fn users_by_month(users: &[User]) -> Vec<MonthBucket> {
    bucket_by_month(users.iter().map(|u| (u.created_at, 0.0)))
}

fn bucket_by_month(items: impl Iterator<Item = (DateTime<Utc>, f64)>) -> Vec<MonthBucket> {
    let mut buckets: BTreeMap<(i32, u32), (usize, f64)> = BTreeMap::new();
    for (created_at, amount) in items {
        let entry = buckets
            .entry((created_at.year(), created_at.month()))
            .or_default();
        entry.0 += 1;
        entry.1 += amount;
    }

    buckets
        .into_iter()
        .map(|((year, month), (count, budget))| MonthBucket {
            year,
            month,
            label: format!("{year}-{month:02}"),
            count,
            budget,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::models::TripStatus;

    fn trip(id: &str, created: DateTime<Utc>, budget: f64) -> Trip {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Trip {
            id: id.into(),
            user_id: "u1".into(),
            title: id.into(),
            destination: "Oslo, Norway".into(),
            description: None,
            start_date: day,
            end_date: day,
            budget,
            status: TripStatus::Planning,
            image_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_every_trip_lands_in_its_month() {
        let trips = vec![
            trip("a", Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap(), 100.0),
            trip("b", Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap(), 50.0),
            trip("c", Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(), 25.0),
            trip("d", Utc.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap(), 0.0),
        ];

        let buckets = trips_by_month(&trips);
        let labels: Vec<_> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-12", "2025-01", "2025-03"]);

        let total: usize = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, trips.len());

        let march = &buckets[2];
        assert_eq!(march.count, 2);
        assert_eq!(march.budget, 125.0);

        for t in &trips {
            let matching: Vec<_> = buckets
                .iter()
                .filter(|b| b.year == t.created_at.year() && b.month == t.created_at.month())
                .collect();
            assert_eq!(matching.len(), 1);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(trips_by_month(&[]).is_empty());
        assert!(users_by_month(&[]).is_empty());
    }
}
