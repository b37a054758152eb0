//! Headline numbers and per-user summaries for the admin console.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use super::percentage;
use crate::models::{Trip, TripStatus, User, UserStatus};

/// Count of records in one status with its share of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusShare {
    pub status: String,
    pub count: usize,
    pub percentage: f64,
}

/// One entry per trip status, in lifecycle order.
pub fn trips_by_status(trips: &[Trip]) -> Vec<StatusShare> {
    let mut counts: HashMap<TripStatus, usize> = HashMap::new();
    for trip in trips {
        *counts.entry(trip.status).or_default() += 1;
    }
    TripStatus::ALL
        .iter()
        .map(|s| share(s.as_str(), counts.get(s).copied().unwrap_or(0), trips.len()))
        .collect()
}

/// One entry per user status.
pub fn users_by_status(users: &[User]) -> Vec<StatusShare> {
    let mut counts: HashMap<UserStatus, usize> = HashMap::new();
    for user in users {
        *counts.entry(user.status).or_default() += 1;
    }
    UserStatus::ALL
        .iter()
        .map(|s| share(s.as_str(), counts.get(s).copied().unwrap_or(0), users.len()))
        .collect()
}

fn share(status: &str, count: usize, total: usize) -> StatusShare {
    StatusShare {
        status: status.to_string(),
        count,
        percentage: percentage(count as f64, total as f64),
    }
}

/// A user with counters derived from their trips.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub joined_at: DateTime<Utc>,
    pub total_trips: usize,
    pub total_budget: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_trip_at: Option<DateTime<Utc>>,
}

/// Attach trip counts and budgets to each user, biggest spenders first.
///
/// Trips whose owner is not in `users` are ignored.
pub fn user_summaries(users: &[User], trips: &[Trip]) -> Vec<UserSummary> {
    let mut per_user: HashMap<&str, (usize, f64, Option<DateTime<Utc>>)> = HashMap::new();
    for trip in trips {
        let entry = per_user.entry(trip.user_id.as_str()).or_default();
        entry.0 += 1;
        entry.1 += trip.budget;
        entry.2 = entry.2.max(Some(trip.created_at));
    }

    let mut summaries: Vec<UserSummary> = users
        .iter()
        .map(|user| {
            let (total_trips, total_budget, last_trip_at) =
                per_user.get(user.id.as_str()).copied().unwrap_or_default();
            UserSummary {
                user_id: user.id.clone(),
                name: user.name.clone(),
                email: user.email.clone(),
                status: user.status,
                joined_at: user.created_at,
                total_trips,
                total_budget,
                last_trip_at,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total_budget
            .partial_cmp(&a.total_budget)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.total_trips.cmp(&a.total_trips))
            .then_with(|| a.name.cmp(&b.name))
    });
    summaries
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub active_users: usize,
    pub new_users_this_month: usize,
    pub total_trips: usize,
    /// Upcoming plus ongoing
    pub active_trips: usize,
    pub completed_trips: usize,
    pub trips_this_month: usize,
    pub trips_last_month: usize,
    /// Month-over-month change in trips created, in percent (may be negative)
    pub trip_growth_rate: f64,
    pub total_budget: f64,
    pub average_budget: f64,
}

pub fn dashboard_stats(users: &[User], trips: &[Trip], today: NaiveDate) -> DashboardStats {
    let this_month = (today.year(), today.month());
    let last_month = if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    };
    let month_of = |at: &DateTime<Utc>| (at.year(), at.month());

    let mut stats = DashboardStats {
        total_users: users.len(),
        total_trips: trips.len(),
        ..DashboardStats::default()
    };

    for user in users {
        if user.status == UserStatus::Active {
            stats.active_users += 1;
        }
        if month_of(&user.created_at) == this_month {
            stats.new_users_this_month += 1;
        }
    }

    for trip in trips {
        stats.total_budget += trip.budget;
        if trip.status.is_active() {
            stats.active_trips += 1;
        }
        if trip.status == TripStatus::Completed {
            stats.completed_trips += 1;
        }
        let created = month_of(&trip.created_at);
        if created == this_month {
            stats.trips_this_month += 1;
        } else if created == last_month {
            stats.trips_last_month += 1;
        }
    }

    if !trips.is_empty() {
        stats.average_budget = stats.total_budget / trips.len() as f64;
    }
    stats.trip_growth_rate = growth_rate(stats.trips_this_month, stats.trips_last_month);
    stats
}

fn growth_rate(current: usize, previous: usize) -> f64 {
    match (current, previous) {
        (0, 0) => 0.0,
        (_, 0) => 100.0,
        (c, p) => (c as f64 - p as f64) / p as f64 * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::UserRole;

    fn user(id: &str, status: UserStatus, created: DateTime<Utc>) -> User {
        User {
            id: id.into(),
            name: id.to_uppercase(),
            email: format!("{id}@example.com"),
            phone: None,
            image_id: None,
            status,
            role: UserRole::User,
            created_at: created,
        }
    }

    fn trip(user_id: &str, status: TripStatus, budget: f64, created: DateTime<Utc>) -> Trip {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        Trip {
            id: format!("{user_id}-{budget}"),
            user_id: user_id.into(),
            title: "Trip".into(),
            destination: "Lima, Peru".into(),
            description: None,
            start_date: day,
            end_date: day,
            budget,
            status,
            image_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_input_is_zeroed() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let stats = dashboard_stats(&[], &[], today);
        assert_eq!(stats, DashboardStats::default());

        assert!(trips_by_status(&[]).iter().all(|s| s.count == 0 && s.percentage == 0.0));
        assert!(users_by_status(&[]).iter().all(|s| s.percentage == 0.0));
        assert!(user_summaries(&[], &[]).is_empty());
    }

    #[test]
    fn test_dashboard_stats() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let users = vec![
            user("ana", UserStatus::Active, at(2025, 1, 3)),
            user("ben", UserStatus::Suspended, at(2024, 11, 2)),
        ];
        let trips = vec![
            trip("ana", TripStatus::Upcoming, 1000.0, at(2025, 1, 5)),
            trip("ana", TripStatus::Ongoing, 500.0, at(2025, 1, 6)),
            trip("ben", TripStatus::Completed, 300.0, at(2024, 12, 24)),
            trip("ben", TripStatus::Planning, 200.0, at(2024, 10, 1)),
        ];

        let stats = dashboard_stats(&users, &trips, today);
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.active_users, 1);
        assert_eq!(stats.new_users_this_month, 1);
        assert_eq!(stats.active_trips, 2);
        assert_eq!(stats.completed_trips, 1);
        assert_eq!(stats.trips_this_month, 2);
        assert_eq!(stats.trips_last_month, 1);
        assert_eq!(stats.trip_growth_rate, 100.0);
        assert_eq!(stats.total_budget, 2000.0);
        assert_eq!(stats.average_budget, 500.0);
    }

    #[test]
    fn test_growth_rate() {
        assert_eq!(growth_rate(0, 0), 0.0);
        assert_eq!(growth_rate(3, 0), 100.0);
        assert_eq!(growth_rate(1, 2), -50.0);
        assert_eq!(growth_rate(6, 4), 50.0);
    }

    #[test]
    fn test_status_shares_are_bounded() {
        let trips = vec![
            trip("a", TripStatus::Planning, 1.0, at(2025, 1, 1)),
            trip("a", TripStatus::Planning, 1.0, at(2025, 1, 1)),
            trip("a", TripStatus::Completed, 1.0, at(2025, 1, 1)),
        ];
        let shares = trips_by_status(&trips);
        assert_eq!(shares.len(), 4);
        let sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!(sum <= 100.0 + 1e-9);
        assert!(shares.iter().all(|s| (0.0..=100.0).contains(&s.percentage)));
        assert_eq!(shares[0].status, "planning");
        assert_eq!(shares[0].count, 2);
    }

    #[test]
    fn test_user_summaries() {
        let users = vec![
            user("ana", UserStatus::Active, at(2025, 1, 3)),
            user("ben", UserStatus::Active, at(2025, 1, 4)),
        ];
        let trips = vec![
            trip("ben", TripStatus::Planning, 900.0, at(2025, 2, 1)),
            trip("ben", TripStatus::Planning, 100.0, at(2025, 3, 1)),
            trip("ana", TripStatus::Planning, 50.0, at(2025, 1, 9)),
            trip("ghost", TripStatus::Planning, 10.0, at(2025, 1, 9)),
        ];

        let summaries = user_summaries(&users, &trips);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].user_id, "ben");
        assert_eq!(summaries[0].total_trips, 2);
        assert_eq!(summaries[0].total_budget, 1000.0);
        assert_eq!(summaries[0].last_trip_at, Some(at(2025, 3, 1)));
        assert_eq!(summaries[1].total_budget, 50.0);
    }
}
