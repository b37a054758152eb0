//! Budget and spending breakdowns.

use std::collections::HashMap;

use serde::Serialize;

use super::percentage;
use crate::models::{Activity, CategoryStyle, Expense, Trip, TripStatus, normalize_category};

/// Amount attributed to one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub amount: f64,
    /// Share of the breakdown total, 0-100
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<CategoryStyle>,
}

/// A total split into mutually exclusive categories.
///
/// `total` is the sum of the category amounts, so the categories always
/// partition it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBreakdown {
    pub total: f64,
    pub categories: Vec<CategoryTotal>,
}

impl BudgetBreakdown {
    fn from_totals(mut categories: Vec<CategoryTotal>) -> Self {
        let total: f64 = categories.iter().map(|c| c.amount).sum();
        for category in &mut categories {
            category.percentage = percentage(category.amount, total);
        }
        Self { total, categories }
    }

    pub fn get(&self, key: &str) -> Option<&CategoryTotal> {
        self.categories.iter().find(|c| c.key == key)
    }
}

/// Split the total trip budget by trip status. All four statuses are listed.
pub fn budget_by_status(trips: &[Trip]) -> BudgetBreakdown {
    let mut sums: HashMap<TripStatus, (usize, f64)> = HashMap::new();
    for trip in trips {
        let entry = sums.entry(trip.status).or_default();
        entry.0 += 1;
        entry.1 += trip.budget;
    }

    let categories = TripStatus::ALL
        .iter()
        .map(|status| {
            let (count, amount) = sums.get(status).copied().unwrap_or_default();
            CategoryTotal {
                key: status.as_str().to_string(),
                label: capitalize(status.as_str()),
                count,
                amount,
                percentage: 0.0,
                style: None,
            }
        })
        .collect();

    BudgetBreakdown::from_totals(categories)
}

/// Split expenses by category, largest first.
pub fn expense_breakdown(expenses: &[Expense]) -> BudgetBreakdown {
    by_category(expenses.iter().map(|e| (e.category.as_str(), e.amount)))
}

/// Split planned activity costs by category, largest first.
pub fn activity_breakdown(activities: &[Activity]) -> BudgetBreakdown {
    by_category(activities.iter().map(|a| (a.category.as_str(), a.cost)))
}

fn by_category<'a>(items: impl Iterator<Item = (&'a str, f64)>) -> BudgetBreakdown {
    let mut sums: HashMap<String, (usize, f64)> = HashMap::new();
    for (category, amount) in items {
        let entry = sums.entry(normalize_category(category)).or_default();
        entry.0 += 1;
        entry.1 += amount;
    }

    let mut categories: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(key, (count, amount))| {
            let style = CategoryStyle::lookup(&key);
            CategoryTotal {
                label: capitalize(&key),
                key,
                count,
                amount,
                percentage: 0.0,
                style: Some(style),
            }
        })
        .collect();

    categories.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });

    BudgetBreakdown::from_totals(categories)
}

/// Budget consumption for a single trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCostSummary {
    pub budget: f64,
    pub expenses_total: f64,
    pub activities_total: f64,
    /// Expenses plus planned activity costs
    pub committed: f64,
    /// Negative when over budget
    pub remaining: f64,
    /// Committed share of the budget, clamped to 0-100
    pub percent_used: f64,
    pub over_budget: bool,
}

pub fn trip_cost_summary(
    trip: &Trip,
    activities: &[Activity],
    expenses: &[Expense],
) -> TripCostSummary {
    let expenses_total: f64 = expenses.iter().map(|e| e.amount).sum();
    let activities_total: f64 = activities.iter().map(|a| a.cost).sum();
    let committed = expenses_total + activities_total;

    TripCostSummary {
        budget: trip.budget,
        expenses_total,
        activities_total,
        committed,
        remaining: trip.budget - committed,
        percent_used: if trip.budget > 0.0 {
            percentage(committed, trip.budget)
        } else if committed > 0.0 {
            100.0
        } else {
            0.0
        },
        over_budget: committed > trip.budget,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    fn trip(status: TripStatus, budget: f64) -> Trip {
        Trip {
            id: format!("{}-{}", status.as_str(), budget),
            user_id: "u1".into(),
            title: "Trip".into(),
            destination: "Kyoto, Japan".into(),
            description: None,
            start_date: day(),
            end_date: day(),
            budget,
            status,
            image_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn expense(category: &str, amount: f64) -> Expense {
        Expense {
            id: format!("{category}-{amount}"),
            trip_id: "t1".into(),
            title: "x".into(),
            date: day(),
            category: category.into(),
            amount,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_breakdown_partitions_total() {
        let trips = vec![
            trip(TripStatus::Planning, 1200.5),
            trip(TripStatus::Completed, 300.25),
            trip(TripStatus::Planning, 99.99),
            trip(TripStatus::Ongoing, 0.1),
        ];
        let breakdown = budget_by_status(&trips);

        let raw_total: f64 = trips.iter().map(|t| t.budget).sum();
        let category_sum: f64 = breakdown.categories.iter().map(|c| c.amount).sum();
        assert!((breakdown.total - raw_total).abs() < EPSILON);
        assert!((category_sum - breakdown.total).abs() < EPSILON);

        assert_eq!(breakdown.categories.len(), 4);
        assert_eq!(breakdown.get("planning").unwrap().count, 2);
        assert_eq!(breakdown.get("upcoming").unwrap().amount, 0.0);

        let pct_sum: f64 = breakdown.categories.iter().map(|c| c.percentage).sum();
        assert!(pct_sum <= 100.0 + EPSILON);
        for c in &breakdown.categories {
            assert!((0.0..=100.0).contains(&c.percentage));
        }
    }

    #[test]
    fn test_expense_breakdown_groups_case_insensitively() {
        let expenses = vec![
            expense("Food", 40.0),
            expense(" food", 10.0),
            expense("Hotel", 200.0),
            expense("", 5.0),
        ];
        let breakdown = expense_breakdown(&expenses);

        assert_eq!(breakdown.total, 255.0);
        assert_eq!(breakdown.categories[0].key, "hotel");
        assert_eq!(breakdown.categories[0].style.unwrap().key, "accommodation");
        let food = breakdown.get("food").unwrap();
        assert_eq!(food.count, 2);
        assert_eq!(food.amount, 50.0);
        assert_eq!(breakdown.get("other").unwrap().amount, 5.0);
    }

    #[test]
    fn test_empty_breakdowns_are_zero() {
        let breakdown = expense_breakdown(&[]);
        assert_eq!(breakdown.total, 0.0);
        assert!(breakdown.categories.is_empty());

        let by_status = budget_by_status(&[]);
        assert_eq!(by_status.total, 0.0);
        assert!(by_status.categories.iter().all(|c| c.percentage == 0.0));
    }

    #[test]
    fn test_trip_cost_summary() {
        let t = trip(TripStatus::Ongoing, 500.0);
        let expenses = vec![expense("food", 150.0), expense("transport", 50.0)];
        let summary = trip_cost_summary(&t, &[], &expenses);

        assert_eq!(summary.committed, 200.0);
        assert_eq!(summary.remaining, 300.0);
        assert_eq!(summary.percent_used, 40.0);
        assert!(!summary.over_budget);

        let over = trip_cost_summary(&t, &[], &[expense("hotel", 800.0)]);
        assert!(over.over_budget);
        assert_eq!(over.percent_used, 100.0);
        assert_eq!(over.remaining, -300.0);
    }

    #[test]
    fn test_zero_budget_trip() {
        let t = trip(TripStatus::Planning, 0.0);
        assert_eq!(trip_cost_summary(&t, &[], &[]).percent_used, 0.0);
        assert_eq!(
            trip_cost_summary(&t, &[], &[expense("food", 1.0)]).percent_used,
            100.0
        );
    }
}
