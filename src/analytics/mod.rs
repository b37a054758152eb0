//! Aggregation helpers for dashboards.
//!
//! Every function here is a pure, single pass over already-loaded records.
//! Empty input produces zero-valued summaries; nothing in this module fails.

mod breakdown;
mod dashboard;
mod destinations;
mod monthly;

pub use breakdown::{
    BudgetBreakdown, CategoryTotal, TripCostSummary, activity_breakdown, budget_by_status,
    expense_breakdown, trip_cost_summary,
};
pub use dashboard::{
    DashboardStats, StatusShare, UserSummary, dashboard_stats, trips_by_status, user_summaries,
    users_by_status,
};
pub use destinations::{DestinationStat, RegionStat, destinations_by_popularity, trips_by_region};
pub use monthly::{MonthBucket, trips_by_month, users_by_month};

/// Share of `part` in `whole` as a percentage clamped to `[0, 100]`.
///
/// Returns 0 when `whole` is zero or negative.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 || !whole.is_finite() || !part.is_finite() {
        return 0.0;
    }
    (part / whole * 100.0).clamp(0.0, 100.0)
}

/// Round to two decimals for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
