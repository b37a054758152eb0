//! Admin dashboard assembly.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{
    BudgetBreakdown, DashboardStats, DestinationStat, MonthBucket, RegionStat, StatusShare,
    UserSummary, budget_by_status, dashboard_stats, destinations_by_popularity, trips_by_month,
    trips_by_region, trips_by_status, user_summaries, users_by_month, users_by_status,
};
use crate::error::Result;
use crate::services::{TripService, UserService};
use crate::storage::DocumentStore;

const TOP_DESTINATIONS: usize = 10;

/// Every view of the admin console in one payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub generated_on: NaiveDate,
    pub stats: DashboardStats,
    pub trips_by_month: Vec<MonthBucket>,
    pub users_by_month: Vec<MonthBucket>,
    pub trips_by_status: Vec<StatusShare>,
    pub users_by_status: Vec<StatusShare>,
    pub budget_by_status: BudgetBreakdown,
    pub top_destinations: Vec<DestinationStat>,
    pub regions: Vec<RegionStat>,
    pub users: Vec<UserSummary>,
}

#[derive(Clone)]
pub struct AdminService {
    users: UserService,
    trips: TripService,
}

impl AdminService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: UserService::new(Arc::clone(&store)),
            trips: TripService::new(store),
        }
    }

    /// Load users and trips concurrently and build every dashboard view.
    pub async fn dashboard(&self, today: NaiveDate) -> Result<AdminDashboard> {
        let (users, trips) =
            futures::try_join!(self.users.list_users(), self.trips.list_all_trips())?;

        log::debug!(
            "Building dashboard from {} user(s) and {} trip(s)",
            users.len(),
            trips.len()
        );

        Ok(AdminDashboard {
            generated_on: today,
            stats: dashboard_stats(&users, &trips, today),
            trips_by_month: trips_by_month(&trips),
            users_by_month: users_by_month(&users),
            trips_by_status: trips_by_status(&trips),
            users_by_status: users_by_status(&users),
            budget_by_status: budget_by_status(&trips),
            top_destinations: destinations_by_popularity(&trips, TOP_DESTINATIONS),
            regions: trips_by_region(&trips),
            users: user_summaries(&users, &trips),
        })
    }
}
