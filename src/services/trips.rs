//! Trip service.
//!
//! Trips and their children (activities, expenses, itinerary stops and
//! shares) on top of a `DocumentStore`. Inputs are validated here; the store
//! itself accepts any object.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::analytics::{
    BudgetBreakdown, TripCostSummary, activity_breakdown, expense_breakdown, trip_cost_summary,
};
use crate::error::{AppError, Result};
use crate::models::{
    Activity, ActivityPatch, Expense, ExpensePatch, ItineraryStop, NewActivity, NewExpense,
    NewStop, NewTrip, SharePermission, SharedTrip, StopPatch, Trip, TripPatch, TripStatus,
    is_plausible_email,
};
use crate::services::records::Records;
use crate::services::validate;
use crate::storage::{Collection, DocumentStore, Query, to_document};

/// Child collections removed together with their trip.
const TRIP_CHILDREN: [Collection; 4] = [
    Collection::Activities,
    Collection::Expenses,
    Collection::Itinerary,
    Collection::SharedTrips,
];

/// Everything the trip detail page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripOverview {
    pub trip: Trip,
    pub cost: TripCostSummary,
    pub expense_breakdown: BudgetBreakdown,
    pub activity_breakdown: BudgetBreakdown,
    pub itinerary: Vec<ItineraryStop>,
}

#[derive(Clone)]
pub struct TripService {
    records: Records,
}

impl TripService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            records: Records::new(store),
        }
    }

    // ---- trips ----

    /// Create a trip, deriving its status from today's date when none is given.
    pub async fn create_trip(&self, user_id: &str, input: NewTrip) -> Result<Trip> {
        self.create_trip_on(user_id, input, Utc::now().date_naive())
            .await
    }

    /// Same as `create_trip` with an explicit "today".
    pub async fn create_trip_on(
        &self,
        user_id: &str,
        mut input: NewTrip,
        today: NaiveDate,
    ) -> Result<Trip> {
        let user_id = validate::required("user id", user_id)?;
        input.title = validate::required("title", &input.title)?;
        input.destination = validate::required("destination", &input.destination)?;
        input.description = validate::optional(input.description);
        validate::date_range(input.start_date, input.end_date)?;
        validate::amount("budget", input.budget)?;

        let status = input
            .status
            .unwrap_or_else(|| TripStatus::from_dates(input.start_date, input.end_date, today));
        input.status = Some(status);

        let mut document = to_document(&input)?;
        document.insert("userId".into(), Value::String(user_id));

        let trip: Trip = self.records.create(Collection::Trips, document).await?;
        log::info!("Created trip '{}' ({})", trip.title, trip.id);
        Ok(trip)
    }

    pub async fn get_trip(&self, id: &str) -> Result<Trip> {
        self.records.get(Collection::Trips, id).await
    }

    /// A user's trips, newest first.
    pub async fn list_trips(&self, user_id: &str) -> Result<Vec<Trip>> {
        let query = Query::new()
            .equal("userId", user_id)
            .order_desc("createdAt");
        self.records.list(Collection::Trips, &query).await
    }

    /// Every trip, newest first.
    pub async fn list_all_trips(&self) -> Result<Vec<Trip>> {
        let query = Query::new().order_desc("createdAt");
        self.records.list(Collection::Trips, &query).await
    }

    pub async fn update_trip(&self, id: &str, mut patch: TripPatch) -> Result<Trip> {
        let current = self.get_trip(id).await?;

        if let Some(title) = &patch.title {
            patch.title = Some(validate::required("title", title)?);
        }
        if let Some(destination) = &patch.destination {
            patch.destination = Some(validate::required("destination", destination)?);
        }
        if let Some(budget) = patch.budget {
            validate::amount("budget", budget)?;
        }
        validate::date_range(
            patch.start_date.unwrap_or(current.start_date),
            patch.end_date.unwrap_or(current.end_date),
        )?;

        self.records
            .update(Collection::Trips, id, to_document(&patch)?)
            .await
    }

    /// Delete a trip together with its activities, expenses, stops and shares.
    pub async fn delete_trip(&self, id: &str) -> Result<()> {
        let trip = self.get_trip(id).await?;

        let mut removed = 0;
        for collection in TRIP_CHILDREN {
            removed += self.records.delete_where(collection, "tripId", id).await?;
        }
        self.records.delete(Collection::Trips, id).await?;

        log::info!(
            "Deleted trip '{}' ({}) and {} child record(s)",
            trip.title,
            trip.id,
            removed
        );
        Ok(())
    }

    // ---- activities ----

    pub async fn add_activity(&self, trip_id: &str, mut input: NewActivity) -> Result<Activity> {
        self.get_trip(trip_id).await?;
        input.name = validate::required("name", &input.name)?;
        input.category = input.category.trim().to_string();
        input.time = validate::optional(input.time);
        input.location = validate::optional(input.location);
        validate::amount("cost", input.cost)?;

        let mut document = to_document(&input)?;
        document.insert("tripId".into(), Value::String(trip_id.to_string()));
        self.records.create(Collection::Activities, document).await
    }

    /// Activities of a trip, by date.
    pub async fn list_activities(&self, trip_id: &str) -> Result<Vec<Activity>> {
        let query = Query::new().equal("tripId", trip_id).order_asc("date");
        self.records.list(Collection::Activities, &query).await
    }

    pub async fn update_activity(&self, id: &str, mut patch: ActivityPatch) -> Result<Activity> {
        if let Some(name) = &patch.name {
            patch.name = Some(validate::required("name", name)?);
        }
        if let Some(cost) = patch.cost {
            validate::amount("cost", cost)?;
        }
        self.records
            .update(Collection::Activities, id, to_document(&patch)?)
            .await
    }

    pub async fn delete_activity(&self, id: &str) -> Result<()> {
        self.records.delete(Collection::Activities, id).await
    }

    // ---- expenses ----

    pub async fn add_expense(&self, trip_id: &str, mut input: NewExpense) -> Result<Expense> {
        self.get_trip(trip_id).await?;
        input.title = validate::required("title", &input.title)?;
        input.category = input.category.trim().to_string();
        validate::amount("amount", input.amount)?;

        let mut document = to_document(&input)?;
        document.insert("tripId".into(), Value::String(trip_id.to_string()));
        self.records.create(Collection::Expenses, document).await
    }

    /// Expenses of a trip, by date.
    pub async fn list_expenses(&self, trip_id: &str) -> Result<Vec<Expense>> {
        let query = Query::new().equal("tripId", trip_id).order_asc("date");
        self.records.list(Collection::Expenses, &query).await
    }

    pub async fn update_expense(&self, id: &str, mut patch: ExpensePatch) -> Result<Expense> {
        if let Some(title) = &patch.title {
            patch.title = Some(validate::required("title", title)?);
        }
        if let Some(amount) = patch.amount {
            validate::amount("amount", amount)?;
        }
        self.records
            .update(Collection::Expenses, id, to_document(&patch)?)
            .await
    }

    pub async fn delete_expense(&self, id: &str) -> Result<()> {
        self.records.delete(Collection::Expenses, id).await
    }

    // ---- itinerary ----

    /// Append a stop after the trip's current last stop.
    pub async fn add_stop(&self, trip_id: &str, mut input: NewStop) -> Result<ItineraryStop> {
        self.get_trip(trip_id).await?;
        input.destination = validate::required("destination", &input.destination)?;
        input.notes = validate::optional(input.notes);
        validate::date_range(input.start_date, input.end_date)?;
        validate::amount("budget", input.budget)?;

        let next_index = self
            .list_itinerary(trip_id)
            .await?
            .iter()
            .map(|stop| stop.order_index + 1)
            .max()
            .unwrap_or(0);

        let mut document = to_document(&input)?;
        document.insert("tripId".into(), Value::String(trip_id.to_string()));
        document.insert("orderIndex".into(), json!(next_index));
        self.records.create(Collection::Itinerary, document).await
    }

    /// Stops of a trip, in travel order.
    pub async fn list_itinerary(&self, trip_id: &str) -> Result<Vec<ItineraryStop>> {
        let query = Query::new()
            .equal("tripId", trip_id)
            .order_asc("orderIndex");
        self.records.list(Collection::Itinerary, &query).await
    }

    pub async fn update_stop(&self, id: &str, mut patch: StopPatch) -> Result<ItineraryStop> {
        let current: ItineraryStop = self.records.get(Collection::Itinerary, id).await?;

        if let Some(destination) = &patch.destination {
            patch.destination = Some(validate::required("destination", destination)?);
        }
        if let Some(budget) = patch.budget {
            validate::amount("budget", budget)?;
        }
        validate::date_range(
            patch.start_date.unwrap_or(current.start_date),
            patch.end_date.unwrap_or(current.end_date),
        )?;

        self.records
            .update(Collection::Itinerary, id, to_document(&patch)?)
            .await
    }

    pub async fn delete_stop(&self, id: &str) -> Result<()> {
        self.records.delete(Collection::Itinerary, id).await
    }

    /// Rewrite `order_index` to follow `ordered_ids`, which must list every
    /// stop of the trip exactly once.
    pub async fn reorder_itinerary(
        &self,
        trip_id: &str,
        ordered_ids: &[String],
    ) -> Result<Vec<ItineraryStop>> {
        let stops = self.list_itinerary(trip_id).await?;

        let known: HashSet<&str> = stops.iter().map(|s| s.id.as_str()).collect();
        let requested: HashSet<&str> = ordered_ids.iter().map(String::as_str).collect();
        if requested.len() != ordered_ids.len() || requested != known {
            return Err(AppError::validation(format!(
                "reorder must list each of the {} stop(s) of trip {} exactly once",
                stops.len(),
                trip_id
            )));
        }

        for (index, id) in ordered_ids.iter().enumerate() {
            let index = index as u32;
            let unchanged = stops
                .iter()
                .any(|s| s.id == *id && s.order_index == index);
            if unchanged {
                continue;
            }
            let patch = to_document(&json!({ "orderIndex": index }))?;
            let _: ItineraryStop = self
                .records
                .update(Collection::Itinerary, id, patch)
                .await?;
        }

        self.list_itinerary(trip_id).await
    }

    // ---- sharing ----

    /// Share a trip with someone by email.
    pub async fn share_trip(
        &self,
        trip_id: &str,
        owner_id: &str,
        email: &str,
        permission: SharePermission,
    ) -> Result<SharedTrip> {
        self.get_trip(trip_id).await?;
        let owner_id = validate::required("owner id", owner_id)?;
        let email = email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(AppError::validation(format!("invalid email '{email}'")));
        }

        let already_shared = self
            .list_shares(trip_id)
            .await?
            .iter()
            .any(|share| share.shared_with.eq_ignore_ascii_case(&email));
        if already_shared {
            return Err(AppError::validation(format!(
                "trip {trip_id} is already shared with {email}"
            )));
        }

        let document = to_document(&json!({
            "tripId": trip_id,
            "ownerId": owner_id,
            "sharedWith": email,
            "permission": permission,
        }))?;
        self.records.create(Collection::SharedTrips, document).await
    }

    pub async fn list_shares(&self, trip_id: &str) -> Result<Vec<SharedTrip>> {
        let query = Query::new()
            .equal("tripId", trip_id)
            .order_asc("createdAt");
        self.records.list(Collection::SharedTrips, &query).await
    }

    pub async fn revoke_share(&self, id: &str) -> Result<()> {
        self.records.delete(Collection::SharedTrips, id).await
    }

    // ---- overview ----

    /// Trip with its cost summary, breakdowns and itinerary.
    pub async fn trip_overview(&self, trip_id: &str) -> Result<TripOverview> {
        let trip = self.get_trip(trip_id).await?;
        let (activities, expenses, itinerary) = futures::try_join!(
            self.list_activities(trip_id),
            self.list_expenses(trip_id),
            self.list_itinerary(trip_id),
        )?;

        Ok(TripOverview {
            cost: trip_cost_summary(&trip, &activities, &expenses),
            expense_breakdown: expense_breakdown(&expenses),
            activity_breakdown: activity_breakdown(&activities),
            itinerary,
            trip,
        })
    }
}
