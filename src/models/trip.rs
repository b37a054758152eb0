//! Trip data structures.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Planning,
    Upcoming,
    Ongoing,
    Completed,
}

impl TripStatus {
    pub const ALL: [TripStatus; 4] = [
        TripStatus::Planning,
        TripStatus::Upcoming,
        TripStatus::Ongoing,
        TripStatus::Completed,
    ];

    /// Derive a status from the trip's date range relative to `today`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Self {
        if today < start {
            TripStatus::Upcoming
        } else if today <= end {
            TripStatus::Ongoing
        } else {
            TripStatus::Completed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Planning => "planning",
            TripStatus::Upcoming => "upcoming",
            TripStatus::Ongoing => "ongoing",
            TripStatus::Completed => "completed",
        }
    }

    /// Upcoming and ongoing trips count as active on the dashboard.
    pub fn is_active(&self) -> bool {
        matches!(self, TripStatus::Upcoming | TripStatus::Ongoing)
    }
}

/// A user-owned travel plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,

    /// Owner of the trip
    pub user_id: String,

    pub title: String,

    /// Free-text destination, usually "City, Country"
    pub destination: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    #[serde(default)]
    pub budget: f64,

    pub status: TripStatus,

    /// File id of the cover image in the trip images bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Number of calendar days covered, counting both ends.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Form payload for creating a trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub title: String,
    pub destination: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub budget: f64,
    /// Derived from the dates when omitted
    #[serde(default)]
    pub status: Option<TripStatus>,
    #[serde(default)]
    pub image_id: Option<String>,
}

/// Partial update for a trip. Only present fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TripStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
}
