// src/models/mod.rs

//! Domain models for the application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod activity;
mod category;
mod config;
mod itinerary;
mod listing;
pub(crate) mod selectors;
mod trip;
mod user;

// Re-export all public types
pub use activity::{Activity, ActivityPatch, Expense, ExpensePatch, NewActivity, NewExpense};
pub use category::{CategoryStyle, normalize_category};
pub use config::{BackendConfig, CollectionIds, Config, ScraperConfig, ServerConfig, SourceConfig};
pub use itinerary::{ItineraryStop, NewStop, SharePermission, SharedTrip, StopPatch};
pub use listing::{ListingKind, ScrapedActivity};
pub use selectors::SourceSelectors;
pub use trip::{NewTrip, Trip, TripPatch, TripStatus};
pub use user::{NewUser, User, UserPatch, UserRole, UserStatus, is_plausible_email};
