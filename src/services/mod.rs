//! Service layer for the trip planner.
//!
//! This module contains the business logic for:
//! - Trips and their children (`TripService`)
//! - User profiles (`UserService`)
//! - The admin dashboard (`AdminService`)
//! - Listing acquisition (`ActivityScraper`)

mod admin;
mod extract;
mod fallback;
mod fetcher;
mod records;
mod scraper;
mod trips;
mod users;
mod validate;

pub use admin::{AdminDashboard, AdminService};
pub use extract::{ExtractContext, ListingExtractor};
pub use fallback::{FALLBACK_SOURCE, placeholder_listings};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use scraper::{AcquisitionPath, ActivityScraper, ScrapeReport, ScrapeSummary, UNKNOWN_CITY};
pub use trips::{TripOverview, TripService};
pub use users::UserService;
