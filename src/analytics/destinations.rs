//! Destination popularity and regional grouping.

use std::collections::HashMap;

use serde::Serialize;

use super::percentage;
use crate::models::Trip;

const UNKNOWN_REGION: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationStat {
    /// Display form of the destination (first spelling seen)
    pub destination: String,
    pub trips: usize,
    pub total_budget: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStat {
    pub region: String,
    pub trips: usize,
    pub total_budget: f64,
    pub percentage: f64,
}

/// Most visited destinations, compared case-insensitively.
///
/// Sorted by trip count, then by name. `limit` caps the number of entries.
pub fn destinations_by_popularity(trips: &[Trip], limit: usize) -> Vec<DestinationStat> {
    let grouped = group(trips, |trip| {
        let name = trip.destination.split_whitespace().collect::<Vec<_>>().join(" ");
        (!name.is_empty()).then_some(name)
    });

    let mut stats: Vec<DestinationStat> = grouped
        .into_iter()
        .map(|g| DestinationStat {
            destination: g.display,
            trips: g.count,
            total_budget: g.budget,
            percentage: percentage(g.count as f64, trips.len() as f64),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.trips
            .cmp(&a.trips)
            .then_with(|| a.destination.to_lowercase().cmp(&b.destination.to_lowercase()))
    });
    stats.truncate(limit);
    stats
}

/// Group trips by the region part of their destination.
///
/// The region is the last comma-separated segment ("Paris, France" → "France").
pub fn trips_by_region(trips: &[Trip]) -> Vec<RegionStat> {
    let grouped = group(trips, |trip| {
        Some(region_of(&trip.destination).unwrap_or(UNKNOWN_REGION).to_string())
    });

    let mut stats: Vec<RegionStat> = grouped
        .into_iter()
        .map(|g| RegionStat {
            region: g.display,
            trips: g.count,
            total_budget: g.budget,
            percentage: percentage(g.count as f64, trips.len() as f64),
        })
        .collect();

    stats.sort_by(|a, b| b.trips.cmp(&a.trips).then_with(|| a.region.cmp(&b.region)));
    stats
}

/// Region part of a free-text destination, if any.
pub fn region_of(destination: &str) -> Option<&str> {
    destination
        .rsplit(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

struct Group {
    display: String,
    count: usize,
    budget: f64,
}

fn group(trips: &[Trip], key: impl Fn(&Trip) -> Option<String>) -> Vec<Group> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Group> = HashMap::new();

    for trip in trips {
        let Some(display) = key(trip) else {
            continue;
        };
        let normalized = display.to_lowercase();
        let entry = groups.entry(normalized.clone()).or_insert_with(|| {
            order.push(normalized);
            Group {
                display,
                count: 0,
                budget: 0.0,
            }
        });
        entry.count += 1;
        entry.budget += trip.budget;
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .collect()
}
