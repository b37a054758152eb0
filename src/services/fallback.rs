//! Deterministic placeholder listings, used when no source yields anything.

use sha2::{Digest, Sha256};

use crate::models::{ListingKind, ScrapedActivity};
use crate::utils::short_hash;

pub const FALLBACK_SOURCE: &str = "fallback";

struct Template {
    name: &'static str,
    description: &'static str,
    base_price: u32,
    spread: u32,
    duration: Option<&'static str>,
}

const ACTIVITIES: [Template; 6] = [
    Template {
        name: "{city} Old Town Walking Tour",
        description: "Guided walk through the historic centre and its landmarks.",
        base_price: 15,
        spread: 20,
        duration: Some("3 hours"),
    },
    Template {
        name: "{city} Food Tasting Experience",
        description: "Sample local specialities at markets and family-run eateries.",
        base_price: 45,
        spread: 40,
        duration: Some("4 hours"),
    },
    Template {
        name: "{city} Museum Pass",
        description: "Skip-the-line entry to the main museums and galleries.",
        base_price: 30,
        spread: 35,
        duration: Some("1 day"),
    },
    Template {
        name: "{city} Sunset Cruise",
        description: "Evening boat trip with views over the city.",
        base_price: 35,
        spread: 45,
        duration: Some("2 hours"),
    },
    Template {
        name: "{city} Bike Tour",
        description: "Cycle through parks and neighbourhoods with a local guide.",
        base_price: 25,
        spread: 25,
        duration: Some("3 hours"),
    },
    Template {
        name: "Day Trip from {city}",
        description: "Full-day excursion to the highlights around the city.",
        base_price: 60,
        spread: 60,
        duration: Some("8 hours"),
    },
];

const HOTELS: [Template; 4] = [
    Template {
        name: "{city} Central Hotel",
        description: "Comfortable rooms within walking distance of the centre.",
        base_price: 90,
        spread: 60,
        duration: None,
    },
    Template {
        name: "Grand {city} Palace",
        description: "Upscale stay with spa, restaurant and city views.",
        base_price: 200,
        spread: 150,
        duration: None,
    },
    Template {
        name: "{city} Budget Inn",
        description: "Simple, clean rooms for travellers on a budget.",
        base_price: 40,
        spread: 30,
        duration: None,
    },
    Template {
        name: "{city} Backpackers Hostel",
        description: "Dorms and private rooms with a shared kitchen.",
        base_price: 18,
        spread: 15,
        duration: None,
    },
];

const TRANSPORT: [Template; 3] = [
    Template {
        name: "{city} Airport Transfer",
        description: "Private transfer between the airport and your hotel.",
        base_price: 35,
        spread: 30,
        duration: Some("45 minutes"),
    },
    Template {
        name: "{city} Public Transport Day Pass",
        description: "Unlimited rides on buses, trams and metro for one day.",
        base_price: 8,
        spread: 10,
        duration: Some("1 day"),
    },
    Template {
        name: "{city} Hop-On Hop-Off Bus",
        description: "Sightseeing bus looping past the main attractions.",
        base_price: 25,
        spread: 20,
        duration: Some("1 day"),
    },
];

/// Placeholder listings for `city`. Same city and kind always give the same records.
pub fn placeholder_listings(city: &str, kind: ListingKind) -> Vec<ScrapedActivity> {
    let templates: &[Template] = match kind {
        ListingKind::Activity => &ACTIVITIES,
        ListingKind::Hotel => &HOTELS,
        ListingKind::Transport => &TRANSPORT,
    };

    templates
        .iter()
        .enumerate()
        .map(|(index, template)| {
            let seed = seed_for(city, kind, index);
            let name = template.name.replace("{city}", city);
            let price = template.base_price + (seed % u64::from(template.spread.max(1))) as u32;
            // 4.0 to 4.9
            let rating = 4.0 + ((seed >> 16) % 10) as f32 / 10.0;

            ScrapedActivity {
                id: format!("{FALLBACK_SOURCE}-{}", short_hash(&format!("{}|{name}", kind.as_str()))),
                name,
                description: Some(template.description.to_string()),
                price: Some(f64::from(price)),
                currency: "USD".to_string(),
                image_url: None,
                duration: template.duration.map(str::to_string),
                rating: Some(rating),
                link: None,
                kind,
                source: FALLBACK_SOURCE.to_string(),
                city: city.to_string(),
            }
        })
        .collect()
}

fn seed_for(city: &str, kind: ListingKind, index: usize) -> u64 {
    let key = format!("{}|{}|{index}", city.trim().to_lowercase(), kind.as_str());
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}
