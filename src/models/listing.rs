//! Normalized listings produced by the scraper.

use serde::{Deserialize, Serialize};

/// Which bucket of the scrape report a listing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Activity,
    Hotel,
    Transport,
}

impl ListingKind {
    pub const ALL: [ListingKind; 3] = [
        ListingKind::Activity,
        ListingKind::Hotel,
        ListingKind::Transport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Activity => "activity",
            ListingKind::Hotel => "hotel",
            ListingKind::Transport => "transport",
        }
    }
}

/// A third-party activity, hotel or transport offer in a common shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedActivity {
    /// Stable id derived from source and name
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Price in `currency`, if the page showed one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Normalized duration text, e.g. "3 hours"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Rating on a 0-5 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    pub kind: ListingKind,

    /// Source name from configuration, or "fallback"
    pub source: String,

    pub city: String,
}

impl ScrapedActivity {
    /// Key used to drop duplicate listings within one kind.
    pub fn dedup_key(&self) -> String {
        self.name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_key_ignores_case_and_spacing() {
        let listing = ScrapedActivity {
            id: "x".into(),
            name: "  Louvre   Museum Tour ".into(),
            description: None,
            price: None,
            currency: "EUR".into(),
            image_url: None,
            duration: None,
            rating: None,
            link: None,
            kind: ListingKind::Activity,
            source: "test".into(),
            city: "Paris".into(),
        };
        assert_eq!(listing.dedup_key(), "louvre museum tour");
    }
}
