// src/models/selectors.rs

//! Ordered CSS selector guesses for scraping a listing page.

use serde::{Deserialize, Serialize};

/// CSS selectors for scraping a listing page.
///
/// Every field is an ordered list of guesses: the first selector that yields
/// something usable wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSelectors {
    /// Selectors for each card/item on the results page
    pub container: Vec<String>,

    /// Selectors for the listing name within a card
    pub name: Vec<String>,

    #[serde(default)]
    pub price: Vec<String>,

    #[serde(default)]
    pub image: Vec<String>,

    #[serde(default)]
    pub description: Vec<String>,

    #[serde(default)]
    pub duration: Vec<String>,

    #[serde(default)]
    pub rating: Vec<String>,

    /// Selectors for the detail link (falls back to the name element)
    #[serde(default)]
    pub link: Vec<String>,
}

impl Default for SourceSelectors {
    fn default() -> Self {
        Self::generic()
    }
}

impl SourceSelectors {
    /// Generic selectors that match most card-based listing pages.
    pub fn generic() -> Self {
        Self {
            container: strings(&[
                "[data-testid*='card']",
                "article",
                "li[class*='result']",
                "div[class*='card']",
                "div[class*='listing']",
                "div[class*='item']",
            ]),
            name: strings(&[
                "h2",
                "h3",
                "[class*='title']",
                "[class*='name']",
                "a[title]",
            ]),
            price: strings(&["[class*='price']", "[data-testid*='price']", "[class*='amount']"]),
            image: strings(&["img"]),
            description: strings(&["p", "[class*='description']", "[class*='summary']"]),
            duration: strings(&["[class*='duration']", "[class*='time']"]),
            rating: strings(&["[class*='rating']", "[class*='score']", "[aria-label*='rating']"]),
            link: strings(&["a[href]"]),
        }
    }

    /// Append `other`'s guesses after this set's, skipping duplicates.
    pub fn extended_with(&self, other: &SourceSelectors) -> Self {
        Self {
            container: merge(&self.container, &other.container),
            name: merge(&self.name, &other.name),
            price: merge(&self.price, &other.price),
            image: merge(&self.image, &other.image),
            description: merge(&self.description, &other.description),
            duration: merge(&self.duration, &other.duration),
            rating: merge(&self.rating, &other.rating),
            link: merge(&self.link, &other.link),
        }
    }

    /// Iterate every selector string in this set.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.container
            .iter()
            .chain(&self.name)
            .chain(&self.price)
            .chain(&self.image)
            .chain(&self.description)
            .chain(&self.duration)
            .chain(&self.rating)
            .chain(&self.link)
            .map(String::as_str)
    }
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn merge(first: &[String], second: &[String]) -> Vec<String> {
    let mut merged = first.to_vec();
    for s in second {
        if !merged.contains(s) {
            merged.push(s.clone());
        }
    }
    merged
}
