// src/services/extract.rs

//! Listing extraction with ordered selector fallbacks.
//!
//! Each field is tried selector by selector until one yields usable text;
//! the raw text is then cleaned with the regex helpers in `utils::text`.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ListingKind, ScrapedActivity, SourceSelectors};
use crate::utils::text::{
    detect_currency, normalize_whitespace, parse_duration, parse_price, parse_rating,
    truncate_chars,
};
use crate::utils::{resolve_url, short_hash};

const MIN_NAME_CHARS: usize = 3;
const MAX_NAME_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 300;

const IMAGE_ATTRS: [&str; 3] = ["src", "data-src", "data-lazy-src"];
const LABEL_ATTRS: [&str; 2] = ["aria-label", "title"];

/// Where the extracted listings come from.
#[derive(Debug, Clone)]
pub struct ExtractContext<'a> {
    pub source: &'a str,
    pub kind: ListingKind,
    pub city: &'a str,
    /// Page URL, for resolving relative links and images
    pub page_url: &'a str,
    /// Currency assumed when the price label has none
    pub currency: &'a str,
    pub limit: usize,
}

/// Compiled selectors for one source.
pub struct ListingExtractor {
    container: Vec<(String, Selector)>,
    name: Vec<Selector>,
    price: Vec<Selector>,
    image: Vec<Selector>,
    description: Vec<Selector>,
    duration: Vec<Selector>,
    rating: Vec<Selector>,
    link: Vec<Selector>,
}

impl ListingExtractor {
    /// Compile every selector guess. Any invalid selector is an error.
    pub fn compile(selectors: &SourceSelectors) -> Result<Self> {
        let compile_all = |list: &[String]| -> Result<Vec<Selector>> {
            list.iter().map(|s| parse_selector(s)).collect()
        };

        Ok(Self {
            container: selectors
                .container
                .iter()
                .map(|s| parse_selector(s).map(|sel| (s.clone(), sel)))
                .collect::<Result<_>>()?,
            name: compile_all(&selectors.name)?,
            price: compile_all(&selectors.price)?,
            image: compile_all(&selectors.image)?,
            description: compile_all(&selectors.description)?,
            duration: compile_all(&selectors.duration)?,
            rating: compile_all(&selectors.rating)?,
            link: compile_all(&selectors.link)?,
        })
    }

    /// Parse a page and extract listings from it.
    pub fn extract_html(&self, html: &str, ctx: &ExtractContext<'_>) -> Vec<ScrapedActivity> {
        let document = Html::parse_document(html);
        self.extract(&document, ctx)
    }

    /// Extract listings from the first container guess that yields plausible cards.
    pub fn extract(&self, document: &Html, ctx: &ExtractContext<'_>) -> Vec<ScrapedActivity> {
        let base_url = Url::parse(ctx.page_url).ok();

        for (raw, selector) in &self.container {
            let listings: Vec<ScrapedActivity> = document
                .select(selector)
                .filter_map(|card| self.parse_card(card, ctx, base_url.as_ref()))
                .take(ctx.limit)
                .collect();

            if !listings.is_empty() {
                log::debug!(
                    "[{}] container '{}' matched {} listing(s)",
                    ctx.source,
                    raw,
                    listings.len()
                );
                return listings;
            }
        }

        Vec::new()
    }

    fn parse_card(
        &self,
        card: ElementRef<'_>,
        ctx: &ExtractContext<'_>,
        base_url: Option<&Url>,
    ) -> Option<ScrapedActivity> {
        let (name, name_elem) = self.extract_name(card)?;

        let price_text = first_text(card, &self.price);
        let price = price_text.as_deref().and_then(parse_price);
        let currency = price_text
            .as_deref()
            .and_then(detect_currency)
            .unwrap_or(ctx.currency)
            .to_string();

        let description = first_text(card, &self.description)
            .filter(|d| *d != name)
            .map(|d| truncate_chars(&d, MAX_DESCRIPTION_CHARS));

        let duration = first_text(card, &self.duration)
            .as_deref()
            .and_then(parse_duration);

        let rating = self.extract_rating(card);
        let image_url = self.extract_image(card, base_url);
        let link = self.extract_link(card, name_elem, base_url);

        let id_seed = format!("{}|{}|{}", ctx.source, name, link.as_deref().unwrap_or(""));

        Some(ScrapedActivity {
            id: format!("{}-{}", ctx.source, short_hash(&id_seed)),
            name,
            description,
            price,
            currency,
            image_url,
            duration,
            rating,
            link,
            kind: ctx.kind,
            source: ctx.source.to_string(),
            city: ctx.city.to_string(),
        })
    }

    /// Name text (or a label attribute) of the first matching element.
    fn extract_name<'a>(&self, card: ElementRef<'a>) -> Option<(String, ElementRef<'a>)> {
        for selector in &self.name {
            for elem in card.select(selector) {
                let mut text = element_text(elem);
                if text.is_empty() {
                    text = first_attr(elem, &LABEL_ATTRS).unwrap_or_default();
                }
                if is_plausible_name(&text) {
                    return Some((text, elem));
                }
            }
        }
        None
    }

    fn extract_rating(&self, card: ElementRef<'_>) -> Option<f32> {
        for selector in &self.rating {
            for elem in card.select(selector) {
                let from_text = parse_rating(&element_text(elem));
                let rating = from_text.or_else(|| {
                    first_attr(elem, &LABEL_ATTRS).and_then(|label| parse_rating(&label))
                });
                if rating.is_some() {
                    return rating;
                }
            }
        }
        None
    }

    fn extract_image(&self, card: ElementRef<'_>, base_url: Option<&Url>) -> Option<String> {
        for selector in &self.image {
            for elem in card.select(selector) {
                let srcset = elem
                    .value()
                    .attr("srcset")
                    .and_then(|set| set.split(',').next())
                    .and_then(|entry| entry.split_whitespace().next());

                let candidate = IMAGE_ATTRS
                    .iter()
                    .filter_map(|attr| elem.value().attr(attr))
                    .chain(srcset)
                    .map(str::trim)
                    .find(|src| !src.is_empty() && !src.starts_with("data:"));

                if let Some(src) = candidate {
                    return Some(resolve(base_url, src));
                }
            }
        }
        None
    }

    fn extract_link(
        &self,
        card: ElementRef<'_>,
        name_elem: ElementRef<'_>,
        base_url: Option<&Url>,
    ) -> Option<String> {
        let from_selectors = self
            .link
            .iter()
            .flat_map(|selector| card.select(selector))
            .find_map(|elem| elem.value().attr("href"));

        from_selectors
            .or_else(|| name_elem.value().attr("href"))
            .or_else(|| card.value().attr("href"))
            .filter(|href| !href.trim().is_empty() && !href.starts_with('#'))
            .filter(|href| !href.starts_with("javascript:"))
            .map(|href| resolve(base_url, href))
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn resolve(base_url: Option<&Url>, href: &str) -> String {
    match base_url {
        Some(base) => resolve_url(base, href),
        None => href.to_string(),
    }
}

fn element_text(elem: ElementRef<'_>) -> String {
    normalize_whitespace(&elem.text().collect::<String>())
}

/// Normalized text of the first element that has any, trying selectors in order.
fn first_text(card: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|selector| card.select(selector))
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn first_attr(elem: ElementRef<'_>, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|attr| elem.value().attr(attr))
        .map(normalize_whitespace)
        .find(|value| !value.is_empty())
}

fn is_plausible_name(name: &str) -> bool {
    let len = name.chars().count();
    (MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len)
}
