// src/services/scraper.rs

//! Activity, hotel and transport scraper.
//!
//! For each listing kind the scraper walks the configured sources with the
//! lightweight fetcher, retries empty kinds with the rendered fetcher and a
//! widened selector set, and finally substitutes placeholder listings. It
//! never returns an error: failures are counted and logged.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::analytics::round2;
use crate::error::Result;
use crate::models::{Config, ListingKind, ScrapedActivity, SourceConfig, SourceSelectors};
use crate::services::extract::{ExtractContext, ListingExtractor};
use crate::services::fallback::placeholder_listings;
use crate::services::fetcher::{HttpFetcher, PageFetcher};

/// City used when the caller passes an empty one.
pub const UNKNOWN_CITY: &str = "Unknown";

/// How a kind's listings were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionPath {
    Live,
    Rendered,
    Fallback,
}

/// Counters for one scrape run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeSummary {
    pub total_activities: usize,
    pub total_hotels: usize,
    pub total_transport: usize,
    /// Mean over listings that have a price, 0 when none do
    pub average_price: f64,
    pub elapsed_ms: u64,
    /// Source fetches attempted across both paths
    pub attempts: usize,
    pub failures: usize,
    pub paths: BTreeMap<ListingKind, AcquisitionPath>,
}

/// Categorized listings for one city.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeReport {
    pub city: String,
    pub activities: Vec<ScrapedActivity>,
    pub hotels: Vec<ScrapedActivity>,
    pub transport: Vec<ScrapedActivity>,
    pub summary: ScrapeSummary,
}

impl ScrapeReport {
    pub fn listings(&self, kind: ListingKind) -> &[ScrapedActivity] {
        match kind {
            ListingKind::Activity => &self.activities,
            ListingKind::Hotel => &self.hotels,
            ListingKind::Transport => &self.transport,
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &ScrapedActivity> {
        self.activities
            .iter()
            .chain(&self.hotels)
            .chain(&self.transport)
    }

    pub fn path(&self, kind: ListingKind) -> AcquisitionPath {
        self.summary
            .paths
            .get(&kind)
            .copied()
            .unwrap_or(AcquisitionPath::Fallback)
    }
}

#[derive(Debug, Default)]
struct RunState {
    attempts: usize,
    failures: usize,
}

impl RunState {
    /// Wait between attempts, never before the first one.
    async fn pace(&self, delay: Duration) {
        if self.attempts > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Scrapes third-party listing pages for a city.
pub struct ActivityScraper {
    config: Arc<Config>,
    fetcher: Arc<dyn PageFetcher>,
    rendered: Option<Arc<dyn PageFetcher>>,
}

impl ActivityScraper {
    /// Build a scraper with HTTP fetchers from the scraper configuration.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::lightweight(&config.scraper)?);
        let rendered: Option<Arc<dyn PageFetcher>> = if config.scraper.rendered_fallback {
            Some(Arc::new(HttpFetcher::browser(&config.scraper)?))
        } else {
            None
        };
        Ok(Self::with_fetchers(config, fetcher, rendered))
    }

    pub fn with_fetchers(
        config: Arc<Config>,
        fetcher: Arc<dyn PageFetcher>,
        rendered: Option<Arc<dyn PageFetcher>>,
    ) -> Self {
        Self {
            config,
            fetcher,
            rendered,
        }
    }

    /// Scrape every listing kind for `city`. Always returns a report.
    pub async fn scrape_city(&self, city: &str) -> ScrapeReport {
        let started = Instant::now();
        let mut run = RunState::default();
        let mut paths = BTreeMap::new();
        let mut by_kind = BTreeMap::new();

        let trimmed = city.trim();
        let city = if trimmed.is_empty() {
            log::warn!("Empty city, returning placeholder listings");
            UNKNOWN_CITY
        } else {
            trimmed
        };

        for kind in ListingKind::ALL {
            let (listings, path) = if trimmed.is_empty() {
                (placeholder_listings(city, kind), AcquisitionPath::Fallback)
            } else {
                self.scrape_kind(city, kind, &mut run).await
            };
            log::info!(
                "[{}] {} {} listing(s) via {:?}",
                city,
                listings.len(),
                kind.as_str(),
                path
            );
            paths.insert(kind, path);
            by_kind.insert(kind, listings);
        }

        let mut take = |kind: ListingKind| by_kind.remove(&kind).unwrap_or_default();
        let activities = take(ListingKind::Activity);
        let hotels = take(ListingKind::Hotel);
        let transport = take(ListingKind::Transport);

        let prices: Vec<f64> = activities
            .iter()
            .chain(&hotels)
            .chain(&transport)
            .filter_map(|l| l.price)
            .collect();
        let average_price = if prices.is_empty() {
            0.0
        } else {
            round2(prices.iter().sum::<f64>() / prices.len() as f64)
        };

        let summary = ScrapeSummary {
            total_activities: activities.len(),
            total_hotels: hotels.len(),
            total_transport: transport.len(),
            average_price,
            elapsed_ms: started.elapsed().as_millis() as u64,
            attempts: run.attempts,
            failures: run.failures,
            paths,
        };

        ScrapeReport {
            city: city.to_string(),
            activities,
            hotels,
            transport,
            summary,
        }
    }

    async fn scrape_kind(
        &self,
        city: &str,
        kind: ListingKind,
        run: &mut RunState,
    ) -> (Vec<ScrapedActivity>, AcquisitionPath) {
        let live = self
            .run_pass(self.fetcher.as_ref(), city, kind, false, run)
            .await;
        if !live.is_empty() {
            return (live, AcquisitionPath::Live);
        }

        if let Some(rendered) = &self.rendered {
            log::info!(
                "[{}] no {} listings from lightweight pass, trying {}",
                city,
                kind.as_str(),
                rendered.name()
            );
            let listings = self.run_pass(rendered.as_ref(), city, kind, true, run).await;
            if !listings.is_empty() {
                return (listings, AcquisitionPath::Rendered);
            }
        }

        log::warn!(
            "[{}] no {} listings scraped, using placeholders",
            city,
            kind.as_str()
        );
        (placeholder_listings(city, kind), AcquisitionPath::Fallback)
    }

    /// Fetch every source of one kind in order, deduplicating by name.
    async fn run_pass(
        &self,
        fetcher: &dyn PageFetcher,
        city: &str,
        kind: ListingKind,
        widen_selectors: bool,
        run: &mut RunState,
    ) -> Vec<ScrapedActivity> {
        let delay = Duration::from_millis(self.config.scraper.request_delay_ms);
        let mut seen = HashSet::new();
        let mut listings = Vec::new();

        for source in self.config.sources_for(kind) {
            run.pace(delay).await;
            run.attempts += 1;

            match self
                .scrape_source(fetcher, source, city, widen_selectors)
                .await
            {
                Ok(found) => {
                    for listing in found {
                        if seen.insert(listing.dedup_key()) {
                            listings.push(listing);
                        }
                    }
                }
                Err(error) => {
                    run.failures += 1;
                    log::warn!(
                        "[{}] source {} failed for {}: {}",
                        fetcher.name(),
                        source.name,
                        city,
                        error
                    );
                }
            }
        }

        listings
    }

    async fn scrape_source(
        &self,
        fetcher: &dyn PageFetcher,
        source: &SourceConfig,
        city: &str,
        widen_selectors: bool,
    ) -> Result<Vec<ScrapedActivity>> {
        let selectors = if widen_selectors {
            source.selectors.extended_with(&SourceSelectors::generic())
        } else {
            source.selectors.clone()
        };
        let extractor = ListingExtractor::compile(&selectors)?;

        let url = source.search_url(city);
        let html = fetcher.fetch(&url).await?;

        let ctx = ExtractContext {
            source: &source.name,
            kind: source.kind,
            city,
            page_url: &url,
            currency: &source.currency,
            limit: self.config.scraper.max_results_per_source,
        };
        let listings = extractor.extract_html(&html, &ctx);
        log::debug!(
            "[{}] {} -> {} listing(s)",
            fetcher.name(),
            url,
            listings.len()
        );
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::selectors::strings;

    const TOURS_PAGE: &str = r#"
        <ul>
          <li class="tour"><h3>Colosseum Underground</h3><span class="cost">€65</span></li>
          <li class="tour"><h3>Vatican Museums</h3><span class="cost">€40</span></li>
        </ul>
    "#;

    const MORE_TOURS_PAGE: &str = r#"
        <ul>
          <li class="tour"><h3>colosseum   underground</h3><span class="cost">€70</span></li>
          <li class="tour"><h3>Trastevere Food Walk</h3><span class="cost">€55</span></li>
        </ul>
    "#;

    /// Only matches the generic selectors.
    const HOTEL_PAGE: &str = r#"
        <article><h2>Hotel Artemide</h2><div class="price-box">$210</div></article>
    "#;

    /// Serves fixed pages by URL and records every request.
    struct StubFetcher {
        name: &'static str,
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(name: &'static str, pages: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                name,
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::scrape(self.name, format!("no page for {url}")))
        }
    }

    fn source(name: &str, kind: ListingKind) -> SourceConfig {
        SourceConfig {
            name: name.to_string(),
            kind,
            url: format!("https://{name}.test/search?q={{city}}"),
            currency: "USD".to_string(),
            selectors: SourceSelectors {
                container: strings(&["li.tour"]),
                name: strings(&["h3"]),
                price: strings(&[".cost"]),
                image: Vec::new(),
                description: Vec::new(),
                duration: Vec::new(),
                rating: Vec::new(),
                link: Vec::new(),
            },
        }
    }

    fn config() -> Arc<Config> {
        let mut config = Config::default();
        config.scraper.request_delay_ms = 0;
        config.sources = vec![
            source("tours", ListingKind::Activity),
            source("moretours", ListingKind::Activity),
            source("stays", ListingKind::Hotel),
            source("rides", ListingKind::Transport),
        ];
        Arc::new(config)
    }

    #[tokio::test]
    async fn test_live_rendered_and_fallback_paths() {
        let live = StubFetcher::new(
            "live",
            &[
                ("https://tours.test/search?q=Rome", TOURS_PAGE),
                ("https://moretours.test/search?q=Rome", MORE_TOURS_PAGE),
            ],
        );
        let rendered = StubFetcher::new(
            "rendered",
            &[("https://stays.test/search?q=Rome", HOTEL_PAGE)],
        );
        let scraper = ActivityScraper::with_fetchers(config(), live.clone(), Some(rendered.clone()));

        let report = scraper.scrape_city("  Rome ").await;

        assert_eq!(report.city, "Rome");
        assert_eq!(report.path(ListingKind::Activity), AcquisitionPath::Live);
        assert_eq!(report.path(ListingKind::Hotel), AcquisitionPath::Rendered);
        assert_eq!(report.path(ListingKind::Transport), AcquisitionPath::Fallback);

        // duplicate "colosseum underground" dropped
        let names: Vec<_> = report.activities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            ["Colosseum Underground", "Vatican Museums", "Trastevere Food Walk"]
        );
        assert_eq!(report.activities[0].currency, "EUR");

        assert_eq!(report.hotels.len(), 1);
        assert_eq!(report.hotels[0].name, "Hotel Artemide");
        assert_eq!(report.hotels[0].price, Some(210.0));

        assert_eq!(report.transport.len(), 3);
        assert!(report.transport.iter().all(|t| t.source == "fallback"));

        // live: tours, moretours, stays, rides; rendered: stays, rides
        assert_eq!(live.requests().len(), 4);
        assert_eq!(rendered.requests().len(), 2);
        assert_eq!(report.summary.attempts, 6);
        assert_eq!(report.summary.failures, 3);
        assert_eq!(report.summary.total_activities, 3);
        assert_eq!(report.summary.total_hotels, 1);
        assert_eq!(report.summary.total_transport, 3);
        assert!(report.summary.average_price > 0.0);
    }

    #[tokio::test]
    async fn test_all_sources_failing_still_returns_placeholders() {
        let live = StubFetcher::new("live", &[]);
        let scraper = ActivityScraper::with_fetchers(config(), live, None);

        let report = scraper.scrape_city("Oslo").await;

        assert_eq!(report.activities.len(), 6);
        assert_eq!(report.hotels.len(), 4);
        assert_eq!(report.transport.len(), 3);
        assert!(report.all().all(|l| l.city == "Oslo"));
        assert_eq!(report.summary.failures, 4);

        let again = scraper.scrape_city("Oslo").await;
        assert_eq!(report.activities, again.activities);
    }

    #[tokio::test]
    async fn test_empty_city_skips_fetching() {
        let live = StubFetcher::new("live", &[]);
        let scraper = ActivityScraper::with_fetchers(config(), live.clone(), None);

        let report = scraper.scrape_city("   ").await;

        assert_eq!(report.city, UNKNOWN_CITY);
        assert!(live.requests().is_empty());
        assert_eq!(report.summary.attempts, 0);
        for kind in ListingKind::ALL {
            assert_eq!(report.path(kind), AcquisitionPath::Fallback);
            assert!(!report.listings(kind).is_empty());
        }
    }

    #[tokio::test]
    async fn test_invalid_selector_counts_as_failure() {
        let mut config = (*config()).clone();
        config.sources[0].selectors.container = strings(&["[[broken"]);
        let live = StubFetcher::new(
            "live",
            &[("https://moretours.test/search?q=Rome", MORE_TOURS_PAGE)],
        );
        let scraper = ActivityScraper::with_fetchers(Arc::new(config), live.clone(), None);

        let report = scraper.scrape_city("Rome").await;

        assert_eq!(report.path(ListingKind::Activity), AcquisitionPath::Live);
        assert_eq!(report.activities.len(), 2);
        assert!(
            !live
                .requests()
                .contains(&"https://tours.test/search?q=Rome".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_are_paced() {
        let delay = Duration::from_millis(250);
        let mut config = (*config()).clone();
        config.scraper.request_delay_ms = 250;
        let live = StubFetcher::new("live", &[]);
        let scraper = ActivityScraper::with_fetchers(Arc::new(config), live.clone(), None);

        let started = tokio::time::Instant::now();
        let report = scraper.scrape_city("Rome").await;
        let elapsed = started.elapsed();

        // four sources, three gaps
        assert_eq!(report.summary.attempts, 4);
        assert_eq!(live.requests().len(), 4);
        assert!(elapsed >= delay * 3, "elapsed {elapsed:?}");
        assert!(elapsed < delay * 4, "elapsed {elapsed:?}");

        let started = tokio::time::Instant::now();
        let report = scraper.scrape_city("").await;
        assert_eq!(report.summary.attempts, 0);
        assert!(started.elapsed() < delay);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let mut paths = BTreeMap::new();
        paths.insert(ListingKind::Hotel, AcquisitionPath::Rendered);
        let summary = ScrapeSummary {
            total_activities: 0,
            total_hotels: 0,
            total_transport: 0,
            average_price: 0.0,
            elapsed_ms: 5,
            attempts: 1,
            failures: 0,
            paths,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalHotels"], 0);
        assert_eq!(json["elapsedMs"], 5);
        assert_eq!(json["paths"]["hotel"], "rendered");
    }
}
