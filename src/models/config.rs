//! Application configuration structures.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{ListingKind, SourceSelectors};
use crate::storage::Collection;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and scraping behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Third-party listing sources, tried in order per kind
    #[serde(default = "defaults::default_sources")]
    pub sources: Vec<SourceConfig>,

    /// HTTP endpoint settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store location and collection ids
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply environment variable overrides on top of file values.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = non_empty("TRIPKIT_LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }
        if let Some(project) = non_empty("TRIPKIT_PROJECT_ID") {
            self.backend.project_id = project;
        }
        if let Some(database) = non_empty("TRIPKIT_DATABASE_ID") {
            self.backend.database_id = database;
        }
        if let Some(dir) = non_empty("TRIPKIT_DATA_DIR") {
            self.backend.data_dir = PathBuf::from(dir);
        }
        for collection in Collection::ALL {
            let key = format!("TRIPKIT_COLLECTION_{}", collection.env_suffix());
            if let Some(id) = non_empty(&key) {
                self.backend.collections.set(collection, id);
            }
        }
    }

    /// Sources configured for one listing kind, in configured order.
    pub fn sources_for(&self, kind: ListingKind) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter().filter(move |s| s.kind == kind)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.browser_user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.browser_user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.max_results_per_source == 0 {
            return Err(AppError::validation(
                "scraper.max_results_per_source must be > 0",
            ));
        }
        for kind in ListingKind::ALL {
            if self.sources_for(kind).next().is_none() {
                return Err(AppError::validation(format!(
                    "No sources defined for kind '{}'",
                    kind.as_str()
                )));
            }
        }
        for source in &self.sources {
            source.validate()?;
        }
        self.server
            .listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| AppError::validation(format!("server.listen_addr: {e}")))?;
        self.backend.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            sources: defaults::default_sources(),
            server: ServerConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for the lightweight fetch path
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// User-Agent header for the rendered (browser profile) path
    #[serde(default = "defaults::browser_user_agent")]
    pub browser_user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between source attempts in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum listings kept from a single source
    #[serde(default = "defaults::max_results_per_source")]
    pub max_results_per_source: usize,

    /// Retry empty kinds with the rendered fetcher before using fallback data
    #[serde(default = "defaults::enabled")]
    pub rendered_fallback: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            browser_user_agent: defaults::browser_user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_results_per_source: defaults::max_results_per_source(),
            rendered_fallback: true,
        }
    }
}

/// A single third-party listing source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source name for logs and listing attribution
    pub name: String,

    pub kind: ListingKind,

    /// Search URL; `{city}` is replaced with the URL-encoded city name
    pub url: String,

    /// Currency assumed when the price text has no symbol
    #[serde(default = "defaults::currency")]
    pub currency: String,

    #[serde(default)]
    pub selectors: SourceSelectors,
}

impl SourceConfig {
    /// Build the search URL for a city.
    pub fn search_url(&self, city: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(city.trim().as_bytes()).collect();
        self.url.replace("{city}", &encoded)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("source name is empty"));
        }
        if !self.url.contains("{city}") {
            return Err(AppError::validation(format!(
                "source '{}' url has no {{city}} placeholder",
                self.name
            )));
        }
        if self.selectors.container.is_empty() || self.selectors.name.is_empty() {
            return Err(AppError::validation(format!(
                "source '{}' needs container and name selectors",
                self.name
            )));
        }
        for selector in self.selectors.all() {
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        Ok(())
    }
}

/// HTTP endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::listen_addr")]
    pub listen_addr: String,

    /// Origin allowed by CORS; any origin when unset
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: defaults::listen_addr(),
            allowed_origin: None,
        }
    }
}

/// Document store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "defaults::project_id")]
    pub project_id: String,

    #[serde(default = "defaults::database_id")]
    pub database_id: String,

    /// Root directory for the local JSON store
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub collections: CollectionIds,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            project_id: defaults::project_id(),
            database_id: defaults::database_id(),
            data_dir: defaults::data_dir(),
            collections: CollectionIds::default(),
        }
    }
}

impl BackendConfig {
    /// Directory holding this project's database files.
    pub fn database_dir(&self) -> PathBuf {
        self.data_dir.join(&self.project_id).join(&self.database_id)
    }

    fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(AppError::validation("backend.project_id is empty"));
        }
        if self.database_id.trim().is_empty() {
            return Err(AppError::validation("backend.database_id is empty"));
        }
        for collection in Collection::ALL {
            let id = self.collections.id(collection);
            if id.trim().is_empty() || id.contains(['/', '\\']) {
                return Err(AppError::validation(format!(
                    "backend.collections.{} is not a valid id",
                    collection.name()
                )));
            }
        }
        Ok(())
    }
}

/// Physical collection ids for each logical collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionIds {
    #[serde(default = "defaults::users")]
    pub users: String,
    #[serde(default = "defaults::trips")]
    pub trips: String,
    #[serde(default = "defaults::activities")]
    pub activities: String,
    #[serde(default = "defaults::expenses")]
    pub expenses: String,
    #[serde(default = "defaults::itinerary")]
    pub itinerary: String,
    #[serde(default = "defaults::shared_trips")]
    pub shared_trips: String,
}

impl Default for CollectionIds {
    fn default() -> Self {
        Self {
            users: defaults::users(),
            trips: defaults::trips(),
            activities: defaults::activities(),
            expenses: defaults::expenses(),
            itinerary: defaults::itinerary(),
            shared_trips: defaults::shared_trips(),
        }
    }
}

impl CollectionIds {
    pub fn id(&self, collection: Collection) -> &str {
        match collection {
            Collection::Users => &self.users,
            Collection::Trips => &self.trips,
            Collection::Activities => &self.activities,
            Collection::Expenses => &self.expenses,
            Collection::Itinerary => &self.itinerary,
            Collection::SharedTrips => &self.shared_trips,
        }
    }

    fn set(&mut self, collection: Collection, id: String) {
        let slot = match collection {
            Collection::Users => &mut self.users,
            Collection::Trips => &mut self.trips,
            Collection::Activities => &mut self.activities,
            Collection::Expenses => &mut self.expenses,
            Collection::Itinerary => &mut self.itinerary,
            Collection::SharedTrips => &mut self.shared_trips,
        };
        *slot = id;
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::SourceConfig;
    use crate::models::selectors::strings;
    use crate::models::{ListingKind, SourceSelectors};

    // Scraper defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; tripkit/0.1)".into()
    }
    pub fn browser_user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/124.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn max_results_per_source() -> usize {
        12
    }
    pub fn enabled() -> bool {
        true
    }
    pub fn currency() -> String {
        "USD".into()
    }

    // Server defaults
    pub fn listen_addr() -> String {
        "127.0.0.1:3000".into()
    }

    // Backend defaults
    pub fn project_id() -> String {
        "tripkit".into()
    }
    pub fn database_id() -> String {
        "main".into()
    }
    pub fn data_dir() -> PathBuf {
        PathBuf::from("storage/data")
    }
    pub fn users() -> String {
        "users".into()
    }
    pub fn trips() -> String {
        "trips".into()
    }
    pub fn activities() -> String {
        "activities".into()
    }
    pub fn expenses() -> String {
        "expenses".into()
    }
    pub fn itinerary() -> String {
        "itinerary".into()
    }
    pub fn shared_trips() -> String {
        "shared-trips".into()
    }

    // Source defaults
    pub fn default_sources() -> Vec<SourceConfig> {
        vec![
            SourceConfig {
                name: "getyourguide".into(),
                kind: ListingKind::Activity,
                url: "https://www.getyourguide.com/s/?q={city}".into(),
                currency: currency(),
                selectors: SourceSelectors {
                    container: strings(&[
                        "[data-test-id='vertical-activity-card']",
                        "div.vertical-activity-card",
                        "article.activity-card",
                    ]),
                    name: strings(&[
                        "[data-test-id='activity-card-title']",
                        "h3.vertical-activity-card__title",
                        "h3",
                    ]),
                    price: strings(&[
                        "[data-test-id='activity-price']",
                        ".baseline-pricing__value",
                    ]),
                    image: strings(&["img.vertical-activity-card__photo", "img"]),
                    description: strings(&[".vertical-activity-card__description"]),
                    duration: strings(&[
                        "[data-test-id='activity-duration']",
                        ".activity-attributes__duration",
                    ]),
                    rating: strings(&[
                        "[data-test-id='rating']",
                        ".rating-overall__rating-number",
                    ]),
                    link: strings(&["a[href]"]),
                },
            },
            SourceConfig {
                name: "viator".into(),
                kind: ListingKind::Activity,
                url: "https://www.viator.com/searchResults/all?text={city}".into(),
                currency: currency(),
                selectors: SourceSelectors {
                    container: strings(&[
                        "[data-automation='product-card']",
                        "div[class*='productCard']",
                    ]),
                    name: strings(&["[data-automation='product-card-title']", "h3"]),
                    price: strings(&[
                        "[data-automation='product-card-price']",
                        "[class*='currentPrice']",
                    ]),
                    image: strings(&["img"]),
                    description: strings(&["[class*='description']"]),
                    duration: strings(&["[data-automation='product-card-duration']"]),
                    rating: strings(&["[data-automation='product-card-rating']"]),
                    link: strings(&["a[href]"]),
                },
            },
            SourceConfig {
                name: "booking".into(),
                kind: ListingKind::Hotel,
                url: "https://www.booking.com/searchresults.html?ss={city}".into(),
                currency: currency(),
                selectors: SourceSelectors {
                    container: strings(&["[data-testid='property-card']", "div.sr_property_block"]),
                    name: strings(&["[data-testid='title']", ".sr-hotel__name"]),
                    price: strings(&[
                        "[data-testid='price-and-discounted-price']",
                        ".bui-price-display__value",
                    ]),
                    image: strings(&["img[data-testid='image']", "img"]),
                    description: strings(&["[data-testid='recommended-units']"]),
                    duration: Vec::new(),
                    rating: strings(&[
                        "[data-testid='review-score'] > div:first-child",
                        ".bui-review-score__badge",
                    ]),
                    link: strings(&["a[data-testid='title-link']", "a[href]"]),
                },
            },
            SourceConfig {
                name: "hostelworld".into(),
                kind: ListingKind::Hotel,
                url: "https://www.hostelworld.com/search?search_keywords={city}".into(),
                currency: currency(),
                selectors: SourceSelectors {
                    container: strings(&["div.property-card", "[class*='property-card']"]),
                    name: strings(&[".property-name", "h2"]),
                    price: strings(&[".property-price", "[class*='price']"]),
                    image: strings(&["img"]),
                    description: strings(&[".property-description"]),
                    duration: Vec::new(),
                    rating: strings(&[".rating-score", "[class*='rating']"]),
                    link: strings(&["a[href]"]),
                },
            },
            SourceConfig {
                name: "omio".into(),
                kind: ListingKind::Transport,
                url: "https://www.omio.com/search?destination={city}".into(),
                currency: currency(),
                selectors: SourceSelectors {
                    container: strings(&["[data-e2e='journeyCard']", "div[class*='journey']"]),
                    name: strings(&["[data-e2e='providerName']", "[class*='provider']", "h3"]),
                    price: strings(&["[data-e2e='price']", "[class*='price']"]),
                    image: strings(&["img"]),
                    description: strings(&["[class*='route']"]),
                    duration: strings(&["[data-e2e='duration']", "[class*='duration']"]),
                    rating: Vec::new(),
                    link: strings(&["a[href]"]),
                },
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.scraper.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_kind() {
        let mut config = Config::default();
        config.sources.retain(|s| s.kind != ListingKind::Transport);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.sources[0].selectors.name = vec!["[[invalid".to_string()];
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn validate_rejects_url_without_placeholder() {
        let mut config = Config::default();
        config.sources[0].url = "https://example.com/search".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn search_url_encodes_city() {
        let source = &Config::default().sources[0];
        assert_eq!(
            source.search_url(" São Paulo "),
            "https://www.getyourguide.com/s/?q=S%C3%A3o+Paulo"
        );
    }

    #[test]
    fn env_overrides_backend() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TRIPKIT_PROJECT_ID", "demo"),
            ("TRIPKIT_COLLECTION_SHARED_TRIPS", "shares"),
            ("TRIPKIT_DATABASE_ID", "  "),
        ]);
        let mut config = Config::default();
        config.apply_env_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.project_id, "demo");
        assert_eq!(config.backend.database_id, "main");
        assert_eq!(config.backend.collections.shared_trips, "shares");
        assert_eq!(config.backend.collections.id(Collection::Trips), "trips");
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [scraper]
            request_delay_ms = 0

            [backend]
            database_id = "staging"
            "#,
        )
        .unwrap();
        assert_eq!(config.scraper.request_delay_ms, 0);
        assert_eq!(config.scraper.timeout_secs, 15);
        assert_eq!(config.backend.database_id, "staging");
        assert!(!config.sources.is_empty());
    }
}
