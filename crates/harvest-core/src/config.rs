//! Configuration management for the catalog sweep.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::FilterValue;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/catalog-sweep/config.toml` (or platform
/// equivalent) unless a path is given explicitly. If the default file doesn't
/// exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote catalog API settings
    pub api: ApiConfig,
    /// Pagination, parallelism and stop condition
    pub sweep: SweepConfig,
    /// Filter dimensions to sweep
    pub space: SpaceConfig,
    /// Output settings
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults
    /// if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration and apply environment variable overrides.
    ///
    /// The result is not validated, so callers can layer further overrides
    /// (command-line flags) before calling [`validate`](Self::validate).
    ///
    /// Supports the following environment variables:
    /// - `CATALOG_SWEEP_CAP`: Override the target collection size
    /// - `CATALOG_SWEEP_CONCURRENCY`: Override the worker count
    /// - `CATALOG_SWEEP_PAGE_SIZE`: Override the page size
    /// - `CATALOG_SWEEP_SALT`: Override the signing secret
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_overrides(path, |key| std::env::var(key).ok())
    }

    /// [`load_with_env`](Self::load_with_env) with an explicit variable lookup.
    pub fn load_with_overrides<F>(path: Option<&Path>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };

        config.apply_env_overrides(lookup);
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CATALOG_SWEEP_CAP") {
            match val.parse() {
                Ok(cap) => {
                    self.sweep.cap = cap;
                    tracing::debug!("Override sweep.cap from env: {}", cap);
                }
                Err(_) => tracing::warn!("Ignoring CATALOG_SWEEP_CAP={val:?}: not a number"),
            }
        }

        if let Some(val) = lookup("CATALOG_SWEEP_CONCURRENCY") {
            match val.parse() {
                Ok(concurrency) => {
                    self.sweep.concurrency = concurrency;
                    tracing::debug!("Override sweep.concurrency from env: {}", concurrency);
                }
                Err(_) => {
                    tracing::warn!("Ignoring CATALOG_SWEEP_CONCURRENCY={val:?}: not a number");
                }
            }
        }

        if let Some(val) = lookup("CATALOG_SWEEP_PAGE_SIZE") {
            match val.parse() {
                Ok(page_size) => {
                    self.sweep.page_size = page_size;
                    tracing::debug!("Override sweep.page_size from env: {}", page_size);
                }
                Err(_) => tracing::warn!("Ignoring CATALOG_SWEEP_PAGE_SIZE={val:?}: not a number"),
            }
        }

        if let Some(val) = lookup("CATALOG_SWEEP_SALT") {
            self.api.secret_salt = val;
            tracing::debug!("Override api.secret_salt from env");
        }
    }

    /// Check the values a sweep cannot run without.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sweep.page_size == 0 {
            return Err(ConfigError::invalid(
                "sweep.page_size",
                "must be greater than zero",
            ));
        }
        if self.sweep.concurrency == 0 {
            return Err(ConfigError::invalid(
                "sweep.concurrency",
                "must be greater than zero",
            ));
        }
        if self.sweep.cap == 0 {
            return Err(ConfigError::invalid("sweep.cap", "must be greater than zero"));
        }
        if self.api.secret_salt.is_empty() {
            return Err(ConfigError::invalid("api.secret_salt", "must not be empty"));
        }

        if self.api.bootstrap_urls.is_empty() {
            return Err(ConfigError::invalid(
                "api.bootstrap_urls",
                "at least one session endpoint is required",
            ));
        }

        url::Url::parse(&self.api.offers_url)
            .map_err(|e| ConfigError::invalid("api.offers_url", e.to_string()))?;
        for bootstrap_url in &self.api.bootstrap_urls {
            url::Url::parse(bootstrap_url)
                .map_err(|e| ConfigError::invalid("api.bootstrap_urls", e.to_string()))?;
        }

        let mut seen = HashSet::new();
        for dimension in &self.space.dimensions {
            if !seen.insert(dimension.name.as_str()) {
                return Err(ConfigError::invalid(
                    "space.dimensions",
                    format!("duplicate dimension '{}'", dimension.name),
                ));
            }
            if dimension.domain_len() == 0 {
                return Err(ConfigError::invalid(
                    "space.dimensions",
                    format!("dimension '{}' has no values", dimension.name),
                ));
            }
        }

        Ok(())
    }

    /// Save configuration to disk at the given path.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| {
            ConfigError::invalid("config_path", "no parent directory")
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/catalog-sweep/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "catalog-sweep", "catalog-sweep")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Remote catalog API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Offers search endpoint
    pub offers_url: String,
    /// Session endpoints called once, in order, before any data fetch
    pub bootstrap_urls: Vec<String>,
    /// User agent sent with every request
    pub user_agent: String,
    /// Secret prepended to the signature input
    pub secret_salt: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            offers_url: "https://offers-service.domclick.ru/research/v5/offers/".to_string(),
            bootstrap_urls: vec![
                "https://api.domclick.ru/core/no-auth-zone/api/v1/ensure_session".to_string(),
                "https://ipoteka.domclick.ru/mobile/v1/feature_toggles".to_string(),
            ],
            user_agent: "Android; 12; Google; google_pixel_5; 8.72.0; 8720006; ; NONAUTH"
                .to_string(),
            secret_salt: "ad65f331b02b90d868cbdd660d82aba0".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Pagination, parallelism and stop condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Items requested per page (`limit`)
    pub page_size: u32,
    /// Maximum combinations fetched in parallel
    pub concurrency: usize,
    /// Stop consuming once this many unique records are collected
    pub cap: usize,
    /// Abort in-flight fetches once the cap is reached instead of letting
    /// them finish in the background
    pub abort_in_flight: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            page_size: 30,
            concurrency: 10,
            cap: 20_000,
            abort_in_flight: false,
        }
    }
}

/// One filter dimension of the parameter space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionConfig {
    /// Query parameter name
    pub name: String,
    /// Whether "no constraint" is part of the domain (it comes first)
    #[serde(default)]
    pub unconstrained: bool,
    /// Explicit values, in sweep order
    #[serde(default)]
    pub values: Vec<FilterValue>,
}

impl DimensionConfig {
    /// A dimension with the given values and no "no constraint" option.
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<FilterValue>) -> Self {
        Self {
            name: name.into(),
            unconstrained: false,
            values,
        }
    }

    /// Add "no constraint" to the front of the domain.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.unconstrained = true;
        self
    }

    /// The full domain, sentinel included.
    #[must_use]
    pub fn domain(&self) -> Vec<FilterValue> {
        let mut domain = Vec::with_capacity(self.domain_len());
        if self.unconstrained {
            domain.push(FilterValue::Unconstrained);
        }
        domain.extend(self.values.iter().cloned());
        domain
    }

    /// Number of values in the domain, sentinel included.
    #[must_use]
    pub fn domain_len(&self) -> usize {
        self.values.len() + usize::from(self.unconstrained)
    }
}

/// Filter dimensions to sweep, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    /// Dimensions; the first varies slowest
    pub dimensions: Vec<DimensionConfig>,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        let minutes = || -> Vec<FilterValue> {
            [5, 10, 15, 20].into_iter().map(FilterValue::Integer).collect()
        };

        Self {
            dimensions: vec![
                DimensionConfig::new(
                    "address",
                    vec![FilterValue::text("1d1463ae-c80f-4d19-9331-a1b68a85b553")],
                ),
                DimensionConfig::new("deal_type", vec![FilterValue::text("sale")]),
                DimensionConfig::new("category", vec![FilterValue::text("living")]),
                DimensionConfig::new(
                    "offer_type",
                    vec![FilterValue::list(["flat"]), FilterValue::list(["layout"])],
                ),
                DimensionConfig::new(
                    "rooms",
                    ["st", "1", "2", "3", "4+"]
                        .into_iter()
                        .map(FilterValue::text)
                        .collect(),
                )
                .optional(),
                DimensionConfig::new("time_on_foot__lte", minutes()).optional(),
                DimensionConfig::new("time_by_car__lte", minutes()).optional(),
            ],
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Destination file
    pub output_path: PathBuf,
    /// File format written to `output_path`
    pub format: ExportFormat,
    /// Dotted column paths to keep, in output order
    pub columns: Vec<String>,
}

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Comma-separated values with one header row
    #[default]
    Csv,
    /// One JSON object per line
    JsonLines,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("offers.csv"),
            format: ExportFormat::default(),
            columns: DEFAULT_COLUMNS.iter().map(ToString::to_string).collect(),
        }
    }
}

const DEFAULT_COLUMNS: &[&str] = &[
    "id",
    "offer_type",
    "object_info.floor",
    "object_info.rooms",
    "object_info.area",
    "price_info.price",
    "price_info.square_price",
    "address.position.lat",
    "address.position.lon",
    "seller.agent.is_agent",
    "published_dt",
    "updated_dt",
    "trade_in",
    "source",
    "ipoteka_rate",
    "has_advance_payment",
    "is_exclusive",
    "status",
    "assignment_sale",
    "online_show",
    "last_price_history_state",
    "is_placement_paid",
    "discount_status.status",
    "discount_status.value",
    "duplicates_offer_count",
    "chat_available",
    "is_auction",
    "address.id",
    "address.kind",
    "address.guid",
    "address.parent_id",
    "address.locality.id",
    "address.locality.kind",
    "address.locality.subkind",
    "address.locality.parent_id",
    "legal_options.is_owner",
    "legal_options.is_agent_owner_approved",
    "pessimization.pessimized",
    "pessimization.pessimization_type",
    "house.floors",
];
