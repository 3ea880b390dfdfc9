use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Markov stability model settings
    #[serde(default)]
    pub stability: StabilitySettings,

    /// Weather news feed settings
    #[serde(default)]
    pub news: NewsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the API listens on
    pub port: u16,

    /// Directory of static frontend assets served at the root path
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            static_dir: "public".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Open-Meteo forecast endpoint
    pub forecast_base_url: String,

    /// Nominatim base URL (search/reverse are joined onto this)
    pub geocode_base_url: String,

    /// Per-request timeout for upstream calls, in seconds
    pub request_timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            geocode_base_url: "https://nominatim.openstreetmap.org".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Tuning for the Markov-chain stability predictor.
///
/// The defaults (100 trials, 3-hour horizon) are inherited constants with no
/// stated derivation; they are exposed as configuration rather than re-derived.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StabilitySettings {
    /// Monte Carlo trials per prediction
    pub trials: u32,

    /// Forecast horizon in hours (one Markov step per hour)
    pub horizon_hours: u32,
}

impl Default for StabilitySettings {
    fn default() -> Self {
        Self {
            trials: 100,
            horizon_hours: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// RSS feed queried for weather headlines
    pub feed_url: String,

    /// Maximum number of items returned by /api/weather-news
    pub max_items: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feed_url:
                "https://news.google.com/rss/search?q=weather+climate+environment&hl=en-US&gl=US&ceid=US:en"
                    .to_string(),
            max_items: 6,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast");

        Self {
            config_dir,
            server: ServerConfig::default(),
            weather: WeatherConfig::default(),
            stability: StabilitySettings::default(),
            news: NewsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Validate upstream URLs
        self.validate_url(
            &self.weather.forecast_base_url,
            "weather.forecast_base_url",
            &mut result,
        );
        self.validate_url(
            &self.weather.geocode_base_url,
            "weather.geocode_base_url",
            &mut result,
        );
        self.validate_url(&self.news.feed_url, "news.feed_url", &mut result);

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        let static_dir = PathBuf::from(&self.server.static_dir);
        if !static_dir.exists() {
            result.add_warning(
                "server.static_dir",
                format!(
                    "Static asset directory does not exist: {}",
                    static_dir.display()
                ),
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Upstream timeout must be greater than 0",
            );
        }

        if self.stability.trials == 0 {
            result.add_error(
                "stability.trials",
                "At least one Monte Carlo trial is required",
            );
        } else if self.stability.trials > 100_000 {
            result.add_warning(
                "stability.trials",
                "Trial count is unusually large (>100000)",
            );
        }

        if self.stability.horizon_hours == 0 {
            result.add_warning(
                "stability.horizon_hours",
                "Horizon of 0 hours always reports zero risk",
            );
        }

        if self.news.max_items == 0 {
            result.add_warning("news.max_items", "News feed disabled (0 items)");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                // Check scheme
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                // Check host
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                // Validate port if explicitly specified
                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}
