use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::utils::error::Result as AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub tracker: TrackerConfig,
    pub notifications: NotificationsConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Whole-request timeout in seconds.
    pub request_timeout: u64,
    pub user_agent: String,
    pub accept_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub url: String,
    pub target_price: Decimal,
    pub log_path: PathBuf,
    pub history_chart: PathBuf,
    pub title_selector: String,
    pub price_whole_selector: String,
    pub price_fraction_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Environment variable holding the sender address.
    pub username_env: String,
    /// Environment variable holding the sender password or app password.
    pub password_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub input_path: PathBuf,
    /// WHATWG encoding label, e.g. `latin1` or `utf-8`.
    pub encoding: String,
    /// chrono format string for the `Order Date` column.
    pub date_format: String,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            scraper: ScraperConfig {
                request_timeout: 30,
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
                accept_language: "en-US,en;q=0.9".to_string(),
            },
            tracker: TrackerConfig {
                url: "https://www.amazon.com/dp/B0CQ1HP3RX/".to_string(),
                target_price: Decimal::from(50),
                log_path: PathBuf::from("price_log.csv"),
                history_chart: PathBuf::from("images/price_history.svg"),
                title_selector: "#productTitle".to_string(),
                price_whole_selector: ".a-price-whole".to_string(),
                price_fraction_selector: ".a-price-fraction".to_string(),
            },
            notifications: NotificationsConfig {
                smtp: SmtpConfig {
                    host: "smtp.gmail.com".to_string(),
                    port: 587,
                    username_env: "MY_EMAIL".to_string(),
                    password_env: "MY_PASSWORD".to_string(),
                },
            },
            report: ReportConfig {
                input_path: PathBuf::from("SampleSuperstore.csv"),
                encoding: "latin1".to_string(),
                date_format: "%d/%m/%Y".to_string(),
                output_dir: PathBuf::from("images"),
            },
        }
    }
}

impl AppConfig {
    /// Layers built-in defaults, `config/default`, `config/local`, an optional
    /// explicit file and `PRICEWATCH__*` environment variables, in that order.
    pub fn load(extra_file: Option<&Path>) -> AppResult<Self> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = extra_file {
            builder = builder.add_source(File::from(path));
        }

        let s = builder
            .add_source(Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        if self.scraper.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("Scraper user_agent must not be empty".into()));
        }

        if Url::parse(&self.tracker.url).is_err() {
            return Err(ConfigError::Message("Invalid tracker URL format".into()));
        }

        if self.tracker.target_price <= Decimal::ZERO {
            return Err(ConfigError::Message("Tracker target_price must be greater than 0".into()));
        }

        for (name, selector) in [
            ("title_selector", &self.tracker.title_selector),
            ("price_whole_selector", &self.tracker.price_whole_selector),
            ("price_fraction_selector", &self.tracker.price_fraction_selector),
        ] {
            if selector.trim().is_empty() {
                return Err(ConfigError::Message(format!("Tracker {} must not be empty", name)));
            }
        }

        if self.notifications.smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        if encoding_rs::Encoding::for_label(self.report.encoding.as_bytes()).is_none() {
            return Err(ConfigError::Message(format!(
                "Unknown report encoding '{}'",
                self.report.encoding
            )));
        }

        if self.report.date_format.trim().is_empty() {
            return Err(ConfigError::Message("Report date_format must not be empty".into()));
        }

        Ok(())
    }
}
