use core::cmp::Ordering;
use core::fmt::{self, Display};
use core::time::Duration;
use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "santa.toml";
pub const ENV_PREFIX: &str = "SANTA_";

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        })
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct DatabaseConfig {
    pub development: Option<String>,
    pub test: Option<String>,
    pub production: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    pub port: Option<u16>,
    pub username: String,
    pub password: String,
    /// Sender address, the username is used when missing.
    pub from: Option<String>,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
}

impl SmtpConfig {
    #[must_use]
    pub fn sender_address(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct MessagingConfig {
    pub endpoint: String,
    pub token: Option<String>,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GiftConfig {
    #[serde(default = "default_min_price")]
    pub min_price: f64,
    #[serde(default = "default_max_price")]
    pub max_price: f64,
}

impl Default for GiftConfig {
    fn default() -> Self {
        Self {
            min_price: default_min_price(),
            max_price: default_max_price(),
        }
    }
}

/// Whether the lottery may be drawn again once a run has been recorded.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RerunPolicy {
    #[default]
    Allow,
    Once,
}

/// What a lottery run reports when a notification could not be delivered.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFailurePolicy {
    /// Succeed and list the failed deliveries in the summary.
    #[default]
    Report,
    /// Fail the whole run after every dispatch has been attempted.
    Fail,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LotteryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_notification_timeout_secs")]
    pub notification_timeout_secs: u64,
    #[serde(default)]
    pub rerun: RerunPolicy,
    #[serde(default)]
    pub on_notification_failure: NotificationFailurePolicy,
}

impl LotteryConfig {
    #[must_use]
    pub const fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            notification_timeout_secs: default_notification_timeout_secs(),
            rerun: RerunPolicy::default(),
            on_notification_failure: NotificationFailurePolicy::default(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    pub smtp: Option<SmtpConfig>,
    pub messaging: Option<MessagingConfig>,
    #[serde(default)]
    pub gift: GiftConfig,
    #[serde(default)]
    pub lottery: LotteryConfig,
}

impl Config {
    /// The connection string for the configured environment.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        match self.environment {
            Environment::Development => self.database.development.as_deref(),
            Environment::Test => self.database.test.as_deref(),
            Environment::Production => self.database.production.as_deref(),
        }
        .ok_or(ConfigError::MissingDatabaseUrl(self.environment))
    }

    /// Rejects settings that would make every gift or every draw fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let GiftConfig {
            min_price,
            max_price,
        } = self.gift;
        // NaN bounds compare as None
        if !matches!(
            min_price.partial_cmp(&max_price),
            Some(Ordering::Less | Ordering::Equal)
        ) {
            return Err(ConfigError::InvalidPriceRange {
                min_price,
                max_price,
            });
        }
        if self.lottery.max_attempts == 0 {
            return Err(ConfigError::NoMatchingAttempts);
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] Box<figment::Error>),
    #[error("no database url configured for the {0} environment")]
    MissingDatabaseUrl(Environment),
    #[error("gift.min_price ({min_price}) is greater than gift.max_price ({max_price})")]
    InvalidPriceRange { min_price: f64, max_price: f64 },
    #[error("lottery.max_attempts must be at least 1")]
    NoMatchingAttempts,
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

#[must_use]
pub fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn get_config() -> Result<Config, ConfigError> {
    let config: Config = figment().extract()?;
    config.validate()?;
    Ok(config)
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_owned()
}

fn default_sender_name() -> String {
    "Secret Santa".to_owned()
}

const fn default_min_price() -> f64 {
    20_000.0
}

const fn default_max_price() -> f64 {
    50_000.0
}

const fn default_max_attempts() -> u32 {
    10_000
}

const fn default_notification_timeout_secs() -> u64 {
    30
}

const fn default_port() -> u16 {
    3000
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}
