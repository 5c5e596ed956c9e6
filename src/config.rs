//! Layered configuration loading using figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`APPOINTMENTS_` prefix, `__` between sections)
//! 2. `appointments.toml` in the working directory
//! 3. Built-in defaults
//!
//! `APPOINTMENTS_APPLICATION__PORT=9000` maps to `application.port`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::calendar::OverlapRule;
use crate::validation::DATE_RANGE_MESSAGE;

const CONFIG_FILE: &str = "appointments.toml";
const ENV_PREFIX: &str = "APPOINTMENTS_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8080
}

fn default_date_range_message() -> String {
    DATE_RANGE_MESSAGE.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    /// `0` binds a random free port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulingSettings {
    #[serde(default)]
    pub overlap_rule: OverlapRule,
    /// Reported when a payload's dates are missing, inverted or in the past.
    #[serde(default = "default_date_range_message")]
    pub date_range_message: String,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            overlap_rule: OverlapRule::default(),
            date_range_message: default_date_range_message(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationSettings,
    #[serde(default)]
    pub scheduling: SchedulingSettings,
}

impl Settings {
    /// Load from defaults, `appointments.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Same as [`Settings::load`], after loading a `.env` file if one exists.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let local_path = PathBuf::from(CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }
}
