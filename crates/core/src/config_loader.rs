//! Configuration loading.
//!
//! Defaults come from the `Default` impls in [`crate::config`]; a TOML file
//! and `SHORT_SCAN_`-prefixed environment variables override them. Nested
//! keys use a double underscore, e.g. `SHORT_SCAN_RISK__HIGH_BETA=3.0` or
//! `SHORT_SCAN_CATALYST__API_KEY=...`. A missing config file is not an
//! error; the defaults stand on their own.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";
const ENV_PREFIX: &str = "SHORT_SCAN_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the default `config/Config.toml` location,
    /// a sibling `config/Config.json` if one exists, and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be parsed,
    /// or an override value has the wrong type.
    pub fn load() -> Result<AppConfig> {
        let config = Self::figment(DEFAULT_CONFIG_PATH)
            .join(Json::file("config/Config.json"))
            .extract()
            .context("failed to load configuration")?;

        Ok(config)
    }

    /// Loads configuration from an explicit TOML file plus the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or an override value
    /// has the wrong type.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        let config = Self::figment(path)
            .extract()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;

        Ok(config)
    }

    fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
