//! Toolkit configuration loader.
//!
//! Settings come from a YAML file; `DATABASE_URL` (from the environment or a
//! `.env` file) overrides the database URL it names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::auth::Authenticator;
use crate::db::DatabaseConfig;
use crate::logic::ActionContext;

pub const DEFAULT_DATABASE_URL: &str = "entities.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub pool: DatabaseConfig,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            url: DEFAULT_DATABASE_URL.to_string(),
            pool: DatabaseConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationSettings {
    pub allow_multiroot: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub accept_email_as_username: bool,
}

/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    pub database: DatabaseSettings,
    pub organizations: OrganizationSettings,
    pub auth: AuthSettings,
}

impl ToolkitConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Example
    /// ```ignore
    /// let config = ToolkitConfig::load_from_file("config/entikit.yaml")?;
    /// let db = Database::new_with_config(&config.database.url, config.database.pool.clone())?;
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let mut config = Self::from_yaml(&contents)?;
        config.apply_env();
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn from_yaml(contents: &str) -> Result<Self, String> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|e| format!("Failed to parse YAML: {}", e))
    }

    fn apply_env(&mut self) {
        dotenv::dotenv().ok();
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                self.database.url = url;
            }
        }
    }

    pub fn action_context(&self) -> ActionContext {
        ActionContext::new(self.organizations.allow_multiroot)
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.auth.accept_email_as_username)
    }
}
