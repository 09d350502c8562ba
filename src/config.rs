// ⚙️ Configuration - environment + optional pricing file

use crate::pricing::{PricingConfig, PricingEngine};
use anyhow::Result;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "linkbio.db";
pub const DEFAULT_PROFILE_KEY: &str = "linktreeProfile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file holding profiles and the audit trail
    pub database_path: PathBuf,

    /// Key the profile snapshot is stored under
    pub profile_key: String,

    /// JSON pricing catalog; built-in catalog when unset
    pub pricing_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            profile_key: DEFAULT_PROFILE_KEY.to_string(),
            pricing_path: None,
        }
    }
}

impl AppConfig {
    /// LINKBIO_DB, LINKBIO_PROFILE_KEY, LINKBIO_PRICING
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = AppConfig::default();

        AppConfig {
            database_path: non_empty("LINKBIO_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            profile_key: non_empty("LINKBIO_PROFILE_KEY").unwrap_or(defaults.profile_key),
            pricing_path: non_empty("LINKBIO_PRICING").map(PathBuf::from),
        }
    }

    pub fn pricing_engine(&self) -> Result<PricingEngine> {
        match &self.pricing_path {
            Some(path) => PricingEngine::new(PricingConfig::from_file(path)?),
            None => Ok(PricingEngine::default()),
        }
    }
}
