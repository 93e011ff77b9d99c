//! Loading and saving [`AppConfig`] through confy.

use raidlens_types::AppConfig;
use std::path::PathBuf;

use crate::error::ConfigError;

const APP_NAME: &str = "raidlens";

pub trait AppConfigExt: Sized {
    /// Load the stored config, falling back to defaults on any failure.
    fn load() -> Self;
    fn save(&self) -> Result<(), ConfigError>;
    /// Catalog directory, defaulting to `<config_dir>/raidlens/catalog`.
    fn catalog_dir(&self) -> Option<PathBuf>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        match confy::load(APP_NAME, None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "[CONFIG] Failed to load config, using defaults");
                AppConfig::default()
            }
        }
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, None, self)?;
        Ok(())
    }

    fn catalog_dir(&self) -> Option<PathBuf> {
        self.catalog
            .dir
            .clone()
            .or_else(|| dirs::config_dir().map(|d| d.join(APP_NAME).join("catalog")))
    }
}
