//! Runner configuration loaded from TOML.
//!
//! ```toml
//! [scoring]
//! base_score = 80
//! max_results = 5
//!
//! [catalog]
//! path = "providers.toml"   # omit to use the built-in roster
//!
//! [dialogue]
//! restart_intent = "start_new_project"
//! form_name = "project_form"
//!
//! [logging]
//! filter = "cro_match_core=info,cro_match_actions=info"
//! json = false
//! ```
//!
//! Every section and key is optional.

use std::path::{Path, PathBuf};

use cro_match_core::{
    Catalog, CatalogError, FormController, Scorer, ScoringConfig, ScoringConfigError,
    DEFAULT_RESTART_INTENT,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::server::{ActionServer, DEFAULT_FORM_NAME};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid scoring config: {0}")]
    Scoring(#[from] ScoringConfigError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    pub catalog: CatalogConfig,
    pub dialogue: DialogueConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Roster file; the built-in roster is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    pub restart_intent: String,
    pub form_name: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            restart_intent: DEFAULT_RESTART_INTENT.to_string(),
            form_name: DEFAULT_FORM_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "cro_match_core=info,cro_match_actions=info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.scoring.validate()?;
        Ok(config)
    }

    /// Resolve the provider catalog this configuration points at.
    pub fn catalog(&self) -> ConfigResult<Catalog> {
        match &self.catalog.path {
            Some(path) => {
                let catalog = Catalog::load(path)?;
                info!(path = %path.display(), providers = catalog.len(), "loaded provider catalog");
                Ok(catalog)
            }
            None => Ok(Catalog::builtin()),
        }
    }

    /// Assemble the action server described by this configuration.
    pub fn build_server(&self) -> ConfigResult<ActionServer> {
        let scorer = Scorer::try_new(self.scoring.clone())?;
        let controller = FormController::new(self.catalog()?, scorer)
            .with_restart_intent(self.dialogue.restart_intent.clone());
        Ok(ActionServer::new(controller).with_form_name(self.dialogue.form_name.clone()))
    }
}
