//! Application configuration.
//!
//! Loaded once at startup from a JSON file; rule validation failures are
//! fatal. The responses list is ordered — evaluation order is significant.
//!
//! ```json
//! {
//!   "storage": { "root": "./storage" },
//!   "matching": { "debug": true },
//!   "responses": [
//!     {
//!       "match": { "routingNumber": "083000137" },
//!       "action": { "return": { "code": "R03" } }
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::rule::Response;
use crate::types::ResponderError;

/// Complete configuration for the responder.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub matching: Matching,
    #[serde(default)]
    pub responses: Vec<Response>,
}

/// Where inbound uploads land and responses are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StorageConfig {
    /// Root directory all other paths resolve against.
    pub root: PathBuf,
    /// Inbound uploads, relative to `root`.
    #[serde(default = "default_inbound")]
    pub inbound: PathBuf,
    /// Response files, relative to `root`.
    #[serde(default = "default_returned")]
    pub returned: PathBuf,
}

fn default_inbound() -> PathBuf {
    PathBuf::from("inbound")
}

fn default_returned() -> PathBuf {
    PathBuf::from("returned")
}

/// Matcher options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Matching {
    /// Log per-rule predicate traces while matching.
    #[serde(default)]
    pub debug: bool,
}

impl Config {
    /// Read and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for
    /// the configuration schema, or contains a rule that fails validation
    /// (invalid action combination, unknown return or change code). All of
    /// these are fatal to startup.
    pub fn load(path: &Path) -> Result<Config, ResponderError> {
        let raw = fs::read_to_string(path).map_err(|source| ResponderError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&raw).map_err(|source| ResponderError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every configured rule; failures are fatal to startup.
    pub fn validate(&self) -> Result<(), ResponderError> {
        for (index, response) in self.responses.iter().enumerate() {
            response
                .validate()
                .map_err(|err| ResponderError::InvalidResponse {
                    index,
                    message: err.to_string(),
                })?;
        }
        Ok(())
    }
}
