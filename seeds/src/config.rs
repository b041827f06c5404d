use std::{env, fmt, fs, path::Path};

use common::deserialize_disallow_empty_string::disallow_empty_string;
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::SeedError;

/// Environment variable pointing at a JSON seed config overriding the bundled one.
pub const SEEDS_CONFIG_ENV: &str = "PATENT_SEEDS_CONFIG";

const EMBEDDED_CONFIG: &str = include_str!("../resources/uspto_quantum.json");

/// One boolean search expression, e.g. `abst/(qubit or qubits)`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SearchTerm(#[serde(deserialize_with = "disallow_empty_string")] String);

impl SearchTerm {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingMode {
    /// Fail on any character outside the handled set.
    #[default]
    Strict,
    /// Percent-encode any character outside the handled set.
    Widened,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    /// Everything in front of the query parameter, including the trailing `&`.
    #[serde(deserialize_with = "disallow_empty_string")]
    pub search_base: String,
    #[serde(default = "default_query_param")]
    pub query_param: String,
    #[serde(default = "default_url_suffix")]
    pub url_suffix: String,
    #[serde(default)]
    pub encoding: EncodingMode,
    pub search_terms: Vec<SearchTerm>,
}

fn default_query_param() -> String {
    "Query".into()
}

fn default_url_suffix() -> String {
    "&d=PTXT".into()
}

impl SeedConfig {
    /// The quantum technology vocabulary shipped with the crate.
    pub fn embedded() -> Result<Self, SeedError> {
        Self::from_json(EMBEDDED_CONFIG)
    }

    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str::<Self>(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();

        let contents =
            fs::read_to_string(path).map_err(|err| SeedError::ConfigRead(path.into(), err))?;

        debug!("Read seed config from {}", path.display());

        Self::from_json(&contents)
    }

    /// Reads the file named by `PATENT_SEEDS_CONFIG`, falling back to the
    /// bundled vocabulary when the variable is unset.
    pub fn load() -> Result<Self, SeedError> {
        match env::var(SEEDS_CONFIG_ENV) {
            Ok(path) => {
                info!("Loading seed config from {path}");
                Self::from_path(path)
            }
            Err(_) => Self::embedded(),
        }
    }
}
