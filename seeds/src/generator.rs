use std::fmt;

use tracing::{debug, warn};

use crate::{
    config::{SearchTerm, SeedConfig},
    encoding::encode_term,
    errors::SeedError,
};

/// A start URL for the crawl, along with the term it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedUrl {
    pub term: SearchTerm,
    pub url: String,
}

impl fmt::Display for SeedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

pub struct SeedUrlGenerator {
    config: SeedConfig,
}

impl SeedUrlGenerator {
    pub fn new(config: SeedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// One URL per configured search term, in vocabulary order.
    ///
    /// Holds no state between calls, so every call returns the same list.
    pub fn generate(&self) -> Result<Vec<SeedUrl>, SeedError> {
        if self.config.search_terms.is_empty() {
            warn!("Seed vocabulary is empty, no start URLs generated");
        }

        self.config
            .search_terms
            .iter()
            .map(|term| self.build_url(term))
            .collect()
    }

    fn build_url(&self, term: &SearchTerm) -> Result<SeedUrl, SeedError> {
        let encoded = encode_term(term.as_str(), self.config.encoding)?;

        let url = format!(
            "{}{}={}{}",
            self.config.search_base, self.config.query_param, encoded, self.config.url_suffix
        );

        debug!("Seed URL for {term}: {url}");

        Ok(SeedUrl {
            term: term.clone(),
            url,
        })
    }
}
