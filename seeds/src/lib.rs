pub mod config;
pub mod encoding;
pub mod errors;
pub mod generator;

pub use config::{EncodingMode, SearchTerm, SeedConfig};
pub use errors::SeedError;
pub use generator::{SeedUrl, SeedUrlGenerator};
