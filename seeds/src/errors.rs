use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Search term {term:?} contains unsupported character {character:?}")]
    UnsupportedCharacter { term: String, character: char },
    #[error("Failed to read seed config {}", .0.display())]
    ConfigRead(PathBuf, #[source] std::io::Error),
    #[error("Failed to deserialize seed config: {0}")]
    ConfigInvalid(#[from] serde_json::Error),
}
