use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuideError {
    #[error("Failed to read stdin: {0}")]
    StdinRead(#[from] io::Error),

    #[error("Failed to write output: {0}")]
    OutputWrite(io::Error),

    #[error("Failed to parse input JSON: {0}")]
    InputParse(#[from] serde_json::Error),

    #[error("Failed to read guidance catalog from {path}: {source}")]
    CatalogRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse guidance catalog: {0}")]
    CatalogParse(String),

    #[error("Guidance catalog not found at {0}")]
    CatalogNotFound(PathBuf),

    #[error("Home directory not found")]
    NoHomeDir,

    #[error("Duplicate topic id in catalog: {0}")]
    DuplicateTopic(String),

    #[error("Topic {0} has no keywords")]
    EmptyTopic(String),

    #[error("Topic {0} has an empty keyword")]
    EmptyKeyword(String),

    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error("Mood rating {0} out of range (expected 1-5)")]
    MoodOutOfRange(u8),
}
