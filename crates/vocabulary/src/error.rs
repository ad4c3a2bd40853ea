use std::path::PathBuf;

use thiserror::Error;

use crate::word::UnknownPartOfSpeech;

/// Why a single raw record could not become an [`Entry`](crate::Entry).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("field `{field}` must be {expected}, found {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{field}` must only contain strings, found {found} at index {index}")]
    NonStringElement {
        field: &'static str,
        index: usize,
        found: &'static str,
    },

    #[error(transparent)]
    UnknownKind(#[from] UnknownPartOfSpeech),

    #[error("field `{field}` is given more than once")]
    DuplicateField { field: &'static str },

    #[error("field names mix long names and short tokens")]
    MixedFieldSpelling,
}

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML deserialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed collection: {0}")]
    Structure(String),

    #[error("invalid entry {word:?}: {source}")]
    Entry { word: String, source: EntryError },
}

pub type Result<T> = std::result::Result<T, VocabularyError>;
