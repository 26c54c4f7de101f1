//! OSM loading error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or inspecting OSM data.
#[derive(Debug, Error)]
pub enum OsmError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document has no \"elements\" array")]
    MissingElements,

    #[error("Malformed {kind} element: {source}")]
    Element {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Unknown way {0}")]
    UnknownWay(i64),

    #[error("Way {0} has no nodes")]
    EmptyWay(i64),

    #[error("Way {way} references node {node} which is not loaded")]
    MissingNode { way: i64, node: i64 },
}

pub type Result<T> = std::result::Result<T, OsmError>;
