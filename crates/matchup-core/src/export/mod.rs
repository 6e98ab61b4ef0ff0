//! Export artifacts: the relationship table and the static graph JSON.

mod graph;
mod layout;
mod matchups;

pub use graph::{
    build_snapshot, load_export_input, write_snapshot, AbilitySlot, EdgeProperties, ExportInput,
    GraphEdge, GraphIndexes, GraphMeta, GraphNode, GraphSnapshot, NodeKind, NodeProperties,
};
pub use layout::{spring_layout, LAYOUT_ITERATIONS, LAYOUT_SEED};
pub use matchups::{
    archive_table, diff_tables, fetch_matchup_rows, load_table, save_table, MatchupRow, TableDiff,
};

use std::path::PathBuf;

use thiserror::Error;

use crate::graph::StoreError;
use crate::source::SourceError;

/// Errors raised while producing or reading export artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A required input artifact is absent.
    #[error("expected file not found: {}", path.display())]
    Missing { path: PathBuf },

    /// IO error.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),
}
