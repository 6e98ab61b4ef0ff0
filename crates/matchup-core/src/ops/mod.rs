//! Store operations: ingestion, matchup synthesis, and consistency checks.

mod ingest;
mod matchup;
mod validate;

pub use ingest::{apply_schema, upsert_archetypes, upsert_character, upsert_mechanics};
pub use matchup::{clear_synthesized_matchups, synthesize_matchups, MatchupSummary};
pub use validate::{
    check_drift, collect_source_state, collect_store_state, run_validation_queries, DriftReport,
    EntityNames, SetDiff, ValidationReport,
};

use thiserror::Error;

use crate::graph::StoreError;
use crate::source::SourceError;

/// Operations that touch both the source files and the store.
#[derive(Debug, Error)]
pub enum OpsError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
