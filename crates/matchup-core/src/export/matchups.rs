//! The relationship table: one row per synthesized matchup edge.
//!
//! The table is both the interchange format between synthesis and the static
//! exporter and a standalone artifact for diffing across time. Rows are
//! keyed by (source, relationship, target); evidence and reason are payload,
//! not key.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::graph::{GraphStore, StoreError};
use crate::model::{render_reason, Evidence, MatchupKind};

use super::ExportError;

/// One row of the relationship table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupRow {
    pub source: String,
    pub relationship: String,
    pub target: String,
    pub evidence: u64,
    pub reason: String,
}

impl MatchupRow {
    /// The diff key: source, relationship kind, target.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.source, &self.relationship, &self.target)
    }
}

#[derive(Debug, Deserialize)]
struct CounterEdgeRow {
    source: String,
    target: String,
    #[serde(default)]
    evidence: Vec<Evidence>,
}

#[derive(Debug, Deserialize)]
struct EvenEdgeRow {
    source: String,
    target: String,
    #[serde(default)]
    reason: String,
}

/// Read every matchup edge from the store, render reason text from the
/// stored evidence records, and return rows sorted by key.
pub async fn fetch_matchup_rows(store: &GraphStore) -> Result<Vec<MatchupRow>, StoreError> {
    let mut rows = Vec::new();
    for (table, kind) in [
        ("strong_against", MatchupKind::StrongAgainst),
        ("weak_against", MatchupKind::WeakAgainst),
    ] {
        let edges: Vec<CounterEdgeRow> = store
            .query_rows(
                &format!("SELECT source, target, evidence FROM {table}"),
                Vec::new(),
            )
            .await?;
        for edge in edges {
            rows.push(MatchupRow {
                source: edge.source,
                relationship: kind.as_str().to_string(),
                target: edge.target,
                evidence: edge.evidence.len() as u64,
                reason: render_reason(kind, &edge.evidence),
            });
        }
    }

    let evens: Vec<EvenEdgeRow> = store
        .query_rows("SELECT source, target, reason FROM even_against", Vec::new())
        .await?;
    for edge in evens {
        rows.push(MatchupRow {
            source: edge.source,
            relationship: MatchupKind::EvenAgainst.as_str().to_string(),
            target: edge.target,
            evidence: 0,
            reason: edge.reason,
        });
    }

    rows.sort_by(|a, b| {
        (&a.source, &a.relationship, &a.target).cmp(&(&b.source, &b.relationship, &b.target))
    });
    Ok(rows)
}

/// Write a relationship table as pretty JSON.
pub fn save_table(path: &Path, rows: &[MatchupRow]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let mut payload = serde_json::to_string_pretty(rows)?;
    payload.push('\n');
    fs::write(path, payload).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a previously exported relationship table.
pub fn load_table(path: &Path) -> Result<Vec<MatchupRow>, ExportError> {
    if !path.exists() {
        return Err(ExportError::Missing {
            path: path.to_path_buf(),
        });
    }
    let raw = fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Keyed difference between two relationship tables.
#[derive(Debug, Default, Clone)]
pub struct TableDiff {
    pub added: Vec<MatchupRow>,
    pub removed: Vec<MatchupRow>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Report rows whose key appears in only one table. Rows carry the
/// evidence/reason of the table they were found in; a changed payload on an
/// unchanged key is not a difference.
pub fn diff_tables(old: &[MatchupRow], new: &[MatchupRow]) -> TableDiff {
    let old_keys: std::collections::BTreeSet<_> = old.iter().map(|row| row.key()).collect();
    let new_keys: std::collections::BTreeSet<_> = new.iter().map(|row| row.key()).collect();

    let mut diff = TableDiff {
        added: new
            .iter()
            .filter(|row| !old_keys.contains(&row.key()))
            .cloned()
            .collect(),
        removed: old
            .iter()
            .filter(|row| !new_keys.contains(&row.key()))
            .cloned()
            .collect(),
    };
    diff.added.sort_by(|a, b| a.key().cmp(&b.key()));
    diff.removed.sort_by(|a, b| a.key().cmp(&b.key()));
    diff
}

/// Copy the current table into the history directory under a timestamped
/// name and return the destination path.
pub fn archive_table(
    table_path: &Path,
    history_dir: &Path,
    label: &str,
) -> Result<PathBuf, ExportError> {
    if !table_path.exists() {
        return Err(ExportError::Missing {
            path: table_path.to_path_buf(),
        });
    }
    fs::create_dir_all(history_dir).map_err(|source| ExportError::Io {
        path: history_dir.to_path_buf(),
        source,
    })?;
    let timestamp = chrono::Local::now().format("%Y-%m-%dT%H%M%S");
    let destination = history_dir.join(format!("{timestamp}_{label}.json"));
    fs::copy(table_path, &destination).map_err(|source| ExportError::Io {
        path: destination.clone(),
        source,
    })?;
    Ok(destination)
}
