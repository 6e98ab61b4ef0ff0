//! Read-only consistency checks.
//!
//! Gaps found here are data, not failure: every check returns the offending
//! names and leaves acting on them to the caller.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::graph::{GraphStore, StoreError};
use crate::source;
use crate::source::SourceError;

use super::OpsError;

#[derive(Debug, Deserialize)]
struct NameRow {
    name: String,
}

/// Validation gaps in the store. Empty lists mean the check passed.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ValidationReport {
    /// Characters with no archetype link.
    pub characters_missing_archetype: Vec<String>,
    /// Characters with no ability at all.
    pub characters_missing_abilities: Vec<String>,
    /// Abilities with neither a uses nor a counters edge.
    pub abilities_missing_analysis: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.characters_missing_archetype.is_empty()
            && self.characters_missing_abilities.is_empty()
            && self.abilities_missing_analysis.is_empty()
    }
}

async fn fetch_name_set(
    store: &GraphStore,
    table: &str,
    field: &str,
) -> Result<BTreeSet<String>, StoreError> {
    let rows: Vec<NameRow> = store
        .query_rows(&format!("SELECT {field} AS name FROM {table}"), Vec::new())
        .await?;
    Ok(rows.into_iter().map(|row| row.name).collect())
}

/// Run the three structural checks as set differences over fetched rows.
pub async fn run_validation_queries(store: &GraphStore) -> Result<ValidationReport, StoreError> {
    let characters = fetch_name_set(store, "character", "name").await?;
    let abilities = fetch_name_set(store, "ability", "name").await?;
    let linked = fetch_name_set(store, "is_archetype", "character").await?;
    let with_abilities = fetch_name_set(store, "has_ability", "character").await?;
    let mut analyzed = fetch_name_set(store, "uses_mechanic", "ability").await?;
    analyzed.extend(fetch_name_set(store, "counters_mechanic", "ability").await?);

    Ok(ValidationReport {
        characters_missing_archetype: characters.difference(&linked).cloned().collect(),
        characters_missing_abilities: characters.difference(&with_abilities).cloned().collect(),
        abilities_missing_analysis: abilities.difference(&analyzed).cloned().collect(),
    })
}

/// Name sets for the three drift-checked entity kinds.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntityNames {
    pub characters: BTreeSet<String>,
    pub abilities: BTreeSet<String>,
    pub mechanics: BTreeSet<String>,
}

/// Set difference between the source files and the store for one entity kind.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SetDiff {
    pub source_count: usize,
    pub store_count: usize,
    pub missing_in_store: Vec<String>,
    pub missing_in_source: Vec<String>,
}

impl SetDiff {
    fn between(source: &BTreeSet<String>, store: &BTreeSet<String>) -> Self {
        Self {
            source_count: source.len(),
            store_count: store.len(),
            missing_in_store: source.difference(store).cloned().collect(),
            missing_in_source: store.difference(source).cloned().collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.missing_in_store.is_empty() && self.missing_in_source.is_empty()
    }
}

/// Drift between the curated files and the store contents.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DriftReport {
    pub characters: SetDiff,
    pub abilities: SetDiff,
    pub mechanics: SetDiff,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.characters.is_clean() && self.abilities.is_clean() && self.mechanics.is_clean()
    }
}

/// Collect the names known from the source files.
pub fn collect_source_state(data_root: &Path) -> Result<EntityNames, SourceError> {
    let profiles = source::load_character_profiles(&data_root.join("characters"))?;
    let mut names = EntityNames::default();
    for profile in &profiles {
        names.characters.insert(profile.character.name.clone());
        for ability in &profile.abilities {
            names.abilities.insert(ability.name.clone());
        }
    }
    for mechanic in source::load_mechanics(&data_root.join("mechanics.yaml"))? {
        names.mechanics.insert(mechanic.name);
    }
    Ok(names)
}

/// Collect the names present in the store.
pub async fn collect_store_state(store: &GraphStore) -> Result<EntityNames, StoreError> {
    Ok(EntityNames {
        characters: fetch_name_set(store, "character", "name").await?,
        abilities: fetch_name_set(store, "ability", "name").await?,
        mechanics: fetch_name_set(store, "mechanic", "name").await?,
    })
}

/// Compare source-file names against store contents in both directions.
/// Pure comparison; nothing is mutated.
pub async fn check_drift(data_root: &Path, store: &GraphStore) -> Result<DriftReport, OpsError> {
    let source_state = collect_source_state(data_root)?;
    let store_state = collect_store_state(store).await?;
    Ok(DriftReport {
        characters: SetDiff::between(&source_state.characters, &store_state.characters),
        abilities: SetDiff::between(&source_state.abilities, &store_state.abilities),
        mechanics: SetDiff::between(&source_state.mechanics, &store_state.mechanics),
    })
}
