//! Write operations that translate domain records into store mutations.
//!
//! Node and edge identity is structural: record ids are derived from names
//! (composite ids for edges), so repeating an ingestion never duplicates
//! rows. Mechanics referenced before their full definition is loaded are
//! created as name-only stubs.

use serde::Serialize;

use crate::graph::{GraphStore, StoreError};
use crate::model::{Archetype, CharacterProfile, Mechanic};

/// Idempotent uniqueness declarations for the node tables and the edge
/// tables. Safe to run repeatedly.
const SCHEMA_STATEMENTS: &[&str] = &[
    "DEFINE TABLE IF NOT EXISTS character SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS character_name ON character FIELDS name UNIQUE",
    "DEFINE TABLE IF NOT EXISTS ability SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS ability_name ON ability FIELDS name UNIQUE",
    "DEFINE TABLE IF NOT EXISTS archetype SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS archetype_name ON archetype FIELDS name UNIQUE",
    "DEFINE TABLE IF NOT EXISTS mechanic SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS mechanic_name ON mechanic FIELDS name UNIQUE",
    "DEFINE TABLE IF NOT EXISTS is_archetype SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS is_archetype_pair ON is_archetype FIELDS character, archetype UNIQUE",
    "DEFINE TABLE IF NOT EXISTS has_ability SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS has_ability_pair ON has_ability FIELDS character, ability UNIQUE",
    "DEFINE TABLE IF NOT EXISTS uses_mechanic SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS uses_mechanic_pair ON uses_mechanic FIELDS ability, mechanic UNIQUE",
    "DEFINE TABLE IF NOT EXISTS counters_mechanic SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS counters_mechanic_pair ON counters_mechanic FIELDS ability, mechanic UNIQUE",
    "DEFINE TABLE IF NOT EXISTS character_counters_mechanic SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS character_counters_mechanic_pair ON character_counters_mechanic FIELDS character, mechanic UNIQUE",
    "DEFINE TABLE IF NOT EXISTS strong_against SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS strong_against_pair ON strong_against FIELDS source, target UNIQUE",
    "DEFINE TABLE IF NOT EXISTS weak_against SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS weak_against_pair ON weak_against FIELDS source, target UNIQUE",
    "DEFINE TABLE IF NOT EXISTS even_against SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS even_against_pair ON even_against FIELDS source, target UNIQUE",
];

/// Declare uniqueness constraints for every node and edge table.
pub async fn apply_schema(store: &GraphStore) -> Result<(), StoreError> {
    for statement in SCHEMA_STATEMENTS {
        store.execute(statement, Vec::new()).await?;
    }
    Ok(())
}

const UPSERT_ARCHETYPES: &str = r#"
FOR $row IN $rows {
    UPSERT type::thing('archetype', $row.name) SET
        name = $row.name,
        description = $row.description,
        signature_traits = $row.signature_traits,
        notes = $row.notes,
        sources = $row.sources;
}
"#;

/// Bulk upsert archetypes by name. No statement is issued for empty input.
pub async fn upsert_archetypes(
    store: &GraphStore,
    archetypes: &[Archetype],
) -> Result<(), StoreError> {
    if archetypes.is_empty() {
        return Ok(());
    }
    let rows = serde_json::to_value(archetypes)?;
    store.execute(UPSERT_ARCHETYPES, vec![("rows", rows)]).await
}

const UPSERT_MECHANICS: &str = r#"
FOR $row IN $rows {
    UPSERT type::thing('mechanic', $row.name) SET
        name = $row.name,
        category = $row.category,
        description = $row.description,
        archetype_implications = $row.archetype_implications,
        sources = $row.sources;
}
"#;

/// Bulk upsert mechanics by name. No statement is issued for empty input.
pub async fn upsert_mechanics(store: &GraphStore, mechanics: &[Mechanic]) -> Result<(), StoreError> {
    if mechanics.is_empty() {
        return Ok(());
    }
    let rows = serde_json::to_value(mechanics)?;
    store.execute(UPSERT_MECHANICS, vec![("rows", rows)]).await
}

const UPSERT_CHARACTER: &str = r#"
UPSERT type::thing('character', $character.slug) SET
    name = $character.name,
    description = $character.description,
    source_url = $character.source_url,
    last_updated = $character.last_updated,
    aliases = $character.aliases
"#;

// The archetype link is only written when the archetype node already
// exists; a dangling reference is left for validation to report.
const LINK_ARCHETYPE: &str = r#"
IF record::exists(type::thing('archetype', $character.archetype)) {
    UPSERT type::thing('is_archetype', [$character.name, $character.archetype]) SET
        character = $character.name,
        archetype = $character.archetype;
}
"#;

const UPSERT_ABILITIES: &str = r#"
FOR $ability IN $abilities {
    UPSERT type::thing('ability', $ability.name) SET
        name = $ability.name,
        slot = $ability.slot,
        ability_type = $ability.ability_type,
        description = $ability.description,
        notes = $ability.notes;
    UPSERT type::thing('has_ability', [$character.name, $ability.name]) SET
        character = $character.name,
        ability = $ability.name,
        slot = $ability.slot,
        ability_type = $ability.ability_type;
    FOR $mechanic IN $ability.uses {
        UPSERT type::thing('mechanic', $mechanic) SET name = $mechanic;
        UPSERT type::thing('uses_mechanic', [$ability.name, $mechanic]) SET
            ability = $ability.name,
            mechanic = $mechanic;
    };
    FOR $mechanic IN $ability.counters {
        UPSERT type::thing('mechanic', $mechanic) SET name = $mechanic;
        UPSERT type::thing('counters_mechanic', [$ability.name, $mechanic]) SET
            ability = $ability.name,
            mechanic = $mechanic;
        UPSERT type::thing('character_counters_mechanic', [$character.name, $mechanic]) SET
            character = $character.name,
            mechanic = $mechanic;
    };
}
"#;

#[derive(Serialize)]
struct CharacterParam<'a> {
    slug: String,
    name: &'a str,
    archetype: &'a str,
    description: &'a str,
    source_url: &'a str,
    last_updated: String,
    aliases: &'a [String],
}

#[derive(Serialize)]
struct AbilityParam<'a> {
    name: &'a str,
    slot: &'a str,
    ability_type: &'a str,
    description: &'a str,
    notes: Option<&'a str>,
    uses: &'a [String],
    counters: &'a [String],
}

/// Ingest one character profile as a single transaction: the character node,
/// its archetype link, its abilities with slot/type edges, mechanic stubs,
/// `uses`/`counters` edges, and the materialized character-counters-mechanic
/// shortcut. A failure anywhere rolls the whole character back.
pub async fn upsert_character(
    store: &GraphStore,
    profile: &CharacterProfile,
) -> Result<(), StoreError> {
    let meta = &profile.character;
    let character = serde_json::to_value(CharacterParam {
        slug: meta.slug(),
        name: &meta.name,
        archetype: &meta.archetype,
        description: &meta.description,
        source_url: &meta.source_url,
        last_updated: meta.last_updated.to_rfc3339(),
        aliases: &meta.aliases,
    })?;
    let abilities = serde_json::to_value(
        profile
            .abilities
            .iter()
            .map(|ability| AbilityParam {
                name: &ability.name,
                slot: &ability.slot,
                ability_type: &ability.kind,
                description: &ability.description,
                notes: ability.notes.as_deref(),
                uses: &ability.mechanics.uses,
                counters: &ability.mechanics.counters,
            })
            .collect::<Vec<_>>(),
    )?;

    tracing::debug!(character = meta.name.as_str(), "ingesting character");
    store
        .execute_transactional(
            &[UPSERT_CHARACTER, LINK_ARCHETYPE, UPSERT_ABILITIES],
            vec![("character", character), ("abilities", abilities)],
        )
        .await
}
