//! Matchup synthesis: derives directed STRONG/WEAK/EVEN relationships
//! between characters from ability/mechanic overlap.
//!
//! The join runs in memory over adjacency rows fetched from the store:
//! ability ownership (`has_ability`) crossed with `counters_mechanic` and
//! `uses_mechanic`. Evidence accumulates in `BTreeMap` folds, so the order
//! of evidence records is stable across runs. Writes append to any existing
//! evidence, making repeated synthesis without a clear additive; run
//! [`clear_synthesized_matchups`] first for a fresh derivation.
//!
//! The two passes are independent store operations. A crash between them
//! leaves a valid, partially synthesized graph that a re-run completes.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::graph::{GraphStore, Params, StoreError};
use crate::model::{Evidence, EVEN_REASON};

#[derive(Debug, Deserialize)]
struct OwnerRow {
    character: String,
    ability: String,
}

#[derive(Debug, Deserialize)]
struct MechanicEdgeRow {
    ability: String,
    mechanic: String,
}

#[derive(Debug, Deserialize)]
struct NameRow {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PairRow {
    source: String,
    target: String,
}

/// Totals reported after a synthesis run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchupSummary {
    /// Directed pairs that received STRONG_AGAINST (and mirrored WEAK) edges.
    pub strong_pairs: usize,
    /// Unordered pairs that fell back to mutual EVEN_AGAINST.
    pub even_pairs: usize,
    /// Evidence records written across all strong pairs.
    pub evidence_records: usize,
}

/// Delete every synthesized matchup edge, leaving all other state untouched.
pub async fn clear_synthesized_matchups(store: &GraphStore) -> Result<(), StoreError> {
    store
        .execute(
            "DELETE strong_against; DELETE weak_against; DELETE even_against",
            Vec::new(),
        )
        .await
}

/// Derive matchup edges for every pair of distinct characters.
pub async fn synthesize_matchups(store: &GraphStore) -> Result<MatchupSummary, StoreError> {
    let evidence = collect_counter_evidence(store).await?;
    let mut summary = MatchupSummary {
        strong_pairs: evidence.len(),
        ..MatchupSummary::default()
    };
    for ((source, target), records) in &evidence {
        summary.evidence_records += records.len();
        write_counter_pair(store, source, target, records).await?;
    }
    summary.even_pairs = fallback_pass(store).await?;
    tracing::debug!(
        strong = summary.strong_pairs,
        even = summary.even_pairs,
        evidence = summary.evidence_records,
        "matchup synthesis complete"
    );
    Ok(summary)
}

/// Counter pass input: for every counter triple (C1, A1, M) and use triple
/// (C2, A2, M) with C1 != C2, one evidence record on the ordered (C1, C2)
/// pair. Multiplicity is preserved - independent ability pairs each count.
async fn collect_counter_evidence(
    store: &GraphStore,
) -> Result<BTreeMap<(String, String), Vec<Evidence>>, StoreError> {
    let owner_rows: Vec<OwnerRow> = store
        .query_rows("SELECT character, ability FROM has_ability", Vec::new())
        .await?;
    let counter_rows: Vec<MechanicEdgeRow> = store
        .query_rows("SELECT ability, mechanic FROM counters_mechanic", Vec::new())
        .await?;
    let use_rows: Vec<MechanicEdgeRow> = store
        .query_rows("SELECT ability, mechanic FROM uses_mechanic", Vec::new())
        .await?;

    // Abilities are interned by name, so one ability may belong to several
    // characters; every owner contributes a triple.
    let mut owners: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for row in owner_rows {
        owners.entry(row.ability).or_default().insert(row.character);
    }

    let mut users: BTreeMap<String, BTreeSet<(String, String)>> = BTreeMap::new();
    for row in &use_rows {
        if let Some(characters) = owners.get(&row.ability) {
            for character in characters {
                users
                    .entry(row.mechanic.clone())
                    .or_default()
                    .insert((character.clone(), row.ability.clone()));
            }
        }
    }

    let mut counters: BTreeSet<(String, String, String)> = BTreeSet::new();
    for row in &counter_rows {
        if let Some(characters) = owners.get(&row.ability) {
            for character in characters {
                counters.insert((row.mechanic.clone(), character.clone(), row.ability.clone()));
            }
        }
    }

    let mut evidence: BTreeMap<(String, String), Vec<Evidence>> = BTreeMap::new();
    for (mechanic, counter_character, counter_ability) in &counters {
        let Some(matching) = users.get(mechanic) else {
            continue;
        };
        for (user_character, countered_ability) in matching {
            if user_character == counter_character {
                continue;
            }
            evidence
                .entry((counter_character.clone(), user_character.clone()))
                .or_default()
                .push(Evidence {
                    counter_ability: counter_ability.clone(),
                    countered_ability: countered_ability.clone(),
                    mechanic: mechanic.clone(),
                });
        }
    }
    Ok(evidence)
}

const UPSERT_STRONG: &str = r#"
UPSERT type::thing('strong_against', [$source, $target]) SET
    source = $source,
    target = $target,
    evidence = array::concat(evidence ?? [], $records),
    evidence_count = (evidence_count ?? 0) + $count
"#;

const UPSERT_WEAK: &str = r#"
UPSERT type::thing('weak_against', [$target, $source]) SET
    source = $target,
    target = $source,
    evidence = array::concat(evidence ?? [], $records),
    evidence_count = (evidence_count ?? 0) + $count
"#;

/// Write one STRONG edge and its mirrored WEAK edge in a single transaction
/// so their evidence counts can never diverge.
async fn write_counter_pair(
    store: &GraphStore,
    source: &str,
    target: &str,
    records: &[Evidence],
) -> Result<(), StoreError> {
    let params: Params = vec![
        ("source", serde_json::Value::from(source)),
        ("target", serde_json::Value::from(target)),
        ("records", serde_json::to_value(records)?),
        ("count", serde_json::Value::from(records.len() as u64)),
    ];
    store
        .execute_transactional(&[UPSERT_STRONG, UPSERT_WEAK], params)
        .await
}

const UPSERT_EVEN: &str = r#"
UPSERT type::thing('even_against', [$source, $target]) SET
    source = $source,
    target = $target,
    reason = $reason
"#;

const UPSERT_EVEN_REVERSE: &str = r#"
UPSERT type::thing('even_against', [$target, $source]) SET
    source = $target,
    target = $source,
    reason = $reason
"#;

/// Fallback pass: every unordered pair with no STRONG/WEAK edge in either
/// direction receives EVEN_AGAINST edges both ways. STRONG/WEAK and EVEN are
/// mutually exclusive per unordered pair.
async fn fallback_pass(store: &GraphStore) -> Result<usize, StoreError> {
    let mut names: Vec<String> = store
        .query_rows::<NameRow>("SELECT name FROM character", Vec::new())
        .await?
        .into_iter()
        .map(|row| row.name)
        .collect();
    names.sort();

    let mut resolved: BTreeSet<(String, String)> = BTreeSet::new();
    for table in ["strong_against", "weak_against"] {
        let pairs: Vec<PairRow> = store
            .query_rows(&format!("SELECT source, target FROM {table}"), Vec::new())
            .await?;
        for pair in pairs {
            resolved.insert(unordered(pair.source, pair.target));
        }
    }

    let mut even_pairs = 0usize;
    for (i, a) in names.iter().enumerate() {
        for b in names.iter().skip(i + 1) {
            if resolved.contains(&(a.clone(), b.clone())) {
                continue;
            }
            let params: Params = vec![
                ("source", serde_json::Value::from(a.as_str())),
                ("target", serde_json::Value::from(b.as_str())),
                ("reason", serde_json::Value::from(EVEN_REASON)),
            ];
            store
                .execute_transactional(&[UPSERT_EVEN, UPSERT_EVEN_REVERSE], params)
                .await?;
            even_pairs += 1;
        }
    }
    Ok(even_pairs)
}

fn unordered(a: String, b: String) -> (String, String) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
