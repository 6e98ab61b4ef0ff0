use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};

use matchup_core::config::StoreConfig;
use matchup_core::export::{
    build_snapshot, diff_tables, fetch_matchup_rows, write_snapshot, ExportInput, MatchupRow,
    NodeKind,
};
use matchup_core::model::{
    AbilityMechanics, Archetype, CharacterAbility, CharacterMeta, CharacterProfile, Mechanic,
    Roster, RosterEntry, EVEN_REASON,
};
use matchup_core::ops;
use matchup_core::GraphStore;

async fn mem_store() -> GraphStore {
    let config = StoreConfig {
        uri: "mem://".to_string(),
        ..StoreConfig::default()
    };
    let store = GraphStore::connect(&config).await.unwrap();
    ops::apply_schema(&store).await.unwrap();
    store
}

fn profile(
    name: &str,
    archetype: &str,
    abilities: &[(&str, &[&str], &[&str])],
) -> CharacterProfile {
    CharacterProfile {
        character: CharacterMeta {
            name: name.to_string(),
            archetype: archetype.to_string(),
            description: format!("{name} profile"),
            source_url: "https://example.test".to_string(),
            last_updated: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            aliases: Vec::new(),
        },
        abilities: abilities
            .iter()
            .map(|(ability, uses, counters)| CharacterAbility {
                name: (*ability).to_string(),
                slot: "Q".to_string(),
                kind: "active".to_string(),
                description: format!("{ability} description"),
                mechanics: AbilityMechanics {
                    uses: uses.iter().map(|s| s.to_string()).collect(),
                    counters: counters.iter().map(|s| s.to_string()).collect(),
                },
                notes: None,
            })
            .collect(),
    }
}

fn fixture_input(matchups: Vec<MatchupRow>) -> ExportInput {
    ExportInput {
        archetypes: vec![Archetype {
            name: "Duelist".to_string(),
            description: "Solo fighter.".to_string(),
            signature_traits: vec!["burst".to_string()],
            notes: None,
            sources: Vec::new(),
        }],
        mechanics: vec![Mechanic {
            name: "Shield".to_string(),
            category: "defense".to_string(),
            description: "Absorbs damage.".to_string(),
            archetype_implications: Vec::new(),
            sources: Vec::new(),
        }],
        roster: Roster {
            meta: BTreeMap::new(),
            characters: vec![
                RosterEntry {
                    name: "Alice".to_string(),
                    archetype: "Duelist".to_string(),
                    status: "complete".to_string(),
                    aliases: Vec::new(),
                },
                RosterEntry {
                    name: "Bob".to_string(),
                    archetype: "Duelist".to_string(),
                    status: "draft".to_string(),
                    aliases: Vec::new(),
                },
            ],
        },
        profiles: vec![
            profile("Alice", "Duelist", &[("Zap", &[], &["Shield"])]),
            profile("Bob", "Duelist", &[("Guard", &["Shield"], &[])]),
        ],
        matchups,
    }
}

fn matchup_row(source: &str, relationship: &str, target: &str, evidence: u64) -> MatchupRow {
    MatchupRow {
        source: source.to_string(),
        relationship: relationship.to_string(),
        target: target.to_string(),
        evidence,
        reason: "r".to_string(),
    }
}

#[tokio::test]
async fn fetched_rows_are_sorted_and_rendered() {
    let store = mem_store().await;
    ops::upsert_character(&store, &profile("Alice", "Duelist", &[("Zap", &[], &["Shield"])]))
        .await
        .unwrap();
    ops::upsert_character(&store, &profile("Bob", "Duelist", &[("Guard", &["Shield"], &[])]))
        .await
        .unwrap();
    ops::upsert_character(&store, &profile("Cara", "Duelist", &[("Blink", &["Teleport"], &[])]))
        .await
        .unwrap();
    ops::synthesize_matchups(&store).await.unwrap();

    let rows = fetch_matchup_rows(&store).await.unwrap();
    let keys: Vec<(String, String, String)> = rows
        .iter()
        .map(|row| {
            (
                row.source.clone(),
                row.relationship.clone(),
                row.target.clone(),
            )
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);

    let strong: Vec<&MatchupRow> = rows
        .iter()
        .filter(|row| row.relationship == "STRONG_AGAINST")
        .collect();
    assert_eq!(strong.len(), 1);
    assert_eq!(strong[0].source, "Alice");
    assert_eq!(strong[0].target, "Bob");
    assert_eq!(strong[0].evidence, 1);
    assert_eq!(strong[0].reason, "[Zap] counters [Guard via Shield]. ");

    let weak: Vec<&MatchupRow> = rows
        .iter()
        .filter(|row| row.relationship == "WEAK_AGAINST")
        .collect();
    assert_eq!(weak[0].reason, "[Guard] is countered by [Zap via Shield]. ");

    let evens: Vec<&MatchupRow> = rows
        .iter()
        .filter(|row| row.relationship == "EVEN_AGAINST")
        .collect();
    // Alice-Cara and Bob-Cara, both directions each.
    assert_eq!(evens.len(), 4);
    assert!(evens.iter().all(|row| row.reason == EVEN_REASON));
    assert!(evens.iter().all(|row| row.evidence == 0));
}

#[test]
fn snapshot_contains_all_node_kinds_with_roster_status() {
    let input = fixture_input(vec![matchup_row("Alice", "STRONG_AGAINST", "Bob", 1)]);
    let snapshot = build_snapshot(&input);

    assert_eq!(snapshot.meta.node_count, snapshot.nodes.len());
    assert_eq!(snapshot.meta.edge_count, snapshot.edges.len());
    assert_eq!(snapshot.meta.label_distribution["Character"], 2);
    assert_eq!(snapshot.meta.archetype_counts["Duelist"], 2);
    assert_eq!(snapshot.meta.mechanic_category_counts["defense"], 1);

    let alice = snapshot
        .nodes
        .iter()
        .find(|node| node.id == "character:Alice")
        .unwrap();
    assert_eq!(alice.label, NodeKind::Character);
    let rendered = serde_json::to_value(&alice.properties).unwrap();
    assert_eq!(rendered["status"], "complete");
    assert_eq!(rendered["mechanics_countered"][0], "Shield");

    let matchup = snapshot
        .edges
        .iter()
        .find(|edge| edge.relationship == "STRONG_AGAINST")
        .unwrap();
    assert_eq!(matchup.source, "character:Alice");
    assert_eq!(matchup.target, "character:Bob");
    assert_eq!(matchup.properties.evidence, Some(1));
}

#[test]
fn snapshot_indexes_cover_matchup_adjacency_and_degrees() {
    let input = fixture_input(vec![
        matchup_row("Alice", "STRONG_AGAINST", "Bob", 2),
        matchup_row("Bob", "WEAK_AGAINST", "Alice", 2),
    ]);
    let snapshot = build_snapshot(&input);

    assert_eq!(
        snapshot.indexes.strong_against["character:Alice"],
        vec!["character:Bob".to_string()]
    );
    assert_eq!(
        snapshot.indexes.weak_against["character:Bob"],
        vec!["character:Alice".to_string()]
    );
    assert_eq!(snapshot.indexes.mechanic_usage["Shield"], 1);
    assert_eq!(snapshot.indexes.mechanic_counter["Shield"], 1);

    // Every node appears in the neighbor index, even if isolated.
    for node in &snapshot.nodes {
        assert!(snapshot.indexes.neighbors.contains_key(&node.id));
    }
    // Degrees add up to the edge count on both sides.
    let total_out: usize = snapshot.indexes.degrees_out.values().sum();
    let total_in: usize = snapshot.indexes.degrees_in.values().sum();
    assert_eq!(total_out, snapshot.edges.len());
    assert_eq!(total_in, snapshot.edges.len());
}

#[test]
fn matchup_rows_naming_unknown_characters_are_skipped() {
    let input = fixture_input(vec![matchup_row("Alice", "STRONG_AGAINST", "Nobody", 1)]);
    let snapshot = build_snapshot(&input);
    assert!(!snapshot
        .edges
        .iter()
        .any(|edge| edge.relationship == "STRONG_AGAINST"));
}

#[test]
fn repeated_exports_are_position_stable() {
    let input = fixture_input(vec![matchup_row("Alice", "STRONG_AGAINST", "Bob", 1)]);
    let first = build_snapshot(&input);
    let second = build_snapshot(&input);

    let positions = |snapshot: &matchup_core::export::GraphSnapshot| {
        snapshot
            .nodes
            .iter()
            .map(|node| (node.id.clone(), node.x, node.y))
            .collect::<Vec<_>>()
    };
    assert_eq!(positions(&first), positions(&second));
}

#[test]
fn snapshot_round_trips_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/graph.json");
    let snapshot = build_snapshot(&fixture_input(Vec::new()));
    write_snapshot(&snapshot, &path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let reloaded: matchup_core::export::GraphSnapshot = serde_json::from_str(&raw).unwrap();
    assert_eq!(reloaded.nodes.len(), snapshot.nodes.len());
    assert_eq!(reloaded.edges.len(), snapshot.edges.len());
}

#[tokio::test]
async fn export_after_resynthesis_is_key_stable() {
    let store = mem_store().await;
    ops::upsert_character(&store, &profile("Alice", "Duelist", &[("Zap", &[], &["Shield"])]))
        .await
        .unwrap();
    ops::upsert_character(&store, &profile("Bob", "Duelist", &[("Guard", &["Shield"], &[])]))
        .await
        .unwrap();

    ops::clear_synthesized_matchups(&store).await.unwrap();
    ops::synthesize_matchups(&store).await.unwrap();
    let first = fetch_matchup_rows(&store).await.unwrap();

    ops::clear_synthesized_matchups(&store).await.unwrap();
    ops::synthesize_matchups(&store).await.unwrap();
    let second = fetch_matchup_rows(&store).await.unwrap();

    assert_eq!(first, second);
    assert!(diff_tables(&first, &second).is_empty());
}
