use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

use matchup_core::config::StoreConfig;
use matchup_core::model::{AbilityMechanics, CharacterAbility, CharacterMeta, CharacterProfile};
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
    abilities: &[(&str, &[&str], &[&str])],
) -> CharacterProfile {
    CharacterProfile {
        character: CharacterMeta {
            name: name.to_string(),
            archetype: "Duelist".to_string(),
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

/// The store returns projected-but-absent fields as an explicit `None`,
/// which `#[serde(default)]` alone does not cover.
fn none_as_zero<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct EdgeRow {
    source: String,
    target: String,
    #[serde(default, deserialize_with = "none_as_zero")]
    evidence_count: u64,
}

async fn edges(store: &GraphStore, table: &str) -> Vec<EdgeRow> {
    let mut rows: Vec<EdgeRow> = store
        .query_rows(
            &format!("SELECT source, target, evidence_count FROM {table}"),
            Vec::new(),
        )
        .await
        .unwrap();
    rows.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
    rows
}

#[tokio::test]
async fn counter_pass_produces_mirrored_strong_weak() {
    let store = mem_store().await;
    // Alice's Zap counters Shield; Bob's Guard uses Shield.
    ops::upsert_character(&store, &profile("Alice", &[("Zap", &[], &["Shield"])]))
        .await
        .unwrap();
    ops::upsert_character(&store, &profile("Bob", &[("Guard", &["Shield"], &[])]))
        .await
        .unwrap();

    let summary = ops::synthesize_matchups(&store).await.unwrap();
    assert_eq!(summary.strong_pairs, 1);
    assert_eq!(summary.even_pairs, 0);
    assert_eq!(summary.evidence_records, 1);

    let strong = edges(&store, "strong_against").await;
    assert_eq!(strong.len(), 1);
    assert_eq!(strong[0].source, "Alice");
    assert_eq!(strong[0].target, "Bob");
    assert_eq!(strong[0].evidence_count, 1);

    let weak = edges(&store, "weak_against").await;
    assert_eq!(weak.len(), 1);
    assert_eq!(weak[0].source, "Bob");
    assert_eq!(weak[0].target, "Alice");
    assert_eq!(weak[0].evidence_count, 1);

    assert!(edges(&store, "even_against").await.is_empty());
}

#[tokio::test]
async fn no_overlap_falls_back_to_mutual_even() {
    let store = mem_store().await;
    ops::upsert_character(&store, &profile("Alice", &[("Zap", &["Lightning"], &[])]))
        .await
        .unwrap();
    ops::upsert_character(&store, &profile("Bob", &[("Guard", &["Shield"], &[])]))
        .await
        .unwrap();

    let summary = ops::synthesize_matchups(&store).await.unwrap();
    assert_eq!(summary.strong_pairs, 0);
    assert_eq!(summary.even_pairs, 1);

    let even = edges(&store, "even_against").await;
    assert_eq!(even.len(), 2);
    assert_eq!(even[0].source, "Alice");
    assert_eq!(even[0].target, "Bob");
    assert_eq!(even[1].source, "Bob");
    assert_eq!(even[1].target, "Alice");
    assert!(edges(&store, "strong_against").await.is_empty());
    assert!(edges(&store, "weak_against").await.is_empty());
}

#[tokio::test]
async fn every_pair_has_exactly_one_relation() {
    let store = mem_store().await;
    ops::upsert_character(&store, &profile("Alice", &[("Zap", &[], &["Shield"])]))
        .await
        .unwrap();
    ops::upsert_character(&store, &profile("Bob", &[("Guard", &["Shield"], &[])]))
        .await
        .unwrap();
    ops::upsert_character(&store, &profile("Cara", &[("Blink", &["Teleport"], &[])]))
        .await
        .unwrap();

    ops::synthesize_matchups(&store).await.unwrap();

    let mut relations: BTreeMap<(String, String), Vec<&'static str>> = BTreeMap::new();
    for (table, kind) in [
        ("strong_against", "STRONG"),
        ("weak_against", "WEAK"),
        ("even_against", "EVEN"),
    ] {
        for edge in edges(&store, table).await {
            relations
                .entry((edge.source, edge.target))
                .or_default()
                .push(kind);
        }
    }

    let names = ["Alice", "Bob", "Cara"];
    for a in names {
        for b in names {
            if a == b {
                continue;
            }
            let kinds = relations
                .get(&(a.to_string(), b.to_string()))
                .unwrap_or_else(|| panic!("no relation for ({a}, {b})"));
            assert_eq!(kinds.len(), 1, "({a}, {b}) has {kinds:?}");
        }
    }
}

#[tokio::test]
async fn independent_counters_accumulate_evidence() {
    let store = mem_store().await;
    // Two of Alice's abilities counter Shield independently.
    ops::upsert_character(
        &store,
        &profile(
            "Alice",
            &[("Zap", &[], &["Shield"]), ("Pierce", &[], &["Shield"])],
        ),
    )
    .await
    .unwrap();
    ops::upsert_character(&store, &profile("Bob", &[("Guard", &["Shield"], &[])]))
        .await
        .unwrap();

    let summary = ops::synthesize_matchups(&store).await.unwrap();
    assert_eq!(summary.evidence_records, 2);

    let strong = edges(&store, "strong_against").await;
    assert_eq!(strong[0].evidence_count, 2);
    let weak = edges(&store, "weak_against").await;
    assert_eq!(weak[0].evidence_count, 2);
}

#[tokio::test]
async fn synthesis_without_clear_is_additive() {
    let store = mem_store().await;
    ops::upsert_character(&store, &profile("Alice", &[("Zap", &[], &["Shield"])]))
        .await
        .unwrap();
    ops::upsert_character(&store, &profile("Bob", &[("Guard", &["Shield"], &[])]))
        .await
        .unwrap();

    ops::synthesize_matchups(&store).await.unwrap();
    ops::synthesize_matchups(&store).await.unwrap();

    let strong = edges(&store, "strong_against").await;
    assert_eq!(strong.len(), 1);
    assert_eq!(strong[0].evidence_count, 2);
}

#[tokio::test]
async fn clear_then_synthesize_is_idempotent() {
    let store = mem_store().await;
    ops::upsert_character(&store, &profile("Alice", &[("Zap", &[], &["Shield"])]))
        .await
        .unwrap();
    ops::upsert_character(&store, &profile("Bob", &[("Guard", &["Shield"], &[])]))
        .await
        .unwrap();
    ops::upsert_character(&store, &profile("Cara", &[("Blink", &["Teleport"], &[])]))
        .await
        .unwrap();

    let mut snapshots = Vec::new();
    for _ in 0..3 {
        ops::clear_synthesized_matchups(&store).await.unwrap();
        ops::synthesize_matchups(&store).await.unwrap();
        let mut snapshot = Vec::new();
        for table in ["strong_against", "weak_against", "even_against"] {
            for edge in edges(&store, table).await {
                snapshot.push((
                    table.to_string(),
                    edge.source,
                    edge.target,
                    edge.evidence_count,
                ));
            }
        }
        snapshots.push(snapshot);
    }
    assert_eq!(snapshots[0], snapshots[1]);
    assert_eq!(snapshots[1], snapshots[2]);
}

#[tokio::test]
async fn clear_leaves_base_graph_untouched() {
    let store = mem_store().await;
    ops::upsert_character(&store, &profile("Alice", &[("Zap", &[], &["Shield"])]))
        .await
        .unwrap();
    ops::upsert_character(&store, &profile("Bob", &[("Guard", &["Shield"], &[])]))
        .await
        .unwrap();
    ops::synthesize_matchups(&store).await.unwrap();

    ops::clear_synthesized_matchups(&store).await.unwrap();

    assert!(edges(&store, "strong_against").await.is_empty());
    assert!(edges(&store, "weak_against").await.is_empty());
    assert!(edges(&store, "even_against").await.is_empty());

    #[derive(Deserialize)]
    struct NameRow {
        #[allow(dead_code)]
        name: String,
    }
    let characters: Vec<NameRow> = store
        .query_rows("SELECT name FROM character", Vec::new())
        .await
        .unwrap();
    assert_eq!(characters.len(), 2);
}

#[tokio::test]
async fn self_counter_does_not_create_an_edge() {
    let store = mem_store().await;
    // Alice both uses and counters Shield; no self matchup may appear.
    ops::upsert_character(
        &store,
        &profile(
            "Alice",
            &[("Zap", &[], &["Shield"]), ("Bubble", &["Shield"], &[])],
        ),
    )
    .await
    .unwrap();

    let summary = ops::synthesize_matchups(&store).await.unwrap();
    assert_eq!(summary.strong_pairs, 0);
    assert!(edges(&store, "strong_against").await.is_empty());
    assert!(edges(&store, "even_against").await.is_empty());
}
