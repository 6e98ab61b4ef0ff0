//! Static graph artifact for the companion website.
//!
//! Flattens the curated sources plus a relationship table into one JSON
//! document: nodes with layout positions, edges, and precomputed indexes
//! (degrees, neighbor lists, per-relationship adjacency, mechanic usage).
//! Node and edge properties are typed records with a closed field set plus
//! one open `extra` map for forward compatibility.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{Archetype, CharacterProfile, Mechanic, Roster};
use crate::source;
use crate::source::SourceError;

use super::layout::{spring_layout, LAYOUT_ITERATIONS, LAYOUT_SEED};
use super::matchups::MatchupRow;
use super::ExportError;

const ARCHETYPE_SIZE: f64 = 2.5;
const CHARACTER_SIZE: f64 = 2.0;
const MECHANIC_SIZE: f64 = 1.5;
const ABILITY_SIZE: f64 = 1.0;

/// Everything the exporter needs: the four source documents plus the
/// relationship table produced by synthesis.
#[derive(Debug, Clone)]
pub struct ExportInput {
    pub archetypes: Vec<Archetype>,
    pub mechanics: Vec<Mechanic>,
    pub roster: Roster,
    pub profiles: Vec<CharacterProfile>,
    pub matchups: Vec<MatchupRow>,
}

/// Load the source documents under `data_root` and attach a relationship
/// table (pass an empty slice to export without matchup edges).
pub fn load_export_input(
    data_root: &Path,
    matchups: Vec<MatchupRow>,
) -> Result<ExportInput, SourceError> {
    Ok(ExportInput {
        archetypes: source::load_archetypes(&data_root.join("archetypes.yaml"))?,
        mechanics: source::load_mechanics(&data_root.join("mechanics.yaml"))?,
        roster: source::load_roster(&data_root.join("character_list.yaml"))?,
        profiles: source::load_character_profiles(&data_root.join("characters"))?,
        matchups,
    })
}

/// Node kinds of the exported graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Archetype,
    Mechanic,
    Ability,
    Character,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Archetype => "Archetype",
            NodeKind::Mechanic => "Mechanic",
            NodeKind::Ability => "Ability",
            NodeKind::Character => "Character",
        }
    }
}

/// An ability reference on a character node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub name: String,
    pub slot: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Typed per-kind node properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeProperties {
    Archetype {
        name: String,
        description: String,
        signature_traits: Vec<String>,
        notes: Option<String>,
        sources: Vec<String>,
        #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty", default)]
        extra: BTreeMap<String, serde_json::Value>,
    },
    Mechanic {
        name: String,
        description: String,
        category: String,
        archetype_implications: Vec<String>,
        sources: Vec<String>,
        #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty", default)]
        extra: BTreeMap<String, serde_json::Value>,
    },
    Ability {
        name: String,
        slot: String,
        #[serde(rename = "type")]
        kind: String,
        description: String,
        notes: Option<String>,
        #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty", default)]
        extra: BTreeMap<String, serde_json::Value>,
    },
    Character {
        name: String,
        description: String,
        archetype: String,
        status: Option<String>,
        aliases: Vec<String>,
        source_url: String,
        last_updated: String,
        abilities: Vec<String>,
        ability_slots: Vec<AbilitySlot>,
        mechanics_used: Vec<String>,
        mechanics_countered: Vec<String>,
        #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty", default)]
        extra: BTreeMap<String, serde_json::Value>,
    },
}

/// One exported node with a 2-D layout position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: NodeKind,
    pub properties: NodeProperties,
    pub size: f64,
    pub x: f64,
    pub y: f64,
}

/// Typed edge properties: known fields plus an open `extra` map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ability_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty", default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One exported edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub relationship: String,
    pub properties: EdgeProperties,
}

/// Summary block of the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMeta {
    pub generated_at: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub label_distribution: BTreeMap<String, usize>,
    pub archetype_counts: BTreeMap<String, usize>,
    pub mechanic_category_counts: BTreeMap<String, usize>,
}

/// Precomputed client-side indexes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphIndexes {
    pub degrees_in: BTreeMap<String, usize>,
    pub degrees_out: BTreeMap<String, usize>,
    pub neighbors: BTreeMap<String, Vec<String>>,
    pub strong_against: BTreeMap<String, Vec<String>>,
    pub weak_against: BTreeMap<String, Vec<String>>,
    pub even_against: BTreeMap<String, Vec<String>>,
    pub mechanic_usage: BTreeMap<String, usize>,
    pub mechanic_counter: BTreeMap<String, usize>,
}

/// The full exported document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub meta: GraphMeta,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub indexes: GraphIndexes,
}

/// Flatten the input into the exported document. Pure and deterministic
/// apart from the `generated_at` stamp: nodes, edges, indexes and layout
/// positions are identical for identical input.
pub fn build_snapshot(input: &ExportInput) -> GraphSnapshot {
    let archetypes: BTreeMap<&str, &Archetype> = input
        .archetypes
        .iter()
        .map(|archetype| (archetype.name.as_str(), archetype))
        .collect();
    let mechanics: BTreeMap<&str, &Mechanic> = input
        .mechanics
        .iter()
        .map(|mechanic| (mechanic.name.as_str(), mechanic))
        .collect();
    let profiles: BTreeMap<&str, &CharacterProfile> = input
        .profiles
        .iter()
        .map(|profile| (profile.character.name.as_str(), profile))
        .collect();
    let roster_status: BTreeMap<&str, &str> = input
        .roster
        .characters
        .iter()
        .map(|entry| (entry.name.as_str(), entry.status.as_str()))
        .collect();

    let mut nodes: Vec<GraphNode> = Vec::new();
    let mut seen_nodes: BTreeSet<String> = BTreeSet::new();
    let mut push_node = |nodes: &mut Vec<GraphNode>,
                         seen: &mut BTreeSet<String>,
                         id: String,
                         label: NodeKind,
                         properties: NodeProperties,
                         size: f64| {
        if seen.insert(id.clone()) {
            nodes.push(GraphNode {
                id,
                label,
                properties,
                size,
                x: 0.0,
                y: 0.0,
            });
        }
    };

    for archetype in archetypes.values() {
        push_node(
            &mut nodes,
            &mut seen_nodes,
            format!("archetype:{}", archetype.name),
            NodeKind::Archetype,
            NodeProperties::Archetype {
                name: archetype.name.clone(),
                description: archetype.description.clone(),
                signature_traits: archetype.signature_traits.clone(),
                notes: archetype.notes.clone(),
                sources: archetype.sources.clone(),
                extra: BTreeMap::new(),
            },
            ARCHETYPE_SIZE,
        );
    }

    for mechanic in mechanics.values() {
        push_node(
            &mut nodes,
            &mut seen_nodes,
            format!("mechanic:{}", mechanic.name),
            NodeKind::Mechanic,
            NodeProperties::Mechanic {
                name: mechanic.name.clone(),
                description: mechanic.description.clone(),
                category: mechanic.category.clone(),
                archetype_implications: mechanic.archetype_implications.clone(),
                sources: mechanic.sources.clone(),
                extra: BTreeMap::new(),
            },
            MECHANIC_SIZE,
        );
    }

    // Ability names are interned: the first profile defining one wins.
    for profile in profiles.values() {
        for ability in &profile.abilities {
            push_node(
                &mut nodes,
                &mut seen_nodes,
                format!("ability:{}", ability.name),
                NodeKind::Ability,
                NodeProperties::Ability {
                    name: ability.name.clone(),
                    slot: ability.slot.clone(),
                    kind: ability.kind.clone(),
                    description: ability.description.clone(),
                    notes: ability.notes.clone(),
                    extra: BTreeMap::new(),
                },
                ABILITY_SIZE,
            );
        }
    }

    for (name, profile) in &profiles {
        let mut used: BTreeSet<String> = BTreeSet::new();
        let mut countered: BTreeSet<String> = BTreeSet::new();
        for ability in &profile.abilities {
            used.extend(ability.mechanics.uses.iter().cloned());
            countered.extend(ability.mechanics.counters.iter().cloned());
        }
        push_node(
            &mut nodes,
            &mut seen_nodes,
            format!("character:{name}"),
            NodeKind::Character,
            NodeProperties::Character {
                name: (*name).to_string(),
                description: profile.character.description.clone(),
                archetype: profile.character.archetype.clone(),
                status: roster_status.get(name).map(|s| (*s).to_string()),
                aliases: profile.character.aliases.clone(),
                source_url: profile.character.source_url.clone(),
                last_updated: profile.character.last_updated.to_rfc3339(),
                abilities: profile.abilities.iter().map(|a| a.name.clone()).collect(),
                ability_slots: profile
                    .abilities
                    .iter()
                    .map(|a| AbilitySlot {
                        name: a.name.clone(),
                        slot: a.slot.clone(),
                        kind: a.kind.clone(),
                    })
                    .collect(),
                mechanics_used: used.into_iter().collect(),
                mechanics_countered: countered.into_iter().collect(),
                extra: BTreeMap::new(),
            },
            CHARACTER_SIZE,
        );
    }

    let mut edges: Vec<GraphEdge> = Vec::new();
    let mut seen_edges: BTreeSet<String> = BTreeSet::new();
    let mut push_edge = |edges: &mut Vec<GraphEdge>,
                         seen: &mut BTreeSet<String>,
                         id: String,
                         source: String,
                         target: String,
                         relationship: &str,
                         properties: EdgeProperties| {
        if seen.insert(id.clone()) {
            edges.push(GraphEdge {
                id,
                source,
                target,
                relationship: relationship.to_string(),
                properties,
            });
        }
    };

    for (name, profile) in &profiles {
        let character_id = format!("character:{name}");
        let archetype = profile.character.archetype.as_str();
        if archetypes.contains_key(archetype) {
            push_edge(
                &mut edges,
                &mut seen_edges,
                format!("edge:{character_id}->archetype:{archetype}"),
                character_id.clone(),
                format!("archetype:{archetype}"),
                "IS_ARCHETYPE",
                EdgeProperties::default(),
            );
        }

        for ability in &profile.abilities {
            let ability_id = format!("ability:{}", ability.name);
            push_edge(
                &mut edges,
                &mut seen_edges,
                format!("edge:{character_id}->{ability_id}"),
                character_id.clone(),
                ability_id.clone(),
                "HAS_ABILITY",
                EdgeProperties {
                    slot: Some(ability.slot.clone()),
                    ability_type: Some(ability.kind.clone()),
                    ..EdgeProperties::default()
                },
            );

            // Mechanic edges only point at mechanics present in the baseline
            // file; stub-only references stay out of the artifact.
            for mechanic in &ability.mechanics.uses {
                if mechanics.contains_key(mechanic.as_str()) {
                    let mechanic_id = format!("mechanic:{mechanic}");
                    push_edge(
                        &mut edges,
                        &mut seen_edges,
                        format!("edge:{ability_id}->{mechanic_id}:uses"),
                        ability_id.clone(),
                        mechanic_id,
                        "USES_MECHANIC",
                        EdgeProperties::default(),
                    );
                }
            }
            for mechanic in &ability.mechanics.counters {
                if mechanics.contains_key(mechanic.as_str()) {
                    let mechanic_id = format!("mechanic:{mechanic}");
                    push_edge(
                        &mut edges,
                        &mut seen_edges,
                        format!("edge:{ability_id}->{mechanic_id}:counters"),
                        ability_id.clone(),
                        mechanic_id.clone(),
                        "COUNTERS_MECHANIC",
                        EdgeProperties::default(),
                    );
                    push_edge(
                        &mut edges,
                        &mut seen_edges,
                        format!("edge:{character_id}->{mechanic_id}:character_counter"),
                        character_id.clone(),
                        mechanic_id,
                        "CHARACTER_COUNTERS_MECHANIC",
                        EdgeProperties {
                            ability: Some(ability.name.clone()),
                            ..EdgeProperties::default()
                        },
                    );
                }
            }
        }
    }

    for (index, row) in input.matchups.iter().enumerate() {
        if !profiles.contains_key(row.source.as_str()) || !profiles.contains_key(row.target.as_str())
        {
            tracing::warn!(
                source = row.source.as_str(),
                target = row.target.as_str(),
                "skipping matchup row naming an unknown character"
            );
            continue;
        }
        push_edge(
            &mut edges,
            &mut seen_edges,
            format!("edge:matchup:{index}"),
            format!("character:{}", row.source),
            format!("character:{}", row.target),
            &row.relationship,
            EdgeProperties {
                evidence: Some(row.evidence),
                reason: Some(row.reason.clone()),
                ..EdgeProperties::default()
            },
        );
    }

    apply_layout(&mut nodes, &edges);
    let indexes = build_indexes(&nodes, &edges, &profiles);
    let meta = build_meta(&nodes, &edges, &profiles, &mechanics);

    GraphSnapshot {
        meta,
        nodes,
        edges,
        indexes,
    }
}

fn apply_layout(nodes: &mut [GraphNode], edges: &[GraphEdge]) {
    let index_of: BTreeMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.id.as_str(), index))
        .collect();
    let edge_indexes: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|edge| {
            let a = index_of.get(edge.source.as_str())?;
            let b = index_of.get(edge.target.as_str())?;
            Some((*a, *b))
        })
        .collect();
    let positions = spring_layout(nodes.len(), &edge_indexes, LAYOUT_SEED, LAYOUT_ITERATIONS);
    for (node, (x, y)) in nodes.iter_mut().zip(positions) {
        node.x = x;
        node.y = y;
    }
}

fn build_indexes(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    profiles: &BTreeMap<&str, &CharacterProfile>,
) -> GraphIndexes {
    let mut indexes = GraphIndexes::default();

    let mut neighbors: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for edge in edges {
        *indexes.degrees_out.entry(edge.source.clone()).or_default() += 1;
        *indexes.degrees_in.entry(edge.target.clone()).or_default() += 1;
        neighbors
            .entry(edge.source.clone())
            .or_default()
            .insert(edge.target.clone());
        neighbors
            .entry(edge.target.clone())
            .or_default()
            .insert(edge.source.clone());

        let adjacency = match edge.relationship.as_str() {
            "STRONG_AGAINST" => Some(&mut indexes.strong_against),
            "WEAK_AGAINST" => Some(&mut indexes.weak_against),
            "EVEN_AGAINST" => Some(&mut indexes.even_against),
            _ => None,
        };
        if let Some(map) = adjacency {
            map.entry(edge.source.clone())
                .or_default()
                .push(edge.target.clone());
        }
    }
    for node in nodes {
        indexes.neighbors.insert(
            node.id.clone(),
            neighbors
                .remove(&node.id)
                .map(|set| set.into_iter().collect())
                .unwrap_or_default(),
        );
    }
    for list in indexes
        .strong_against
        .values_mut()
        .chain(indexes.weak_against.values_mut())
        .chain(indexes.even_against.values_mut())
    {
        list.sort();
    }

    for profile in profiles.values() {
        let mut used: BTreeSet<&str> = BTreeSet::new();
        let mut countered: BTreeSet<&str> = BTreeSet::new();
        for ability in &profile.abilities {
            used.extend(ability.mechanics.uses.iter().map(String::as_str));
            countered.extend(ability.mechanics.counters.iter().map(String::as_str));
        }
        for mechanic in used {
            *indexes.mechanic_usage.entry(mechanic.to_string()).or_default() += 1;
        }
        for mechanic in countered {
            *indexes
                .mechanic_counter
                .entry(mechanic.to_string())
                .or_default() += 1;
        }
    }

    indexes
}

fn build_meta(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    profiles: &BTreeMap<&str, &CharacterProfile>,
    mechanics: &BTreeMap<&str, &Mechanic>,
) -> GraphMeta {
    let mut label_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for node in nodes {
        *label_distribution
            .entry(node.label.as_str().to_string())
            .or_default() += 1;
    }

    let mut archetype_counts: BTreeMap<String, usize> = BTreeMap::new();
    for profile in profiles.values() {
        *archetype_counts
            .entry(profile.character.archetype.clone())
            .or_default() += 1;
    }

    let mut mechanic_category_counts: BTreeMap<String, usize> = BTreeMap::new();
    for mechanic in mechanics.values() {
        *mechanic_category_counts
            .entry(mechanic.category.clone())
            .or_default() += 1;
    }

    GraphMeta {
        generated_at: chrono::Utc::now().to_rfc3339(),
        node_count: nodes.len(),
        edge_count: edges.len(),
        label_distribution,
        archetype_counts,
        mechanic_category_counts,
    }
}

/// Write the artifact as pretty JSON, creating parent directories.
pub fn write_snapshot(snapshot: &GraphSnapshot, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let mut payload = serde_json::to_string_pretty(snapshot)?;
    payload.push('\n');
    fs::write(path, payload).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
