//! Archetype and mechanic baselines plus the roster list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named play-style category. Every character belongs to exactly one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Archetype {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub signature_traits: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// A named gameplay effect or condition that abilities use or counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mechanic {
    pub name: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub archetype_implications: Vec<String>,
    pub sources: Vec<String>,
}

/// One line of the roster/status list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub archetype: String,
    pub status: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// The roster document: free-form metadata plus known characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
    pub characters: Vec<RosterEntry>,
}
