//! Character profiles and their abilities.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Derive the storage key for a display name: lowercase, `&` becomes `and`,
/// spaces become underscores, apostrophes are stripped.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .replace('&', "and")
        .replace(' ', "_")
        .replace('\'', "")
}

/// Mechanic names an ability interacts with.
///
/// Names may refer to mechanics that have not been loaded yet; ingestion
/// creates stub nodes for them on first reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbilityMechanics {
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub counters: Vec<String>,
}

/// Scalar facts about a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterMeta {
    pub name: String,
    /// Name of the archetype this character belongs to.
    pub archetype: String,
    pub description: String,
    pub source_url: String,
    #[serde(deserialize_with = "deserialize_last_updated")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl CharacterMeta {
    /// Storage key derived from the display name.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// A single ability as curated in a character document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterAbility {
    pub name: String,
    pub slot: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub mechanics: AbilityMechanics,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One character document: metadata plus its abilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub character: CharacterMeta,
    pub abilities: Vec<CharacterAbility>,
}

fn deserialize_last_updated<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Parse an RFC 3339 timestamp, a bare `YYYY-MM-DDTHH:MM:SS`, or a plain date.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&parsed));
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = parsed.and_hms_opt(0, 0, 0).ok_or("date out of range")?;
        return Ok(Utc.from_utc_datetime(&midnight));
    }
    Err(format!(
        "invalid timestamp '{raw}': expected RFC 3339, YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD"
    ))
}
