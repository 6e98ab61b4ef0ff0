//! Loaders for the curated YAML source files.
//!
//! One document per archetype list, one per mechanic list, one per character
//! (with nested ability records), and one roster/status list. A malformed
//! document fails the whole load with the offending path named; records are
//! never silently skipped.

mod error;

pub use error::SourceError;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::model::{slugify, Archetype, CharacterProfile, Mechanic, Roster};

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    if !path.exists() {
        return Err(SourceError::Missing {
            path: path.to_path_buf(),
        });
    }
    let raw = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|err| SourceError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[derive(Deserialize)]
struct ArchetypeFile {
    #[serde(default)]
    archetypes: Vec<Archetype>,
}

#[derive(Deserialize)]
struct MechanicFile {
    #[serde(default)]
    mechanics: Vec<Mechanic>,
}

/// Load the archetype baseline from a top-level `archetypes:` list.
pub fn load_archetypes(path: &Path) -> Result<Vec<Archetype>, SourceError> {
    Ok(read_yaml::<ArchetypeFile>(path)?.archetypes)
}

/// Load the mechanic baseline from a top-level `mechanics:` list.
pub fn load_mechanics(path: &Path) -> Result<Vec<Mechanic>, SourceError> {
    Ok(read_yaml::<MechanicFile>(path)?.mechanics)
}

/// Load a single character document.
pub fn load_character_profile(path: &Path) -> Result<CharacterProfile, SourceError> {
    read_yaml(path)
}

/// Load every character document under a directory, sorted by file name.
pub fn load_character_profiles(dir: &Path) -> Result<Vec<CharacterProfile>, SourceError> {
    if !dir.exists() {
        return Err(SourceError::Missing {
            path: dir.to_path_buf(),
        });
    }
    let entries = fs::read_dir(dir).map_err(|source| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    paths.sort();
    paths.iter().map(|path| load_character_profile(path)).collect()
}

/// Load the roster/status list.
pub fn load_roster(path: &Path) -> Result<Roster, SourceError> {
    read_yaml(path)
}

/// Path of a character document under the data root, keyed by slug.
pub fn character_path(data_root: &Path, name: &str) -> PathBuf {
    data_root
        .join("characters")
        .join(format!("{}.yaml", slugify(name)))
}

/// Write a JSON checkpoint of a profile before it is pushed to the store.
pub fn write_checkpoint(profile: &CharacterProfile, path: &Path) -> Result<(), SourceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SourceError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let payload = serde_json::to_string_pretty(profile).map_err(|err| SourceError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    fs::write(path, payload).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
