//! Domain model for the curated roster.
//!
//! Plain validated records with no behavior beyond derived fields. Validation
//! happens at deserialization time: a malformed document fails fast instead
//! of producing a partially constructed record.

mod character;
mod foundation;
mod matchup;

pub use character::{
    slugify, AbilityMechanics, CharacterAbility, CharacterMeta, CharacterProfile,
};
pub use foundation::{Archetype, Mechanic, Roster, RosterEntry};
pub use matchup::{render_reason, Evidence, MatchupKind, EVEN_REASON};
