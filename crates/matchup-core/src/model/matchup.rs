//! Synthesized matchup relationships between characters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reason attached to EVEN_AGAINST edges.
pub const EVEN_REASON: &str = "No direct ability or mechanic counters found.";

/// Directed matchup relationship kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchupKind {
    StrongAgainst,
    WeakAgainst,
    EvenAgainst,
}

impl MatchupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchupKind::StrongAgainst => "STRONG_AGAINST",
            MatchupKind::WeakAgainst => "WEAK_AGAINST",
            MatchupKind::EvenAgainst => "EVEN_AGAINST",
        }
    }
}

impl fmt::Display for MatchupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchupKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "STRONG_AGAINST" => Ok(MatchupKind::StrongAgainst),
            "WEAK_AGAINST" => Ok(MatchupKind::WeakAgainst),
            "EVEN_AGAINST" => Ok(MatchupKind::EvenAgainst),
            other => Err(format!("unknown matchup kind '{other}'")),
        }
    }
}

/// One unit of evidence behind a STRONG/WEAK conclusion: a countering
/// ability, the ability it counters, and the mechanic they overlap on.
///
/// Edges store the ordered list of these records; the human-readable reason
/// is rendered from the list on read, so accumulation stays associative.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Evidence {
    pub counter_ability: String,
    pub countered_ability: String,
    pub mechanic: String,
}

/// Render the reason text for a matchup edge from its evidence records.
pub fn render_reason(kind: MatchupKind, evidence: &[Evidence]) -> String {
    match kind {
        MatchupKind::EvenAgainst => EVEN_REASON.to_string(),
        MatchupKind::StrongAgainst => evidence
            .iter()
            .map(|e| {
                format!(
                    "[{}] counters [{} via {}]. ",
                    e.counter_ability, e.countered_ability, e.mechanic
                )
            })
            .collect(),
        MatchupKind::WeakAgainst => evidence
            .iter()
            .map(|e| {
                format!(
                    "[{}] is countered by [{} via {}]. ",
                    e.countered_ability, e.counter_ability, e.mechanic
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zap_shield() -> Evidence {
        Evidence {
            counter_ability: "Zap".to_string(),
            countered_ability: "Guard".to_string(),
            mechanic: "Shield".to_string(),
        }
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            MatchupKind::StrongAgainst,
            MatchupKind::WeakAgainst,
            MatchupKind::EvenAgainst,
        ] {
            assert_eq!(kind.as_str().parse::<MatchupKind>().unwrap(), kind);
        }
        assert!("FRIENDS_WITH".parse::<MatchupKind>().is_err());
    }

    #[test]
    fn strong_reason_names_both_abilities() {
        let reason = render_reason(MatchupKind::StrongAgainst, &[zap_shield()]);
        assert_eq!(reason, "[Zap] counters [Guard via Shield]. ");
    }

    #[test]
    fn weak_reason_is_mirrored() {
        let reason = render_reason(MatchupKind::WeakAgainst, &[zap_shield()]);
        assert_eq!(reason, "[Guard] is countered by [Zap via Shield]. ");
    }

    #[test]
    fn even_reason_ignores_evidence() {
        assert_eq!(render_reason(MatchupKind::EvenAgainst, &[]), EVEN_REASON);
    }

    #[test]
    fn reason_concatenates_in_evidence_order() {
        let mut second = zap_shield();
        second.mechanic = "Stun".to_string();
        let reason = render_reason(MatchupKind::StrongAgainst, &[zap_shield(), second]);
        assert!(reason.starts_with("[Zap] counters [Guard via Shield]. "));
        assert!(reason.ends_with("[Zap] counters [Guard via Stun]. "));
    }
}
