//! Difficulty tiers and the behavior bundle derived from them.

use crate::config::{BehaviorOverride, Difficulty};
use serde::{Deserialize, Serialize};

/// Behavior values written onto a host bot record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorModifiers {
    /// Hit probability scale (0.0 to 1.0)
    pub accuracy: f64,
    /// Reaction delay multiplier; lower reacts faster
    pub reaction_time: f64,
    /// Aggression scale (0.0 to 1.0)
    pub aggression: f64,
}

impl BehaviorModifiers {
    /// Slow, inaccurate, mostly passive
    pub fn easy() -> Self {
        Self {
            accuracy: 0.30,
            reaction_time: 2.0,
            aggression: 0.40,
        }
    }

    pub fn normal() -> Self {
        Self {
            accuracy: 0.60,
            reaction_time: 1.2,
            aggression: 0.70,
        }
    }

    pub fn hard() -> Self {
        Self {
            accuracy: 0.80,
            reaction_time: 0.8,
            aggression: 0.90,
        }
    }

    /// Near-perfect aim and almost instant reactions
    pub fn impossible() -> Self {
        Self {
            accuracy: 0.95,
            reaction_time: 0.3,
            aggression: 1.00,
        }
    }

    /// Fixed lookup: the same tier always yields the same bundle.
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self::easy(),
            Difficulty::Normal => Self::normal(),
            Difficulty::Hard => Self::hard(),
            Difficulty::Impossible => Self::impossible(),
        }
    }
}

/// Effective behavior after the difficulty table and an optional override.
///
/// `hearing` and `vision` have no table value; they are only set by an
/// override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedBehavior {
    pub accuracy: f64,
    pub reaction_time: f64,
    pub aggression: f64,
    pub hearing: Option<f64>,
    pub vision: Option<f64>,
}

/// Table value for `difficulty` with each present override field replacing
/// the corresponding table field.
pub fn resolve_behavior(difficulty: Difficulty, behavior: Option<&BehaviorOverride>) -> ResolvedBehavior {
    let base = BehaviorModifiers::from_difficulty(difficulty);
    let behavior = behavior.copied().unwrap_or_default();
    ResolvedBehavior {
        accuracy: behavior.accuracy.unwrap_or(base.accuracy),
        reaction_time: behavior.reaction_time.unwrap_or(base.reaction_time),
        aggression: behavior.aggression.unwrap_or(base.aggression),
        hearing: behavior.hearing,
        vision: behavior.vision,
    }
}
