use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a level acts as a floor or a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelKind {
    /// Price floor, built from candle lows.
    Support,
    /// Price ceiling, built from candle highs.
    Resistance,
}

impl LevelKind {
    /// Lowercase name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Resistance => "resistance",
        }
    }
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the current price interacts with a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerDirection {
    /// Price sits inside the level's tolerance band.
    Touch,
    /// Price just crossed above a resistance band.
    Breakout,
    /// Price just crossed below a support band.
    Breakdown,
}

impl TriggerDirection {
    /// Lowercase name used in logs and alert text.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Touch => "touch",
            Self::Breakout => "breakout",
            Self::Breakdown => "breakdown",
        }
    }

    /// Whether this direction is an edge-triggered crossing.
    #[must_use]
    pub fn is_crossing(&self) -> bool {
        matches!(self, Self::Breakout | Self::Breakdown)
    }
}

impl fmt::Display for TriggerDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign of a price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Price rose.
    Up,
    /// Price fell or stayed flat.
    Down,
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}
