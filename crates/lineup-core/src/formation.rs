// Formation identifiers and their pitch layouts.
//
// Coordinates are normalized to 0..=1:
// - x: 0 = left touchline, 1 = right touchline
// - y: 0 = own goal line, 1 = opponent goal line

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::PositionCode;

/// Every supported formation fields exactly this many players.
pub const STARTING_XI_SIZE: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormationError {
    #[error("unknown formation `{0}`")]
    UnknownFormation(String),
}

// ---------------------------------------------------------------------------
// Formation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    #[serde(rename = "4-3-3")]
    F433,
    #[serde(rename = "4-4-2")]
    F442,
    #[serde(rename = "3-5-2")]
    F352,
    #[serde(rename = "4-2-3-1")]
    F4231,
    #[serde(rename = "5-3-2")]
    F532,
    #[serde(rename = "3-4-3")]
    F343,
    #[serde(rename = "4-5-1")]
    F451,
    #[serde(rename = "4-1-4-1")]
    F4141,
    #[serde(rename = "4-4-1-1")]
    F4411,
    #[serde(rename = "3-6-1")]
    F361,
}

impl Formation {
    pub const ALL: [Formation; 10] = [
        Formation::F433,
        Formation::F442,
        Formation::F352,
        Formation::F4231,
        Formation::F532,
        Formation::F343,
        Formation::F451,
        Formation::F4141,
        Formation::F4411,
        Formation::F361,
    ];

    pub const DEFAULT: Formation = Formation::F433;

    /// Canonical formation code string (e.g., "4-3-3").
    pub fn code(&self) -> &'static str {
        match self {
            Formation::F433 => "4-3-3",
            Formation::F442 => "4-4-2",
            Formation::F352 => "3-5-2",
            Formation::F4231 => "4-2-3-1",
            Formation::F532 => "5-3-2",
            Formation::F343 => "3-4-3",
            Formation::F451 => "4-5-1",
            Formation::F4141 => "4-1-4-1",
            Formation::F4411 => "4-4-1-1",
            Formation::F361 => "3-6-1",
        }
    }

    fn slots(&self) -> &'static [Slot; STARTING_XI_SIZE] {
        match self {
            Formation::F433 => &F433,
            Formation::F442 => &F442,
            Formation::F352 => &F352,
            Formation::F4231 => &F4231,
            Formation::F532 => &F532,
            Formation::F343 => &F343,
            Formation::F451 => &F451,
            Formation::F4141 => &F4141,
            Formation::F4411 => &F4411,
            Formation::F361 => &F361,
        }
    }
}

impl Default for Formation {
    fn default() -> Self {
        Formation::DEFAULT
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Formation {
    type Err = FormationError;

    /// Accepts the dashed code ("4-2-3-1") or the bare digits ("4231").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Formation::ALL
            .into_iter()
            .find(|f| code == f.code() || code == f.code().replace('-', ""))
            .ok_or_else(|| FormationError::UnknownFormation(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Position keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionKey {
    GK,
    LB,
    LCB,
    CB,
    RCB,
    RB,
    LWB,
    RWB,
    CDM,
    LDM,
    RDM,
    LM,
    LCM,
    CM,
    RCM,
    RM,
    LAM,
    CAM,
    RAM,
    LW,
    RW,
    CF,
    ST,
    LST,
    RST,
}

impl PositionKey {
    pub fn label(&self) -> &'static str {
        match self {
            PositionKey::GK => "Goalkeeper",
            PositionKey::LB => "Left Back",
            PositionKey::LCB => "Left Centre Back",
            PositionKey::CB => "Centre Back",
            PositionKey::RCB => "Right Centre Back",
            PositionKey::RB => "Right Back",
            PositionKey::LWB => "Left Wing Back",
            PositionKey::RWB => "Right Wing Back",
            PositionKey::CDM => "Defensive Midfielder",
            PositionKey::LDM => "Left Defensive Midfielder",
            PositionKey::RDM => "Right Defensive Midfielder",
            PositionKey::LM => "Left Midfielder",
            PositionKey::LCM => "Left Centre Midfielder",
            PositionKey::CM => "Centre Midfielder",
            PositionKey::RCM => "Right Centre Midfielder",
            PositionKey::RM => "Right Midfielder",
            PositionKey::LAM => "Left Attacking Midfielder",
            PositionKey::CAM => "Attacking Midfielder",
            PositionKey::RAM => "Right Attacking Midfielder",
            PositionKey::LW => "Left Winger",
            PositionKey::RW => "Right Winger",
            PositionKey::CF => "Second Striker",
            PositionKey::ST => "Striker",
            PositionKey::LST => "Left Striker",
            PositionKey::RST => "Right Striker",
        }
    }

    /// The positional group a player in this slot is expected to come from.
    pub fn group(&self) -> PositionCode {
        match self {
            PositionKey::GK => PositionCode::Goalkeeper,
            PositionKey::LB
            | PositionKey::LCB
            | PositionKey::CB
            | PositionKey::RCB
            | PositionKey::RB
            | PositionKey::LWB
            | PositionKey::RWB => PositionCode::Defender,
            PositionKey::CDM
            | PositionKey::LDM
            | PositionKey::RDM
            | PositionKey::LM
            | PositionKey::LCM
            | PositionKey::CM
            | PositionKey::RCM
            | PositionKey::RM
            | PositionKey::LAM
            | PositionKey::CAM
            | PositionKey::RAM => PositionCode::Midfielder,
            PositionKey::LW
            | PositionKey::RW
            | PositionKey::CF
            | PositionKey::ST
            | PositionKey::LST
            | PositionKey::RST => PositionCode::Forward,
        }
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// Layouts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormationPosition {
    pub key: PositionKey,
    pub label: &'static str,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormationLayout {
    pub formation: Formation,
    /// Goalkeeper first, then back to front, left to right within a line.
    pub positions: Vec<FormationPosition>,
}

impl FormationLayout {
    pub fn position(&self, key: PositionKey) -> Option<&FormationPosition> {
        self.positions.iter().find(|p| p.key == key)
    }
}

/// Layout for a known formation.
pub fn layout(formation: Formation) -> FormationLayout {
    let positions = formation
        .slots()
        .iter()
        .map(|&(key, x, y)| FormationPosition {
            key,
            label: key.label(),
            x,
            y,
        })
        .collect();
    FormationLayout {
        formation,
        positions,
    }
}

/// Layout for a formation code; unknown codes are refused.
pub fn layout_for(code: &str) -> Result<FormationLayout, FormationError> {
    code.parse::<Formation>().map(layout)
}

/// What to do with a formation code outside the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFormationPolicy {
    Reject,
    Fallback(Formation),
}

impl UnknownFormationPolicy {
    pub fn resolve(&self, code: &str) -> Result<Formation, FormationError> {
        match (code.parse::<Formation>(), self) {
            (Ok(f), _) => Ok(f),
            (Err(e), UnknownFormationPolicy::Reject) => Err(e),
            (Err(_), UnknownFormationPolicy::Fallback(f)) => {
                tracing::debug!("unknown formation '{}', falling back to {}", code, f);
                Ok(*f)
            }
        }
    }

    pub fn layout_for(&self, code: &str) -> Result<FormationLayout, FormationError> {
        self.resolve(code).map(layout)
    }
}

impl Default for UnknownFormationPolicy {
    fn default() -> Self {
        UnknownFormationPolicy::Fallback(Formation::DEFAULT)
    }
}

type Slot = (PositionKey, f32, f32);

use PositionKey::*;

const F433: [Slot; STARTING_XI_SIZE] = [
    (GK, 0.50, 0.04),
    (LB, 0.15, 0.25),
    (LCB, 0.35, 0.20),
    (RCB, 0.65, 0.20),
    (RB, 0.85, 0.25),
    (LCM, 0.30, 0.45),
    (CM, 0.50, 0.42),
    (RCM, 0.70, 0.45),
    (LW, 0.12, 0.75),
    (ST, 0.50, 0.82),
    (RW, 0.88, 0.75),
];

const F442: [Slot; STARTING_XI_SIZE] = [
    (GK, 0.50, 0.04),
    (LB, 0.15, 0.25),
    (LCB, 0.35, 0.20),
    (RCB, 0.65, 0.20),
    (RB, 0.85, 0.25),
    (LM, 0.15, 0.50),
    (LCM, 0.35, 0.45),
    (RCM, 0.65, 0.45),
    (RM, 0.85, 0.50),
    (LST, 0.35, 0.78),
    (RST, 0.65, 0.78),
];

const F352: [Slot; STARTING_XI_SIZE] = [
    (GK, 0.50, 0.04),
    (LCB, 0.25, 0.20),
    (CB, 0.50, 0.18),
    (RCB, 0.75, 0.20),
    (LM, 0.08, 0.48),
    (LCM, 0.30, 0.45),
    (CM, 0.50, 0.40),
    (RCM, 0.70, 0.45),
    (RM, 0.92, 0.48),
    (LST, 0.38, 0.78),
    (RST, 0.62, 0.78),
];

const F4231: [Slot; STARTING_XI_SIZE] = [
    (GK, 0.50, 0.04),
    (LB, 0.15, 0.25),
    (LCB, 0.35, 0.20),
    (RCB, 0.65, 0.20),
    (RB, 0.85, 0.25),
    (LDM, 0.35, 0.38),
    (RDM, 0.65, 0.38),
    (LAM, 0.20, 0.62),
    (CAM, 0.50, 0.60),
    (RAM, 0.80, 0.62),
    (ST, 0.50, 0.82),
];

const F532: [Slot; STARTING_XI_SIZE] = [
    (GK, 0.50, 0.04),
    (LWB, 0.08, 0.30),
    (LCB, 0.28, 0.20),
    (CB, 0.50, 0.18),
    (RCB, 0.72, 0.20),
    (RWB, 0.92, 0.30),
    (LCM, 0.30, 0.48),
    (CM, 0.50, 0.45),
    (RCM, 0.70, 0.48),
    (LST, 0.38, 0.78),
    (RST, 0.62, 0.78),
];

const F343: [Slot; STARTING_XI_SIZE] = [
    (GK, 0.50, 0.04),
    (LCB, 0.25, 0.20),
    (CB, 0.50, 0.18),
    (RCB, 0.75, 0.20),
    (LM, 0.10, 0.48),
    (LCM, 0.38, 0.45),
    (RCM, 0.62, 0.45),
    (RM, 0.90, 0.48),
    (LW, 0.15, 0.75),
    (ST, 0.50, 0.82),
    (RW, 0.85, 0.75),
];

const F451: [Slot; STARTING_XI_SIZE] = [
    (GK, 0.50, 0.04),
    (LB, 0.15, 0.25),
    (LCB, 0.35, 0.20),
    (RCB, 0.65, 0.20),
    (RB, 0.85, 0.25),
    (LM, 0.12, 0.52),
    (LCM, 0.32, 0.48),
    (CM, 0.50, 0.45),
    (RCM, 0.68, 0.48),
    (RM, 0.88, 0.52),
    (ST, 0.50, 0.80),
];

const F4141: [Slot; STARTING_XI_SIZE] = [
    (GK, 0.50, 0.04),
    (LB, 0.15, 0.25),
    (LCB, 0.35, 0.20),
    (RCB, 0.65, 0.20),
    (RB, 0.85, 0.25),
    (CDM, 0.50, 0.35),
    (LM, 0.12, 0.55),
    (LCM, 0.35, 0.52),
    (RCM, 0.65, 0.52),
    (RM, 0.88, 0.55),
    (ST, 0.50, 0.82),
];

const F4411: [Slot; STARTING_XI_SIZE] = [
    (GK, 0.50, 0.04),
    (LB, 0.15, 0.25),
    (LCB, 0.35, 0.20),
    (RCB, 0.65, 0.20),
    (RB, 0.85, 0.25),
    (LM, 0.15, 0.48),
    (LCM, 0.35, 0.45),
    (RCM, 0.65, 0.45),
    (RM, 0.85, 0.48),
    (CF, 0.50, 0.66),
    (ST, 0.50, 0.82),
];

const F361: [Slot; STARTING_XI_SIZE] = [
    (GK, 0.50, 0.04),
    (LCB, 0.25, 0.20),
    (CB, 0.50, 0.18),
    (RCB, 0.75, 0.20),
    (LM, 0.08, 0.48),
    (LDM, 0.38, 0.38),
    (RDM, 0.62, 0.38),
    (RM, 0.92, 0.48),
    (LAM, 0.35, 0.62),
    (RAM, 0.65, 0.62),
    (ST, 0.50, 0.82),
];
