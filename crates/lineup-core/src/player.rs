// Canonical player record and boundary validation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayerError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unknown position code `{0}`")]
    UnknownPosition(String),

    #[error("field `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("invalid date `{value}` for field `{field}`")]
    InvalidDate { field: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// Identity and position
// ---------------------------------------------------------------------------

/// Stable player identity. Unique across a team's starting XI and bench.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        PlayerId(s.to_string())
    }
}

/// Broad positional group a player is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionCode {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl PositionCode {
    /// Parse a listing code. Accepts the group codes plus the common
    /// single-role abbreviations squad sheets use.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GK" | "G" | "GKP" => Some(PositionCode::Goalkeeper),
            "DEF" | "D" | "CB" | "LB" | "RB" | "LWB" | "RWB" => Some(PositionCode::Defender),
            "MID" | "M" | "CM" | "CDM" | "DM" | "CAM" | "AM" | "LM" | "RM" => {
                Some(PositionCode::Midfielder)
            }
            "FWD" | "F" | "FW" | "ST" | "CF" | "LW" | "RW" => Some(PositionCode::Forward),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            PositionCode::Goalkeeper => "GK",
            PositionCode::Defender => "DEF",
            PositionCode::Midfielder => "MID",
            PositionCode::Forward => "FWD",
        }
    }
}

impl fmt::Display for PositionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

pub const FAN_RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=10;
pub const VALUE_SCORE_RANGE: std::ops::RangeInclusive<i8> = -2..=2;
pub const FITNESS_RANGE: std::ops::RangeInclusive<u8> = 0..=100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub appearances: u32,
    pub goals: u32,
    pub assists: u32,
    /// Only tracked for goalkeepers and defenders.
    #[serde(default)]
    pub clean_sheets: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatus {
    #[serde(default)]
    pub injured: bool,
    #[serde(default)]
    pub captain: bool,
    #[serde(default)]
    pub on_loan: bool,
    #[serde(default)]
    pub recommended: bool,
}

/// Transfer-market attributes. All optional; mock squads rarely fill them all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub nationality: Option<String>,
    /// Market value in euros.
    pub market_value: Option<u64>,
    pub age: Option<u8>,
    pub contract_until: Option<NaiveDate>,
    /// Match fitness, 0-100.
    pub fitness: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: PositionCode,
    pub shirt_number: Option<u8>,
    pub image: Option<String>,
    #[serde(default)]
    pub stats: PlayerStats,
    #[serde(default)]
    pub status: PlayerStatus,
    fan_rating: Option<u8>,
    value_score: Option<i8>,
    pub comments: Option<String>,
    #[serde(default)]
    pub market: MarketInfo,
}

impl Player {
    /// Create a player with empty stats and no optional attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: PositionCode) -> Self {
        Player {
            id: PlayerId::new(id),
            name: name.into(),
            position,
            shirt_number: None,
            image: None,
            stats: PlayerStats::default(),
            status: PlayerStatus::default(),
            fan_rating: None,
            value_score: None,
            comments: None,
            market: MarketInfo::default(),
        }
    }

    pub fn fan_rating(&self) -> Option<u8> {
        self.fan_rating
    }

    pub fn value_score(&self) -> Option<i8> {
        self.value_score
    }

    /// Set the fan rating (1-10). `None` clears it.
    pub fn set_fan_rating(&mut self, rating: Option<u8>) -> Result<(), PlayerError> {
        if let Some(r) = rating {
            if !FAN_RATING_RANGE.contains(&r) {
                return Err(PlayerError::OutOfRange {
                    field: "fan_rating",
                    value: r as i64,
                });
            }
        }
        self.fan_rating = rating;
        Ok(())
    }

    /// Set the value-for-money vote (-2..=2). `None` clears it.
    pub fn set_value_score(&mut self, score: Option<i8>) -> Result<(), PlayerError> {
        if let Some(s) = score {
            if !VALUE_SCORE_RANGE.contains(&s) {
                return Err(PlayerError::OutOfRange {
                    field: "value_score",
                    value: s as i64,
                });
            }
        }
        self.value_score = score;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Boundary record
// ---------------------------------------------------------------------------

/// Loosely-typed player record as it arrives from a squad sheet or a search
/// result. Everything is optional or stringly; `Player::try_from` does the
/// checking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlayer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub appearances: Option<u32>,
    #[serde(default)]
    pub goals: Option<u32>,
    #[serde(default)]
    pub assists: Option<u32>,
    #[serde(default)]
    pub clean_sheets: Option<u32>,
    #[serde(default)]
    pub injured: Option<bool>,
    #[serde(default)]
    pub captain: Option<bool>,
    #[serde(default)]
    pub on_loan: Option<bool>,
    #[serde(default)]
    pub recommended: Option<bool>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub value_for_money: Option<i64>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub market_value: Option<u64>,
    #[serde(default)]
    pub age: Option<i64>,
    /// ISO date, `YYYY-MM-DD`.
    #[serde(default)]
    pub contract_until: Option<String>,
    #[serde(default)]
    pub fitness: Option<i64>,
}

/// Treat blank strings as missing; CSV cells come through as `Some("")`.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn in_range<T>(
    field: &'static str,
    value: i64,
    range: std::ops::RangeInclusive<T>,
) -> Result<T, PlayerError>
where
    T: TryFrom<i64> + PartialOrd + Copy,
{
    match T::try_from(value) {
        Ok(v) if range.contains(&v) => Ok(v),
        _ => Err(PlayerError::OutOfRange { field, value }),
    }
}

impl TryFrom<RawPlayer> for Player {
    type Error = PlayerError;

    fn try_from(raw: RawPlayer) -> Result<Self, Self::Error> {
        let id = non_blank(raw.id).ok_or(PlayerError::MissingField("id"))?;
        let name = non_blank(raw.name).ok_or(PlayerError::MissingField("name"))?;
        let pos_str = non_blank(raw.position).ok_or(PlayerError::MissingField("position"))?;
        let position = PositionCode::from_str_pos(&pos_str)
            .ok_or_else(|| PlayerError::UnknownPosition(pos_str.clone()))?;

        let shirt_number = raw
            .number
            .map(|n| in_range("number", n, 1u8..=99))
            .transpose()?;
        let fan_rating = raw
            .rating
            .map(|r| in_range("rating", r, FAN_RATING_RANGE))
            .transpose()?;
        let value_score = raw
            .value_for_money
            .map(|v| in_range("value_for_money", v, VALUE_SCORE_RANGE))
            .transpose()?;
        let age = raw.age.map(|a| in_range("age", a, 14u8..=50)).transpose()?;
        let fitness = raw
            .fitness
            .map(|f| in_range("fitness", f, FITNESS_RANGE))
            .transpose()?;
        let contract_until = non_blank(raw.contract_until)
            .map(|d| {
                NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|_| PlayerError::InvalidDate {
                    field: "contract_until",
                    value: d,
                })
            })
            .transpose()?;

        Ok(Player {
            id: PlayerId(id),
            name,
            position,
            shirt_number,
            image: non_blank(raw.image),
            stats: PlayerStats {
                appearances: raw.appearances.unwrap_or(0),
                goals: raw.goals.unwrap_or(0),
                assists: raw.assists.unwrap_or(0),
                clean_sheets: raw.clean_sheets,
            },
            status: PlayerStatus {
                injured: raw.injured.unwrap_or(false),
                captain: raw.captain.unwrap_or(false),
                on_loan: raw.on_loan.unwrap_or(false),
                recommended: raw.recommended.unwrap_or(false),
            },
            fan_rating,
            value_score,
            comments: non_blank(raw.comments),
            market: MarketInfo {
                nationality: non_blank(raw.nationality),
                market_value: raw.market_value,
                age,
                contract_until,
                fitness,
            },
        })
    }
}
