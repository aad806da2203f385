// Squad data sources.
//
// The roster code never reaches for global fixtures: whoever builds the app
// hands it a `SquadProvider`. `InMemoryProvider` backs tests, `CsvProvider`
// reads a squad sheet with one row per player.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::player::{Player, RawPlayer};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub league_id: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown league `{0}`")]
    UnknownLeague(String),

    #[error("unknown team `{0}`")]
    UnknownTeam(String),

    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Synchronous access to leagues, teams and squads.
pub trait SquadProvider {
    fn leagues(&self) -> Vec<League>;

    fn teams(&self, league_id: &str) -> Result<Vec<Team>, ProviderError>;

    /// Squad list for a team, in sheet order.
    fn players(&self, team_id: &str) -> Result<Vec<Player>, ProviderError>;
}

// ---------------------------------------------------------------------------
// In-memory provider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    leagues: Vec<League>,
    teams: Vec<Team>,
    squads: HashMap<String, Vec<Player>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a league. Re-registering an id keeps the first name.
    pub fn add_league(&mut self, league: League) {
        if !self.leagues.iter().any(|l| l.id == league.id) {
            self.leagues.push(league);
        }
    }

    /// Register a team and its league. Re-registering an id keeps the
    /// existing entry.
    pub fn add_team(&mut self, league: League, team: Team) {
        self.add_league(league);
        if !self.teams.iter().any(|t| t.id == team.id) {
            self.squads.entry(team.id.clone()).or_default();
            self.teams.push(team);
        }
    }

    /// Append a player to a registered team's squad. Returns `false` if the
    /// team is unknown or the player id is already in that squad.
    pub fn add_player(&mut self, team_id: &str, player: Player) -> bool {
        let Some(squad) = self.squads.get_mut(team_id) else {
            return false;
        };
        if squad.iter().any(|p| p.id == player.id) {
            return false;
        }
        squad.push(player);
        true
    }

    pub fn player_count(&self) -> usize {
        self.squads.values().map(Vec::len).sum()
    }
}

impl SquadProvider for InMemoryProvider {
    fn leagues(&self) -> Vec<League> {
        self.leagues.clone()
    }

    fn teams(&self, league_id: &str) -> Result<Vec<Team>, ProviderError> {
        if !self.leagues.iter().any(|l| l.id == league_id) {
            return Err(ProviderError::UnknownLeague(league_id.to_string()));
        }
        Ok(self
            .teams
            .iter()
            .filter(|t| t.league_id == league_id)
            .cloned()
            .collect())
    }

    fn players(&self, team_id: &str) -> Result<Vec<Player>, ProviderError> {
        self.squads
            .get(team_id)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownTeam(team_id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CSV provider
// ---------------------------------------------------------------------------

/// One squad-sheet row. Columns beyond the identity ones are optional and
/// may be left blank.
#[derive(Debug, Deserialize)]
struct SquadRow {
    league_id: String,
    league_name: String,
    team_id: String,
    team_name: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    number: Option<i64>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    appearances: Option<u32>,
    #[serde(default)]
    goals: Option<u32>,
    #[serde(default)]
    assists: Option<u32>,
    #[serde(default)]
    clean_sheets: Option<u32>,
    #[serde(default)]
    injured: Option<bool>,
    #[serde(default)]
    captain: Option<bool>,
    #[serde(default)]
    on_loan: Option<bool>,
    #[serde(default)]
    nationality: Option<String>,
    #[serde(default)]
    market_value: Option<u64>,
    #[serde(default)]
    age: Option<i64>,
    #[serde(default)]
    contract_until: Option<String>,
    #[serde(default)]
    fitness: Option<i64>,
}

impl SquadRow {
    fn split(self) -> (League, Team, RawPlayer) {
        let league = League {
            id: self.league_id.trim().to_string(),
            name: self.league_name.trim().to_string(),
        };
        let team = Team {
            id: self.team_id.trim().to_string(),
            name: self.team_name.trim().to_string(),
            league_id: league.id.clone(),
        };
        let raw = RawPlayer {
            id: self.id,
            name: self.name,
            position: self.position,
            number: self.number,
            image: self.image,
            appearances: self.appearances,
            goals: self.goals,
            assists: self.assists,
            clean_sheets: self.clean_sheets,
            injured: self.injured,
            captain: self.captain,
            on_loan: self.on_loan,
            nationality: self.nationality,
            market_value: self.market_value,
            age: self.age,
            contract_until: self.contract_until,
            fitness: self.fitness,
            ..RawPlayer::default()
        };
        (league, team, raw)
    }
}

/// Squad data loaded once from a CSV sheet.
#[derive(Debug, Clone, Default)]
pub struct CsvProvider {
    inner: InMemoryProvider,
}

impl CsvProvider {
    /// Load a squad sheet from disk.
    pub fn open(path: &Path) -> Result<Self, ProviderError> {
        let file = std::fs::File::open(path).map_err(|e| ProviderError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let provider = Self::from_reader(file).map_err(|e| ProviderError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
        info!(
            "loaded {} players in {} leagues from {}",
            provider.inner.player_count(),
            provider.inner.leagues.len(),
            path.display()
        );
        Ok(provider)
    }

    /// Parse a squad sheet. Malformed rows and rows that fail player
    /// validation are skipped with a warning; only a broken header fails.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
        // Surface header errors instead of silently producing nothing.
        reader.headers()?;

        let mut inner = InMemoryProvider::new();
        for (line, result) in reader.deserialize::<SquadRow>().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!("skipping malformed squad row {}: {}", line + 2, e);
                    continue;
                }
            };
            let (league, team, raw) = row.split();
            let team_id = team.id.clone();
            // The team exists even if none of its players survive validation.
            inner.add_team(league, team);
            let player = match Player::try_from(raw) {
                Ok(p) => p,
                Err(e) => {
                    warn!("skipping player on row {} ({}): {}", line + 2, team_id, e);
                    continue;
                }
            };
            let player_id = player.id.clone();
            if !inner.add_player(&team_id, player) {
                warn!("duplicate player '{}' in team '{}', keeping first", player_id, team_id);
            }
        }
        Ok(CsvProvider { inner })
    }
}

impl SquadProvider for CsvProvider {
    fn leagues(&self) -> Vec<League> {
        self.inner.leagues()
    }

    fn teams(&self, league_id: &str) -> Result<Vec<Team>, ProviderError> {
        self.inner.teams(league_id)
    }

    fn players(&self, team_id: &str) -> Result<Vec<Player>, ProviderError> {
        self.inner.players(team_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
