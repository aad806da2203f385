// Roster state: the starting XI and bench for one team, plus the formation
// they are laid out in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::drag::{Collection, RosterChange};
use crate::formation::{self, Formation, FormationPosition, STARTING_XI_SIZE};
use crate::player::{Player, PlayerError, PlayerId};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("player {0} is already on the roster")]
    DuplicatePlayer(PlayerId),

    #[error("player {0} is not on the roster")]
    PlayerNotFound(PlayerId),

    #[error("invalid value for player {player_id}: {source}")]
    InvalidValue {
        player_id: PlayerId,
        source: PlayerError,
    },

    #[error("starting XI has {0} players, more than a formation has slots")]
    TooManyStarters(usize),

    #[error("failed to encode or decode roster snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// One pitch slot paired with whoever fills it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment<'a> {
    pub position: FormationPosition,
    pub player: Option<&'a Player>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterState {
    pub formation: Formation,
    pub starting_xi: Vec<Player>,
    pub bench: Vec<Player>,
}

impl RosterState {
    /// An empty roster.
    pub fn new(formation: Formation) -> Self {
        RosterState {
            formation,
            starting_xi: Vec::new(),
            bench: Vec::new(),
        }
    }

    /// Build a roster from a squad list: the first eleven start, everyone
    /// else goes to the bench in listed order.
    pub fn from_squad(formation: Formation, players: Vec<Player>) -> Result<Self, RosterError> {
        if let Some(dup) = first_duplicate(players.iter().map(|p| &p.id)) {
            return Err(RosterError::DuplicatePlayer(dup.clone()));
        }

        let mut starting_xi = players;
        let bench = if starting_xi.len() > STARTING_XI_SIZE {
            starting_xi.split_off(STARTING_XI_SIZE)
        } else {
            Vec::new()
        };

        if starting_xi.len() < STARTING_XI_SIZE {
            warn!(
                "squad has only {} players, starting XI is short",
                starting_xi.len()
            );
        }

        Ok(RosterState {
            formation,
            starting_xi,
            bench,
        })
    }

    /// Whether the starting XI fills every slot of the formation.
    pub fn is_complete(&self) -> bool {
        self.starting_xi.len() == STARTING_XI_SIZE
    }

    /// Replace both collections with the result of a drop.
    pub fn apply(&mut self, change: RosterChange) {
        self.starting_xi = change.starting_xi;
        self.bench = change.bench;
    }

    /// Switch formation. Players keep their order in the XI and are mapped
    /// onto the new formation's slots index by index.
    pub fn set_formation(&mut self, formation: Formation) {
        if formation != self.formation {
            info!("formation changed {} -> {}", self.formation, formation);
            self.formation = formation;
        }
    }

    /// Each slot of the current formation with its starter, if any.
    pub fn assignments(&self) -> Vec<Assignment<'_>> {
        formation::layout(self.formation)
            .positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| Assignment {
                position,
                player: self.starting_xi.get(i),
            })
            .collect()
    }

    /// Where a player currently sits.
    pub fn locate(&self, id: &PlayerId) -> Option<(Collection, usize)> {
        if let Some(i) = self.starting_xi.iter().position(|p| &p.id == id) {
            return Some((Collection::Pitch, i));
        }
        self.bench
            .iter()
            .position(|p| &p.id == id)
            .map(|i| (Collection::Bench, i))
    }

    pub fn find(&self, id: &PlayerId) -> Option<&Player> {
        self.starting_xi
            .iter()
            .chain(self.bench.iter())
            .find(|p| &p.id == id)
    }

    pub fn find_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.starting_xi
            .iter_mut()
            .chain(self.bench.iter_mut())
            .find(|p| &p.id == id)
    }

    /// All player ids across both collections, XI first.
    pub fn player_ids(&self) -> Vec<&PlayerId> {
        self.starting_xi
            .iter()
            .chain(self.bench.iter())
            .map(|p| &p.id)
            .collect()
    }

    /// Add a player picked from search to the end of the bench.
    pub fn add_to_bench(&mut self, player: Player) -> Result<(), RosterError> {
        if self.find(&player.id).is_some() {
            return Err(RosterError::DuplicatePlayer(player.id));
        }
        self.bench.push(player);
        Ok(())
    }

    /// Take a player off the roster entirely.
    pub fn remove_player(&mut self, id: &PlayerId) -> Result<Player, RosterError> {
        match self.locate(id) {
            Some((Collection::Pitch, i)) => Ok(self.starting_xi.remove(i)),
            Some((Collection::Bench, i)) => Ok(self.bench.remove(i)),
            None => Err(RosterError::PlayerNotFound(id.clone())),
        }
    }

    /// Record a fan rating (1-10) for a player.
    pub fn rate_player(&mut self, id: &PlayerId, rating: u8) -> Result<(), RosterError> {
        let player = self
            .find_mut(id)
            .ok_or_else(|| RosterError::PlayerNotFound(id.clone()))?;
        player
            .set_fan_rating(Some(rating))
            .map_err(|source| RosterError::InvalidValue {
                player_id: id.clone(),
                source,
            })
    }

    /// Record a value-for-money vote (-2..=2) for a player.
    pub fn set_value_score(&mut self, id: &PlayerId, score: i8) -> Result<(), RosterError> {
        let player = self
            .find_mut(id)
            .ok_or_else(|| RosterError::PlayerNotFound(id.clone()))?;
        player
            .set_value_score(Some(score))
            .map_err(|source| RosterError::InvalidValue {
                player_id: id.clone(),
                source,
            })
    }

    /// Serialize for whatever storage the front end keeps between sessions.
    pub fn to_json(&self) -> Result<String, RosterError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a snapshot. Stored ratings go back through the same range
    /// checks as live edits.
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let mut state: RosterState = serde_json::from_str(json)?;
        if state.starting_xi.len() > STARTING_XI_SIZE {
            return Err(RosterError::TooManyStarters(state.starting_xi.len()));
        }
        if let Some(dup) = first_duplicate(state.player_ids().into_iter()) {
            return Err(RosterError::DuplicatePlayer(dup.clone()));
        }
        for player in state.starting_xi.iter_mut().chain(state.bench.iter_mut()) {
            recheck_votes(player).map_err(|source| RosterError::InvalidValue {
                player_id: player.id.clone(),
                source,
            })?;
        }
        Ok(state)
    }
}

fn recheck_votes(player: &mut Player) -> Result<(), PlayerError> {
    let rating = player.fan_rating();
    let score = player.value_score();
    player.set_fan_rating(rating)?;
    player.set_value_score(score)
}

fn first_duplicate<'a>(mut ids: impl Iterator<Item = &'a PlayerId>) -> Option<&'a PlayerId> {
    let mut seen = HashSet::new();
    ids.find(|id| !seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::PositionKey;
    use crate::player::PositionCode;
    use crate::roster::drag::DragReconciler;

    fn squad(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(format!("p{i}"), format!("Player {i}"), PositionCode::Midfielder))
            .collect()
    }

    fn id(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    #[test]
    fn from_squad_splits_first_eleven() {
        let roster = RosterState::from_squad(Formation::F433, squad(15)).unwrap();
        assert_eq!(roster.starting_xi.len(), 11);
        assert_eq!(roster.bench.len(), 4);
        assert_eq!(roster.bench[0].id.as_str(), "p11");
        assert!(roster.is_complete());
    }

    #[test]
    fn from_squad_short_squad_has_no_bench() {
        let roster = RosterState::from_squad(Formation::F442, squad(9)).unwrap();
        assert_eq!(roster.starting_xi.len(), 9);
        assert!(roster.bench.is_empty());
        assert!(!roster.is_complete());
    }

    #[test]
    fn from_squad_rejects_duplicates() {
        let mut players = squad(12);
        players.push(players[3].clone());
        let err = RosterState::from_squad(Formation::F433, players).unwrap_err();
        assert!(matches!(err, RosterError::DuplicatePlayer(ref d) if d.as_str() == "p3"));
    }

    #[test]
    fn assignments_follow_formation() {
        let mut roster = RosterState::from_squad(Formation::F433, squad(11)).unwrap();
        let slots = roster.assignments();
        assert_eq!(slots.len(), 11);
        assert_eq!(slots[0].position.key, PositionKey::GK);
        assert_eq!(slots[0].player.unwrap().id.as_str(), "p0");
        assert_eq!(slots[10].position.key, PositionKey::RW);

        roster.set_formation(Formation::F442);
        let slots = roster.assignments();
        assert_eq!(slots[10].position.key, PositionKey::RST);
        // Same player, new slot
        assert_eq!(slots[10].player.unwrap().id.as_str(), "p10");
    }

    #[test]
    fn assignments_leave_empty_slots_for_short_xi() {
        let roster = RosterState::from_squad(Formation::F433, squad(8)).unwrap();
        let slots = roster.assignments();
        assert_eq!(slots.len(), 11);
        assert!(slots[7].player.is_some());
        assert!(slots[8].player.is_none());
    }

    #[test]
    fn apply_drop_result() {
        let mut roster = RosterState::from_squad(Formation::F433, squad(13)).unwrap();
        let mut drag = DragReconciler::new();
        drag.drag_start(id("p12"), Collection::Bench, Some(1));
        let change = drag
            .drop_at(Collection::Pitch, Some(5), &roster.starting_xi, &roster.bench)
            .unwrap();
        roster.apply(change);

        assert_eq!(roster.locate(&id("p12")), Some((Collection::Pitch, 5)));
        assert_eq!(roster.locate(&id("p5")), Some((Collection::Bench, 1)));
        assert!(roster.is_complete());
    }

    #[test]
    fn add_to_bench_rejects_existing_player() {
        let mut roster = RosterState::from_squad(Formation::F433, squad(12)).unwrap();
        let dup = roster.starting_xi[0].clone();
        assert!(matches!(
            roster.add_to_bench(dup),
            Err(RosterError::DuplicatePlayer(_))
        ));

        let new = Player::new("new", "New Signing", PositionCode::Forward);
        roster.add_to_bench(new).unwrap();
        assert_eq!(roster.locate(&id("new")), Some((Collection::Bench, 1)));
    }

    #[test]
    fn remove_player_from_either_collection() {
        let mut roster = RosterState::from_squad(Formation::F433, squad(12)).unwrap();
        let removed = roster.remove_player(&id("p11")).unwrap();
        assert_eq!(removed.id.as_str(), "p11");
        assert!(roster.bench.is_empty());

        roster.remove_player(&id("p0")).unwrap();
        assert_eq!(roster.starting_xi.len(), 10);

        assert!(matches!(
            roster.remove_player(&id("p0")),
            Err(RosterError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn rate_player_validates_range() {
        let mut roster = RosterState::from_squad(Formation::F433, squad(12)).unwrap();
        roster.rate_player(&id("p11"), 9).unwrap();
        assert_eq!(roster.find(&id("p11")).unwrap().fan_rating(), Some(9));

        let err = roster.rate_player(&id("p2"), 0).unwrap_err();
        assert!(matches!(err, RosterError::InvalidValue { .. }));
        assert!(matches!(
            roster.rate_player(&id("ghost"), 5),
            Err(RosterError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn value_score_validates_range() {
        let mut roster = RosterState::from_squad(Formation::F433, squad(11)).unwrap();
        roster.set_value_score(&id("p4"), 2).unwrap();
        assert_eq!(roster.find(&id("p4")).unwrap().value_score(), Some(2));
        assert!(roster.set_value_score(&id("p4"), -3).is_err());
    }

    #[test]
    fn snapshot_restores_same_roster() {
        let mut roster = RosterState::from_squad(Formation::F352, squad(14)).unwrap();
        roster.rate_player(&id("p1"), 7).unwrap();
        let json = roster.to_json().unwrap();
        let restored = RosterState::from_json(&json).unwrap();
        assert_eq!(restored, roster);
        assert!(json.contains("\"3-5-2\""));
    }

    #[test]
    fn snapshot_with_duplicate_ids_rejected() {
        let mut roster = RosterState::from_squad(Formation::F433, squad(12)).unwrap();
        roster.bench.push(roster.starting_xi[0].clone());
        let json = roster.to_json().unwrap();
        assert!(matches!(
            RosterState::from_json(&json),
            Err(RosterError::DuplicatePlayer(_))
        ));
    }

    #[test]
    fn snapshot_with_out_of_range_votes_rejected() {
        let roster = RosterState::from_squad(Formation::F433, squad(12)).unwrap();
        let json = roster.to_json().unwrap();

        let bad_rating = json.replacen("\"fan_rating\":null", "\"fan_rating\":42", 1);
        let err = RosterState::from_json(&bad_rating).unwrap_err();
        match err {
            RosterError::InvalidValue { player_id, source } => {
                assert_eq!(player_id.as_str(), "p0");
                assert!(matches!(
                    source,
                    PlayerError::OutOfRange {
                        field: "fan_rating",
                        value: 42
                    }
                ));
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }

        let bad_score = json.replacen("\"value_score\":null", "\"value_score\":-9", 1);
        assert!(matches!(
            RosterState::from_json(&bad_score),
            Err(RosterError::InvalidValue {
                source: PlayerError::OutOfRange {
                    field: "value_score",
                    ..
                },
                ..
            })
        ));
    }

    #[test]
    fn snapshot_with_oversized_xi_rejected() {
        let mut roster = RosterState::from_squad(Formation::F433, squad(13)).unwrap();
        let extra = roster.bench.remove(0);
        roster.starting_xi.push(extra);
        let json = roster.to_json().unwrap();
        assert!(matches!(
            RosterState::from_json(&json),
            Err(RosterError::TooManyStarters(12))
        ));
    }

    #[test]
    fn malformed_snapshot_rejected() {
        assert!(matches!(
            RosterState::from_json("{\"formation\":\"9-9-9\"}"),
            Err(RosterError::Snapshot(_))
        ));
    }
}
