// Integration tests for the lineup builder.
//
// These run the full path a front end takes: read the squad sheet through a
// provider, build a roster, drive drag gestures through the reconciler and
// apply the results.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use lineup_core::config;
use lineup_core::formation::{self, Formation, PositionKey, UnknownFormationPolicy};
use lineup_core::player::PlayerId;
use lineup_core::provider::{CsvProvider, SquadProvider};
use lineup_core::roster::{Collection, DragReconciler, RosterState};

// ===========================================================================
// Test helpers
// ===========================================================================

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .find(|p| p.join("defaults").join("squads.csv").is_file())
        .map(Path::to_path_buf)
        .expect("cannot locate defaults/squads.csv above the crate directory")
}

fn provider() -> CsvProvider {
    CsvProvider::open(&workspace_root().join("defaults").join("squads.csv"))
        .expect("fixture squad sheet should load")
}

fn arsenal(formation: Formation) -> RosterState {
    let players = provider().players("ars").unwrap();
    RosterState::from_squad(formation, players).unwrap()
}

fn id(s: &str) -> PlayerId {
    PlayerId::new(s)
}

fn name_at(roster: &RosterState, collection: Collection, index: usize) -> &str {
    let list = match collection {
        Collection::Pitch => &roster.starting_xi,
        Collection::Bench => &roster.bench,
    };
    &list[index].name
}

fn id_set(roster: &RosterState) -> HashSet<String> {
    roster.player_ids().into_iter().map(|p| p.to_string()).collect()
}

// ===========================================================================
// Fixtures and config
// ===========================================================================

#[test]
fn fixture_sheet_has_expected_leagues_and_teams() {
    let provider = provider();
    let leagues: Vec<String> = provider.leagues().into_iter().map(|l| l.id).collect();
    assert_eq!(leagues, vec!["epl", "liga"]);

    let epl: Vec<String> = provider
        .teams("epl")
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(epl, vec!["Arsenal", "Chelsea"]);

    for team in ["ars", "che", "rma"] {
        let squad = provider.players(team).unwrap();
        assert!(squad.len() > 11, "{team} should have a bench");
    }
}

#[test]
fn first_run_seeds_config_and_squads() {
    let tmp = std::env::temp_dir().join("lineup_it_first_run");
    let _ = std::fs::remove_dir_all(&tmp);
    std::fs::create_dir_all(tmp.join("defaults")).unwrap();
    for name in [config::CONFIG_FILE, "squads.csv"] {
        std::fs::copy(
            workspace_root().join("defaults").join(name),
            tmp.join("defaults").join(name),
        )
        .unwrap();
    }

    let seeded = config::ensure_config_files(&tmp).unwrap();
    assert_eq!(seeded.len(), config::SEED_FILES.len());
    let cfg = config::load_config_from(&tmp).unwrap();
    assert_eq!(cfg.formation(), Some(Formation::F433));

    let seeded_sheet = CsvProvider::open(&tmp.join(&cfg.data.squads)).unwrap();
    let squad = seeded_sheet.players(&cfg.data.team).unwrap();
    assert_eq!(squad.len(), provider().players(&cfg.data.team).unwrap().len());

    let _ = std::fs::remove_dir_all(&tmp);
}

// ===========================================================================
// Layouts
// ===========================================================================

#[test]
fn every_formation_lays_out_a_full_squad() {
    for f in Formation::ALL {
        let roster = arsenal(f);
        let slots = roster.assignments();
        assert_eq!(slots.len(), formation::STARTING_XI_SIZE);
        assert_eq!(slots[0].position.key, PositionKey::GK);
        assert!(slots.iter().all(|s| s.player.is_some()), "{f}");
    }
}

#[test]
fn unknown_formation_policy_is_stable() {
    let reject = UnknownFormationPolicy::Reject;
    let fallback = UnknownFormationPolicy::Fallback(Formation::F442);
    for _ in 0..5 {
        assert!(reject.layout_for("6-6-6").is_err());
        assert_eq!(
            fallback.layout_for("6-6-6").unwrap().formation,
            Formation::F442
        );
    }
}

// ===========================================================================
// Drag and drop
// ===========================================================================

#[test]
fn substitute_comes_on_and_starter_goes_to_bench() {
    let mut roster = arsenal(Formation::F433);
    let mut drag = DragReconciler::new();

    // Trossard (bench 0) onto Havertz's slot (9)
    drag.drag_start(id("ars-trossard"), Collection::Bench, Some(0));
    drag.drag_over(Collection::Pitch, Some(9));
    let applied = drag.drop_with(&roster.starting_xi.clone(), &roster.bench.clone(), |xi, bench| {
        roster.starting_xi = xi;
        roster.bench = bench;
    });
    assert!(applied);

    assert_eq!(name_at(&roster, Collection::Pitch, 9), "Leandro Trossard");
    assert_eq!(roster.bench.last().unwrap().name, "Kai Havertz");
    assert_eq!(roster.starting_xi.len(), 11);
    assert!(!drag.is_dragging());
}

#[test]
fn starters_trade_slots() {
    let mut roster = arsenal(Formation::F433);
    let mut drag = DragReconciler::new();

    // Saka (LW slot 8) onto Martinelli (RW slot 10)
    drag.drag_start(id("ars-saka"), Collection::Pitch, Some(8));
    let change = drag
        .drop_at(Collection::Pitch, Some(10), &roster.starting_xi, &roster.bench)
        .unwrap();
    roster.apply(change);

    assert_eq!(name_at(&roster, Collection::Pitch, 8), "Gabriel Martinelli");
    assert_eq!(name_at(&roster, Collection::Pitch, 10), "Bukayo Saka");
    let rw = roster
        .assignments()
        .into_iter()
        .find(|s| s.position.key == PositionKey::RW)
        .unwrap();
    assert_eq!(rw.player.unwrap().name, "Bukayo Saka");
}

#[test]
fn cancelled_gesture_changes_nothing() {
    let roster = arsenal(Formation::F433);
    let before = roster.clone();
    let mut drag = DragReconciler::new();

    drag.drag_start(id("ars-merino"), Collection::Bench, Some(1));
    drag.drag_over(Collection::Pitch, Some(3));
    drag.drag_end();
    assert!(drag.drop(&roster.starting_xi, &roster.bench).is_none());
    assert_eq!(roster, before);
}

#[test]
fn long_session_preserves_every_player() {
    let mut roster = arsenal(Formation::F4231);
    let expected = id_set(&roster);
    let total = roster.starting_xi.len() + roster.bench.len();
    let mut drag = DragReconciler::new();

    let moves: &[(&str, Collection, Collection, Option<usize>)] = &[
        ("ars-kepa", Collection::Bench, Collection::Pitch, Some(0)),
        ("ars-raya", Collection::Bench, Collection::Bench, Some(0)),
        ("ars-rice", Collection::Pitch, Collection::Pitch, Some(1)),
        ("ars-odegaard", Collection::Pitch, Collection::Bench, None),
        ("ars-merino", Collection::Bench, Collection::Pitch, Some(20)),
        ("ars-ghost", Collection::Bench, Collection::Pitch, Some(2)),
        ("ars-saka", Collection::Bench, Collection::Pitch, Some(2)),
        ("ars-calafiori", Collection::Bench, Collection::Pitch, Some(4)),
        ("ars-white", Collection::Bench, Collection::Bench, Some(0)),
    ];

    for &(player, from, to, index) in moves {
        drag.drag_start(id(player), from, None);
        if let Some(change) = drag.drop_at(to, index, &roster.starting_xi, &roster.bench) {
            roster.apply(change);
        }
        assert_eq!(id_set(&roster), expected, "after moving {player}");
        assert_eq!(
            roster.starting_xi.len() + roster.bench.len(),
            total,
            "after moving {player}"
        );
    }

    // Kepa is in goal, Raya heads the bench
    assert_eq!(roster.locate(&id("ars-kepa")), Some((Collection::Pitch, 0)));
    assert_eq!(roster.locate(&id("ars-raya")), Some((Collection::Bench, 0)));
}

#[test]
fn session_survives_snapshot() {
    let mut roster = arsenal(Formation::F352);
    roster.rate_player(&id("ars-saka"), 9).unwrap();
    roster.set_value_score(&id("ars-partey"), -1).unwrap();

    let mut drag = DragReconciler::new();
    drag.drag_start(id("ars-merino"), Collection::Bench, Some(1));
    let change = drag
        .drop_at(Collection::Pitch, Some(6), &roster.starting_xi, &roster.bench)
        .unwrap();
    roster.apply(change);

    let json = roster.to_json().unwrap();
    let restored = RosterState::from_json(&json).unwrap();
    assert_eq!(restored, roster);
    assert_eq!(restored.find(&id("ars-saka")).unwrap().fan_rating(), Some(9));
    assert_eq!(name_at(&restored, Collection::Pitch, 6), "Mikel Merino");
}
