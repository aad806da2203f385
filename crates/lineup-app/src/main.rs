// Lineup builder entry point.
//
// Startup sequence:
// 1. Load config (copying defaults on first run)
// 2. Initialize tracing (log to file, not stdout)
// 3. Load the squad sheet through the provider
// 4. Resolve the formation (config, or first CLI argument)
// 5. Build the roster and print the pitch assignments and bench

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use lineup_core::config::{self, Config};
use lineup_core::formation::Formation;
use lineup_core::provider::{CsvProvider, SquadProvider};
use lineup_core::roster::{Assignment, RosterState};

fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 2. Initialize tracing
    init_tracing(&config)?;
    info!("Lineup builder starting up");

    // 3. Load the squad sheet
    let provider = CsvProvider::open(Path::new(&config.data.squads))
        .context("failed to load squad data")?;
    let teams = provider
        .teams(&config.data.league)
        .with_context(|| format!("league `{}`", config.data.league))?;
    let team = teams
        .iter()
        .find(|t| t.id == config.data.team)
        .with_context(|| {
            format!(
                "team `{}` not found in league `{}`",
                config.data.team, config.data.league
            )
        })?;
    let players = provider
        .players(&team.id)
        .with_context(|| format!("squad for `{}`", team.id))?;
    info!("Loaded {} players for {}", players.len(), team.name);

    // 4. Resolve the formation
    let formation = resolve_formation(&config, std::env::args().nth(1).as_deref())?;
    info!("Using formation {}", formation);

    // 5. Build the roster and print it
    let roster = RosterState::from_squad(formation, players).context("failed to build roster")?;
    if !roster.is_complete() {
        warn!(
            "{} has only {} starters for {}",
            team.name,
            roster.starting_xi.len(),
            formation
        );
    }

    println!("{} ({})", team.name, formation);
    for slot in roster.assignments() {
        println!("  {}", format_slot(&slot));
    }
    println!("Bench:");
    if roster.bench.is_empty() {
        println!("  [empty]");
    }
    for player in &roster.bench {
        println!("  {} {}", player.position, player.name);
    }

    info!("Lineup builder shut down cleanly");
    Ok(())
}

/// CLI argument wins over config; both go through the configured policy.
fn resolve_formation(config: &Config, arg: Option<&str>) -> anyhow::Result<Formation> {
    let code = arg.unwrap_or(&config.lineup.formation);
    config
        .formation_policy()
        .resolve(code)
        .with_context(|| format!("cannot use formation `{code}`"))
}

/// "GK: David Raya (#22)" or "ST: [empty]".
fn format_slot(slot: &Assignment<'_>) -> String {
    match slot.player {
        Some(p) => {
            let number = p
                .shirt_number
                .map(|n| format!(" (#{n})"))
                .unwrap_or_default();
            let flag = if p.status.injured { " [injured]" } else { "" };
            format!("{}: {}{}{}", slot.position.key, p.name, number, flag)
        }
        None => format!("{}: [empty]", slot.position.key),
    }
}

/// Initialize tracing to log to a file.
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_path = Path::new(&config.logging.file);
    if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let log_file = std::fs::File::create(log_path)
        .with_context(|| format!("failed to create log file {}", log_path.display()))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
