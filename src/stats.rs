//! Lifetime encounter statistics, persisted as TOML.
//!
//! The tally only ever consumes the encounter messages — parries, dashes,
//! defeats — so gameplay code has no dependency on persistence.  The file is
//! written once per terminal outcome and loaded once at startup; a missing or
//! unreadable file just means fresh stats.

use std::fs;
use std::path::PathBuf;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{STATS_FILE_VERSION, TICKS_PER_SECOND};
use crate::encounter::{
    BossDefeatedEvent, DashEvent, EncounterElapsed, ParryEvent, PlayerDefeatedEvent,
};
use crate::menu::GameState;

/// Lifetime tallies across every encounter on this machine.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EncounterStats {
    pub version: u32,
    pub total_wins: u64,
    pub total_deaths: u64,
    /// Fastest clear, in seconds; `None` until the first win.
    pub best_time_secs: Option<f32>,
    pub total_parries: u64,
    pub total_perfect_parries: u64,
    pub highest_parry_chain: u32,
    pub total_dashes: u64,
}

impl EncounterStats {
    /// Folds in one win and keeps the best time.
    fn record_win(&mut self, time_secs: f32) {
        self.total_wins += 1;
        self.best_time_secs = Some(match self.best_time_secs {
            Some(best) => best.min(time_secs),
            None => time_secs,
        });
    }
}

fn stats_path() -> PathBuf {
    PathBuf::from("saves").join("stats.toml")
}

/// Reads the stats file; a missing file yields defaults, a malformed one is
/// an error the caller may ignore.
pub fn load_stats() -> Result<EncounterStats, String> {
    let path = stats_path();
    if !path.exists() {
        return Ok(EncounterStats {
            version: STATS_FILE_VERSION,
            ..Default::default()
        });
    }
    let contents = fs::read_to_string(&path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let stats: EncounterStats =
        toml::from_str(&contents).map_err(|err| format!("failed to parse stats TOML: {err}"))?;
    if stats.version > STATS_FILE_VERSION {
        return Err(format!(
            "unsupported stats version {} (expected at most {})",
            stats.version, STATS_FILE_VERSION
        ));
    }
    Ok(stats)
}

fn write_stats(stats: &EncounterStats) -> Result<(), String> {
    fs::create_dir_all("saves").map_err(|err| format!("failed to create save dir: {err}"))?;
    let serialized = toml::to_string_pretty(stats)
        .map_err(|err| format!("failed to serialize stats TOML: {err}"))?;
    let path = stats_path();
    fs::write(&path, serialized).map_err(|err| format!("failed to write {}: {err}", path.display()))
}

/// Startup: pull lifetime stats off disk, falling back to zeros on any error.
pub fn load_stats_system(mut commands: Commands) {
    match load_stats() {
        Ok(stats) => {
            info!(
                "Loaded stats: {} wins, {} deaths",
                stats.total_wins, stats.total_deaths
            );
            commands.insert_resource(stats);
        }
        Err(err) => {
            warn!("Ignoring stats file: {err}");
            commands.insert_resource(EncounterStats {
                version: STATS_FILE_VERSION,
                ..Default::default()
            });
        }
    }
}

/// Folds this tick's messages into the tally and writes the file when an
/// encounter ends.
#[allow(clippy::too_many_arguments)]
pub fn stats_tally_system(
    mut stats: ResMut<EncounterStats>,
    elapsed: Res<EncounterElapsed>,
    mut parries: MessageReader<ParryEvent>,
    mut dashes: MessageReader<DashEvent>,
    mut wins: MessageReader<BossDefeatedEvent>,
    mut deaths: MessageReader<PlayerDefeatedEvent>,
) {
    for parry in parries.read() {
        stats.total_parries += 1;
        if parry.perfect {
            stats.total_perfect_parries += 1;
        }
        stats.highest_parry_chain = stats.highest_parry_chain.max(parry.chain);
    }
    stats.total_dashes += dashes.read().count() as u64;

    let mut terminal = false;
    for _ in wins.read() {
        stats.record_win(elapsed.0 / TICKS_PER_SECOND);
        terminal = true;
    }
    for _ in deaths.read() {
        stats.total_deaths += 1;
        terminal = true;
    }

    if terminal {
        if let Err(err) = write_stats(&stats) {
            error!("Failed to write stats: {err}");
        }
    }
}

/// Registers stats loading at startup and the message-fed tally.
pub struct StatsPlugin;

impl Plugin for StatsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EncounterStats>()
            .add_systems(Startup, load_stats_system)
            .add_systems(
                Update,
                stats_tally_system
                    .run_if(in_state(GameState::Playing))
                    .after(crate::encounter::encounter_outcome_system),
            );
    }
}
