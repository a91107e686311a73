//! The player: a fast platformer character inside a bullet-hell arena.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`state`] | components: motion, combat resources, the EX attack menu |
//! | [`control`] | movement, jumps, wall cling, dash, focus, shared timers |
//! | [`combat`] | basic/charge shots and card-gated EX attacks |
//!
//! Systems here never touch the boss or resolve collisions; the encounter
//! module owns the tick order and all hit resolution.

pub mod combat;
pub mod control;
pub mod state;

pub use combat::{player_ex_system, player_shoot_system};
pub use control::{player_control_system, player_focus_system, player_timers_system};
pub use state::{ExAttack, Grounding, HitOutcome, Player, PlayerCombat, PlayerMotion};

use crate::constants::PLAYER_SPAWN;
use bevy::prelude::*;

/// Spawns the player at the arena floor spawn point with a full kit.
pub fn spawn_player(commands: &mut Commands) -> Entity {
    commands
        .spawn((
            Player,
            PlayerMotion::default(),
            PlayerCombat::default(),
            Transform::from_xyz(PLAYER_SPAWN.0, PLAYER_SPAWN.1, 0.0),
        ))
        .id()
}
