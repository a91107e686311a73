use crate::constants::{ARENA_HEIGHT, ARENA_WIDTH};
use bevy::prelude::*;

/// Marker for the single gameplay camera, so the effect systems can find it.
#[derive(Component)]
pub struct EncounterCamera;

/// Setup camera for 2D rendering, centred on the arena.
///
/// The arena uses a y-up coordinate frame with the origin at the bottom-left
/// corner; the camera parks at its centre and the effect bus moves it from
/// there.
pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::from_xyz(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0, 999.0),
        EncounterCamera,
    ));
    eprintln!("[SETUP] Camera spawned");
}
