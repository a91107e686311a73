//! Per-tick input snapshot.
//!
//! The simulation never polls a device.  The host writes one
//! [`EncounterInput`] per frame (here: a keyboard mapping system registered by
//! the binary); every gameplay system reads the snapshot.  Tests populate the
//! resource directly to drive the player without any input backend.

use bevy::prelude::*;

/// Aggregated player input for the current tick.
///
/// Edge fields (`*_pressed`, `shoot_released`, `ex_fire`) are true for exactly
/// one frame; held fields stay true while the physical input is down.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct EncounterInput {
    /// Horizontal move axis in `[-1.0, 1.0]`; negative is left.
    pub move_axis: f32,
    /// Jump edge — grounded: jump; airborne: jump or open a parry window.
    pub jump_pressed: bool,
    /// Jump hold — sustains the variable-height window after an impulse.
    pub jump_held: bool,
    /// Dash edge.
    pub dash_pressed: bool,
    /// Shoot hold — accumulates charge.
    pub shoot_held: bool,
    /// Shoot release edge — fires basic or charge shot depending on hold time.
    pub shoot_released: bool,
    /// Shield edge.
    pub shield_pressed: bool,
    /// EX selection change this tick: `Some(1..=5)`.
    pub ex_select: Option<u8>,
    /// EX fire edge.
    pub ex_fire: bool,
    /// Focus hold — drains the focus meter for host-side slow-motion.
    pub focus_held: bool,
}

/// Clears the snapshot at the top of each tick, before mapping systems write
/// into it.  Must be ordered before any input source.
pub fn clear_encounter_input(mut input: ResMut<EncounterInput>) {
    *input = EncounterInput::default();
}

/// Host-side keyboard mapping.  Registered only by the binary — the library
/// and the tests never depend on a physical device.
///
/// | Key | Meaning |
/// |-----|---------|
/// | A/D, ←/→ | move |
/// | Space | jump / air-parry |
/// | Shift | dash |
/// | J | shoot (hold to charge) |
/// | K | shield |
/// | L | EX fire |
/// | 1–5 | EX select |
/// | F | focus |
pub fn keyboard_to_encounter_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut input: ResMut<EncounterInput>,
) {
    let mut axis = 0.0;
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        axis -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        axis += 1.0;
    }
    input.move_axis = axis;

    input.jump_pressed = keys.just_pressed(KeyCode::Space);
    input.jump_held = keys.pressed(KeyCode::Space);
    input.dash_pressed =
        keys.just_pressed(KeyCode::ShiftLeft) || keys.just_pressed(KeyCode::ShiftRight);
    input.shoot_held = keys.pressed(KeyCode::KeyJ);
    input.shoot_released = keys.just_released(KeyCode::KeyJ);
    input.shield_pressed = keys.just_pressed(KeyCode::KeyK);
    input.ex_fire = keys.just_pressed(KeyCode::KeyL);
    input.focus_held = keys.pressed(KeyCode::KeyF);

    input.ex_select = [
        (KeyCode::Digit1, 1u8),
        (KeyCode::Digit2, 2),
        (KeyCode::Digit3, 3),
        (KeyCode::Digit4, 4),
        (KeyCode::Digit5, 5),
    ]
    .iter()
    .find(|(key, _)| keys.just_pressed(*key))
    .map(|(_, slot)| *slot);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_every_field() {
        let mut app = App::new();
        app.insert_resource(EncounterInput {
            move_axis: 1.0,
            jump_pressed: true,
            ex_select: Some(3),
            ..Default::default()
        });
        app.add_systems(Update, clear_encounter_input);
        app.update();
        assert_eq!(
            *app.world().resource::<EncounterInput>(),
            EncounterInput::default()
        );
    }
}
