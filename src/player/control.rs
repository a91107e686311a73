//! Player movement: the input snapshot becomes velocity, grounding, dashes,
//! and parry windows.
//!
//! Runs in the decision stage of the tick, before projectile motion and
//! collision.  All countdowns it relies on are decremented later, in
//! [`player_timers_system`] (the timer stage), so a dash started this tick is
//! invulnerable for exactly its configured duration as seen by the collision
//! stage.

use crate::boss::RealityState;
use crate::config::TuningConfig;
use crate::constants::*;
use crate::effects::{EffectBus, EncounterTime};
use crate::encounter::{DashEvent, Platform};
use crate::input::EncounterInput;
use bevy::prelude::*;

use super::state::{Grounding, Player, PlayerCombat, PlayerMotion};

/// Left wall x for the player box centre.
#[inline]
fn wall_left() -> f32 {
    PLAYER_HALF_EXTENTS.0
}

#[inline]
fn wall_right() -> f32 {
    ARENA_WIDTH - PLAYER_HALF_EXTENTS.0
}

#[inline]
fn floor_y() -> f32 {
    PLAYER_HALF_EXTENTS.1
}

/// Landing reset shared by the floor and the ledges.
fn settle(motion: &mut PlayerMotion, config: &TuningConfig) {
    motion.grounding = Grounding::Grounded;
    motion.jumps_used = 0;
    motion.bonus_jump = false;
    motion.air_dash_available = true;
    motion.cling_timer = config.cling_budget_ticks;
    motion.cling_spent = false;
}

/// Applies the current input snapshot to the player: run acceleration,
/// jumps and wall jumps, the airborne parry window, dash starts, gravity,
/// wall cling, and integration against the arena bounds.
pub fn player_control_system(
    input: Res<EncounterInput>,
    clock: Res<EncounterTime>,
    config: Res<TuningConfig>,
    reality: Res<RealityState>,
    mut players: Query<(&mut PlayerMotion, &mut PlayerCombat, &mut Transform), With<Player>>,
    platforms: Query<(&Platform, &Transform), Without<Player>>,
    mut dashes: MessageWriter<DashEvent>,
) {
    let dt = clock.dt;
    if dt <= 0.0 {
        return;
    }
    let Ok((mut motion, mut combat, mut transform)) = players.single_mut() else {
        return;
    };

    let axis = if reality.controls_inverted() {
        -input.move_axis
    } else {
        input.move_axis
    };
    if axis != 0.0 {
        motion.facing = axis.signum();
    }

    // Dash start. 8-way intent from the move axis and the jump hold; falls
    // back to the facing direction.
    if input.dash_pressed && motion.dash_cooldown <= 0.0 && !motion.is_dashing() {
        let airborne = motion.grounding != Grounding::Grounded;
        if !airborne || motion.air_dash_available {
            let mut dir = Vec2::new(axis, if input.jump_held { 1.0 } else { 0.0 });
            if dir == Vec2::ZERO {
                dir = Vec2::new(motion.facing, 0.0);
            }
            motion.dash_dir = dir.normalize();
            motion.dash_timer = config.dash_ticks;
            motion.dash_cooldown = config.dash_cooldown_ticks;
            if airborne {
                motion.air_dash_available = false;
            }
            dashes.write(DashEvent);
        }
    }

    // Shield arms instantly off cooldown and then blocks exactly one hit.
    if input.shield_pressed && combat.shield_cooldown <= 0.0 && !combat.shield_active {
        combat.shield_active = true;
        combat.shield_cooldown = config.shield_cooldown_ticks;
    }

    if input.jump_pressed {
        match motion.grounding {
            Grounding::Grounded => {
                motion.vel.y = config.jump_impulse;
                motion.jumps_used = 1;
                motion.variable_jump_timer = VARIABLE_JUMP_TICKS;
                motion.grounding = Grounding::Airborne;
            }
            Grounding::WallCling { left } => {
                let kick = if left { WALL_JUMP_KICK } else { -WALL_JUMP_KICK };
                motion.vel = Vec2::new(kick, config.jump_impulse);
                motion.jumps_used = 1;
                motion.variable_jump_timer = VARIABLE_JUMP_TICKS;
                motion.momentum_boost =
                    (motion.momentum_boost + MOMENTUM_BOOST_STEP).min(MOMENTUM_BOOST_MAX);
                motion.grounding = Grounding::Airborne;
            }
            Grounding::Airborne => {
                // An airborne jump press always opens the parry window; the
                // air jump itself only fires while budget remains.
                combat.parry_timer = config.parry_window_ticks;
                let budget = config.max_jumps + u32::from(motion.bonus_jump);
                if motion.jumps_used < budget {
                    if motion.jumps_used >= config.max_jumps {
                        motion.bonus_jump = false;
                    }
                    motion.vel.y = config.jump_impulse;
                    motion.jumps_used += 1;
                    motion.variable_jump_timer = VARIABLE_JUMP_TICKS;
                }
            }
        }
    }

    if motion.is_dashing() {
        // The dash overrides locomotion entirely; no gravity, no control.
        motion.vel = motion.dash_dir * config.dash_speed;
    } else {
        let grounded = motion.grounding == Grounding::Grounded;
        if axis != 0.0 {
            let accel = if grounded { config.run_accel } else { config.air_accel };
            let cap = motion.max_run_speed();
            motion.vel.x = (motion.vel.x + axis * accel * dt).clamp(-cap, cap);
        } else if grounded {
            motion.vel.x *= GROUND_FRICTION.powf(dt);
        }

        let float_scale = if motion.variable_jump_timer > 0.0 && input.jump_held {
            FLOAT_GRAVITY_SCALE
        } else {
            1.0
        };
        motion.vel.y -= config.gravity * float_scale * reality.gravity_sign() * dt;
        motion.vel.y = motion.vel.y.clamp(-config.max_fall_speed, config.max_fall_speed);

        if matches!(motion.grounding, Grounding::WallCling { .. }) {
            motion.vel.y = motion.vel.y.max(-config.cling_slide_speed);
        }
    }

    let vel = motion.vel;
    let prev_bottom = transform.translation.y - PLAYER_HALF_EXTENTS.1;
    transform.translation.x += vel.x * dt;
    transform.translation.y += vel.y * dt;

    // Floor, then the one-way ledges: a ledge only catches the player when
    // the bottom edge crosses its top surface while falling.
    if transform.translation.y <= floor_y() {
        transform.translation.y = floor_y();
        if motion.vel.y < 0.0 {
            motion.vel.y = 0.0;
        }
        if motion.grounding != Grounding::Grounded {
            settle(&mut motion, &config);
        }
    } else {
        let mut supported = false;
        for (platform, p_transform) in &platforms {
            let top = p_transform.translation.y + platform.half.y;
            let bottom = transform.translation.y - PLAYER_HALF_EXTENTS.1;
            let within_x = (transform.translation.x - p_transform.translation.x).abs()
                <= platform.half.x + PLAYER_HALF_EXTENTS.0;
            if within_x && motion.vel.y <= 0.0 && prev_bottom >= top - 0.01 && bottom <= top + 0.01
            {
                transform.translation.y = top + PLAYER_HALF_EXTENTS.1;
                motion.vel.y = 0.0;
                if motion.grounding != Grounding::Grounded {
                    settle(&mut motion, &config);
                }
                supported = true;
                break;
            }
        }
        if !supported && motion.grounding == Grounding::Grounded {
            motion.grounding = Grounding::Airborne;
        }
    }

    // Ceiling.
    if transform.translation.y >= ARENA_HEIGHT - PLAYER_HALF_EXTENTS.1 {
        transform.translation.y = ARENA_HEIGHT - PLAYER_HALF_EXTENTS.1;
        motion.vel.y = motion.vel.y.min(0.0);
    }

    // Walls, and the cling transition: airborne + touching + falling.
    let at_left = transform.translation.x <= wall_left();
    let at_right = transform.translation.x >= wall_right();
    if at_left {
        transform.translation.x = wall_left();
        motion.vel.x = motion.vel.x.max(0.0);
    }
    if at_right {
        transform.translation.x = wall_right();
        motion.vel.x = motion.vel.x.min(0.0);
    }
    match motion.grounding {
        Grounding::Airborne => {
            if (at_left || at_right) && motion.vel.y < 0.0 && !motion.cling_spent && !motion.is_dashing() {
                motion.grounding = Grounding::WallCling { left: at_left };
            }
        }
        Grounding::WallCling { left } => {
            let still_touching = if left { at_left } else { at_right };
            if !still_touching {
                motion.grounding = Grounding::Airborne;
            }
        }
        Grounding::Grounded => {}
    }
}

/// Held-focus slow-motion: drains the meter against the **real** clock and
/// publishes the hold multiplier to the effect bus every frame.
pub fn player_focus_system(
    input: Res<EncounterInput>,
    clock: Res<EncounterTime>,
    mut bus: ResMut<EffectBus>,
    mut players: Query<&mut PlayerCombat, With<Player>>,
) {
    let Ok(mut combat) = players.single_mut() else {
        return;
    };
    if input.focus_held && combat.focus > 0.0 {
        combat.focus = (combat.focus - FOCUS_DRAIN * clock.real_dt).max(0.0);
        bus.hold_scale = FOCUS_SCALE;
    } else {
        combat.focus = (combat.focus + FOCUS_REGEN * clock.real_dt).min(FOCUS_MAX);
        bus.hold_scale = 1.0;
    }
}

/// Timer stage: burns down every player countdown.  The chain resets to zero
/// when its grace period lapses; an exhausted cling budget forces release.
pub fn player_timers_system(
    clock: Res<EncounterTime>,
    mut players: Query<(&mut PlayerMotion, &mut PlayerCombat), With<Player>>,
) {
    let dt = clock.dt;
    if dt <= 0.0 {
        return;
    }
    let Ok((mut motion, mut combat)) = players.single_mut() else {
        return;
    };

    motion.dash_timer = (motion.dash_timer - dt).max(0.0);
    motion.dash_cooldown = (motion.dash_cooldown - dt).max(0.0);
    motion.variable_jump_timer = (motion.variable_jump_timer - dt).max(0.0);

    if matches!(motion.grounding, Grounding::WallCling { .. }) {
        motion.cling_timer -= dt;
        if motion.cling_timer <= 0.0 {
            motion.cling_timer = 0.0;
            motion.cling_spent = true;
            motion.grounding = Grounding::Airborne;
        }
    }

    combat.iframe_timer = (combat.iframe_timer - dt).max(0.0);
    combat.parry_timer = (combat.parry_timer - dt).max(0.0);
    combat.exam_ace_timer = (combat.exam_ace_timer - dt).max(0.0);
    combat.shield_cooldown = (combat.shield_cooldown - dt).max(0.0);
    combat.shot_cooldown = (combat.shot_cooldown - dt).max(0.0);

    if combat.chain_timer > 0.0 {
        combat.chain_timer -= dt;
        if combat.chain_timer <= 0.0 {
            combat.chain_timer = 0.0;
            combat.parry_chain = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::spawn_player;

    fn build_test_app() -> App {
        let mut app = App::new();
        app.insert_resource(EncounterInput::default());
        app.insert_resource(EncounterTime {
            dt: 1.0,
            real_dt: 1.0,
        });
        app.insert_resource(TuningConfig::default());
        app.insert_resource(RealityState::default());
        app.add_message::<DashEvent>();
        app.add_systems(Update, (player_control_system, player_timers_system).chain());
        app
    }

    fn spawn(app: &mut App) -> Entity {
        spawn_player(&mut app.world_mut().commands());
        app.world_mut().flush();
        app.world_mut()
            .query_filtered::<Entity, With<Player>>()
            .single(app.world())
            .unwrap()
    }

    fn set_input(app: &mut App, input: EncounterInput) {
        *app.world_mut().resource_mut::<EncounterInput>() = input;
    }

    fn motion(app: &mut App, entity: Entity) -> PlayerMotion {
        app.world().get::<PlayerMotion>(entity).unwrap().clone()
    }

    #[test]
    fn ground_jump_consumes_one_and_leaves_the_floor() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        set_input(
            &mut app,
            EncounterInput {
                jump_pressed: true,
                jump_held: true,
                ..Default::default()
            },
        );
        app.update();
        let m = motion(&mut app, player);
        assert_eq!(m.jumps_used, 1);
        assert_eq!(m.grounding, Grounding::Airborne);
        assert!(m.vel.y > 0.0);
    }

    #[test]
    fn double_jump_caps_at_budget_and_opens_parry_window() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        for _ in 0..3 {
            set_input(
                &mut app,
                EncounterInput {
                    jump_pressed: true,
                    ..Default::default()
                },
            );
            app.update();
            set_input(&mut app, EncounterInput::default());
            app.update();
        }
        let m = motion(&mut app, player);
        assert_eq!(m.jumps_used, MAX_JUMPS);
        let combat = app.world().get::<PlayerCombat>(player).unwrap();
        assert!(combat.parry_open());
    }

    #[test]
    fn banked_bonus_jump_allows_a_third_jump_once() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        app.world_mut()
            .get_mut::<PlayerMotion>(player)
            .unwrap()
            .bonus_jump = true;
        for _ in 0..4 {
            set_input(
                &mut app,
                EncounterInput {
                    jump_pressed: true,
                    ..Default::default()
                },
            );
            app.update();
            set_input(&mut app, EncounterInput::default());
            app.update();
        }
        let m = motion(&mut app, player);
        assert_eq!(m.jumps_used, MAX_JUMPS + 1);
        assert!(!m.bonus_jump);
    }

    #[test]
    fn dash_runs_for_its_exact_duration() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        set_input(
            &mut app,
            EncounterInput {
                dash_pressed: true,
                move_axis: 1.0,
                ..Default::default()
            },
        );
        app.update();
        set_input(&mut app, EncounterInput::default());
        // The dash was started on tick 1 (timer decremented once already).
        for _ in 0..DASH_TICKS as usize - 1 {
            assert!(motion(&mut app, player).is_dashing());
            app.update();
        }
        assert!(!motion(&mut app, player).is_dashing());
        assert!(motion(&mut app, player).dash_cooldown > 0.0);
    }

    #[test]
    fn wall_cling_caps_fall_speed_and_wall_jump_builds_momentum() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        // Put the player high up against the right wall, falling.
        {
            let mut transform = app.world_mut().get_mut::<Transform>(player).unwrap();
            transform.translation.x = ARENA_WIDTH - PLAYER_HALF_EXTENTS.0;
            transform.translation.y = 400.0;
            let mut m = app.world_mut().get_mut::<PlayerMotion>(player).unwrap();
            m.grounding = Grounding::Airborne;
            m.vel = Vec2::new(0.0, -6.0);
        }
        set_input(
            &mut app,
            EncounterInput {
                move_axis: 1.0,
                ..Default::default()
            },
        );
        app.update();
        app.update();
        let m = motion(&mut app, player);
        assert!(matches!(m.grounding, Grounding::WallCling { left: false }));
        assert!(m.vel.y >= -CLING_SLIDE_SPEED);

        set_input(
            &mut app,
            EncounterInput {
                jump_pressed: true,
                ..Default::default()
            },
        );
        app.update();
        let m = motion(&mut app, player);
        assert_eq!(m.grounding, Grounding::Airborne);
        assert!(m.vel.x < 0.0, "wall jump kicks away from the wall");
        assert_eq!(m.momentum_boost, MOMENTUM_BOOST_STEP);
    }

    fn spawn_ledge(app: &mut App, center: Vec2) {
        app.world_mut().spawn((
            Platform {
                half: Vec2::new(PLATFORM_HALF_EXTENTS.0, PLATFORM_HALF_EXTENTS.1),
            },
            Transform::from_translation(center.extend(0.0)),
        ));
    }

    #[test]
    fn falling_player_lands_on_a_ledge_top() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        let ledge = Vec2::new(640.0, 330.0);
        spawn_ledge(&mut app, ledge);
        let top = ledge.y + PLATFORM_HALF_EXTENTS.1;
        {
            let mut transform = app.world_mut().get_mut::<Transform>(player).unwrap();
            transform.translation.x = ledge.x;
            transform.translation.y = top + PLAYER_HALF_EXTENTS.1 + 30.0;
            let mut m = app.world_mut().get_mut::<PlayerMotion>(player).unwrap();
            m.grounding = Grounding::Airborne;
            m.vel = Vec2::new(0.0, -8.0);
            m.jumps_used = 2;
            m.air_dash_available = false;
        }
        for _ in 0..10 {
            app.update();
        }
        let m = motion(&mut app, player);
        assert_eq!(m.grounding, Grounding::Grounded);
        assert_eq!(m.jumps_used, 0, "landing restocks the jumps");
        assert!(m.air_dash_available);
        let y = app.world().get::<Transform>(player).unwrap().translation.y;
        assert_eq!(y, top + PLAYER_HALF_EXTENTS.1);
    }

    #[test]
    fn rising_player_passes_through_a_ledge() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        let ledge = Vec2::new(640.0, 120.0);
        spawn_ledge(&mut app, ledge);
        {
            let mut transform = app.world_mut().get_mut::<Transform>(player).unwrap();
            transform.translation.x = ledge.x;
            transform.translation.y = 60.0;
            let mut m = app.world_mut().get_mut::<PlayerMotion>(player).unwrap();
            m.grounding = Grounding::Airborne;
            m.vel = Vec2::new(0.0, 14.0);
        }
        // Enough ticks to carry the player box past the ledge top while
        // still ascending.
        for _ in 0..9 {
            app.update();
        }
        let m = motion(&mut app, player);
        assert_eq!(m.grounding, Grounding::Airborne);
        assert!(m.vel.y > 0.0);
        let y = app.world().get::<Transform>(player).unwrap().translation.y;
        assert!(
            y - PLAYER_HALF_EXTENTS.1 > ledge.y + PLATFORM_HALF_EXTENTS.1,
            "rose through the ledge"
        );
    }

    #[test]
    fn zero_delta_moves_nothing() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        app.world_mut().resource_mut::<EncounterTime>().dt = 0.0;
        set_input(
            &mut app,
            EncounterInput {
                move_axis: 1.0,
                ..Default::default()
            },
        );
        let before = app.world().get::<Transform>(player).unwrap().translation;
        app.update();
        let after = app.world().get::<Transform>(player).unwrap().translation;
        assert_eq!(before, after);
    }
}
