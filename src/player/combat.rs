//! Player offense: basic and charge shots, and the card-gated EX attacks.
//!
//! | System | Purpose |
//! |--------|---------|
//! | [`player_shoot_system`] | hold-to-charge shooting with a close-range card incentive |
//! | [`player_ex_system`] | EX selection and firing against the card pool |
//!
//! Neither system resolves damage; they only spawn player-owned projectiles.
//! The encounter collision stage applies hits in spawn order.

use crate::boss::Boss;
use crate::config::TuningConfig;
use crate::constants::*;
use crate::effects::EncounterTime;
use crate::input::EncounterInput;
use crate::projectile::{spawn_projectile, Owner, ProjectileKind, ProjectileSeq};
use bevy::prelude::*;

use super::state::{ExAttack, Player, PlayerCombat};

/// Hold-to-charge shooting.  A release after a long enough hold becomes a
/// charge shot; otherwise a rate-limited basic shot.  Basic shots fired
/// close to the boss earn a card sliver — the risk/reward lever.
pub fn player_shoot_system(
    mut commands: Commands,
    input: Res<EncounterInput>,
    clock: Res<EncounterTime>,
    config: Res<TuningConfig>,
    mut seq: ResMut<ProjectileSeq>,
    mut players: Query<(&mut PlayerCombat, &super::state::PlayerMotion, &Transform), With<Player>>,
    bosses: Query<&Transform, With<Boss>>,
) {
    let dt = clock.dt;
    if dt <= 0.0 {
        return;
    }
    let Ok((mut combat, motion, transform)) = players.single_mut() else {
        return;
    };
    let pos = transform.translation.truncate();

    if input.shoot_held {
        combat.charge_held += dt;
    }
    if !input.shoot_released {
        return;
    }

    let held = combat.charge_held;
    combat.charge_held = 0.0;
    let muzzle = pos + Vec2::new(motion.facing * PLAYER_HALF_EXTENTS.0, 6.0);
    let vel = Vec2::new(motion.facing * SHOT_SPEED, 0.0);

    if held >= config.charge_ticks {
        spawn_projectile(
            &mut commands,
            &mut seq,
            Owner::Player,
            CHARGE_DAMAGE,
            false,
            muzzle,
            ProjectileKind::Straight { vel },
        );
        return;
    }

    if combat.shot_cooldown > 0.0 {
        return;
    }
    combat.shot_cooldown = config.shot_cooldown_ticks;
    spawn_projectile(
        &mut commands,
        &mut seq,
        Owner::Player,
        combat.shot_damage(),
        false,
        muzzle,
        ProjectileKind::Straight { vel },
    );

    if let Ok(boss_transform) = bosses.single() {
        if pos.distance(boss_transform.translation.truncate()) <= config.close_range_dist {
            let max = config.max_cards;
            combat.add_cards(CLOSE_RANGE_CARD_BONUS, max);
        }
    }
}

/// EX selection and firing.  An unaffordable fire attempt is a silent no-op;
/// the pool never goes negative.
pub fn player_ex_system(
    mut commands: Commands,
    input: Res<EncounterInput>,
    clock: Res<EncounterTime>,
    config: Res<TuningConfig>,
    mut seq: ResMut<ProjectileSeq>,
    mut players: Query<(&mut PlayerCombat, &super::state::PlayerMotion, &Transform), With<Player>>,
) {
    if clock.dt <= 0.0 {
        return;
    }
    let Ok((mut combat, motion, transform)) = players.single_mut() else {
        return;
    };

    if let Some(selected) = input.ex_select.and_then(ExAttack::from_slot) {
        combat.ex_selected = selected;
    }

    if !input.ex_fire {
        return;
    }
    let attack = combat.ex_selected;
    if !combat.try_spend_cards(attack.card_cost()) {
        return;
    }

    let pos = transform.translation.truncate();
    let facing = Vec2::new(motion.facing, 0.0);
    match attack {
        ExAttack::HomingVolley => {
            let base = facing.to_angle();
            for i in 0..EX_HOMING_COUNT {
                let spread = (i as f32 - (EX_HOMING_COUNT as f32 - 1.0) / 2.0) * 0.3;
                spawn_projectile(
                    &mut commands,
                    &mut seq,
                    Owner::Player,
                    EX_HOMING_DAMAGE,
                    false,
                    pos + Vec2::new(0.0, 10.0 * i as f32),
                    ProjectileKind::Homing {
                        vel: Vec2::from_angle(base + spread) * HOMING_SPEED,
                        life: config.homing_lifetime_ticks,
                    },
                );
            }
        }
        ExAttack::SpreadVolley => {
            let base = facing.to_angle();
            for i in 0..EX_SPREAD_COUNT {
                let t = i as f32 / (EX_SPREAD_COUNT - 1).max(1) as f32;
                let angle = base - EX_SPREAD_ANGLE + 2.0 * EX_SPREAD_ANGLE * t;
                spawn_projectile(
                    &mut commands,
                    &mut seq,
                    Owner::Player,
                    EX_SPREAD_DAMAGE,
                    false,
                    pos,
                    ProjectileKind::Straight {
                        vel: Vec2::from_angle(angle) * SHOT_SPEED,
                    },
                );
            }
        }
        ExAttack::Boomerang => {
            spawn_projectile(
                &mut commands,
                &mut seq,
                Owner::Player,
                BOOMERANG_DAMAGE,
                false,
                pos,
                ProjectileKind::Boomerang {
                    vel: facing * BOOMERANG_SPEED,
                    returning: false,
                },
            );
        }
        ExAttack::Bomb => {
            spawn_projectile(
                &mut commands,
                &mut seq,
                Owner::Player,
                BOMB_DAMAGE,
                false,
                pos + facing * 20.0,
                ProjectileKind::Bomb {
                    vel: facing * 3.0 + Vec2::new(0.0, 2.0),
                    fuse: BOMB_FUSE_TICKS,
                },
            );
        }
        ExAttack::Ultimate => {
            spawn_projectile(
                &mut commands,
                &mut seq,
                Owner::Player,
                ULTIMATE_DAMAGE_PER_TICK,
                false,
                Vec2::new(ARENA_WIDTH / 2.0, pos.y),
                ProjectileKind::Ultimate {
                    life: ULTIMATE_TICKS,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{spawn_player, PlayerMotion};
    use crate::projectile::Projectile;

    fn build_test_app() -> App {
        let mut app = App::new();
        app.insert_resource(EncounterInput::default());
        app.insert_resource(EncounterTime {
            dt: 1.0,
            real_dt: 1.0,
        });
        app.insert_resource(TuningConfig::default());
        app.insert_resource(ProjectileSeq::default());
        app.add_systems(Update, (player_shoot_system, player_ex_system));
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

    fn projectiles(app: &mut App) -> Vec<Projectile> {
        app.world_mut()
            .query::<&Projectile>()
            .iter(app.world())
            .cloned()
            .collect()
    }

    #[test]
    fn short_tap_fires_a_basic_shot() {
        let mut app = build_test_app();
        let _player = spawn(&mut app);
        set_input(
            &mut app,
            EncounterInput {
                shoot_held: true,
                ..Default::default()
            },
        );
        app.update();
        set_input(
            &mut app,
            EncounterInput {
                shoot_released: true,
                ..Default::default()
            },
        );
        app.update();
        let shots = projectiles(&mut app);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].damage, SHOT_DAMAGE);
        assert_eq!(shots[0].owner, Owner::Player);
    }

    #[test]
    fn long_hold_releases_a_charge_shot_ignoring_the_cooldown() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        app.world_mut()
            .get_mut::<PlayerCombat>(player)
            .unwrap()
            .shot_cooldown = 999.0;
        set_input(
            &mut app,
            EncounterInput {
                shoot_held: true,
                ..Default::default()
            },
        );
        for _ in 0..CHARGE_TICKS as usize {
            app.update();
        }
        set_input(
            &mut app,
            EncounterInput {
                shoot_released: true,
                ..Default::default()
            },
        );
        app.update();
        let shots = projectiles(&mut app);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].damage, CHARGE_DAMAGE);
    }

    #[test]
    fn basic_shot_respects_the_cooldown() {
        let mut app = build_test_app();
        let _player = spawn(&mut app);
        for _ in 0..2 {
            set_input(
                &mut app,
                EncounterInput {
                    shoot_released: true,
                    ..Default::default()
                },
            );
            app.update();
        }
        assert_eq!(projectiles(&mut app).len(), 1);
    }

    #[test]
    fn exam_ace_doubles_basic_shot_damage() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        app.world_mut()
            .get_mut::<PlayerCombat>(player)
            .unwrap()
            .exam_ace_timer = EXAM_ACE_TICKS;
        set_input(
            &mut app,
            EncounterInput {
                shoot_released: true,
                ..Default::default()
            },
        );
        app.update();
        let shots = projectiles(&mut app);
        assert_eq!(shots[0].damage, SHOT_DAMAGE * EXAM_ACE_DAMAGE_MULTIPLIER);
    }

    #[test]
    fn close_range_shot_earns_cards() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        let player_pos = app.world().get::<Transform>(player).unwrap().translation;
        app.world_mut().spawn((
            Boss::new(&TuningConfig::default()),
            Transform::from_translation(player_pos + Vec3::new(CLOSE_RANGE_DIST - 10.0, 0.0, 0.0)),
        ));
        set_input(
            &mut app,
            EncounterInput {
                shoot_released: true,
                ..Default::default()
            },
        );
        app.update();
        let combat = app.world().get::<PlayerCombat>(player).unwrap();
        assert_eq!(combat.cards, CLOSE_RANGE_CARD_BONUS);
    }

    #[test]
    fn unaffordable_ex_is_a_silent_noop() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        set_input(
            &mut app,
            EncounterInput {
                ex_fire: true,
                ..Default::default()
            },
        );
        app.update();
        assert!(projectiles(&mut app).is_empty());
        assert_eq!(app.world().get::<PlayerCombat>(player).unwrap().cards, 0.0);
    }

    #[test]
    fn ex_selection_switches_and_firing_spends_cards() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        app.world_mut()
            .get_mut::<PlayerCombat>(player)
            .unwrap()
            .cards = MAX_CARDS;
        set_input(
            &mut app,
            EncounterInput {
                ex_select: Some(2),
                ex_fire: true,
                ..Default::default()
            },
        );
        app.update();
        let shots = projectiles(&mut app);
        assert_eq!(shots.len(), EX_SPREAD_COUNT as usize);
        let combat = app.world().get::<PlayerCombat>(player).unwrap();
        assert_eq!(combat.ex_selected, ExAttack::SpreadVolley);
        assert!((combat.cards - (MAX_CARDS - EX_SPREAD_VOLLEY_COST)).abs() < 1e-5);
    }

    #[test]
    fn zero_delta_leaves_the_ex_selection_untouched() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        app.world_mut().resource_mut::<EncounterTime>().dt = 0.0;
        set_input(
            &mut app,
            EncounterInput {
                ex_select: Some(3),
                ..Default::default()
            },
        );
        app.update();
        let combat = app.world().get::<PlayerCombat>(player).unwrap();
        assert_eq!(combat.ex_selected, ExAttack::default());
    }

    #[test]
    fn ultimate_spawns_a_screen_wide_band() {
        let mut app = build_test_app();
        let player = spawn(&mut app);
        app.world_mut()
            .get_mut::<PlayerCombat>(player)
            .unwrap()
            .cards = MAX_CARDS;
        set_input(
            &mut app,
            EncounterInput {
                ex_select: Some(5),
                ex_fire: true,
                ..Default::default()
            },
        );
        app.update();
        let mut query = app.world_mut().query::<&ProjectileKind>();
        let kinds: Vec<_> = query.iter(app.world()).collect();
        assert!(matches!(kinds[0], ProjectileKind::Ultimate { .. }));
    }
}
