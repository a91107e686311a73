//! The encounter director: one fixed tick pipeline and all hit resolution.
//!
//! Every update runs the same stage order — clock, decisions, motion,
//! collision, timers, outcome — so a replay with the same seed and inputs
//! reproduces the same fight.  Collisions resolve in projectile spawn order
//! ([`Projectile::seq`]), never in ECS iteration order.
//!
//! This module also owns the cross-cutting message types: boss hits, player
//! hits, parries, phase transitions, defeats.  The stats module consumes
//! them; nothing here reads them back.

use crate::boss::{
    boss_behavior_system, boss_phase_system, boss_timers_system, Boss, BossDialogue, RealityState,
};
use crate::config::TuningConfig;
use crate::constants::*;
use crate::effects::{encounter_clock, EffectBus, EncounterTime};
use crate::input::EncounterInput;
use crate::menu::GameState;
use crate::player::{
    player_control_system, player_ex_system, player_focus_system, player_shoot_system,
    player_timers_system, spawn_player, Grounding, Player, PlayerCombat, PlayerMotion,
};
use crate::projectile::{Aabb, Owner, Projectile, ProjectileKind, ProjectileSeq};
use crate::rng::EncounterRng;
use bevy::prelude::*;

// ── Messages ──────────────────────────────────────────────────────────────────

/// Damage landed on the boss (post-multiplier).
#[derive(Message, Debug, Clone, Copy)]
pub struct BossHitEvent {
    pub damage: f32,
    pub weak: bool,
}

/// The player lost one HP.
#[derive(Message, Debug, Clone, Copy)]
pub struct PlayerHitEvent;

/// A projectile was parried.  `chain` is the chain length including this
/// parry.
#[derive(Message, Debug, Clone, Copy)]
pub struct ParryEvent {
    pub perfect: bool,
    pub chain: u32,
}

/// The boss entered a new phase (2 or 3).  Fired exactly once per phase.
#[derive(Message, Debug, Clone, Copy)]
pub struct PhaseTransitionEvent {
    pub phase: u8,
}

/// Terminal outcomes, fired exactly once each per encounter.
#[derive(Message, Debug, Clone, Copy)]
pub struct BossDefeatedEvent;

#[derive(Message, Debug, Clone, Copy)]
pub struct PlayerDefeatedEvent;

/// A dash started this tick.
#[derive(Message, Debug, Clone, Copy)]
pub struct DashEvent;

/// A phase transition tore out one or more ledges.
#[derive(Message, Debug, Clone, Copy)]
pub struct PlatformRemovedEvent {
    pub remaining: usize,
}

// ── Resources ─────────────────────────────────────────────────────────────────

/// Terminal state of the current encounter.  Written once; reset rewinds it
/// to `Ongoing`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncounterOutcome {
    #[default]
    Ongoing,
    BossDefeated,
    PlayerDefeated,
}

/// Wall-clock ticks since the encounter started; feeds the best-time stat.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct EncounterElapsed(pub f32);

/// One pending bomb blast, produced by the motion stage and consumed by the
/// boss-hit stage the same tick.  Kept in spawn order via `seq`.
#[derive(Debug, Clone, Copy)]
pub struct Blast {
    pub pos: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub seq: u64,
}

#[derive(Resource, Debug, Default)]
pub struct BlastQueue(pub Vec<Blast>);

// ── Arena ─────────────────────────────────────────────────────────────────────

/// One-way floating ledge: the player lands on its top surface when falling
/// across it, and passes through from below or the sides.  Phase transitions
/// tear ledges out.
#[derive(Component, Debug, Clone, Copy)]
pub struct Platform {
    pub half: Vec2,
}

/// Spawns the starting ledge layout.
pub fn spawn_platforms(commands: &mut Commands) {
    for (x, y) in PLATFORM_POSITIONS {
        commands.spawn((
            Platform {
                half: Vec2::new(PLATFORM_HALF_EXTENTS.0, PLATFORM_HALF_EXTENTS.1),
            },
            Transform::from_xyz(x, y, 0.0),
        ));
    }
}

// ── Motion stage ──────────────────────────────────────────────────────────────

/// Advances every projectile one step and despawns the expired ones.  Bomb
/// explosions become queued blasts; the boss-hit stage applies them.
#[allow(clippy::too_many_arguments)]
pub fn projectile_advance_system(
    mut commands: Commands,
    clock: Res<EncounterTime>,
    config: Res<TuningConfig>,
    mut bus: ResMut<EffectBus>,
    mut blasts: ResMut<BlastQueue>,
    mut projectiles: Query<(Entity, &Projectile, &mut ProjectileKind, &mut Transform)>,
    mut players: Query<
        (&Transform, &mut PlayerCombat),
        (With<Player>, Without<Projectile>),
    >,
    bosses: Query<(&Boss, &Transform), (Without<Projectile>, Without<Player>)>,
) {
    let dt = clock.dt;
    if dt <= 0.0 {
        return;
    }

    let player_pos = players
        .single()
        .map(|(t, _)| t.translation.truncate())
        .unwrap_or(Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1));
    let (boss_center, weak_target) = bosses
        .single()
        .map(|(boss, t)| {
            let center = t.translation.truncate();
            let target = if boss.weak_point_open() {
                boss.weak_point_box(center).center()
            } else {
                center
            };
            (center, target)
        })
        .unwrap_or((Vec2::new(BOSS_ANCHOR.0, BOSS_ANCHOR.1), Vec2::new(BOSS_ANCHOR.0, BOSS_ANCHOR.1)));

    let player_box = Aabb::from_center_half(
        player_pos,
        Vec2::new(PLAYER_HALF_EXTENTS.0, PLAYER_HALF_EXTENTS.1),
    );

    for (entity, projectile, mut kind, mut transform) in &mut projectiles {
        // Boss shots chase the player; player shots chase the weak point
        // while it is open, the body otherwise.  Boomerangs always come home.
        let target = match (projectile.owner, &*kind) {
            (_, ProjectileKind::Boomerang { .. }) => player_pos,
            (Owner::Boss, _) => player_pos,
            (Owner::Player, _) => weak_target,
        };

        let mut pos = transform.translation.truncate();
        let fate = kind.advance(&mut pos, dt, &config, target, boss_center);
        transform.translation.x = pos.x;
        transform.translation.y = pos.y;

        match fate {
            crate::projectile::Fate::Alive => {}
            crate::projectile::Fate::Expired => {
                commands.entity(entity).despawn();
                continue;
            }
            crate::projectile::Fate::Exploded => {
                blasts.0.push(Blast {
                    pos,
                    radius: BOMB_BLAST_RADIUS,
                    damage: projectile.damage,
                    seq: projectile.seq,
                });
                bus.request_shake(HIT_SHAKE_TICKS, HIT_SHAKE_MAGNITUDE);
                commands.entity(entity).despawn();
                continue;
            }
        }

        // A returning boomerang caught by the player refunds part of its
        // cost.
        if let ProjectileKind::Boomerang { returning: true, .. } = &*kind {
            if kind.footprint(pos).overlaps(&player_box) {
                if let Ok((_, mut combat)) = players.single_mut() {
                    let max = config.max_cards;
                    combat.add_cards(BOOMERANG_CATCH_REFUND, max);
                }
                commands.entity(entity).despawn();
            }
        }
    }
}

// ── Collision stage ───────────────────────────────────────────────────────────

/// Shortest distance from a point to an axis-aligned box (zero inside).
fn point_box_distance(point: Vec2, aabb: &Aabb) -> f32 {
    let clamped = point.clamp(aabb.min, aabb.max);
    point.distance(clamped)
}

enum BossHitSource {
    Contact(Entity),
    /// Boomerang first contact: damages, then flips home instead of
    /// despawning.
    BoomerangContact(Entity),
    /// Per-tick band damage; the projectile persists.
    Band,
    Blast,
}

/// Player-owned projectiles (and queued blasts) against the boss, resolved
/// in spawn order.  The ultimate band also sweeps every boss shot it touches
/// off the field.
#[allow(clippy::too_many_arguments)]
pub fn player_hits_boss_system(
    mut commands: Commands,
    clock: Res<EncounterTime>,
    config: Res<TuningConfig>,
    mut bus: ResMut<EffectBus>,
    mut blasts: ResMut<BlastQueue>,
    mut bosses: Query<(&mut Boss, &Transform), Without<Projectile>>,
    mut projectiles: Query<(Entity, &Projectile, &mut ProjectileKind, &Transform), Without<Boss>>,
    mut hits: MessageWriter<BossHitEvent>,
) {
    let dt = clock.dt;
    if dt <= 0.0 {
        return;
    }
    let Ok((mut boss, boss_transform)) = bosses.single_mut() else {
        blasts.0.clear();
        return;
    };
    let boss_pos = boss_transform.translation.truncate();
    let body = boss.body_box(boss_pos);
    let weak = boss.weak_point_box(boss_pos);
    let weak_open = boss.weak_point_open();

    // (seq, damage, on_weak, source); sorted by seq before applying so
    // threshold crossings are reproducible.
    let mut pending: Vec<(u64, f32, bool, BossHitSource)> = Vec::new();
    let mut cleared: Vec<Entity> = Vec::new();

    for (entity, projectile, kind, transform) in &projectiles {
        if projectile.owner != Owner::Player {
            continue;
        }
        let pos = transform.translation.truncate();
        match kind {
            ProjectileKind::Bomb { .. } => {}
            ProjectileKind::Ultimate { .. } => {
                if kind.overlaps(pos, &body) {
                    pending.push((
                        projectile.seq,
                        projectile.damage * dt,
                        false,
                        BossHitSource::Band,
                    ));
                }
                // The band erases every boss shot it touches, parryable or
                // not.
                let band = kind.footprint(pos);
                for (other, other_proj, other_kind, other_transform) in &projectiles {
                    if other_proj.owner == Owner::Boss
                        && other_kind
                            .footprint(other_transform.translation.truncate())
                            .overlaps(&band)
                    {
                        cleared.push(other);
                    }
                }
            }
            ProjectileKind::Boomerang { returning, .. } => {
                if !returning && kind.overlaps(pos, &body) {
                    let on_weak = weak_open && kind.overlaps(pos, &weak);
                    pending.push((
                        projectile.seq,
                        projectile.damage,
                        on_weak,
                        BossHitSource::BoomerangContact(entity),
                    ));
                }
            }
            _ => {
                if kind.overlaps(pos, &body) {
                    let on_weak = weak_open && kind.overlaps(pos, &weak);
                    pending.push((
                        projectile.seq,
                        projectile.damage,
                        on_weak,
                        BossHitSource::Contact(entity),
                    ));
                }
            }
        }
    }

    for blast in blasts.0.drain(..) {
        if point_box_distance(blast.pos, &body) <= blast.radius {
            let on_weak = weak_open && point_box_distance(blast.pos, &weak) <= blast.radius;
            pending.push((blast.seq, blast.damage, on_weak, BossHitSource::Blast));
        }
    }

    pending.sort_by_key(|(seq, ..)| *seq);

    for (_, damage, on_weak, source) in pending {
        let Some(applied) = boss.take_damage(damage, on_weak, &config) else {
            // Already defeated: remaining contact shots still despawn.
            if let BossHitSource::Contact(entity) = source {
                commands.entity(entity).despawn();
            }
            continue;
        };
        match source {
            BossHitSource::Contact(entity) => {
                hits.write(BossHitEvent {
                    damage: applied.applied,
                    weak: applied.weak,
                });
                bus.request_shake(HIT_SHAKE_TICKS, HIT_SHAKE_MAGNITUDE);
                bus.add_damage_label(boss_pos, applied.applied, applied.weak, false);
                commands.entity(entity).despawn();
            }
            BossHitSource::BoomerangContact(entity) => {
                hits.write(BossHitEvent {
                    damage: applied.applied,
                    weak: applied.weak,
                });
                bus.request_shake(HIT_SHAKE_TICKS, HIT_SHAKE_MAGNITUDE);
                bus.add_damage_label(boss_pos, applied.applied, applied.weak, false);
                if let Ok((_, _, mut kind, _)) = projectiles.get_mut(entity) {
                    if let ProjectileKind::Boomerang { returning, .. } = &mut *kind {
                        *returning = true;
                    }
                }
            }
            BossHitSource::Band => {
                hits.write(BossHitEvent {
                    damage: applied.applied,
                    weak: applied.weak,
                });
            }
            BossHitSource::Blast => {
                hits.write(BossHitEvent {
                    damage: applied.applied,
                    weak: applied.weak,
                });
                bus.add_damage_label(boss_pos, applied.applied, applied.weak, false);
            }
        }
    }

    cleared.sort();
    cleared.dedup();
    for entity in cleared {
        commands.entity(entity).despawn();
    }
}

/// Boss-owned projectiles and body contact against the player, in spawn
/// order.  Walks the full defense ladder: dash graze, parry, i-frames,
/// shield, damage.
#[allow(clippy::too_many_arguments)]
pub fn boss_hits_player_system(
    mut commands: Commands,
    clock: Res<EncounterTime>,
    config: Res<TuningConfig>,
    mut bus: ResMut<EffectBus>,
    mut players: Query<(&mut PlayerMotion, &mut PlayerCombat, &Transform), With<Player>>,
    mut bosses: Query<(&mut Boss, &Transform), Without<Player>>,
    mut projectiles: Query<(Entity, &mut Projectile, &ProjectileKind, &Transform)>,
    mut player_hits: MessageWriter<PlayerHitEvent>,
    mut parries: MessageWriter<ParryEvent>,
) {
    let dt = clock.dt;
    if dt <= 0.0 {
        return;
    }
    let Ok((mut motion, mut combat, player_transform)) = players.single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let player_box = Aabb::from_center_half(
        player_pos,
        Vec2::new(PLAYER_HALF_EXTENTS.0, PLAYER_HALF_EXTENTS.1),
    );

    // Body contact cannot be parried.
    if let Ok((boss, boss_transform)) = bosses.single() {
        if !boss.is_dead() && boss.body_box(boss_transform.translation.truncate()).overlaps(&player_box)
        {
            if combat.absorb_hit(&mut motion, config.player_iframe_ticks)
                == crate::player::HitOutcome::Damaged
            {
                player_hits.write(PlayerHitEvent);
                bus.request_shake(HIT_SHAKE_TICKS, HIT_SHAKE_MAGNITUDE);
            }
        }
    }

    let mut touching: Vec<(u64, Entity)> = projectiles
        .iter()
        .filter(|(_, projectile, kind, transform)| {
            projectile.owner == Owner::Boss
                && kind.is_live()
                && kind.overlaps(transform.translation.truncate(), &player_box)
        })
        .map(|(entity, projectile, ..)| (projectile.seq, entity))
        .collect();
    touching.sort();

    for (_, entity) in touching {
        let Ok((_, mut projectile, kind, _)) = projectiles.get_mut(entity) else {
            continue;
        };

        // Dashing through a shot is a graze: no damage, a one-time card
        // sliver per projectile.
        if motion.is_dashing() {
            if !projectile.grazed {
                projectile.grazed = true;
                let max = config.max_cards;
                combat.add_cards(DASH_GRAZE_CARD_BONUS, max);
            }
            continue;
        }

        if projectile.parryable && combat.parry_open() {
            let perfect =
                combat.parry_perfect(config.parry_window_ticks, config.perfect_parry_ticks);
            let reward = if perfect {
                PERFECT_PARRY_CARD_REWARD
            } else {
                PARRY_CARD_REWARD
            };
            let max = config.max_cards;
            combat.add_cards(reward, max);
            combat.parry_chain += 1;
            combat.chain_timer = config.parry_chain_window_ticks;
            if combat.parry_chain >= config.parry_chain_target && combat.exam_ace_timer <= 0.0 {
                combat.exam_ace_timer = config.exam_ace_ticks;
                bus.add_damage_label(player_pos, combat.parry_chain as f32, false, true);
            }
            // Every parry bounces the player upward and restocks the air kit.
            motion.vel.y = config.jump_impulse;
            motion.jumps_used = 1;
            motion.grounding = Grounding::Airborne;
            motion.air_dash_available = true;
            if perfect {
                motion.bonus_jump = true;
                bus.request_slowmo(PERFECT_PARRY_SLOWMO_TICKS, PERFECT_PARRY_SLOWMO_SCALE);
                bus.request_freeze(PERFECT_PARRY_FREEZE_TICKS);
            }
            // Deflecting a spinning tip staggers the boss and bares the weak
            // point.
            if matches!(kind, ProjectileKind::Orbiter { .. }) {
                if let Ok((mut boss, _)) = bosses.single_mut() {
                    boss.stun(config.boss_stun_ticks);
                }
            }
            parries.write(ParryEvent {
                perfect,
                chain: combat.parry_chain,
            });
            commands.entity(entity).despawn();
            continue;
        }

        match combat.absorb_hit(&mut motion, config.player_iframe_ticks) {
            crate::player::HitOutcome::Ignored => {}
            outcome => {
                if outcome == crate::player::HitOutcome::Damaged {
                    player_hits.write(PlayerHitEvent);
                    bus.request_shake(HIT_SHAKE_TICKS, HIT_SHAKE_MAGNITUDE);
                }
                // Sustained-contact kinds stay on the field; i-frames cover
                // the overlap.
                if !matches!(
                    kind,
                    ProjectileKind::Beam { .. }
                        | ProjectileKind::WallSweep { .. }
                        | ProjectileKind::Orbiter { .. }
                ) {
                    commands.entity(entity).despawn();
                }
            }
        }
    }
}

// ── Outcome stage ─────────────────────────────────────────────────────────────

/// Watches for a terminal state: the boss's death ceremony elapsing, or the
/// player running out of HP.  Fires the matching message and state change
/// exactly once.
#[allow(clippy::too_many_arguments)]
pub fn encounter_outcome_system(
    clock: Res<EncounterTime>,
    mut elapsed: ResMut<EncounterElapsed>,
    mut outcome: ResMut<EncounterOutcome>,
    mut bosses: Query<&mut Boss>,
    players: Query<&PlayerCombat, With<Player>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut boss_defeats: MessageWriter<BossDefeatedEvent>,
    mut player_defeats: MessageWriter<PlayerDefeatedEvent>,
) {
    if *outcome != EncounterOutcome::Ongoing {
        return;
    }
    if clock.real_dt <= 0.0 {
        return;
    }
    elapsed.0 += clock.real_dt;

    // The death ceremony runs on the real clock so the defeat slow-motion
    // cannot stretch it.
    if let Ok(mut boss) = bosses.single_mut() {
        if boss.is_dead() {
            boss.state_timer -= clock.real_dt;
            if boss.state_timer <= 0.0 {
                *outcome = EncounterOutcome::BossDefeated;
                boss_defeats.write(BossDefeatedEvent);
                next_state.set(GameState::Victory);
            }
            return;
        }
    }

    if let Ok(combat) = players.single() {
        if combat.hp <= 0 {
            *outcome = EncounterOutcome::PlayerDefeated;
            player_defeats.write(PlayerDefeatedEvent);
            next_state.set(GameState::GameOver);
        }
    }
}

// ── Reset ─────────────────────────────────────────────────────────────────────

/// Tears down and rebuilds the whole encounter: entities, effect bus, RNG
/// (reseeded from config), spawn counter, outcome.  Runs on every entry into
/// play, so retries are bit-identical to first runs.
pub fn reset_encounter(
    mut commands: Commands,
    config: Res<TuningConfig>,
    stale: Query<Entity, Or<(With<Projectile>, With<Boss>, With<Player>, With<Platform>)>>,
) {
    for entity in &stale {
        commands.entity(entity).despawn();
    }
    commands.insert_resource(EffectBus::default());
    commands.insert_resource(EncounterRng::from_seed(config.rng_seed));
    commands.insert_resource(ProjectileSeq::default());
    commands.insert_resource(EncounterOutcome::default());
    commands.insert_resource(EncounterElapsed::default());
    commands.insert_resource(BlastQueue::default());
    commands.insert_resource(RealityState::default());
    commands.insert_resource(BossDialogue::default());
    commands.insert_resource(EncounterTime::default());
    commands.spawn((
        Boss::new(&config),
        Transform::from_xyz(BOSS_ANCHOR.0, BOSS_ANCHOR.1, 0.0),
    ));
    spawn_player(&mut commands);
    spawn_platforms(&mut commands);
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers the encounter resources, messages, and the fixed tick pipeline.
/// Host-side systems (input mapping, rendering, menus) live in their own
/// plugins.
pub struct EncounterPlugin;

impl Plugin for EncounterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EncounterInput>()
            .init_resource::<EncounterTime>()
            .init_resource::<TuningConfig>()
            .init_resource::<EffectBus>()
            .init_resource::<EncounterRng>()
            .init_resource::<ProjectileSeq>()
            .init_resource::<EncounterOutcome>()
            .init_resource::<EncounterElapsed>()
            .init_resource::<BlastQueue>()
            .init_resource::<RealityState>()
            .init_resource::<BossDialogue>()
            .add_message::<BossHitEvent>()
            .add_message::<PlayerHitEvent>()
            .add_message::<ParryEvent>()
            .add_message::<PhaseTransitionEvent>()
            .add_message::<BossDefeatedEvent>()
            .add_message::<PlayerDefeatedEvent>()
            .add_message::<DashEvent>()
            .add_message::<PlatformRemovedEvent>()
            .add_systems(OnEnter(GameState::Playing), reset_encounter)
            .add_systems(
                Update,
                (
                    encounter_clock,
                    player_focus_system,
                    player_control_system,
                    player_shoot_system,
                    player_ex_system,
                    boss_phase_system,
                    boss_behavior_system,
                    projectile_advance_system,
                    player_hits_boss_system,
                    boss_hits_player_system,
                    boss_timers_system,
                    player_timers_system,
                    encounter_outcome_system,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
