//! Boss state machine: phases, attack patterns, stun/weak-point windows, and
//! the phase-3 reality break.
//!
//! The boss is a finite-state machine over named countdown timers.  Phase is
//! monotone: it only climbs as HP crosses thresholds, and each climb passes
//! through a one-time `Transitioning` state with its side effects (dialogue,
//! shake, phase message).  `Dead` is terminal.
//!
//! Attack patterns are phase-scoped ordered tables indexed cyclically, so the
//! cursor can never run off the end of a table.

use crate::config::TuningConfig;
use crate::constants::*;
use crate::effects::{EffectBus, EncounterTime};
use crate::encounter::{PhaseTransitionEvent, Platform, PlatformRemovedEvent};
use crate::player::Player;
use crate::projectile::{
    spawn_projectile, Aabb, BeamState, Owner, ProjectileKind, ProjectileSeq,
};
use crate::rng::EncounterRng;
use bevy::prelude::*;

// ── State ─────────────────────────────────────────────────────────────────────

/// Discrete boss state.  `Dead` is never exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossState {
    /// Hovering between attacks; the attack timer only runs here.
    Idle,
    /// Opened by an orbiter-tip parry; weak point exposed, attacks halted.
    Stunned,
    /// One-time phase-change ceremony; no actions until it elapses.
    Transitioning,
    /// Reality-break telegraph: movement continues, no new attacks.
    Warning,
    Dead,
}

/// The boss actor.  Exactly one per encounter.
#[derive(Component, Debug)]
pub struct Boss {
    pub hp: f32,
    pub max_hp: f32,
    /// 1..=3, monotonically non-decreasing.
    pub phase: u8,
    pub state: BossState,
    /// Countdown for the current non-idle state (stun, transition, warning,
    /// death ceremony).
    pub state_timer: f32,
    /// Ticks until the next attack; only decremented in `Idle`.
    pub attack_timer: f32,
    /// Cyclic index into the current phase's attack table.
    pub attack_cursor: usize,
    /// While positive the weak point is open and damage is amplified.
    pub weak_point_timer: f32,
    /// Hit-flash visual countdown.
    pub flash_timer: f32,
    /// Phase-3 teleport cadence.
    pub teleport_timer: f32,
    /// Elapsed ticks feeding the phase-2 drift oscillator.
    pub drift_elapsed: f32,
    /// True between queueing a reality break and its effect landing; at most
    /// one may be pending.
    pub reality_pending: bool,
}

impl Boss {
    pub fn new(config: &TuningConfig) -> Self {
        Self {
            hp: config.boss_max_hp,
            max_hp: config.boss_max_hp,
            phase: 1,
            state: BossState::Idle,
            state_timer: 0.0,
            attack_timer: config.attack_interval_ticks,
            attack_cursor: 0,
            weak_point_timer: 0.0,
            flash_timer: 0.0,
            teleport_timer: BOSS_TELEPORT_INTERVAL_TICKS,
            drift_elapsed: 0.0,
            reality_pending: false,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.state == BossState::Dead
    }

    pub fn weak_point_open(&self) -> bool {
        self.weak_point_timer > 0.0
    }

    /// Body collision box around `pos`.
    pub fn body_box(&self, pos: Vec2) -> Aabb {
        Aabb::from_center_half(pos, Vec2::new(BOSS_HALF_EXTENTS.0, BOSS_HALF_EXTENTS.1))
    }

    /// Weak-point sub-rectangle (lower body) while the window is open.
    pub fn weak_point_box(&self, pos: Vec2) -> Aabb {
        let center = pos - Vec2::new(0.0, BOSS_HALF_EXTENTS.1 * 0.5);
        Aabb::from_center_half(
            center,
            Vec2::new(WEAK_POINT_HALF_EXTENTS.0, WEAK_POINT_HALF_EXTENTS.1),
        )
    }

    /// Applies damage and returns what actually landed, or `None` against an
    /// already-defeated boss.  `on_weak_point` selects the phase-scaled
    /// multiplier.
    pub fn take_damage(
        &mut self,
        amount: f32,
        on_weak_point: bool,
        config: &TuningConfig,
    ) -> Option<AppliedDamage> {
        if self.hp <= 0.0 || self.is_dead() {
            return None;
        }
        let weak = on_weak_point && self.weak_point_open();
        let applied = if weak {
            amount * config.weak_point_multiplier_for(self.phase)
        } else {
            amount
        };
        self.hp = (self.hp - applied).max(0.0);
        self.flash_timer = BOSS_FLASH_TICKS;
        Some(AppliedDamage { applied, weak })
    }

    /// Forces the stunned state and opens the weak point for the same window.
    /// Ignored once dead or mid-transition.  A stun that interrupts a
    /// reality-break telegraph cancels the break outright, so a later table
    /// entry can queue a fresh one.
    pub fn stun(&mut self, duration: f32) {
        if matches!(self.state, BossState::Dead | BossState::Transitioning) {
            return;
        }
        if self.state == BossState::Warning {
            self.reality_pending = false;
        }
        self.state = BossState::Stunned;
        self.state_timer = duration;
        self.weak_point_timer = duration;
    }

    /// Phase the current HP maps to, given the threshold ladder.
    pub fn target_phase(&self, config: &TuningConfig) -> u8 {
        if self.hp <= config.phase_3_threshold {
            3
        } else if self.hp <= config.phase_2_threshold {
            2
        } else {
            1
        }
    }
}

/// Result of a [`Boss::take_damage`] call that landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedDamage {
    pub applied: f32,
    pub weak: bool,
}

/// Dialogue line surfaced to the HUD on phase changes; cosmetic only.
#[derive(Resource, Default, Debug)]
pub struct BossDialogue {
    pub line: Option<&'static str>,
    pub timer: f32,
}

impl BossDialogue {
    fn say(&mut self, line: &'static str) {
        self.line = Some(line);
        self.timer = 240.0;
    }
}

// ── Reality break ─────────────────────────────────────────────────────────────

/// The rule rewrite a reality break applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealityEffect {
    InvertControls,
    InvertGravity,
    GlobalSlowmo,
}

/// Active reality-break rule changes.  Cleared automatically when the timer
/// runs out.
#[derive(Resource, Default, Debug)]
pub struct RealityState {
    pub effect: Option<RealityEffect>,
    pub timer: f32,
}

impl RealityState {
    pub fn controls_inverted(&self) -> bool {
        self.effect == Some(RealityEffect::InvertControls) && self.timer > 0.0
    }

    pub fn gravity_sign(&self) -> f32 {
        if self.effect == Some(RealityEffect::InvertGravity) && self.timer > 0.0 {
            -1.0
        } else {
            1.0
        }
    }
}

// ── Attack tables ─────────────────────────────────────────────────────────────

/// One parameterless attack action; spawning happens in [`launch_attack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossAttack {
    GeometryVolley,
    BouncingErasers,
    EquationRain,
    WallWipe,
    DenseRain,
    ProtractorSpin,
    HomingChalk,
    DoubleBeam,
    TextbookSlam,
    SweepingLaser,
    CompassHell,
    TeleportStrike,
    RealityBreak,
    FullBarrage,
}

/// Ordered attack table for a phase.  Indexed cyclically; never empty.
pub fn phase_pattern(phase: u8) -> &'static [BossAttack] {
    match phase {
        1 => &[
            BossAttack::GeometryVolley,
            BossAttack::BouncingErasers,
            BossAttack::EquationRain,
            BossAttack::WallWipe,
        ],
        2 => &[
            BossAttack::DenseRain,
            BossAttack::ProtractorSpin,
            BossAttack::HomingChalk,
            BossAttack::TextbookSlam,
            BossAttack::DoubleBeam,
            BossAttack::BouncingErasers,
        ],
        _ => &[
            BossAttack::CompassHell,
            BossAttack::SweepingLaser,
            BossAttack::TeleportStrike,
            BossAttack::RealityBreak,
            BossAttack::TextbookSlam,
            BossAttack::FullBarrage,
        ],
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Death and phase-ladder checks.  Runs before behaviour so a freshly entered
/// `Transitioning`/`Dead` state suppresses this tick's actions.
#[allow(clippy::too_many_arguments)]
pub fn boss_phase_system(
    mut commands: Commands,
    mut bosses: Query<&mut Boss>,
    platforms: Query<Entity, With<Platform>>,
    clock: Res<EncounterTime>,
    config: Res<TuningConfig>,
    mut bus: ResMut<EffectBus>,
    mut rng: ResMut<EncounterRng>,
    mut dialogue: ResMut<BossDialogue>,
    mut transitions: MessageWriter<PhaseTransitionEvent>,
    mut removals: MessageWriter<PlatformRemovedEvent>,
) {
    if clock.dt <= 0.0 {
        return;
    }
    let Ok(mut boss) = bosses.single_mut() else {
        return;
    };

    if boss.hp <= 0.0 && !boss.is_dead() {
        boss.state = BossState::Dead;
        boss.state_timer = config.boss_death_ticks;
        boss.weak_point_timer = 0.0;
        // One-shot defeat feedback; the outcome itself fires when the death
        // timer elapses.
        bus.request_slowmo(DEATH_SLOWMO_TICKS, DEATH_SLOWMO_SCALE);
        bus.request_zoom(DEATH_ZOOM_TARGET, DEATH_ZOOM_TICKS);
        dialogue.say("Impossible... my proof was flawless!");
        return;
    }
    if boss.is_dead() || boss.state == BossState::Transitioning {
        return;
    }

    let target = boss.target_phase(&config);
    if target > boss.phase {
        boss.phase = target;
        boss.state = BossState::Transitioning;
        boss.state_timer = config.phase_transition_ticks;
        boss.attack_cursor = 0;
        boss.attack_timer = config.attack_interval_for(target);
        bus.request_shake(PHASE_SHAKE_TICKS, PHASE_SHAKE_MAGNITUDE);
        if target >= 3 {
            bus.request_zoom(1.15, PHASE_SHAKE_TICKS);
            dialogue.say("Enough! I will rewrite the axioms themselves!");
        } else {
            dialogue.say("You force me to take this seriously.");
        }
        // Phase entry tears out ledges: one at phase 2, all of them at 3.
        let ledges: Vec<Entity> = platforms.iter().collect();
        if !ledges.is_empty() {
            if target >= 3 {
                for &entity in &ledges {
                    commands.entity(entity).despawn();
                }
                removals.write(PlatformRemovedEvent { remaining: 0 });
            } else {
                let pick = rng.index(ledges.len());
                commands.entity(ledges[pick]).despawn();
                removals.write(PlatformRemovedEvent {
                    remaining: ledges.len() - 1,
                });
            }
        }
        transitions.write(PhaseTransitionEvent { phase: target });
    }
}

/// Per-phase movement plus the attack cadence.  Attacks only advance in
/// `Idle`; `Warning` keeps moving but issues nothing new.
#[allow(clippy::too_many_arguments)]
pub fn boss_behavior_system(
    mut commands: Commands,
    mut bosses: Query<(&mut Boss, &mut Transform), Without<Player>>,
    players: Query<&Transform, With<Player>>,
    clock: Res<EncounterTime>,
    config: Res<TuningConfig>,
    mut seq: ResMut<ProjectileSeq>,
    mut rng: ResMut<EncounterRng>,
) {
    let dt = clock.dt;
    if dt <= 0.0 {
        return;
    }
    let Ok((mut boss, mut transform)) = bosses.single_mut() else {
        return;
    };
    let player_pos = players
        .single()
        .map(|t| t.translation.truncate())
        .unwrap_or(Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1));

    if boss.is_dead() {
        return;
    }

    // Movement. Stun and transition hold position; warning keeps drifting.
    if !matches!(boss.state, BossState::Stunned | BossState::Transitioning) {
        let anchor = Vec2::new(BOSS_ANCHOR.0, BOSS_ANCHOR.1);
        let pos = transform.translation.truncate();
        let next = match boss.phase {
            1 => pos + (anchor - pos) * (0.02 * dt).min(1.0),
            2 => {
                boss.drift_elapsed += dt;
                let y = anchor.y + BOSS_DRIFT_AMPLITUDE * (BOSS_DRIFT_FREQUENCY * boss.drift_elapsed).sin();
                let eased_x = pos.x + (anchor.x - pos.x) * (0.02 * dt).min(1.0);
                Vec2::new(eased_x, y)
            }
            _ => {
                boss.teleport_timer -= dt;
                if boss.teleport_timer <= 0.0 {
                    boss.teleport_timer = config.boss_teleport_interval_ticks;
                    teleport_destination(&mut rng, player_pos, config.boss_teleport_min_dist)
                } else {
                    pos + rng.jitter(BOSS_JITTER) * dt
                }
            }
        };
        transform.translation.x = next.x;
        transform.translation.y = next.y;
    }

    if boss.state != BossState::Idle {
        return;
    }

    boss.attack_timer -= dt;
    if boss.attack_timer > 0.0 {
        return;
    }
    boss.attack_timer = config.attack_interval_for(boss.phase);

    let pattern = phase_pattern(boss.phase);
    let attack = pattern[boss.attack_cursor % pattern.len()];
    boss.attack_cursor = boss.attack_cursor.wrapping_add(1);

    let boss_pos = transform.translation.truncate();
    match attack {
        BossAttack::RealityBreak => {
            // At most one pending warning at a time.
            if !boss.reality_pending {
                boss.reality_pending = true;
                boss.state = BossState::Warning;
                boss.state_timer = config.reality_warning_ticks;
            }
        }
        BossAttack::TeleportStrike => {
            let dest = teleport_destination(&mut rng, player_pos, config.boss_teleport_min_dist);
            transform.translation.x = dest.x;
            transform.translation.y = dest.y;
            launch_attack(
                BossAttack::GeometryVolley,
                &mut commands,
                &mut seq,
                &mut rng,
                dest,
                player_pos,
                &config,
            );
        }
        other => {
            launch_attack(
                other,
                &mut commands,
                &mut seq,
                &mut rng,
                boss_pos,
                player_pos,
                &config,
            );
        }
    }
}

/// Spawns the projectiles for one attack action.
pub fn launch_attack(
    attack: BossAttack,
    commands: &mut Commands,
    seq: &mut ProjectileSeq,
    rng: &mut EncounterRng,
    boss_pos: Vec2,
    player_pos: Vec2,
    config: &TuningConfig,
) {
    match attack {
        BossAttack::GeometryVolley => {
            let aim = (player_pos - boss_pos).normalize_or_zero();
            let aim = if aim == Vec2::ZERO { Vec2::NEG_X } else { aim };
            let base = aim.to_angle();
            for i in 0..VOLLEY_COUNT {
                let t = i as f32 / (VOLLEY_COUNT - 1).max(1) as f32;
                let angle = base - VOLLEY_SPREAD + 2.0 * VOLLEY_SPREAD * t;
                spawn_projectile(
                    commands,
                    seq,
                    Owner::Boss,
                    1.0,
                    true,
                    boss_pos,
                    ProjectileKind::Straight {
                        vel: Vec2::from_angle(angle) * VOLLEY_SPEED,
                    },
                );
            }
        }
        BossAttack::BouncingErasers => {
            for _ in 0..3 {
                let dir = Vec2::from_angle(rng.range(std::f32::consts::PI * 0.75, std::f32::consts::PI * 1.25));
                spawn_projectile(
                    commands,
                    seq,
                    Owner::Boss,
                    1.0,
                    true,
                    boss_pos,
                    ProjectileKind::Bouncer {
                        vel: dir * BOUNCER_SPEED,
                        life: config.bouncer_lifetime_ticks,
                    },
                );
            }
        }
        BossAttack::EquationRain | BossAttack::DenseRain => {
            let count = if attack == BossAttack::DenseRain {
                RAIN_COUNT * 2
            } else {
                RAIN_COUNT
            };
            for _ in 0..count {
                let origin_x = rng.range(40.0, ARENA_WIDTH - 40.0);
                spawn_projectile(
                    commands,
                    seq,
                    Owner::Boss,
                    1.0,
                    true,
                    Vec2::new(origin_x, ARENA_HEIGHT + 40.0),
                    ProjectileKind::Rain {
                        origin_x,
                        amplitude: rng.range(RAIN_AMPLITUDE_MIN, RAIN_AMPLITUDE_MAX),
                        frequency: RAIN_FREQUENCY,
                        phase: rng.range(0.0, std::f32::consts::TAU),
                        elapsed: 0.0,
                    },
                );
            }
        }
        BossAttack::WallWipe => {
            // Sweeps in from whichever edge is behind the player.
            let from_left = player_pos.x > ARENA_WIDTH / 2.0;
            let (x, dir) = if from_left {
                (-WALL_SWEEP_HALF_WIDTH, 1.0)
            } else {
                (ARENA_WIDTH + WALL_SWEEP_HALF_WIDTH, -1.0)
            };
            spawn_projectile(
                commands,
                seq,
                Owner::Boss,
                1.0,
                false,
                Vec2::new(x, ARENA_HEIGHT / 2.0),
                ProjectileKind::WallSweep {
                    vel: Vec2::new(dir * WALL_SWEEP_SPEED, 0.0),
                },
            );
        }
        BossAttack::ProtractorSpin => {
            spawn_projectile(
                commands,
                seq,
                Owner::Boss,
                1.0,
                true,
                boss_pos,
                ProjectileKind::Orbiter {
                    angle: rng.range(0.0, std::f32::consts::TAU),
                    angular_velocity: ORBITER_ANGULAR_VELOCITY,
                    radius: ORBITER_RADIUS,
                    life: ORBITER_LIFETIME_TICKS,
                },
            );
        }
        BossAttack::HomingChalk => {
            for i in 0..2 {
                let offset = Vec2::new(0.0, 40.0 - 80.0 * i as f32);
                let dir = (player_pos - boss_pos - offset).normalize_or_zero();
                let dir = if dir == Vec2::ZERO { Vec2::NEG_X } else { dir };
                spawn_projectile(
                    commands,
                    seq,
                    Owner::Boss,
                    1.0,
                    true,
                    boss_pos + offset,
                    ProjectileKind::Homing {
                        vel: dir * HOMING_SPEED,
                        life: config.homing_lifetime_ticks,
                    },
                );
            }
        }
        BossAttack::DoubleBeam => {
            for i in 0..2 {
                let angle = if i == 0 {
                    (player_pos - boss_pos).to_angle()
                } else {
                    (player_pos - boss_pos).to_angle() + std::f32::consts::FRAC_PI_4
                };
                spawn_projectile(
                    commands,
                    seq,
                    Owner::Boss,
                    1.0,
                    false,
                    boss_pos,
                    ProjectileKind::Beam {
                        state: BeamState::Charging,
                        timer: config.beam_charge_ticks,
                        angle,
                        sweep_rate: 0.0,
                        length: ARENA_WIDTH,
                    },
                );
            }
        }
        BossAttack::TextbookSlam => {
            // Hovers over the player's current column, then drops.
            spawn_projectile(
                commands,
                seq,
                Owner::Boss,
                1.0,
                false,
                Vec2::new(player_pos.x, ARENA_HEIGHT + SLAM_HALF_EXTENTS.1),
                ProjectileKind::Slam {
                    warn: SLAM_WARNING_TICKS,
                    falling: false,
                },
            );
        }
        BossAttack::CompassHell => {
            // Rotating radial waves; every other needle can be parried.
            for wave in 0..COMPASS_BURSTS {
                let speed = COMPASS_BASE_SPEED + wave as f32;
                for i in 0..COMPASS_COUNT {
                    let angle = i as f32 * std::f32::consts::TAU / COMPASS_COUNT as f32
                        + wave as f32 * COMPASS_WAVE_OFFSET;
                    spawn_projectile(
                        commands,
                        seq,
                        Owner::Boss,
                        1.0,
                        i % 2 == 0,
                        boss_pos,
                        ProjectileKind::Straight {
                            vel: Vec2::from_angle(angle) * speed,
                        },
                    );
                }
            }
        }
        BossAttack::SweepingLaser => {
            spawn_projectile(
                commands,
                seq,
                Owner::Boss,
                1.0,
                false,
                boss_pos,
                ProjectileKind::Beam {
                    state: BeamState::Charging,
                    timer: config.beam_charge_ticks,
                    angle: std::f32::consts::PI,
                    sweep_rate: BEAM_SWEEP_RATE,
                    length: ARENA_WIDTH,
                },
            );
        }
        BossAttack::FullBarrage => {
            launch_attack(BossAttack::GeometryVolley, commands, seq, rng, boss_pos, player_pos, config);
            launch_attack(BossAttack::BouncingErasers, commands, seq, rng, boss_pos, player_pos, config);
            launch_attack(BossAttack::DenseRain, commands, seq, rng, boss_pos, player_pos, config);
        }
        // Handled by the behaviour system before dispatch.
        BossAttack::RealityBreak | BossAttack::TeleportStrike => {}
    }
}

fn teleport_destination(rng: &mut EncounterRng, player_pos: Vec2, min_dist: f32) -> Vec2 {
    for _ in 0..8 {
        let candidate = Vec2::new(
            rng.range(120.0, ARENA_WIDTH - 120.0),
            rng.range(200.0, ARENA_HEIGHT - 120.0),
        );
        if candidate.distance(player_pos) >= min_dist {
            return candidate;
        }
    }
    // Degenerate arena/tuning: fall back to the far corner from the player.
    if player_pos.x > ARENA_WIDTH / 2.0 {
        Vec2::new(160.0, 420.0)
    } else {
        Vec2::new(ARENA_WIDTH - 160.0, 420.0)
    }
}

/// Timer stage: burns down the boss's state/weak-point/flash timers, lands
/// the reality-break effect exactly once when the warning elapses, and
/// reverts it when its duration runs out.
pub fn boss_timers_system(
    mut bosses: Query<&mut Boss>,
    clock: Res<EncounterTime>,
    config: Res<TuningConfig>,
    mut reality: ResMut<RealityState>,
    mut bus: ResMut<EffectBus>,
    mut rng: ResMut<EncounterRng>,
    mut dialogue: ResMut<BossDialogue>,
) {
    let dt = clock.dt;
    if dt <= 0.0 {
        return;
    }
    let Ok(mut boss) = bosses.single_mut() else {
        return;
    };

    boss.weak_point_timer = (boss.weak_point_timer - dt).max(0.0);
    boss.flash_timer = (boss.flash_timer - dt).max(0.0);

    match boss.state {
        BossState::Stunned | BossState::Transitioning => {
            boss.state_timer -= dt;
            if boss.state_timer <= 0.0 {
                boss.state = BossState::Idle;
            }
        }
        BossState::Warning => {
            boss.state_timer -= dt;
            if boss.state_timer <= 0.0 {
                boss.state = BossState::Idle;
                boss.reality_pending = false;
                let effect = match rng.index(3) {
                    0 => RealityEffect::InvertControls,
                    1 => RealityEffect::InvertGravity,
                    _ => RealityEffect::GlobalSlowmo,
                };
                reality.effect = Some(effect);
                reality.timer = config.reality_effect_ticks;
                if effect == RealityEffect::GlobalSlowmo {
                    bus.request_slowmo(config.reality_effect_ticks, REALITY_SLOWMO_SCALE);
                }
                bus.request_shake(PHASE_SHAKE_TICKS, PHASE_SHAKE_MAGNITUDE);
                dialogue.say("Axiom override: accepted.");
            }
        }
        BossState::Dead | BossState::Idle => {}
    }

    if reality.timer > 0.0 {
        reality.timer -= dt;
        if reality.timer <= 0.0 {
            reality.effect = None;
            reality.timer = 0.0;
        }
    }

    if dialogue.timer > 0.0 {
        dialogue.timer -= dt;
        if dialogue.timer <= 0.0 {
            dialogue.line = None;
        }
    }
}
