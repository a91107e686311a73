//! Projectile taxonomy.
//!
//! Every boss- or player-fired object is one entity carrying a [`Projectile`]
//! (damage, parryability, owner, spawn order) and a [`ProjectileKind`] — a
//! closed sum type over every motion rule in the game.  Motion and
//! self-termination dispatch through a single `match` in
//! [`ProjectileKind::advance`]; there is no open-ended behaviour hierarchy.
//!
//! Projectiles never resolve their own collisions.  The encounter systems
//! query footprints/overlap here and decide hits, parries, and grazes in
//! deterministic spawn order (`Projectile::seq`).

use crate::config::TuningConfig;
use crate::constants::*;
use bevy::prelude::*;

/// Which actor fired a projectile.  Fixed at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Player,
    Boss,
}

/// Common projectile state.  `parryable` and `owner` never change after spawn.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub damage: f32,
    pub parryable: bool,
    pub owner: Owner,
    /// Monotonic spawn index; simultaneous hits resolve in `seq` order.
    pub seq: u64,
    /// Set once the player has earned the dash-graze bonus from this
    /// projectile, so grazing cannot be farmed by hovering inside it.
    pub grazed: bool,
}

/// Monotonic spawn counter feeding [`Projectile::seq`].
#[derive(Resource, Default)]
pub struct ProjectileSeq(u64);

impl ProjectileSeq {
    pub fn next(&mut self) -> u64 {
        let seq = self.0;
        self.0 += 1;
        seq
    }
}

/// Beam phase: a harmless telegraph, then a damaging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamState {
    Charging,
    Firing,
}

/// Per-kind motion state.  Variants carry only what their motion rule needs.
#[derive(Component, Debug, Clone)]
pub enum ProjectileKind {
    /// Constant velocity until off-screen.
    Straight { vel: Vec2 },
    /// Reflects off arena edges, gains speed multiplicatively each tick, dies
    /// on a fixed lifetime regardless of bounces.
    Bouncer { vel: Vec2, life: f32 },
    /// Constant fall, horizontal sway `origin_x + amplitude·sin(freq·t + φ)`.
    Rain {
        origin_x: f32,
        amplitude: f32,
        frequency: f32,
        phase: f32,
        elapsed: f32,
    },
    /// Rotates around the boss centre; damages and parries only at its tips.
    Orbiter {
        angle: f32,
        angular_velocity: f32,
        radius: f32,
        life: f32,
    },
    /// Steers toward a live target by velocity blending; fizzles on timeout.
    Homing { vel: Vec2, life: f32 },
    /// Charge-then-fire laser anchored at its spawn pivot, optionally
    /// sweeping while firing.
    Beam {
        state: BeamState,
        timer: f32,
        angle: f32,
        sweep_rate: f32,
        length: f32,
    },
    /// Full-height bar translating across the arena.
    WallSweep { vel: Vec2 },
    /// Dive-slam tome: hovers above its mark through a warning countdown,
    /// then drops straight down and dies below the floor.
    Slam { warn: f32, falling: bool },
    /// Player ruler: decelerates outbound, then returns to the player.
    /// Catching it refunds part of its card cost.
    Boomerang { vel: Vec2, returning: bool },
    /// Player eraser bomb: short throw, fixed fuse, area blast on expiry.
    Bomb { vel: Vec2, fuse: f32 },
    /// Player ultimate: a screen-wide band that damages per tick and clears
    /// parryable boss projectiles it touches.
    Ultimate { life: f32 },
}

/// What became of a projectile after one motion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Alive,
    /// Left the playfield, timed out, or finished firing.
    Expired,
    /// Bomb fuse ran out: the encounter applies the area blast, then despawns.
    Exploded,
}

// ── Axis-aligned footprint ────────────────────────────────────────────────────

/// Axis-aligned collision box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center_half(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn expand(&self, by: f32) -> Aabb {
        Aabb {
            min: self.min - Vec2::splat(by),
            max: self.max + Vec2::splat(by),
        }
    }
}

impl ProjectileKind {
    /// Half-extents of the variant's axis-aligned footprint.
    pub fn half_extents(&self) -> Vec2 {
        match self {
            ProjectileKind::Straight { .. } => Vec2::splat(8.0),
            ProjectileKind::Bouncer { .. } => Vec2::splat(12.0),
            ProjectileKind::Rain { .. } => Vec2::splat(10.0),
            // The orbiter's box is only a broad-phase bound; contact is
            // decided per tip.
            ProjectileKind::Orbiter { radius, .. } => Vec2::splat(radius + ORBITER_TIP_RADIUS),
            ProjectileKind::Homing { .. } => Vec2::splat(8.0),
            ProjectileKind::Beam { length, .. } => Vec2::splat(*length),
            ProjectileKind::WallSweep { .. } => {
                Vec2::new(WALL_SWEEP_HALF_WIDTH, ARENA_HEIGHT / 2.0 + DESPAWN_MARGIN)
            }
            ProjectileKind::Slam { .. } => Vec2::new(SLAM_HALF_EXTENTS.0, SLAM_HALF_EXTENTS.1),
            ProjectileKind::Boomerang { .. } => Vec2::splat(10.0),
            ProjectileKind::Bomb { .. } => Vec2::splat(12.0),
            ProjectileKind::Ultimate { .. } => Vec2::new(ARENA_WIDTH, 60.0),
        }
    }

    /// Broad-phase footprint around `pos`.
    pub fn footprint(&self, pos: Vec2) -> Aabb {
        Aabb::from_center_half(pos, self.half_extents())
    }

    /// Kind-aware narrow-phase overlap against a target box.
    ///
    /// Most variants are pure box checks.  The orbiter touches only at its
    /// tips; a beam touches along its firing segment and never while
    /// charging.
    pub fn overlaps(&self, pos: Vec2, target: &Aabb) -> bool {
        match self {
            ProjectileKind::Orbiter { .. } => {
                let expanded = target.expand(ORBITER_TIP_RADIUS);
                self.tip_positions(pos).iter().any(|tip| expanded.contains(*tip))
            }
            ProjectileKind::Beam {
                state,
                angle,
                length,
                ..
            } => {
                if *state != BeamState::Firing {
                    return false;
                }
                let end = pos + Vec2::from_angle(*angle) * *length;
                let target_half = (target.max - target.min) * 0.5;
                let reach = BEAM_HALF_WIDTH + target_half.x.max(target_half.y);
                segment_distance(pos, end, target.center()) <= reach
            }
            _ => self.footprint(pos).overlaps(target),
        }
    }

    /// World positions of the orbiter's tips; empty for every other variant.
    pub fn tip_positions(&self, pos: Vec2) -> Vec<Vec2> {
        match self {
            ProjectileKind::Orbiter { angle, radius, .. } => (0..ORBITER_TIPS)
                .map(|i| {
                    let tip_angle =
                        angle + i as f32 * std::f32::consts::TAU / ORBITER_TIPS as f32;
                    pos + Vec2::from_angle(tip_angle) * *radius
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the variant deals contact damage right now.  Beams are
    /// harmless while charging, slams while hovering; ultimates damage the
    /// boss through their own per-tick rule instead.
    pub fn is_live(&self) -> bool {
        !matches!(
            self,
            ProjectileKind::Beam {
                state: BeamState::Charging,
                ..
            } | ProjectileKind::Slam { falling: false, .. }
        )
    }

    /// One motion step.  `target` is the steering goal for homing-like
    /// variants (the player for boss shots, the boss weak point or centre for
    /// player shots); `boss_center` anchors orbiters.
    pub fn advance(
        &mut self,
        pos: &mut Vec2,
        dt: f32,
        config: &TuningConfig,
        target: Vec2,
        boss_center: Vec2,
    ) -> Fate {
        if dt <= 0.0 {
            return Fate::Alive;
        }
        match self {
            ProjectileKind::Straight { vel } => {
                *pos += *vel * dt;
                offscreen_fate(*pos)
            }
            ProjectileKind::Bouncer { vel, life } => {
                // Ramp compounds per tick; powf keeps it frame-rate honest.
                *vel *= config.bouncer_speed_ramp.powf(dt);
                *pos += *vel * dt;
                if pos.x < 0.0 {
                    pos.x = 0.0;
                    vel.x = vel.x.abs();
                } else if pos.x > ARENA_WIDTH {
                    pos.x = ARENA_WIDTH;
                    vel.x = -vel.x.abs();
                }
                if pos.y < 0.0 {
                    pos.y = 0.0;
                    vel.y = vel.y.abs();
                } else if pos.y > ARENA_HEIGHT {
                    pos.y = ARENA_HEIGHT;
                    vel.y = -vel.y.abs();
                }
                *life -= dt;
                if *life <= 0.0 {
                    Fate::Expired
                } else {
                    Fate::Alive
                }
            }
            ProjectileKind::Rain {
                origin_x,
                amplitude,
                frequency,
                phase,
                elapsed,
            } => {
                *elapsed += dt;
                pos.y -= RAIN_FALL_SPEED * dt;
                pos.x = *origin_x + *amplitude * (*frequency * *elapsed + *phase).sin();
                if pos.y < -DESPAWN_MARGIN {
                    Fate::Expired
                } else {
                    Fate::Alive
                }
            }
            ProjectileKind::Orbiter {
                angle,
                angular_velocity,
                radius: _,
                life,
            } => {
                *angle += *angular_velocity * dt;
                *pos = boss_center;
                *life -= dt;
                if *life <= 0.0 {
                    Fate::Expired
                } else {
                    Fate::Alive
                }
            }
            ProjectileKind::Homing { vel, life } => {
                let to_target = target - *pos;
                // Degenerate aim (target on top of us): keep the previous
                // heading instead of normalising a zero vector.
                if to_target.length_squared() > 1e-6 {
                    let desired = to_target.normalize() * HOMING_SPEED;
                    let t = (config.homing_lerp * dt).min(1.0);
                    *vel += (desired - *vel) * t;
                }
                *pos += *vel * dt;
                *life -= dt;
                if *life <= 0.0 {
                    Fate::Expired
                } else {
                    offscreen_fate(*pos)
                }
            }
            ProjectileKind::Beam {
                state,
                timer,
                angle,
                sweep_rate,
                length: _,
            } => {
                *timer -= dt;
                match state {
                    BeamState::Charging => {
                        if *timer <= 0.0 {
                            *state = BeamState::Firing;
                            *timer = config.beam_fire_ticks;
                        }
                        Fate::Alive
                    }
                    BeamState::Firing => {
                        *angle += *sweep_rate * dt;
                        if *timer <= 0.0 {
                            Fate::Expired
                        } else {
                            Fate::Alive
                        }
                    }
                }
            }
            ProjectileKind::WallSweep { vel } => {
                *pos += *vel * dt;
                if pos.x < -DESPAWN_MARGIN || pos.x > ARENA_WIDTH + DESPAWN_MARGIN {
                    Fate::Expired
                } else {
                    Fate::Alive
                }
            }
            ProjectileKind::Slam { warn, falling } => {
                if *falling {
                    pos.y -= SLAM_FALL_SPEED * dt;
                    if pos.y < -DESPAWN_MARGIN {
                        Fate::Expired
                    } else {
                        Fate::Alive
                    }
                } else {
                    *warn -= dt;
                    if *warn <= 0.0 {
                        *falling = true;
                    }
                    Fate::Alive
                }
            }
            ProjectileKind::Boomerang { vel, returning } => {
                if !*returning {
                    let speed = vel.length();
                    let decel = BOOMERANG_DECEL * dt;
                    if speed <= decel {
                        *returning = true;
                    } else {
                        *vel *= (speed - decel) / speed;
                    }
                } else {
                    let to_player = target - *pos;
                    if to_player.length_squared() > 1e-6 {
                        *vel = to_player.normalize() * BOOMERANG_SPEED;
                    }
                }
                *pos += *vel * dt;
                offscreen_fate(*pos)
            }
            ProjectileKind::Bomb { vel, fuse } => {
                *pos += *vel * dt;
                *fuse -= dt;
                if *fuse <= 0.0 {
                    Fate::Exploded
                } else {
                    Fate::Alive
                }
            }
            ProjectileKind::Ultimate { life } => {
                *life -= dt;
                if *life <= 0.0 {
                    Fate::Expired
                } else {
                    Fate::Alive
                }
            }
        }
    }
}

fn offscreen_fate(pos: Vec2) -> Fate {
    if pos.x < -DESPAWN_MARGIN
        || pos.x > ARENA_WIDTH + DESPAWN_MARGIN
        || pos.y < -DESPAWN_MARGIN
        || pos.y > ARENA_HEIGHT + DESPAWN_MARGIN
    {
        Fate::Expired
    } else {
        Fate::Alive
    }
}

/// Distance from `point` to the segment `a`–`b`.
fn segment_distance(a: Vec2, b: Vec2, point: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= 1e-6 {
        return (point - a).length();
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).length()
}

/// Spawns a projectile entity with its common state, motion variant, and
/// transform.  `seq` comes from [`ProjectileSeq`] so collision resolution can
/// stay in insertion order.
pub fn spawn_projectile(
    commands: &mut Commands,
    seq: &mut ProjectileSeq,
    owner: Owner,
    damage: f32,
    parryable: bool,
    pos: Vec2,
    kind: ProjectileKind,
) -> Entity {
    commands
        .spawn((
            Projectile {
                damage,
                parryable,
                owner,
                seq: seq.next(),
                grazed: false,
            },
            kind,
            Transform::from_translation(pos.extend(0.0)),
        ))
        .id()
}
