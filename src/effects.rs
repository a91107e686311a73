//! Screen-feedback timer bus and the scaled simulation clock.
//!
//! Gameplay code never talks to the camera or renderer.  It files requests
//! with the [`EffectBus`] — shake, slow-motion, hit-freeze, zoom, floating
//! damage labels — and the bus aggregates them into a per-tick time-scale,
//! camera offset, and zoom level that the host samples when drawing.
//!
//! [`encounter_clock`] runs first in the tick pipeline: it advances the bus by
//! the real (wall-clock) delta and publishes the **scaled** delta in
//! [`EncounterTime`], which every gameplay system reads instead of
//! `Res<Time>`.  Hit-freeze therefore stops the simulation without stopping
//! the bus's own timers.

use crate::constants::*;
use crate::rng::EncounterRng;
use bevy::prelude::*;

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Per-frame tick deltas.  `dt` is scaled by the effect bus (0 while frozen);
/// `real_dt` is the raw wall-clock delta in ticks.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct EncounterTime {
    pub dt: f32,
    pub real_dt: f32,
}

/// Converts the wall-clock frame delta into tick units, advances the effect
/// bus, and publishes the scaled gameplay delta for this frame.
pub fn encounter_clock(
    time: Res<Time>,
    mut clock: ResMut<EncounterTime>,
    mut bus: ResMut<EffectBus>,
    mut rng: ResMut<EncounterRng>,
) {
    let real_dt = (time.delta_secs() * TICKS_PER_SECOND).min(MAX_TICK_DELTA);
    bus.tick(real_dt, &mut rng);
    clock.real_dt = real_dt;
    clock.dt = real_dt * bus.time_scale();
}

// ── Damage labels ─────────────────────────────────────────────────────────────

/// Color/priority class of a floating damage label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LabelKind {
    Normal,
    /// Weak-point hit — amplified damage, shown larger.
    Weak,
    /// Critical feedback (perfect parry, phase events); never evicted first.
    Crit,
}

/// One transient floating text entry owned by the bus.
#[derive(Debug, Clone)]
pub struct DamageLabel {
    pub pos: Vec2,
    pub text: String,
    pub kind: LabelKind,
    pub vel: Vec2,
    /// Remaining lifetime in ticks.
    pub life: f32,
}

// ── Bus ───────────────────────────────────────────────────────────────────────

/// Process-wide registry of transient presentation timers.
///
/// Best-effort cosmetic layer: no request can fail, and nothing here feeds
/// back into gameplay state except through the published time-scale.
#[derive(Resource, Debug, Clone)]
pub struct EffectBus {
    shake_timer: f32,
    shake_magnitude: f32,
    camera_offset: Vec2,
    slowmo_timer: f32,
    slowmo_scale: f32,
    freeze_timer: f32,
    zoom: f32,
    zoom_target: f32,
    /// Extra multiplier applied on top of the timer-driven scale.  Rewritten
    /// every tick by its owner (player focus); not a countdown.
    pub hold_scale: f32,
    labels: Vec<DamageLabel>,
    label_cap: usize,
}

impl Default for EffectBus {
    fn default() -> Self {
        Self {
            shake_timer: 0.0,
            shake_magnitude: 0.0,
            camera_offset: Vec2::ZERO,
            slowmo_timer: 0.0,
            slowmo_scale: 1.0,
            freeze_timer: 0.0,
            zoom: 1.0,
            zoom_target: 1.0,
            hold_scale: 1.0,
            labels: Vec::new(),
            label_cap: DAMAGE_LABEL_CAP,
        }
    }
}

impl EffectBus {
    /// Overwrites the current shake.  Last writer wins; requests are not
    /// additive.
    pub fn request_shake(&mut self, duration: f32, magnitude: f32) {
        self.shake_timer = duration.max(0.0);
        self.shake_magnitude = magnitude.max(0.0);
    }

    /// Runs the simulation at `scale` for `duration` ticks, then restores 1.0.
    pub fn request_slowmo(&mut self, duration: f32, scale: f32) {
        self.slowmo_timer = duration.max(0.0);
        self.slowmo_scale = scale.clamp(0.0, 1.0);
    }

    /// Hit-stop: forces the gameplay time-scale to zero.  While active, the
    /// slow-motion and shake timers are suspended; the freeze timer itself
    /// still burns down every real tick.
    pub fn request_freeze(&mut self, duration: f32) {
        self.freeze_timer = self.freeze_timer.max(duration.max(0.0));
    }

    /// Sets a zoom target that [`Self::tick`] eases toward; never snaps.
    pub fn request_zoom(&mut self, target: f32, _duration: f32) {
        self.zoom_target = target.max(0.1);
    }

    /// Enqueues a floating damage label, evicting the lowest-priority,
    /// nearest-to-expiry entry when over capacity.
    pub fn add_damage_label(&mut self, pos: Vec2, amount: f32, is_weak: bool, is_crit: bool) {
        let kind = if is_crit {
            LabelKind::Crit
        } else if is_weak {
            LabelKind::Weak
        } else {
            LabelKind::Normal
        };
        if self.labels.len() >= self.label_cap {
            if let Some(victim) = self
                .labels
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    (a.kind, a.life)
                        .partial_cmp(&(b.kind, b.life))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(i, _)| i)
            {
                self.labels.swap_remove(victim);
            }
        }
        self.labels.push(DamageLabel {
            pos,
            text: format_amount(amount),
            kind,
            vel: Vec2::new(0.0, DAMAGE_LABEL_DRIFT),
            life: DAMAGE_LABEL_TICKS,
        });
    }

    /// Advances every bus timer by the real delta and resamples the camera
    /// offset.
    pub fn tick(&mut self, real_dt: f32, rng: &mut EncounterRng) {
        if real_dt <= 0.0 {
            return;
        }
        if self.freeze_timer > 0.0 {
            // Freeze pre-empts slow-motion and shake: their timers hold.
            self.freeze_timer = (self.freeze_timer - real_dt).max(0.0);
        } else {
            if self.shake_timer > 0.0 {
                self.shake_timer = (self.shake_timer - real_dt).max(0.0);
            }
            if self.slowmo_timer > 0.0 {
                self.slowmo_timer = (self.slowmo_timer - real_dt).max(0.0);
                if self.slowmo_timer == 0.0 {
                    self.slowmo_scale = 1.0;
                }
            }
        }

        self.camera_offset = if self.shake_timer > 0.0 {
            rng.jitter(self.shake_magnitude)
        } else {
            Vec2::ZERO
        };

        // Exponential ease toward the zoom target, normalised to tick units.
        self.zoom += (self.zoom_target - self.zoom) * (ZOOM_SMOOTHING * real_dt).min(1.0);

        for label in &mut self.labels {
            label.pos += label.vel * real_dt;
            label.life -= real_dt;
        }
        self.labels.retain(|label| label.life > 0.0);
    }

    /// Effective gameplay time-scale this tick: 0 while frozen, otherwise the
    /// slow-motion scale times any externally held multiplier.
    pub fn time_scale(&self) -> f32 {
        if self.freeze_timer > 0.0 {
            return 0.0;
        }
        let base = if self.slowmo_timer > 0.0 {
            self.slowmo_scale
        } else {
            1.0
        };
        base * self.hold_scale
    }

    /// Camera offset sampled this tick; zero while shake is inactive.
    pub fn camera_offset(&self) -> Vec2 {
        self.camera_offset
    }

    /// Current (eased) zoom level.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_timer > 0.0
    }

    /// Live floating damage labels, for host-side text rendering.
    pub fn labels(&self) -> &[DamageLabel] {
        &self.labels
    }
}

/// "12" for whole amounts, "1.5" otherwise.
fn format_amount(amount: f32) -> String {
    if (amount - amount.round()).abs() < 1e-3 {
        format!("{}", amount.round() as i64)
    } else {
        format!("{amount:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> EncounterRng {
        EncounterRng::from_seed(42)
    }

    #[test]
    fn slowmo_restores_to_unit_scale() {
        let mut bus = EffectBus::default();
        let mut rng = rng();
        bus.request_slowmo(10.0, 0.25);
        assert_eq!(bus.time_scale(), 0.25);
        for _ in 0..10 {
            bus.tick(1.0, &mut rng);
        }
        assert_eq!(bus.time_scale(), 1.0);
    }

    #[test]
    fn freeze_preempts_slowmo_timer_decrement() {
        let mut bus = EffectBus::default();
        let mut rng = rng();
        bus.request_slowmo(10.0, 0.5);
        bus.request_freeze(4.0);
        assert_eq!(bus.time_scale(), 0.0);
        for _ in 0..4 {
            bus.tick(1.0, &mut rng);
        }
        // The freeze burned down; the slow-mo window is still fully intact.
        assert!(!bus.is_frozen());
        assert_eq!(bus.time_scale(), 0.5);
        for _ in 0..10 {
            bus.tick(1.0, &mut rng);
        }
        assert_eq!(bus.time_scale(), 1.0);
    }

    #[test]
    fn shake_is_last_writer_wins() {
        let mut bus = EffectBus::default();
        let mut rng = rng();
        bus.request_shake(100.0, 50.0);
        bus.request_shake(2.0, 1.0);
        bus.tick(1.0, &mut rng);
        let offset = bus.camera_offset();
        assert!(offset.x.abs() <= 1.0 && offset.y.abs() <= 1.0);
        bus.tick(1.0, &mut rng);
        bus.tick(1.0, &mut rng);
        assert_eq!(bus.camera_offset(), Vec2::ZERO);
    }

    #[test]
    fn zoom_eases_without_snapping() {
        let mut bus = EffectBus::default();
        let mut rng = rng();
        bus.request_zoom(2.0, 0.0);
        bus.tick(1.0, &mut rng);
        assert!(bus.zoom() > 1.0 && bus.zoom() < 2.0);
        for _ in 0..200 {
            bus.tick(1.0, &mut rng);
        }
        assert!((bus.zoom() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn label_eviction_prefers_low_priority_then_nearest_expiry() {
        let mut bus = EffectBus {
            label_cap: 2,
            ..Default::default()
        };
        let mut rng = rng();
        bus.add_damage_label(Vec2::ZERO, 1.0, false, true); // crit
        bus.add_damage_label(Vec2::ZERO, 2.0, false, false); // normal, older
        bus.tick(5.0, &mut rng); // normal now nearer expiry than the next add
        bus.add_damage_label(Vec2::ZERO, 3.0, true, false); // forces eviction
        assert_eq!(bus.labels().len(), 2);
        assert!(bus.labels().iter().any(|l| l.kind == LabelKind::Crit));
        assert!(bus.labels().iter().any(|l| l.kind == LabelKind::Weak));
    }

    #[test]
    fn labels_expire() {
        let mut bus = EffectBus::default();
        let mut rng = rng();
        bus.add_damage_label(Vec2::ZERO, 1.0, false, false);
        bus.tick(DAMAGE_LABEL_TICKS + 1.0, &mut rng);
        assert!(bus.labels().is_empty());
    }

    #[test]
    fn zero_delta_tick_changes_nothing() {
        let mut bus = EffectBus::default();
        let mut rng = rng();
        bus.request_slowmo(10.0, 0.5);
        bus.add_damage_label(Vec2::ZERO, 1.0, false, false);
        let before_scale = bus.time_scale();
        let before_life = bus.labels()[0].life;
        bus.tick(0.0, &mut rng);
        assert_eq!(bus.time_scale(), before_scale);
        assert_eq!(bus.labels()[0].life, before_life);
    }
}
