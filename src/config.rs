//! Runtime tuning configuration loaded from `assets/tuning.toml`.
//!
//! [`TuningConfig`] is a Bevy [`Resource`] that mirrors the designer-facing
//! constants in [`crate::constants`].  At startup, [`load_tuning_config`]
//! reads `assets/tuning.toml` and overwrites the defaults with any values
//! present in the file.  Missing keys fall back to the compile-time defaults,
//! so a minimal TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<TuningConfig>` to any system parameter list and read
//! values with `config.dash_ticks`, `config.boss_max_hp`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `TuningConfig::default()`.

use crate::constants::*;
use crate::error::{validate_max_cards, validate_phase_thresholds, validate_speed_ramp};
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable encounter configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/tuning.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    // ── Boss ─────────────────────────────────────────────────────────────────
    pub boss_max_hp: f32,
    pub phase_2_threshold: f32,
    pub phase_3_threshold: f32,
    pub phase_transition_ticks: f32,
    pub attack_interval_ticks: f32,
    pub attack_interval_phase_3_ticks: f32,
    pub boss_stun_ticks: f32,
    pub weak_point_multiplier: f32,
    pub weak_point_multiplier_phase_3: f32,
    pub boss_death_ticks: f32,
    pub boss_teleport_interval_ticks: f32,
    pub boss_teleport_min_dist: f32,
    pub reality_warning_ticks: f32,
    pub reality_effect_ticks: f32,

    // ── Boss projectiles ─────────────────────────────────────────────────────
    pub bouncer_speed_ramp: f32,
    pub bouncer_lifetime_ticks: f32,
    pub homing_lerp: f32,
    pub homing_lifetime_ticks: f32,
    pub beam_charge_ticks: f32,
    pub beam_fire_ticks: f32,

    // ── Player: movement ─────────────────────────────────────────────────────
    pub run_accel: f32,
    pub run_max_speed: f32,
    pub air_accel: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub jump_impulse: f32,
    pub max_jumps: u32,
    pub cling_slide_speed: f32,
    pub cling_budget_ticks: f32,

    // ── Player: dash / parry / shield ────────────────────────────────────────
    pub dash_speed: f32,
    pub dash_ticks: f32,
    pub dash_cooldown_ticks: f32,
    pub parry_window_ticks: f32,
    pub perfect_parry_ticks: f32,
    pub parry_chain_window_ticks: f32,
    pub parry_chain_target: u32,
    pub exam_ace_ticks: f32,
    pub shield_cooldown_ticks: f32,

    // ── Player: resources & shots ────────────────────────────────────────────
    pub player_max_hp: i32,
    pub player_iframe_ticks: f32,
    pub max_cards: f32,
    pub shot_cooldown_ticks: f32,
    pub charge_ticks: f32,
    pub close_range_dist: f32,

    // ── Effects / misc ───────────────────────────────────────────────────────
    pub zoom_smoothing: f32,
    pub damage_label_cap: usize,
    pub rng_seed: u64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            // Boss
            boss_max_hp: BOSS_MAX_HP,
            phase_2_threshold: PHASE_2_THRESHOLD,
            phase_3_threshold: PHASE_3_THRESHOLD,
            phase_transition_ticks: PHASE_TRANSITION_TICKS,
            attack_interval_ticks: ATTACK_INTERVAL_TICKS,
            attack_interval_phase_3_ticks: ATTACK_INTERVAL_PHASE_3_TICKS,
            boss_stun_ticks: BOSS_STUN_TICKS,
            weak_point_multiplier: WEAK_POINT_MULTIPLIER,
            weak_point_multiplier_phase_3: WEAK_POINT_MULTIPLIER_PHASE_3,
            boss_death_ticks: BOSS_DEATH_TICKS,
            boss_teleport_interval_ticks: BOSS_TELEPORT_INTERVAL_TICKS,
            boss_teleport_min_dist: BOSS_TELEPORT_MIN_DIST,
            reality_warning_ticks: REALITY_WARNING_TICKS,
            reality_effect_ticks: REALITY_EFFECT_TICKS,
            // Boss projectiles
            bouncer_speed_ramp: BOUNCER_SPEED_RAMP,
            bouncer_lifetime_ticks: BOUNCER_LIFETIME_TICKS,
            homing_lerp: HOMING_LERP,
            homing_lifetime_ticks: HOMING_LIFETIME_TICKS,
            beam_charge_ticks: BEAM_CHARGE_TICKS,
            beam_fire_ticks: BEAM_FIRE_TICKS,
            // Player: movement
            run_accel: RUN_ACCEL,
            run_max_speed: RUN_MAX_SPEED,
            air_accel: AIR_ACCEL,
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            jump_impulse: JUMP_IMPULSE,
            max_jumps: MAX_JUMPS,
            cling_slide_speed: CLING_SLIDE_SPEED,
            cling_budget_ticks: CLING_BUDGET_TICKS,
            // Player: dash / parry / shield
            dash_speed: DASH_SPEED,
            dash_ticks: DASH_TICKS,
            dash_cooldown_ticks: DASH_COOLDOWN_TICKS,
            parry_window_ticks: PARRY_WINDOW_TICKS,
            perfect_parry_ticks: PERFECT_PARRY_TICKS,
            parry_chain_window_ticks: PARRY_CHAIN_WINDOW_TICKS,
            parry_chain_target: PARRY_CHAIN_TARGET,
            exam_ace_ticks: EXAM_ACE_TICKS,
            shield_cooldown_ticks: SHIELD_COOLDOWN_TICKS,
            // Player: resources & shots
            player_max_hp: PLAYER_MAX_HP,
            player_iframe_ticks: PLAYER_IFRAME_TICKS,
            max_cards: MAX_CARDS,
            shot_cooldown_ticks: SHOT_COOLDOWN_TICKS,
            charge_ticks: CHARGE_TICKS,
            close_range_dist: CLOSE_RANGE_DIST,
            // Effects / misc
            zoom_smoothing: ZOOM_SMOOTHING,
            damage_label_cap: DAMAGE_LABEL_CAP,
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

impl TuningConfig {
    /// Weak-point damage multiplier for the given phase.
    #[inline]
    pub fn weak_point_multiplier_for(&self, phase: u8) -> f32 {
        if phase >= 3 {
            self.weak_point_multiplier_phase_3
        } else {
            self.weak_point_multiplier
        }
    }

    /// Attack interval for the given phase.
    #[inline]
    pub fn attack_interval_for(&self, phase: u8) -> f32 {
        if phase >= 3 {
            self.attack_interval_phase_3_ticks
        } else {
            self.attack_interval_ticks
        }
    }
}

/// Startup system: attempt to load `assets/tuning.toml` and overwrite the
/// `TuningConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  A file that parses but fails
/// validation is rejected wholesale — a half-applied override is worse than
/// none.  A missing file is silently ignored.
pub fn load_tuning_config(mut config: ResMut<TuningConfig>) {
    let path = "assets/tuning.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<TuningConfig>(&contents) {
            Ok(loaded) => {
                if let Err(e) = validate(&loaded) {
                    warn!("rejecting {path}: {e}; using compiled defaults");
                } else {
                    *config = loaded;
                    info!("loaded tuning config from {path}");
                }
            }
            Err(e) => {
                warn!("failed to parse {path}: {e}; using compiled defaults");
            }
        },
        Err(_) => {
            // File not present — defaults are already in place; not an error.
            info!("no {path} found; using compiled defaults");
        }
    }
}

fn validate(config: &TuningConfig) -> crate::error::EncounterResult<()> {
    validate_phase_thresholds(
        config.phase_2_threshold,
        config.phase_3_threshold,
        config.boss_max_hp,
    )?;
    validate_max_cards(config.max_cards)?;
    validate_speed_ramp(config.bouncer_speed_ramp)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_constants() {
        let config = TuningConfig::default();
        assert_eq!(config.boss_max_hp, BOSS_MAX_HP);
        assert_eq!(config.dash_ticks, DASH_TICKS);
        assert_eq!(config.max_cards, MAX_CARDS);
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let config: TuningConfig = toml::from_str("dash_ticks = 20.0").unwrap();
        assert_eq!(config.dash_ticks, 20.0);
        assert_eq!(config.boss_max_hp, BOSS_MAX_HP);
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(validate(&TuningConfig::default()).is_ok());
    }

    #[test]
    fn phase_multiplier_scales_in_phase_3() {
        let config = TuningConfig::default();
        assert_eq!(config.weak_point_multiplier_for(1), WEAK_POINT_MULTIPLIER);
        assert_eq!(
            config.weak_point_multiplier_for(3),
            WEAK_POINT_MULTIPLIER_PHASE_3
        );
    }
}
