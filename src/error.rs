//! Encounter-specific error types.
//!
//! The simulation itself has no recoverable failure modes — degenerate
//! gameplay math falls back to safe defaults in place.  These types cover the
//! crate's actual fallible surface: configuration validation and stats I/O.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::error::EncounterError;
//!
//! fn load() -> Result<(), EncounterError> {
//!     validate_phase_thresholds(cfg.phase_2_threshold, cfg.phase_3_threshold, cfg.boss_max_hp)?;
//!     Ok(())
//! }
//! ```

use std::fmt;

/// Top-level error enum for the encounter engine.
#[derive(Debug)]
pub enum EncounterError {
    /// A tuning value is outside its safe operating range.
    /// Returned by validation helpers when a TOML override is rejected.
    UnsafeTuning {
        /// Name of the field (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// Phase thresholds are not strictly ordered below max HP.
    /// Out-of-order thresholds would make the phase ladder unreachable.
    PhaseOrdering {
        phase_2: f32,
        phase_3: f32,
        max_hp: f32,
    },

    /// Reading or writing the stats file failed.
    StatsIo {
        path: String,
        reason: String,
    },
}

impl fmt::Display for EncounterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncounterError::UnsafeTuning {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "tuning field '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            EncounterError::PhaseOrdering {
                phase_2,
                phase_3,
                max_hp,
            } => write!(
                f,
                "phase thresholds must satisfy 0 < {} < {} < {} (phase 3 < phase 2 < max hp)",
                phase_3, phase_2, max_hp
            ),
            EncounterError::StatsIo { path, reason } => {
                write!(f, "stats file '{}': {}", path, reason)
            }
        }
    }
}

impl std::error::Error for EncounterError {}

/// Convenience alias: a `Result` using `EncounterError` as the error type.
pub type EncounterResult<T> = Result<T, EncounterError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `0 < phase_3 < phase_2 < max_hp`.
pub fn validate_phase_thresholds(phase_2: f32, phase_3: f32, max_hp: f32) -> EncounterResult<()> {
    if phase_3 > 0.0 && phase_3 < phase_2 && phase_2 < max_hp {
        Ok(())
    } else {
        Err(EncounterError::PhaseOrdering {
            phase_2,
            phase_3,
            max_hp,
        })
    }
}

/// Returns an error if `max_cards` is not strictly positive.
pub fn validate_max_cards(value: f32) -> EncounterResult<()> {
    if value <= 0.0 {
        Err(EncounterError::UnsafeTuning {
            name: "max_cards",
            value,
            safe_range: "(0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if the bouncer ramp would shrink or explode projectile
/// speed.  Values above 1.05 compound past double speed inside one lifetime.
pub fn validate_speed_ramp(value: f32) -> EncounterResult<()> {
    if value < 1.0 || value > 1.05 {
        Err(EncounterError::UnsafeTuning {
            name: "bouncer_speed_ramp",
            value,
            safe_range: "[1.0, 1.05]",
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_thresholds_accept_default_ladder() {
        assert!(validate_phase_thresholds(70.0, 30.0, 100.0).is_ok());
    }

    #[test]
    fn phase_thresholds_reject_inverted_ladder() {
        assert!(validate_phase_thresholds(30.0, 70.0, 100.0).is_err());
        assert!(validate_phase_thresholds(120.0, 30.0, 100.0).is_err());
    }

    #[test]
    fn speed_ramp_rejects_decay_and_blowup() {
        assert!(validate_speed_ramp(1.002).is_ok());
        assert!(validate_speed_ramp(0.98).is_err());
        assert!(validate_speed_ramp(1.2).is_err());
    }
}
