//! Blackboard: a deterministic boss-fight encounter against Professor Axiom.
//!
//! The crate splits along the simulation/presentation seam:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | every tuning number, in tick units |
//! | [`config`] | runtime-tunable overrides loaded from TOML |
//! | [`error`] | tuning validation errors |
//! | [`effects`] | screen-feedback bus and the scaled simulation clock |
//! | [`rng`] | seeded RNG wrapper; all randomness flows through it |
//! | [`input`] | per-tick input snapshot |
//! | [`projectile`] | the closed sum type of every moving hazard |
//! | [`boss`] | boss FSM, phases, attack tables, reality breaks |
//! | [`player`] | player movement, parry/dash kit, card economy |
//! | [`encounter`] | the tick pipeline, collision order, outcome |
//! | [`stats`] | lifetime statistics persisted as TOML |
//! | [`menu`] | `GameState` and the menu/end screens |
//! | [`graphics`] / [`rendering`] | camera and flat-colour presentation |
//!
//! Everything above the seam runs headless; the integration tests drive a
//! full encounter with `MinimalPlugins` and no window.

pub mod boss;
pub mod config;
pub mod constants;
pub mod effects;
pub mod encounter;
pub mod error;
pub mod graphics;
pub mod input;
pub mod menu;
pub mod player;
pub mod projectile;
pub mod rendering;
pub mod rng;
pub mod stats;
