//! Centralised gameplay and tuning constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//!
//! ## Units
//!
//! The simulation runs on logical **ticks** at a nominal 60 ticks/second.
//! Durations are in ticks, speeds in world-units per tick, accelerations in
//! world-units per tick².  The clock system converts wall-clock deltas into
//! (possibly time-scaled) tick deltas, so a frame at 60 fps advances the
//! simulation by ≈1.0.

// ── Playfield ─────────────────────────────────────────────────────────────────

/// Width of the arena (world units).  The boss hovers in the right half.
pub const ARENA_WIDTH: f32 = 1280.0;

/// Height of the arena (world units).  `y = 0` is the floor.
pub const ARENA_HEIGHT: f32 = 720.0;

/// Margin beyond the arena edges at which off-screen projectiles are removed.
///
/// Generous enough that wall sweeps and bouncers spawned just outside the
/// arena are not culled before they enter it.
pub const DESPAWN_MARGIN: f32 = 150.0;

/// Centre positions of the starting ledges: one high in the middle, one low
/// on each side.
pub const PLATFORM_POSITIONS: [(f32, f32); 3] =
    [(640.0, 330.0), (280.0, 210.0), (1000.0, 210.0)];

/// Ledge half-extents (half-width, half-thickness).
pub const PLATFORM_HALF_EXTENTS: (f32, f32) = (100.0, 5.0);

// ── Time ──────────────────────────────────────────────────────────────────────

/// Nominal simulation rate used to convert wall-clock seconds into ticks.
pub const TICKS_PER_SECOND: f32 = 60.0;

/// Upper bound on a single frame's tick delta.  A debugger pause or window
/// drag must not produce a multi-second physics step.
pub const MAX_TICK_DELTA: f32 = 3.0;

// ── Boss: Core ────────────────────────────────────────────────────────────────

/// Boss starting and maximum hit-points.
pub const BOSS_MAX_HP: f32 = 100.0;

/// HP at or below which phase 2 begins.
pub const PHASE_2_THRESHOLD: f32 = 70.0;

/// HP at or below which phase 3 begins.
pub const PHASE_3_THRESHOLD: f32 = 30.0;

/// Duration of the `Transitioning` state entered on each phase change (ticks).
/// No attacks are issued and the boss takes no actions while it runs.
pub const PHASE_TRANSITION_TICKS: f32 = 180.0;

/// Ticks between consecutive attacks in phases 1 and 2.
pub const ATTACK_INTERVAL_TICKS: f32 = 120.0;

/// Ticks between consecutive attacks in phase 3 — twice the pressure.
pub const ATTACK_INTERVAL_PHASE_3_TICKS: f32 = 60.0;

/// Stun duration (ticks) applied when an orbiter tip is parried.
/// The weak-point window stays open for the same duration.
pub const BOSS_STUN_TICKS: f32 = 120.0;

/// Damage multiplier while the boss's weak point is open.
pub const WEAK_POINT_MULTIPLIER: f32 = 2.0;

/// Weak-point multiplier in phase 3.  Risk scales with the bullet density.
pub const WEAK_POINT_MULTIPLIER_PHASE_3: f32 = 4.0;

/// Ticks the hit-flash visual timer runs after the boss takes damage.
pub const BOSS_FLASH_TICKS: f32 = 8.0;

/// Ticks between boss death (HP = 0) and the victory outcome firing.
/// Covers the slow-motion death feedback.
pub const BOSS_DEATH_TICKS: f32 = 120.0;

/// Half-extents of the boss body collision box.
pub const BOSS_HALF_EXTENTS: (f32, f32) = (60.0, 80.0);

/// Half-extents of the weak-point sub-rectangle while it is open.
pub const WEAK_POINT_HALF_EXTENTS: (f32, f32) = (25.0, 25.0);

// ── Boss: Movement ────────────────────────────────────────────────────────────

/// Anchor position the boss hovers around in phase 1.
pub const BOSS_ANCHOR: (f32, f32) = (980.0, 400.0);

/// Vertical drift amplitude (u) of the phase-2 float pattern.
pub const BOSS_DRIFT_AMPLITUDE: f32 = 80.0;

/// Angular frequency (rad/tick) of the phase-2 float pattern.
pub const BOSS_DRIFT_FREQUENCY: f32 = 0.02;

/// Positional jitter magnitude (u) in phase 3.
pub const BOSS_JITTER: f32 = 3.0;

/// Ticks between phase-3 teleports.
pub const BOSS_TELEPORT_INTERVAL_TICKS: f32 = 180.0;

/// Minimum distance (u) between a teleport destination and the player.
/// Re-rolled until satisfied (bounded attempts) so the boss never lands on top
/// of the player.
pub const BOSS_TELEPORT_MIN_DIST: f32 = 200.0;

// ── Boss: Reality Break ───────────────────────────────────────────────────────

/// Ticks the `Warning` telegraph runs before a reality-break effect lands.
/// Movement continues; no new attacks are issued.
pub const REALITY_WARNING_TICKS: f32 = 90.0;

/// Ticks a reality-break effect (control/gravity inversion, global slow-mo)
/// stays applied before auto-reverting.
pub const REALITY_EFFECT_TICKS: f32 = 300.0;

/// Global time-scale applied by the reality-break slow-mo variant.
pub const REALITY_SLOWMO_SCALE: f32 = 0.6;

// ── Projectiles: Boss ─────────────────────────────────────────────────────────

/// Speed (u/tick) of straight geometry-volley shots.
pub const VOLLEY_SPEED: f32 = 6.0;

/// Shots per geometry volley, fanned toward the player.
pub const VOLLEY_COUNT: u32 = 5;

/// Fan half-angle (radians) of the geometry volley.
pub const VOLLEY_SPREAD: f32 = 0.35;

/// Initial speed (u/tick) of a bouncing eraser.
pub const BOUNCER_SPEED: f32 = 5.0;

/// Multiplicative per-tick speed ramp applied to bouncing erasers.
/// Compounds: after its full 300-tick lifetime a bouncer is ≈35% faster.
pub const BOUNCER_SPEED_RAMP: f32 = 1.002;

/// Lifetime (ticks) of a bouncing eraser, independent of bounce count.
pub const BOUNCER_LIFETIME_TICKS: f32 = 300.0;

/// Fall speed (u/tick) of sinusoidal equation rain.
pub const RAIN_FALL_SPEED: f32 = 3.0;

/// Horizontal sway amplitude range (u) for equation rain, randomised per drop.
pub const RAIN_AMPLITUDE_MIN: f32 = 40.0;
pub const RAIN_AMPLITUDE_MAX: f32 = 60.0;

/// Sway angular frequency (rad/tick) for equation rain.
pub const RAIN_FREQUENCY: f32 = 0.05;

/// Drops per equation-rain attack (phase 1); phase 2 doubles this.
pub const RAIN_COUNT: u32 = 6;

/// Angular velocity (rad/tick) of the protractor orbiter.
pub const ORBITER_ANGULAR_VELOCITY: f32 = 0.05;

/// Orbit radius (u) of the protractor orbiter around the boss centre.
pub const ORBITER_RADIUS: f32 = 120.0;

/// Tip count on the protractor orbiter, spaced at equal angles.
pub const ORBITER_TIPS: u32 = 4;

/// Contact radius (u) of a single orbiter tip for parry checks.
pub const ORBITER_TIP_RADIUS: f32 = 14.0;

/// Lifetime (ticks) of the protractor orbiter if never parried.
pub const ORBITER_LIFETIME_TICKS: f32 = 480.0;

/// Speed (u/tick) of homing chalk.
pub const HOMING_SPEED: f32 = 4.5;

/// Per-tick blend factor steering a homing projectile toward its target.
/// 0.1 turns ≈90° in about 22 ticks; low enough to dodge by doubling back.
pub const HOMING_LERP: f32 = 0.1;

/// Timeout lifetime (ticks) after which homing chalk fizzles.
pub const HOMING_LIFETIME_TICKS: f32 = 360.0;

/// Ticks a beam spends in its `Charging` telegraph before it deals damage.
pub const BEAM_CHARGE_TICKS: f32 = 60.0;

/// Ticks a beam stays in `Firing`.
pub const BEAM_FIRE_TICKS: f32 = 90.0;

/// Sweep rate (rad/tick) of the phase-3 sweeping laser.  0 for static beams.
pub const BEAM_SWEEP_RATE: f32 = 0.008;

/// Beam half-width (u) for collision purposes.
pub const BEAM_HALF_WIDTH: f32 = 18.0;

/// Horizontal speed (u/tick) of the full-height wall sweep.
pub const WALL_SWEEP_SPEED: f32 = 4.0;

/// Wall-sweep bar half-width (u).
pub const WALL_SWEEP_HALF_WIDTH: f32 = 20.0;

/// Ticks the textbook slam hovers over its mark before dropping.
pub const SLAM_WARNING_TICKS: f32 = 90.0;

/// Fall speed (u/tick) of the dropping slam.
pub const SLAM_FALL_SPEED: f32 = 20.0;

/// Slam half-extents (u).
pub const SLAM_HALF_EXTENTS: (f32, f32) = (100.0, 50.0);

/// Radial waves per compass-hell attack.
pub const COMPASS_BURSTS: u32 = 3;

/// Shots per compass-hell wave, evenly spread around the circle.
pub const COMPASS_COUNT: u32 = 8;

/// Speed (u/tick) of the first compass wave; later waves add 1 per wave.
pub const COMPASS_BASE_SPEED: f32 = 4.0;

/// Angular offset (rad) between consecutive compass waves.
pub const COMPASS_WAVE_OFFSET: f32 = 0.261_8;

// ── Projectiles: Player ───────────────────────────────────────────────────────

/// Speed (u/tick) of the basic chalk shot.
pub const SHOT_SPEED: f32 = 12.0;

/// Basic shot damage before any multiplier.
pub const SHOT_DAMAGE: f32 = 1.0;

/// Minimum ticks between basic shots.
pub const SHOT_COOLDOWN_TICKS: f32 = 12.0;

/// Ticks the shoot input must be held for a release to become a charge shot.
pub const CHARGE_TICKS: f32 = 45.0;

/// Charge shot damage.
pub const CHARGE_DAMAGE: f32 = 3.0;

/// Distance (u) to the boss centre below which a basic shot earns bonus cards.
pub const CLOSE_RANGE_DIST: f32 = 100.0;

/// Cards earned per close-range basic shot.
pub const CLOSE_RANGE_CARD_BONUS: f32 = 0.05;

// ── Player: Movement ──────────────────────────────────────────────────────────

/// Horizontal acceleration (u/tick²) while a move input is held.
pub const RUN_ACCEL: f32 = 0.8;

/// Maximum horizontal run speed (u/tick) before momentum bonuses.
pub const RUN_MAX_SPEED: f32 = 6.0;

/// Multiplicative per-tick horizontal friction on the ground with no input.
pub const GROUND_FRICTION: f32 = 0.85;

/// Air control acceleration (u/tick²) — weaker than ground accel.
pub const AIR_ACCEL: f32 = 0.45;

/// Downward acceleration (u/tick²).
pub const GRAVITY: f32 = 0.8;

/// Terminal fall speed (u/tick).
pub const MAX_FALL_SPEED: f32 = 18.0;

/// Half-extents of the player collision box.
pub const PLAYER_HALF_EXTENTS: (f32, f32) = (14.0, 22.0);

/// Player spawn position at encounter start.
pub const PLAYER_SPAWN: (f32, f32) = (200.0, 22.0);

// ── Player: Jump ──────────────────────────────────────────────────────────────

/// Instantaneous upward impulse (u/tick) applied per jump.
pub const JUMP_IMPULSE: f32 = 14.0;

/// Jumps available after ground contact.
pub const MAX_JUMPS: u32 = 2;

/// Ticks after a jump impulse during which holding jump reduces gravity
/// (the variable-height "floaty" window).
pub const VARIABLE_JUMP_TICKS: f32 = 12.0;

/// Gravity multiplier while the variable-jump window is held.
pub const FLOAT_GRAVITY_SCALE: f32 = 0.45;

// ── Player: Wall Cling ────────────────────────────────────────────────────────

/// Fall-speed cap (u/tick) while clinging to a wall.
pub const CLING_SLIDE_SPEED: f32 = 2.0;

/// Ticks a cling lasts before forced release.
pub const CLING_BUDGET_TICKS: f32 = 90.0;

/// Horizontal kick-away speed (u/tick) of a wall jump.
pub const WALL_JUMP_KICK: f32 = 8.0;

/// Momentum bonus added per chained wall jump.  Multiplies run speed; resets
/// on taking damage.
pub const MOMENTUM_BOOST_STEP: f32 = 0.1;

/// Momentum bonus cap.
pub const MOMENTUM_BOOST_MAX: f32 = 2.0;

// ── Player: Dash ──────────────────────────────────────────────────────────────

/// Dash speed (u/tick), fixed for the whole burst.
pub const DASH_SPEED: f32 = 15.0;

/// Dash duration (ticks).  Invulnerability covers exactly this window.
pub const DASH_TICKS: f32 = 10.0;

/// Ticks between dashes.
pub const DASH_COOLDOWN_TICKS: f32 = 60.0;

/// Cards earned by dashing through a boss projectile (graze), once per
/// projectile.
pub const DASH_GRAZE_CARD_BONUS: f32 = 0.5;

// ── Player: Parry ─────────────────────────────────────────────────────────────

/// Ticks the parry window stays open after an airborne jump press.
pub const PARRY_WINDOW_TICKS: f32 = 15.0;

/// Leading portion of the parry window counted as a perfect parry.
pub const PERFECT_PARRY_TICKS: f32 = 6.0;

/// Cards earned by a normal parry.
pub const PARRY_CARD_REWARD: f32 = 1.0;

/// Cards earned by a perfect parry.
pub const PERFECT_PARRY_CARD_REWARD: f32 = 2.0;

/// Ticks the parry chain survives without another parry before resetting.
pub const PARRY_CHAIN_WINDOW_TICKS: f32 = 300.0;

/// Chain length that arms exam-ace mode.
pub const PARRY_CHAIN_TARGET: u32 = 3;

/// Duration (ticks) of exam-ace mode once armed.
pub const EXAM_ACE_TICKS: f32 = 600.0;

/// Basic-shot damage multiplier while exam-ace mode runs.
pub const EXAM_ACE_DAMAGE_MULTIPLIER: f32 = 2.0;

/// Slow-motion feedback on a perfect parry: duration (ticks) and scale.
pub const PERFECT_PARRY_SLOWMO_TICKS: f32 = 30.0;
pub const PERFECT_PARRY_SLOWMO_SCALE: f32 = 0.3;

/// Hit-freeze feedback on a perfect parry (ticks).
pub const PERFECT_PARRY_FREEZE_TICKS: f32 = 6.0;

// ── Player: Shield ────────────────────────────────────────────────────────────

/// Ticks between shield activations, counted from activation (not from the
/// blocked hit).
pub const SHIELD_COOLDOWN_TICKS: f32 = 240.0;

// ── Player: Health & Cards ────────────────────────────────────────────────────

/// Player hit-points.  Every hit costs exactly 1.
pub const PLAYER_MAX_HP: i32 = 5;

/// Invulnerability window (ticks) after taking a hit.
pub const PLAYER_IFRAME_TICKS: f32 = 60.0;

/// Card pool cap.  Fractional balances are allowed; the pool clamps here.
pub const MAX_CARDS: f32 = 5.0;

// ── Player: EX Attacks ────────────────────────────────────────────────────────

/// Card costs per EX selection.  An unaffordable attempt is a silent no-op.
pub const EX_HOMING_VOLLEY_COST: f32 = 1.0;
pub const EX_SPREAD_VOLLEY_COST: f32 = 1.5;
pub const EX_BOOMERANG_COST: f32 = 2.0;
pub const EX_BOMB_COST: f32 = 2.0;
pub const EX_ULTIMATE_COST: f32 = 5.0;

/// Shots per EX homing volley.
pub const EX_HOMING_COUNT: u32 = 3;

/// Damage per EX homing-volley shot.
pub const EX_HOMING_DAMAGE: f32 = 1.0;

/// Damage per EX spread-volley shot; wide coverage, thin per-shot hit.
pub const EX_SPREAD_DAMAGE: f32 = 0.5;

/// Boomerang damage, applied on each overlap pass.
pub const BOOMERANG_DAMAGE: f32 = 2.0;

/// Shots per EX spread volley and its fan half-angle (radians).
pub const EX_SPREAD_COUNT: u32 = 7;
pub const EX_SPREAD_ANGLE: f32 = 0.5;

/// Boomerang outbound speed (u/tick); it decelerates, reverses, and returns.
pub const BOOMERANG_SPEED: f32 = 10.0;

/// Per-tick deceleration (u/tick²) on the boomerang's outbound leg.
pub const BOOMERANG_DECEL: f32 = 0.3;

/// Card refund for catching a returning boomerang.
pub const BOOMERANG_CATCH_REFUND: f32 = 1.0;

/// Bomb fuse (ticks) and blast radius (u).
pub const BOMB_FUSE_TICKS: f32 = 30.0;
pub const BOMB_BLAST_RADIUS: f32 = 90.0;
pub const BOMB_DAMAGE: f32 = 4.0;

/// Ultimate beam: damage dealt per tick of overlap, and its duration.
pub const ULTIMATE_DAMAGE_PER_TICK: f32 = 0.25;
pub const ULTIMATE_TICKS: f32 = 120.0;

// ── Player: Focus ─────────────────────────────────────────────────────────────

/// Focus meter capacity.
pub const FOCUS_MAX: f32 = 100.0;

/// Meter drain per tick while focus is held, and regen per idle tick.
pub const FOCUS_DRAIN: f32 = 1.0;
pub const FOCUS_REGEN: f32 = 0.5;

/// Time-scale applied while focus is held and the meter is non-empty.
pub const FOCUS_SCALE: f32 = 0.5;

// ── Effects ───────────────────────────────────────────────────────────────────

/// Per-tick exponential smoothing factor easing zoom toward its target.
pub const ZOOM_SMOOTHING: f32 = 0.1;

/// Maximum live floating damage labels; over this, the lowest-priority,
/// nearest-to-expiry label is evicted.
pub const DAMAGE_LABEL_CAP: usize = 200;

/// Lifetime (ticks) of a floating damage label.
pub const DAMAGE_LABEL_TICKS: f32 = 45.0;

/// Upward drift speed (u/tick) of a damage label.
pub const DAMAGE_LABEL_DRIFT: f32 = 0.8;

/// Shake feedback on boss hit / phase transition: duration (ticks), magnitude (u).
pub const HIT_SHAKE_TICKS: f32 = 8.0;
pub const HIT_SHAKE_MAGNITUDE: f32 = 4.0;
pub const PHASE_SHAKE_TICKS: f32 = 45.0;
pub const PHASE_SHAKE_MAGNITUDE: f32 = 10.0;

/// Slow-motion + zoom feedback played once when the boss dies.
pub const DEATH_SLOWMO_TICKS: f32 = 90.0;
pub const DEATH_SLOWMO_SCALE: f32 = 0.25;
pub const DEATH_ZOOM_TARGET: f32 = 1.4;
pub const DEATH_ZOOM_TICKS: f32 = 90.0;

// ── RNG / Persistence ─────────────────────────────────────────────────────────

/// Default seed for the encounter RNG.  Overridable via `assets/tuning.toml`
/// so replays and tests stay reproducible.
pub const DEFAULT_RNG_SEED: u64 = 0x5EED_CAFE;

/// On-disk stats schema version.  Bump when `StatsSnapshot` changes shape.
pub const STATS_FILE_VERSION: u32 = 1;
