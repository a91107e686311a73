//! Whole-encounter integration tests.
//!
//! These run the complete gameplay pipeline headlessly with
//! [`MinimalPlugins`] — no window, no rendering — in the exact system order
//! the encounter plugin uses, but with a fixed one-tick clock in place of the
//! wall-clock driver so every run is reproducible.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use blackboard::boss::{
    boss_behavior_system, boss_phase_system, boss_timers_system, Boss, BossDialogue, BossState,
    RealityState,
};
use blackboard::config::TuningConfig;
use blackboard::constants::*;
use blackboard::effects::{EffectBus, EncounterTime};
use blackboard::encounter::{
    boss_hits_player_system, encounter_outcome_system, player_hits_boss_system,
    projectile_advance_system, reset_encounter, BlastQueue, BossDefeatedEvent, BossHitEvent,
    DashEvent, EncounterElapsed, EncounterOutcome, ParryEvent, PhaseTransitionEvent, Platform,
    PlatformRemovedEvent, PlayerDefeatedEvent, PlayerHitEvent,
};
use blackboard::input::EncounterInput;
use blackboard::menu::GameState;
use blackboard::player::{
    player_control_system, player_ex_system, player_focus_system, player_shoot_system,
    player_timers_system, Player, PlayerCombat, PlayerMotion,
};
use blackboard::projectile::{spawn_projectile, Owner, Projectile, ProjectileKind, ProjectileSeq};
use blackboard::rng::EncounterRng;

/// Running count of phase-transition messages, so "fires exactly once" can
/// be asserted across hundreds of frames.
#[derive(Resource, Default)]
struct TransitionTally(u32);

fn collect_transitions(
    mut reader: MessageReader<PhaseTransitionEvent>,
    mut tally: ResMut<TransitionTally>,
) {
    tally.0 += reader.read().count() as u32;
}

/// One fixed simulation tick per `app.update()`: advances the effect bus by
/// exactly one tick and publishes the scaled delta, standing in for the
/// wall-clock driver.
fn fixed_tick_clock(
    mut clock: ResMut<EncounterTime>,
    mut bus: ResMut<EffectBus>,
    mut rng: ResMut<EncounterRng>,
) {
    bus.tick(1.0, &mut rng);
    clock.real_dt = 1.0;
    clock.dt = bus.time_scale();
}

/// Full pipeline in plugin order, minus rendering and the wall clock.
fn build_encounter_app(seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.init_state::<GameState>();
    app.insert_resource(TuningConfig {
        rng_seed: seed,
        ..Default::default()
    });
    app.init_resource::<EncounterInput>();
    app.init_resource::<EncounterTime>();
    app.init_resource::<EffectBus>();
    app.insert_resource(EncounterRng::from_seed(seed));
    app.init_resource::<ProjectileSeq>();
    app.init_resource::<EncounterOutcome>();
    app.init_resource::<EncounterElapsed>();
    app.init_resource::<BlastQueue>();
    app.init_resource::<RealityState>();
    app.init_resource::<BossDialogue>();
    app.init_resource::<TransitionTally>();
    app.add_message::<BossHitEvent>();
    app.add_message::<PlayerHitEvent>();
    app.add_message::<ParryEvent>();
    app.add_message::<PhaseTransitionEvent>();
    app.add_message::<BossDefeatedEvent>();
    app.add_message::<PlayerDefeatedEvent>();
    app.add_message::<DashEvent>();
    app.add_message::<PlatformRemovedEvent>();
    app.add_systems(OnEnter(GameState::Playing), reset_encounter);
    app.add_systems(
        Update,
        (
            fixed_tick_clock,
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
            collect_transitions,
        )
            .chain()
            .run_if(in_state(GameState::Playing)),
    );
    app
}

fn enter_playing(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update();
}

fn boss_entity(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<Boss>>()
        .single(app.world())
        .unwrap()
}

fn player_entity(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<Player>>()
        .single(app.world())
        .unwrap()
}

fn projectile_count(app: &mut App) -> usize {
    app.world_mut()
        .query::<&Projectile>()
        .iter(app.world())
        .count()
}

fn spawn_shot(
    app: &mut App,
    owner: Owner,
    damage: f32,
    parryable: bool,
    pos: Vec2,
    kind: ProjectileKind,
) {
    let world = app.world_mut();
    world.resource_scope(|world, mut seq: Mut<ProjectileSeq>| {
        let mut commands = world.commands();
        spawn_projectile(&mut commands, &mut seq, owner, damage, parryable, pos, kind);
    });
    app.world_mut().flush();
}

#[test]
fn entering_playing_builds_the_encounter() {
    let mut app = build_encounter_app(1);
    enter_playing(&mut app);
    let boss = boss_entity(&mut app);
    let player = player_entity(&mut app);
    assert_eq!(app.world().get::<Boss>(boss).unwrap().hp, BOSS_MAX_HP);
    assert_eq!(
        app.world().get::<PlayerCombat>(player).unwrap().hp,
        PLAYER_MAX_HP
    );
    assert_eq!(
        *app.world().resource::<EncounterOutcome>(),
        EncounterOutcome::Ongoing
    );
}

#[test]
fn phase_transition_fires_once_and_suppresses_attacks() {
    let mut app = build_encounter_app(2);
    enter_playing(&mut app);
    let boss = boss_entity(&mut app);

    // Drop straight to the phase-2 threshold before the first attack lands.
    app.world_mut().get_mut::<Boss>(boss).unwrap().hp = PHASE_2_THRESHOLD;
    app.update();
    {
        let b = app.world().get::<Boss>(boss).unwrap();
        assert_eq!(b.phase, 2);
        assert_eq!(b.state, BossState::Transitioning);
    }
    assert_eq!(app.world().resource::<TransitionTally>().0, 1);

    // No attacks while the ceremony runs, and no duplicate message.
    for _ in 0..PHASE_TRANSITION_TICKS as usize {
        app.update();
        assert_eq!(projectile_count(&mut app), 0);
    }
    assert_eq!(app.world().resource::<TransitionTally>().0, 1);
    assert_eq!(
        app.world().get::<Boss>(boss).unwrap().state,
        BossState::Idle
    );

    // Attacks resume on the phase-2 cadence after the ceremony.
    for _ in 0..=ATTACK_INTERVAL_TICKS as usize {
        app.update();
    }
    assert!(projectile_count(&mut app) > 0);
}

#[test]
fn phase_transitions_tear_out_the_ledges() {
    let mut app = build_encounter_app(9);
    enter_playing(&mut app);
    let boss = boss_entity(&mut app);

    fn ledge_count(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<Entity, With<Platform>>()
            .iter(app.world())
            .count()
    }
    assert_eq!(ledge_count(&mut app), PLATFORM_POSITIONS.len());

    // Phase 2 takes one ledge.
    app.world_mut().get_mut::<Boss>(boss).unwrap().hp = PHASE_2_THRESHOLD;
    app.update();
    assert_eq!(ledge_count(&mut app), PLATFORM_POSITIONS.len() - 1);

    // Skip the ceremony, then drop to the phase-3 threshold: the rest go.
    {
        let mut b = app.world_mut().get_mut::<Boss>(boss).unwrap();
        b.state = BossState::Idle;
        b.hp = PHASE_3_THRESHOLD;
    }
    app.update();
    assert_eq!(app.world().get::<Boss>(boss).unwrap().phase, 3);
    assert_eq!(ledge_count(&mut app), 0);
}

/// Moves the lone hazard onto the player so the overlap never lapses.
fn track_player(app: &mut App) {
    let player = player_entity(app);
    let pos = app.world().get::<Transform>(player).unwrap().translation;
    let hazard = app
        .world_mut()
        .query_filtered::<Entity, With<Projectile>>()
        .single(app.world())
        .unwrap();
    app.world_mut().get_mut::<Transform>(hazard).unwrap().translation = pos;
}

#[test]
fn dash_iframes_last_exactly_the_dash_duration() {
    let mut app = build_encounter_app(3);
    enter_playing(&mut app);
    let player = player_entity(&mut app);
    let player_pos = app
        .world()
        .get::<Transform>(player)
        .unwrap()
        .translation
        .truncate();

    // A non-parryable hazard sitting on the player; re-centred every tick so
    // the dash cannot simply outrun it.
    spawn_shot(
        &mut app,
        Owner::Boss,
        1.0,
        false,
        player_pos,
        ProjectileKind::WallSweep { vel: Vec2::ZERO },
    );

    // Dash on the first tick; the hazard overlaps the whole time.
    *app.world_mut().resource_mut::<EncounterInput>() = EncounterInput {
        dash_pressed: true,
        ..Default::default()
    };
    app.update();
    *app.world_mut().resource_mut::<EncounterInput>() = EncounterInput::default();

    // Ticks 2..=10 are still inside the dash: untouched, plus one graze.
    for _ in 0..DASH_TICKS as usize - 1 {
        track_player(&mut app);
        app.update();
        let combat = app.world().get::<PlayerCombat>(player).unwrap();
        assert_eq!(combat.hp, PLAYER_MAX_HP);
    }
    assert_eq!(
        app.world().get::<PlayerCombat>(player).unwrap().cards,
        DASH_GRAZE_CARD_BONUS
    );

    // The first tick after the dash ends connects.
    track_player(&mut app);
    app.update();
    assert_eq!(
        app.world().get::<PlayerCombat>(player).unwrap().hp,
        PLAYER_MAX_HP - 1
    );

    // Post-hit i-frames then cover the sustained overlap.
    for _ in 0..PLAYER_IFRAME_TICKS as usize - 1 {
        track_player(&mut app);
        app.update();
        assert_eq!(
            app.world().get::<PlayerCombat>(player).unwrap().hp,
            PLAYER_MAX_HP - 1
        );
    }
    track_player(&mut app);
    app.update();
    assert_eq!(
        app.world().get::<PlayerCombat>(player).unwrap().hp,
        PLAYER_MAX_HP - 2
    );
}

#[test]
fn boss_defeat_runs_the_ceremony_then_declares_victory() {
    let mut app = build_encounter_app(4);
    enter_playing(&mut app);
    let boss = boss_entity(&mut app);

    app.world_mut().get_mut::<Boss>(boss).unwrap().hp = 0.0;
    app.update();
    assert_eq!(
        app.world().get::<Boss>(boss).unwrap().state,
        BossState::Dead
    );
    // Defeat slow-motion kicked in, but the outcome waits for the ceremony.
    assert!(app.world().resource::<EffectBus>().time_scale() < 1.0);
    assert_eq!(
        *app.world().resource::<EncounterOutcome>(),
        EncounterOutcome::Ongoing
    );

    let before = projectile_count(&mut app);
    for _ in 0..BOSS_DEATH_TICKS as usize + 1 {
        app.update();
    }
    assert_eq!(
        *app.world().resource::<EncounterOutcome>(),
        EncounterOutcome::BossDefeated
    );
    // A dead boss issues nothing new.
    assert_eq!(projectile_count(&mut app), before);

    // The state machine followed one frame later.
    app.update();
    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::Victory
    );
}

#[test]
fn player_defeat_ends_the_encounter() {
    let mut app = build_encounter_app(5);
    enter_playing(&mut app);
    let player = player_entity(&mut app);
    app.world_mut()
        .get_mut::<PlayerCombat>(player)
        .unwrap()
        .hp = 0;
    app.update();
    assert_eq!(
        *app.world().resource::<EncounterOutcome>(),
        EncounterOutcome::PlayerDefeated
    );
    app.update();
    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::GameOver
    );
}

#[test]
fn hit_freeze_halts_the_whole_simulation() {
    let mut app = build_encounter_app(6);
    enter_playing(&mut app);
    let boss = boss_entity(&mut app);

    spawn_shot(
        &mut app,
        Owner::Boss,
        1.0,
        true,
        Vec2::new(640.0, 300.0),
        ProjectileKind::Straight {
            vel: Vec2::new(-4.0, 0.0),
        },
    );
    // The freeze timer burns one tick before the scale is sampled, so six
    // requested ticks freeze the five updates we inspect.
    app.world_mut()
        .resource_mut::<EffectBus>()
        .request_freeze(6.0);

    let attack_timer_before = app.world().get::<Boss>(boss).unwrap().attack_timer;
    for _ in 0..5 {
        app.update();
        let mut shots = app.world_mut().query::<(&Projectile, &Transform)>();
        let (_, transform) = shots.iter(app.world()).next().unwrap();
        assert_eq!(transform.translation.x, 640.0);
    }
    assert_eq!(
        app.world().get::<Boss>(boss).unwrap().attack_timer,
        attack_timer_before
    );

    // Thawed: motion resumes.
    app.update();
    let mut shots = app.world_mut().query::<(&Projectile, &Transform)>();
    let (_, transform) = shots.iter(app.world()).next().unwrap();
    assert_eq!(transform.translation.x, 636.0);
}

#[test]
fn reentering_play_resets_the_encounter_atomically() {
    let mut app = build_encounter_app(7);
    enter_playing(&mut app);
    let boss = boss_entity(&mut app);

    app.world_mut().get_mut::<Boss>(boss).unwrap().hp = 5.0;
    spawn_shot(
        &mut app,
        Owner::Boss,
        1.0,
        true,
        Vec2::new(400.0, 300.0),
        ProjectileKind::Straight { vel: Vec2::ZERO },
    );
    app.world_mut().resource_mut::<EncounterElapsed>().0 = 4321.0;

    // Out to the menu and straight back in.
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::MainMenu);
    app.update();
    enter_playing(&mut app);

    let fresh = boss_entity(&mut app);
    assert_eq!(app.world().get::<Boss>(fresh).unwrap().hp, BOSS_MAX_HP);
    assert_eq!(app.world().get::<Boss>(fresh).unwrap().phase, 1);
    assert_eq!(projectile_count(&mut app), 0);
    // One fixed tick has elapsed since the rebuilt encounter started.
    assert_eq!(app.world().resource::<EncounterElapsed>().0, 1.0);
    let player = player_entity(&mut app);
    assert_eq!(
        app.world().get::<PlayerCombat>(player).unwrap().hp,
        PLAYER_MAX_HP
    );
}

/// Two encounters with the same seed and the same (empty) input script stay
/// bit-identical, attack randomness included.
#[test]
fn same_seed_runs_are_identical() {
    fn run(seed: u64, ticks: usize) -> (Vec<(u64, f32, f32)>, f32, Vec2) {
        let mut app = build_encounter_app(seed);
        enter_playing(&mut app);
        for _ in 0..ticks {
            app.update();
        }
        let mut shots: Vec<(u64, f32, f32)> = app
            .world_mut()
            .query::<(&Projectile, &Transform)>()
            .iter(app.world())
            .map(|(p, t)| (p.seq, t.translation.x, t.translation.y))
            .collect();
        shots.sort_by_key(|(seq, ..)| *seq);
        let boss = boss_entity(&mut app);
        let b = app.world().get::<Boss>(boss).unwrap();
        let boss_pos = app
            .world()
            .get::<Transform>(boss)
            .unwrap()
            .translation
            .truncate();
        (shots, b.attack_timer, boss_pos)
    }

    // Long enough to cover several attacks, including the RNG-driven ones.
    let a = run(0xBADC0FFE, 400);
    let b = run(0xBADC0FFE, 400);
    assert_eq!(a, b);
}
