use bevy::prelude::*;
use bevy::window::WindowResolution;

use blackboard::config::{self, TuningConfig};
use blackboard::constants::{ARENA_HEIGHT, ARENA_WIDTH};
use blackboard::encounter::EncounterPlugin;
use blackboard::input::{clear_encounter_input, keyboard_to_encounter_input};
use blackboard::menu::{GameState, MenuPlugin};
use blackboard::rendering::RenderingPlugin;
use blackboard::stats::StatsPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Blackboard".into(),
                resolution: WindowResolution::new(ARENA_WIDTH as u32, ARENA_HEIGHT as u32),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.04, 0.10, 0.07)))
        // Compiled defaults first; load_tuning_config overwrites them from
        // assets/tuning.toml (if present) in the Startup schedule.
        .insert_resource(TuningConfig::default())
        .add_plugins(MenuPlugin)
        .add_plugins(EncounterPlugin)
        .add_plugins(StatsPlugin)
        .add_plugins(RenderingPlugin)
        .add_systems(Startup, config::load_tuning_config)
        // The keyboard snapshot must land before any gameplay system reads
        // it this frame.
        .add_systems(
            PreUpdate,
            (clear_encounter_input, keyboard_to_encounter_input)
                .chain()
                .run_if(in_state(GameState::Playing)),
        )
        .run();
}
