//! Menu and end screens — `GameState` definition and `MenuPlugin`.
//!
//! ## States
//!
//! | State      | Description                                  |
//! |------------|----------------------------------------------|
//! | `MainMenu` | Initial state; splash screen shown           |
//! | `Playing`  | Encounter running; all gameplay systems active |
//! | `Victory`  | Boss defeated; clear screen with time        |
//! | `GameOver` | Player defeated; retry screen                |
//!
//! ## Systems (registered by `MenuPlugin`)
//!
//! | System                | Schedule                 | Purpose                  |
//! |-----------------------|--------------------------|--------------------------|
//! | `setup_main_menu`     | `OnEnter(MainMenu)`      | Spawn splash UI          |
//! | `setup_victory`       | `OnEnter(Victory)`       | Spawn clear screen       |
//! | `setup_game_over`     | `OnEnter(GameOver)`      | Spawn retry screen       |
//! | `cleanup_screen`      | `OnExit(each menu state)`| Despawn screen entities  |
//! | `menu_button_system`  | `Update / in MainMenu`   | Handle Start / Quit      |
//! | `end_screen_keys`     | `Update / in Victory, GameOver` | R retries, Esc to menu |

use crate::constants::TICKS_PER_SECOND;
use crate::encounter::EncounterElapsed;
use bevy::prelude::*;

// ── Game state ────────────────────────────────────────────────────────────────

/// Top-level application state machine.
///
/// Every system in [`crate::encounter::EncounterPlugin`] runs under
/// `.run_if(in_state(GameState::Playing))`, so the simulation is fully inert
/// on every other screen.  Re-entering `Playing` rebuilds the encounter from
/// scratch.
#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Splash screen; shown on startup.
    #[default]
    MainMenu,
    /// Active encounter.
    Playing,
    /// Boss defeated.
    Victory,
    /// Player defeated.
    GameOver,
}

// ── Component markers ─────────────────────────────────────────────────────────

/// Root node of whichever full-screen menu is up; despawned on state exit.
#[derive(Component)]
pub struct ScreenRoot;

/// Tags the "Begin the exam" button.
#[derive(Component)]
pub struct MenuStartButton;

/// Tags the "Quit" button.
#[derive(Component)]
pub struct MenuQuitButton;

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers `GameState`, the three menu screens, and their input handlers.
///
/// Must be added **before** any plugin that calls
/// `.run_if(in_state(GameState::Playing))`, so the state is always registered
/// first.
pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_systems(OnEnter(GameState::MainMenu), setup_main_menu)
            .add_systems(OnEnter(GameState::Victory), setup_victory)
            .add_systems(OnEnter(GameState::GameOver), setup_game_over)
            .add_systems(OnExit(GameState::MainMenu), cleanup_screen)
            .add_systems(OnExit(GameState::Victory), cleanup_screen)
            .add_systems(OnExit(GameState::GameOver), cleanup_screen)
            .add_systems(
                Update,
                menu_button_system.run_if(in_state(GameState::MainMenu)),
            )
            .add_systems(
                Update,
                end_screen_keys.run_if(
                    in_state(GameState::Victory).or(in_state(GameState::GameOver)),
                ),
            );
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn chalk() -> Color {
    Color::srgb(0.92, 0.92, 0.88)
}
fn board_green() -> Color {
    Color::srgb(0.07, 0.19, 0.13)
}
fn start_bg() -> Color {
    Color::srgb(0.10, 0.32, 0.20)
}
fn start_border() -> Color {
    Color::srgb(0.25, 0.68, 0.40)
}
fn quit_bg() -> Color {
    Color::srgb(0.28, 0.08, 0.08)
}
fn quit_border() -> Color {
    Color::srgb(0.60, 0.14, 0.14)
}
fn fail_red() -> Color {
    Color::srgb(0.85, 0.30, 0.25)
}
fn gold() -> Color {
    Color::srgb(0.95, 0.85, 0.40)
}
fn hint_color() -> Color {
    Color::srgb(0.45, 0.50, 0.46)
}

// ── OnEnter(MainMenu): splash ─────────────────────────────────────────────────

/// Spawn the full-screen splash.
///
/// Layout:
/// ```text
/// ┌─────────────────────────────────────────────┐
/// │              BLACKBOARD                     │
/// │     Final exam: Professor Axiom awaits      │
/// │                                             │
/// │          [ BEGIN THE EXAM ]                 │
/// │              [ QUIT ]                       │
/// │                                             │
/// │          v0.1.0  ·  Bevy 0.17               │
/// └─────────────────────────────────────────────┘
/// ```
pub fn setup_main_menu(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(board_green()),
            ScreenRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new("BLACKBOARD"),
                TextFont {
                    font_size: 56.0,
                    ..default()
                },
                TextColor(chalk()),
            ));

            spacer(root, 10.0);

            root.spawn((
                Text::new("Final exam: Professor Axiom awaits"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(hint_color()),
            ));

            spacer(root, 52.0);

            root.spawn((
                Button,
                Node {
                    width: Val::Px(240.0),
                    height: Val::Px(50.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(start_bg()),
                BorderColor::all(start_border()),
                MenuStartButton,
            ))
            .with_children(|btn| {
                btn.spawn((
                    Text::new("BEGIN THE EXAM"),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(chalk()),
                ));
            });

            spacer(root, 14.0);

            root.spawn((
                Button,
                Node {
                    width: Val::Px(240.0),
                    height: Val::Px(50.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(quit_bg()),
                BorderColor::all(quit_border()),
                MenuQuitButton,
            ))
            .with_children(|btn| {
                btn.spawn((
                    Text::new("QUIT"),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(fail_red()),
                ));
            });

            spacer(root, 52.0);

            root.spawn((
                Text::new("v0.1.0  ·  Bevy 0.17"),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(hint_color()),
            ));
        });
}

/// Spawn a fixed-height invisible spacer node.
fn spacer(parent: &mut ChildSpawnerCommands<'_>, px: f32) {
    parent.spawn(Node {
        height: Val::Px(px),
        ..default()
    });
}

// ── OnEnter(Victory / GameOver): end screens ──────────────────────────────────

/// Clear screen with the run time.
pub fn setup_victory(mut commands: Commands, elapsed: Res<EncounterElapsed>) {
    let secs = elapsed.0 / TICKS_PER_SECOND;
    end_screen(
        &mut commands,
        "EXAM PASSED",
        gold(),
        &format!("Cleared in {secs:.1}s"),
    );
}

/// Retry screen.
pub fn setup_game_over(mut commands: Commands) {
    end_screen(
        &mut commands,
        "EXAM FAILED",
        fail_red(),
        "The professor marks in red ink.",
    );
}

fn end_screen(commands: &mut Commands, title: &str, title_color: Color, subtitle: &str) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(board_green()),
            ScreenRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new(title),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(title_color),
            ));

            spacer(root, 12.0);

            root.spawn((
                Text::new(subtitle),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(chalk()),
            ));

            spacer(root, 40.0);

            root.spawn((
                Text::new("[R] Retake the exam    [Esc] Main menu"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(hint_color()),
            ));
        });
}

// ── OnExit: despawn the current screen ────────────────────────────────────────

/// Despawn every screen entity (children come down with the root).
pub fn cleanup_screen(mut commands: Commands, query: Query<Entity, With<ScreenRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

// ── Update: input handlers ────────────────────────────────────────────────────

/// Handle Begin / Quit button presses, plus Enter as a keyboard shortcut.
#[allow(clippy::type_complexity)]
pub fn menu_button_system(
    start_query: Query<(&Interaction, &Children), (Changed<Interaction>, With<MenuStartButton>)>,
    quit_query: Query<(&Interaction, &Children), (Changed<Interaction>, With<MenuQuitButton>)>,
    mut btn_text: Query<&mut TextColor>,
    keys: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: MessageWriter<bevy::app::AppExit>,
) {
    if keys.just_pressed(KeyCode::Enter) {
        next_state.set(GameState::Playing);
        return;
    }

    for (interaction, children) in start_query.iter() {
        match interaction {
            Interaction::Pressed => {
                next_state.set(GameState::Playing);
            }
            Interaction::Hovered => {
                for child in children.iter() {
                    if let Ok(mut color) = btn_text.get_mut(child) {
                        *color = TextColor(Color::WHITE);
                    }
                }
            }
            Interaction::None => {
                for child in children.iter() {
                    if let Ok(mut color) = btn_text.get_mut(child) {
                        *color = TextColor(chalk());
                    }
                }
            }
        }
    }

    for (interaction, children) in quit_query.iter() {
        match interaction {
            Interaction::Pressed => {
                exit.write(bevy::app::AppExit::Success);
            }
            Interaction::Hovered => {
                for child in children.iter() {
                    if let Ok(mut color) = btn_text.get_mut(child) {
                        *color = TextColor(Color::WHITE);
                    }
                }
            }
            Interaction::None => {
                for child in children.iter() {
                    if let Ok(mut color) = btn_text.get_mut(child) {
                        *color = TextColor(fail_red());
                    }
                }
            }
        }
    }
}

/// R retries (straight back into `Playing`, which resets the encounter);
/// Escape returns to the main menu.
pub fn end_screen_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::KeyR) {
        next_state.set(GameState::Playing);
    } else if keys.just_pressed(KeyCode::Escape) {
        next_state.set(GameState::MainMenu);
    }
}
