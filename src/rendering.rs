//! Presentation: flat-colour sprites, camera shake/zoom, damage labels, HUD.
//!
//! Gameplay entities spawn with no visuals; this module attaches a `Sprite`
//! the frame a `Boss`, `Player`, or `ProjectileKind` first appears, and keeps
//! the camera and HUD in sync with the simulation.  Nothing here is read back
//! by gameplay code.
//!
//! ## System Responsibilities
//!
//! | System                        | Schedule | Purpose                              |
//! |-------------------------------|----------|--------------------------------------|
//! | `attach_actor_sprites`        | Update   | Sprite for boss/player/platforms     |
//! | `attach_projectile_sprites`   | Update   | Sprite per projectile variant        |
//! | `boss_flash_system`           | Update   | White hit-flash tint                 |
//! | `camera_effect_system`        | Update   | Apply bus shake offset and zoom      |
//! | `damage_label_render_system`  | Update   | Mirror bus labels into `Text2d`      |
//! | `setup_hud` / `cleanup_hud`   | OnEnter/OnExit(Playing) | HUD lifecycle         |
//! | `hud_display_system`          | Update   | Refresh HP / cards / focus readouts  |
//! | `boss_hp_bar_system`          | Update   | Scale the boss HP bar                |
//! | `dialogue_display_system`     | Update   | Show the professor's current line    |

use crate::boss::{Boss, BossDialogue, BossState};
use crate::constants::*;
use crate::effects::{EffectBus, LabelKind};
use crate::encounter::Platform;
use crate::graphics::EncounterCamera;
use crate::menu::GameState;
use crate::player::{Player, PlayerCombat};
use crate::projectile::{Owner, Projectile, ProjectileKind};
use bevy::prelude::*;

// ── Colour helpers ────────────────────────────────────────────────────────────

fn chalk_white() -> Color {
    Color::srgb(0.93, 0.93, 0.88)
}
fn professor_purple() -> Color {
    Color::srgb(0.52, 0.30, 0.68)
}
fn hostile_red() -> Color {
    Color::srgb(0.90, 0.35, 0.30)
}
fn friendly_cyan() -> Color {
    Color::srgb(0.40, 0.85, 0.90)
}
fn weak_gold() -> Color {
    Color::srgb(0.95, 0.82, 0.35)
}
fn hud_dim() -> Color {
    Color::srgb(0.55, 0.60, 0.56)
}

// ── Component markers ─────────────────────────────────────────────────────────

/// One floating `Text2d` mirroring a bus damage label by list index.
#[derive(Component)]
pub struct DamageLabelText;

/// Root node of the in-game HUD.
#[derive(Component)]
pub struct HudRoot;

/// The player readout line (HP / cards / focus / buffs).
#[derive(Component)]
pub struct HudPlayerLine;

/// The shrinking inner fill of the boss HP bar.
#[derive(Component)]
pub struct BossHpFill;

/// The professor's dialogue line at the top of the screen.
#[derive(Component)]
pub struct DialogueLine;

// ── Sprite attachment ─────────────────────────────────────────────────────────

/// Gives newly spawned actors a flat-colour sprite sized to their collision
/// box.
pub fn attach_actor_sprites(
    mut commands: Commands,
    bosses: Query<Entity, Added<Boss>>,
    players: Query<Entity, Added<Player>>,
    platforms: Query<(Entity, &Platform), Added<Platform>>,
) {
    for entity in &bosses {
        commands.entity(entity).insert(Sprite::from_color(
            professor_purple(),
            Vec2::new(BOSS_HALF_EXTENTS.0 * 2.0, BOSS_HALF_EXTENTS.1 * 2.0),
        ));
    }
    for entity in &players {
        commands.entity(entity).insert(Sprite::from_color(
            chalk_white(),
            Vec2::new(PLAYER_HALF_EXTENTS.0 * 2.0, PLAYER_HALF_EXTENTS.1 * 2.0),
        ));
    }
    for (entity, platform) in &platforms {
        commands
            .entity(entity)
            .insert(Sprite::from_color(hud_dim(), platform.half * 2.0));
    }
}

/// Gives each new projectile a sprite: hostile shots read red, player shots
/// cyan, with the footprint of the variant.
pub fn attach_projectile_sprites(
    mut commands: Commands,
    projectiles: Query<(Entity, &Projectile, &ProjectileKind), Added<ProjectileKind>>,
) {
    for (entity, projectile, kind) in &projectiles {
        let color = match projectile.owner {
            Owner::Boss => hostile_red(),
            Owner::Player => friendly_cyan(),
        };
        let half = kind.half_extents();
        commands
            .entity(entity)
            .insert(Sprite::from_color(color, half * 2.0));
    }
}

/// White tint while the boss's hit flash is live; weak-point gold while the
/// window is open.
pub fn boss_flash_system(mut bosses: Query<(&Boss, &mut Sprite)>) {
    let Ok((boss, mut sprite)) = bosses.single_mut() else {
        return;
    };
    sprite.color = if boss.flash_timer > 0.0 {
        Color::WHITE
    } else if boss.weak_point_open() {
        weak_gold()
    } else if boss.state == BossState::Dead {
        hud_dim()
    } else {
        professor_purple()
    };
}

// ── Camera ────────────────────────────────────────────────────────────────────

/// Applies the effect bus's shake offset and eased zoom to the camera.
pub fn camera_effect_system(
    bus: Res<EffectBus>,
    mut cameras: Query<&mut Transform, With<EncounterCamera>>,
) {
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };
    let offset = bus.camera_offset();
    transform.translation.x = ARENA_WIDTH / 2.0 + offset.x;
    transform.translation.y = ARENA_HEIGHT / 2.0 + offset.y;
    // Zooming in means scaling the camera down.
    let scale = 1.0 / bus.zoom().max(0.1);
    transform.scale = Vec3::new(scale, scale, 1.0);
}

// ── Damage labels ─────────────────────────────────────────────────────────────

/// Mirrors the bus's label list into `Text2d` entities, spawning and
/// despawning to match its length each frame.  The list is capped, so this
/// stays bounded.
pub fn damage_label_render_system(
    mut commands: Commands,
    bus: Res<EffectBus>,
    mut existing: Query<
        (Entity, &mut Transform, &mut Text2d, &mut TextColor),
        With<DamageLabelText>,
    >,
) {
    let labels = bus.labels();
    let mut slots = existing.iter_mut();

    for label in labels {
        let color = match label.kind {
            LabelKind::Normal => chalk_white(),
            LabelKind::Weak => weak_gold(),
            LabelKind::Crit => friendly_cyan(),
        };
        if let Some((_, mut transform, mut text, mut text_color)) = slots.next() {
            transform.translation = label.pos.extend(5.0);
            if text.0 != label.text {
                text.0.clone_from(&label.text);
            }
            *text_color = TextColor(color);
        } else {
            commands.spawn((
                Text2d::new(label.text.clone()),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(color),
                Transform::from_translation(label.pos.extend(5.0)),
                DamageLabelText,
            ));
        }
    }

    for (entity, ..) in slots {
        commands.entity(entity).despawn();
    }
}

// ── HUD ───────────────────────────────────────────────────────────────────────

/// Spawn the in-game HUD: boss HP bar on top, player readout at the bottom,
/// dialogue line between them.
pub fn setup_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                align_items: AlignItems::Center,
                padding: UiRect::all(Val::Px(12.0)),
                ..default()
            },
            HudRoot,
        ))
        .with_children(|root| {
            // ── Boss HP bar ───────────────────────────────────────────────────
            root.spawn((
                Node {
                    width: Val::Percent(60.0),
                    height: Val::Px(14.0),
                    border: UiRect::all(Val::Px(1.0)),
                    ..default()
                },
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                BorderColor::all(hud_dim()),
            ))
            .with_children(|bar| {
                bar.spawn((
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                    BackgroundColor(professor_purple()),
                    BossHpFill,
                ));
            });

            // ── Dialogue ──────────────────────────────────────────────────────
            root.spawn((
                Text::new(""),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(chalk_white()),
                DialogueLine,
            ));

            // ── Player readout ────────────────────────────────────────────────
            root.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(chalk_white()),
                HudPlayerLine,
            ));
        });
}

/// Despawn the HUD tree and any leftover floating labels.
pub fn cleanup_hud(
    mut commands: Commands,
    roots: Query<Entity, With<HudRoot>>,
    labels: Query<Entity, With<DamageLabelText>>,
) {
    for entity in roots.iter().chain(labels.iter()) {
        commands.entity(entity).despawn();
    }
}

/// Refresh the bottom readout: hearts, cards, focus, and active buffs.
pub fn hud_display_system(
    players: Query<&PlayerCombat, With<Player>>,
    mut lines: Query<&mut Text, With<HudPlayerLine>>,
) {
    let Ok(combat) = players.single() else {
        return;
    };
    let Ok(mut text) = lines.single_mut() else {
        return;
    };
    let mut line = format!(
        "HP {}/{}   Cards {:.1}   Focus {:.0}",
        combat.hp, combat.max_hp, combat.cards, combat.focus
    );
    if combat.exam_ace_timer > 0.0 {
        line.push_str("   [EXAM ACE]");
    }
    if combat.shield_active {
        line.push_str("   [SHIELD]");
    }
    *text = Text::new(line);
}

/// Scale the boss HP fill to the current HP fraction.
pub fn boss_hp_bar_system(bosses: Query<&Boss>, mut fills: Query<&mut Node, With<BossHpFill>>) {
    let Ok(boss) = bosses.single() else {
        return;
    };
    let Ok(mut node) = fills.single_mut() else {
        return;
    };
    let fraction = (boss.hp / boss.max_hp).clamp(0.0, 1.0);
    node.width = Val::Percent(fraction * 100.0);
}

/// Show whatever the professor is currently saying, or nothing.
pub fn dialogue_display_system(
    dialogue: Res<BossDialogue>,
    mut lines: Query<&mut Text, With<DialogueLine>>,
) {
    if !dialogue.is_changed() {
        return;
    }
    let Ok(mut text) = lines.single_mut() else {
        return;
    };
    *text = Text::new(dialogue.line.unwrap_or(""));
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers every presentation system.  Added only by the binary; headless
/// tests run the simulation without it.
pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, crate::graphics::setup_camera)
            .add_systems(OnEnter(GameState::Playing), setup_hud)
            .add_systems(OnExit(GameState::Playing), cleanup_hud)
            .add_systems(
                Update,
                (
                    attach_actor_sprites,
                    attach_projectile_sprites,
                    boss_flash_system,
                    camera_effect_system,
                    damage_label_render_system,
                    hud_display_system,
                    boss_hp_bar_system,
                    dialogue_display_system,
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
