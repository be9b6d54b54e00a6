mod buffs;
mod controls;
mod spawn;

pub use buffs::{expire_buffs, tick_buff_durations};

use bevy::input::ButtonInput;
use bevy::prelude::*;
use crate::shared::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        // -- Local resources --
        app.init_resource::<ToolCooldown>();
        app.init_resource::<PlayerControl>();

        // -- Spawn player when we enter Playing --
        app.add_systems(OnEnter(GameState::Playing), spawn::spawn_player);

        // -- Buffs tick on the game clock --
        app.add_systems(
            Update,
            tick_buff_durations.run_if(in_state(GameState::Playing)),
        );

        // -- Keyboard driving; absent in headless apps --
        app.add_systems(
            Update,
            (
                controls::tool_cycle,
                controls::player_step,
                controls::tool_use.after(controls::player_step),
                controls::interact.after(controls::player_step),
                spawn::sync_player_sprite.after(controls::player_step),
            )
                .run_if(in_state(GameState::Playing))
                .run_if(resource_exists::<ButtonInput<KeyCode>>),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Local resources (player-domain only)
// ═══════════════════════════════════════════════════════════════════════════

/// Marker on the player's placeholder sprite.
#[derive(Component, Debug)]
pub struct PlayerMarker;

/// Cooldown timer to prevent tool spam.
#[derive(Resource)]
pub struct ToolCooldown {
    pub timer: Timer,
}

impl Default for ToolCooldown {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(0.3, TimerMode::Once),
        }
    }
}

/// What the keyboard is pointing at.
#[derive(Resource, Debug, Clone, Copy)]
pub struct PlayerControl {
    pub facing: Facing,
    pub tool: ToolKind,
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self {
            facing: Facing::Down,
            tool: ToolKind::Scythe,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Helpers shared across sub-modules
// ═══════════════════════════════════════════════════════════════════════════

/// The ordered list of tools for cycling with Q/E.
pub const TOOL_ORDER: [ToolKind; 7] = [
    ToolKind::Scythe,
    ToolKind::Sword,
    ToolKind::Axe,
    ToolKind::Hoe,
    ToolKind::Pickaxe,
    ToolKind::WateringCan,
    ToolKind::FishingRod,
];

/// Grid delta for a facing direction. Tile rows grow downward.
pub fn facing_offset(facing: Facing) -> IVec2 {
    match facing {
        Facing::Up => IVec2::NEG_Y,
        Facing::Down => IVec2::Y,
        Facing::Left => IVec2::NEG_X,
        Facing::Right => IVec2::X,
    }
}
