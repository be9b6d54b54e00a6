use std::path::Path;
use std::process;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use hedgerow::config::{load_config, CONFIG_PATH};
use hedgerow::shared::*;
use hedgerow::{audio, bushes, calendar, player, save, world};

fn main() {
    // The log subscriber only exists once the app is built, so config
    // problems go straight to stderr.
    let config = match load_config(Path::new(CONFIG_PATH)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("hedgerow: {}", e);
            process::exit(1);
        }
    };

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Hedgerow".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .insert_resource(config)
        .init_resource::<Calendar>()
        .init_resource::<PlayerState>()
        .init_resource::<ActiveBuffs>()
        .init_resource::<NetRole>()
        .init_resource::<GameRng>()
        .insert_resource(WorldSeed(rand::random()))
        // Events
        .add_event::<DayEndEvent>()
        .add_event::<SeasonChangeEvent>()
        .add_event::<ToolUseEvent>()
        .add_event::<InteractEvent>()
        .add_event::<PlaySfxEvent>()
        .add_event::<ItemDebrisEvent>()
        .add_event::<ClearNettlesEvent>()
        // Domain plugins
        .add_plugins(calendar::CalendarPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(bushes::BushPlugin)
        .add_plugins(audio::SfxPlugin)
        .add_plugins(save::SavePlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .add_systems(Update, follow_player.run_if(in_state(GameState::Playing)))
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Keeps the camera centred on the player's tile.
fn follow_player(
    player_state: Res<PlayerState>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
) {
    let centre = Vec2::new(
        (player_state.tile.x * TILE_PX + TILE_PX / 2) as f32,
        (player_state.tile.y * TILE_PX + TILE_PX / 2) as f32,
    );
    let target = world_px_to_translation(centre, 0.0);
    for mut transform in camera_query.iter_mut() {
        transform.translation.x = target.x;
        transform.translation.y = target.y;
    }
}
