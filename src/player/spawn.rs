use bevy::prelude::*;
use crate::shared::*;
use super::PlayerMarker;

/// Spawn the player's placeholder sprite.
/// Runs once on `OnEnter(GameState::Playing)`.
pub fn spawn_player(mut commands: Commands, existing: Query<Entity, With<PlayerMarker>>) {
    // Guard: don't double-spawn if returning to Playing state.
    if !existing.is_empty() {
        return;
    }

    commands.spawn((
        PlayerMarker,
        // Placeholder: a blue square
        Sprite {
            color: Color::srgb(0.2, 0.5, 0.8),
            custom_size: Some(Vec2::new(TILE_PX as f32 * 0.75, TILE_PX as f32)),
            anchor: bevy::sprite::Anchor::BottomCenter,
            ..default()
        },
        Transform::default(),
        Visibility::default(),
    ));
}

/// Keeps the placeholder on the player's tile, depth-sorted with the bushes.
pub fn sync_player_sprite(
    player_state: Res<PlayerState>,
    mut query: Query<&mut Transform, With<PlayerMarker>>,
) {
    let feet = Vec2::new(
        (player_state.tile.x * TILE_PX + TILE_PX / 2) as f32,
        ((player_state.tile.y + 1) * TILE_PX) as f32,
    );
    let layer_depth = feet.y / 10_000.0;
    for mut transform in query.iter_mut() {
        transform.translation = world_px_to_translation(feet, layer_depth);
    }
}
