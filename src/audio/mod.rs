//! Sound cues: one-shot effects, distance falloff, and cues scheduled to
//! fire a little later.

use bevy::audio::Volume;
use bevy::prelude::*;
use crate::shared::*;

pub struct SfxPlugin;

impl Plugin for SfxPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (tick_delayed_sfx, handle_play_sfx.after(tick_delayed_sfx)),
        );
    }
}

/// Cues further than this many tiles from the player are not played.
pub const HEARING_RANGE_TILES: f32 = 20.0;

// ═══════════════════════════════════════════════════════════════════════
// SFX PATH MAPPING
// ═══════════════════════════════════════════════════════════════════════

/// Maps cue ids (sent by other domains) to actual audio file paths.
pub fn sfx_path(sfx_id: &str) -> Option<&'static str> {
    match sfx_id {
        "leafrustle" => Some("audio/sfx/leafrustle.ogg"),
        "treethud" => Some("audio/sfx/treethud.ogg"),
        "axchop" => Some("audio/sfx/axchop.ogg"),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DELAYED CUES
// ═══════════════════════════════════════════════════════════════════════

/// A cue waiting to play. Despawns itself once sent.
#[derive(Component, Debug)]
pub struct DelayedSfx {
    pub sfx_id: String,
    pub timer: Timer,
}

impl DelayedSfx {
    pub fn new(sfx_id: impl Into<String>, delay_ms: u32) -> Self {
        Self {
            sfx_id: sfx_id.into(),
            timer: Timer::from_seconds(delay_ms as f32 / 1000.0, TimerMode::Once),
        }
    }
}

pub fn tick_delayed_sfx(
    mut commands: Commands,
    time: Res<Time>,
    mut pending: Query<(Entity, &mut DelayedSfx)>,
    mut sfx_events: EventWriter<PlaySfxEvent>,
) {
    for (entity, mut delayed) in pending.iter_mut() {
        delayed.timer.tick(time.delta());
        if delayed.timer.finished() {
            sfx_events.send(PlaySfxEvent {
                sfx_id: delayed.sfx_id.clone(),
                tile: None,
            });
            commands.entity(entity).despawn();
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYBACK
// ═══════════════════════════════════════════════════════════════════════

/// Linear falloff with distance from the listener; `None` is out of range.
pub fn cue_volume(listener: IVec2, source: Option<IVec2>) -> Option<f32> {
    let Some(source) = source else {
        return Some(1.0);
    };
    let distance = (source - listener).as_vec2().length();
    if distance >= HEARING_RANGE_TILES {
        return None;
    }
    Some(1.0 - distance / HEARING_RANGE_TILES)
}

/// Listen for PlaySfxEvent and spawn one-shot audio sources that auto-despawn.
/// Without an asset server (headless runs) the events are only drained.
pub fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    asset_server: Option<Res<AssetServer>>,
    player_state: Res<PlayerState>,
) {
    for event in events.read() {
        let Some(server) = asset_server.as_ref() else {
            continue;
        };
        let Some(path) = sfx_path(&event.sfx_id) else {
            debug!("[Audio] No sound for cue '{}'", event.sfx_id);
            continue;
        };
        let Some(volume) = cue_volume(player_state.tile, event.tile) else {
            continue;
        };
        commands.spawn((
            AudioPlayer::new(server.load(path)),
            PlaybackSettings::DESPAWN.with_volume(Volume::new(volume)),
        ));
    }
}
