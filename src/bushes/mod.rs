//! Bushes domain: wild nettles and redberry shrubs.
//!
//! Responsible for:
//! - Routing tool hits and "use" presses to the bush under the target tile
//! - Removing bushes that report themselves destroyed
//! - The overnight pass: day update for every bush, then spawn or clear nettles
//! - Season updates, per-frame sway and fade
//! - Turning handler effects into sounds, debris events and particles

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::audio::DelayedSfx;
use crate::calendar;
use crate::config::HedgerowConfig;
use crate::shared::*;
use crate::world::Locations;

pub mod bush;
pub mod feature;
pub mod particles;
pub mod population;
pub mod render;
pub mod variety;

pub use bush::{CustomBush, NETTLES_DAMAGE, NETTLE_BUFF_SOURCE};
pub use feature::{FeatureContext, FeatureEffect, SheetId, SpriteDraw, Sway, TerrainFeature};
pub use particles::TemporarySprite;
pub use population::{clear_nettles, is_nettle_spawn_day, try_spawn_nettles};
pub use variety::BushVariety;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct BushPlugin;

impl Plugin for BushPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, render::load_bush_atlas)
            .add_systems(
                Update,
                (
                    handle_tool_use_on_bushes,
                    handle_bush_interaction,
                    tick_bush_sway,
                    particles::animate_temporary_sprites,
                    render::attach_temporary_sprite_visuals,
                    render::update_temporary_sprite_visuals,
                    render::sync_bush_sprites.after(handle_tool_use_on_bushes),
                )
                    .run_if(in_state(GameState::Playing)),
            )
            // The overnight pass must see the calendar already on the new day.
            .add_systems(
                Update,
                (
                    advance_bushes_on_day_end.after(calendar::process_day_end),
                    update_bushes_on_season_change.after(advance_bushes_on_day_end),
                    handle_clear_nettles,
                ),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEM PARAMS
// ═══════════════════════════════════════════════════════════════════════

/// Everything a bush handler may read or change besides the bush itself.
#[derive(SystemParam)]
pub struct FeatureEnv<'w> {
    pub calendar: Res<'w, Calendar>,
    pub rng: ResMut<'w, GameRng>,
    pub net: Res<'w, NetRole>,
    pub seed: Res<'w, WorldSeed>,
    pub player: ResMut<'w, PlayerState>,
    pub buffs: ResMut<'w, ActiveBuffs>,
    pub config: Res<'w, HedgerowConfig>,
}

impl FeatureEnv<'_> {
    pub fn context<'a>(&'a mut self, effects: &'a mut Vec<FeatureEffect>) -> FeatureContext<'a> {
        FeatureContext {
            calendar: &self.calendar,
            rng: &mut self.rng.0,
            net: *self.net,
            world_seed: self.seed.0,
            player: &mut self.player,
            buffs: &mut self.buffs,
            config: &self.config,
            effects,
        }
    }
}

/// Where handler effects end up.
#[derive(SystemParam)]
pub struct EffectSinks<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub sfx: EventWriter<'w, PlaySfxEvent>,
    pub debris: EventWriter<'w, ItemDebrisEvent>,
}

impl EffectSinks<'_, '_> {
    /// Sends the effects out. Particles only appear when someone is there
    /// to see them.
    pub fn apply(&mut self, location: &str, effects: Vec<FeatureEffect>, visible: bool) {
        for effect in effects {
            match effect {
                FeatureEffect::Sound { cue, tile } => {
                    self.sfx.send(PlaySfxEvent {
                        sfx_id: cue.to_string(),
                        tile,
                    });
                }
                FeatureEffect::DelayedSound { cue, delay_ms } => {
                    self.commands.spawn(DelayedSfx::new(cue, delay_ms));
                }
                FeatureEffect::Debris {
                    item_id,
                    quality,
                    origin,
                    direction,
                } => {
                    self.debris.send(ItemDebrisEvent {
                        location: location.to_string(),
                        item_id,
                        quality,
                        origin,
                        direction,
                    });
                }
                FeatureEffect::Sprite(particle) => {
                    if visible {
                        let translation =
                            world_px_to_translation(particle.position, particle.layer_depth);
                        self.commands.spawn((
                            Transform::from_translation(translation),
                            Visibility::Hidden,
                            particle,
                        ));
                    }
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Tool swings and explosions. A destroyed bush leaves its location here.
pub fn handle_tool_use_on_bushes(
    mut events: EventReader<ToolUseEvent>,
    mut locations: ResMut<Locations>,
    mut env: FeatureEnv,
    mut sinks: EffectSinks,
) {
    for event in events.read() {
        let name = event
            .location
            .clone()
            .unwrap_or_else(|| env.player.current_location.clone());
        let visible = name == env.player.current_location;
        let Some(location) = locations.get_mut(&name) else {
            warn!("[Bushes] Tool used in unknown location '{}'", name);
            continue;
        };
        let Some(index) = location.feature_at(event.tile) else {
            continue;
        };

        let mut effects = Vec::new();
        let bush = &mut location.large_features[index];
        let tile = bush.tile;
        let destroyed = bush.perform_tool_action(
            &mut env.context(&mut effects),
            event.tool,
            event.explosion,
            tile,
        );
        if destroyed {
            let removed = location.large_features.remove(index);
            info!(
                "[Bushes] {} at {} in {} cut down",
                removed.variety.name(),
                removed.tile,
                name
            );
        }
        sinks.apply(&name, effects, visible);
    }
}

/// "Use" presses on a bush.
pub fn handle_bush_interaction(
    mut events: EventReader<InteractEvent>,
    mut locations: ResMut<Locations>,
    mut env: FeatureEnv,
    mut sinks: EffectSinks,
) {
    for event in events.read() {
        let name = event
            .location
            .clone()
            .unwrap_or_else(|| env.player.current_location.clone());
        let visible = name == env.player.current_location;
        let Some(location) = locations.get_mut(&name) else {
            warn!("[Bushes] Interaction in unknown location '{}'", name);
            continue;
        };
        let Some(index) = location.feature_at(event.tile) else {
            continue;
        };
        let bush = &mut location.large_features[index];
        if !bush.is_actionable() {
            continue;
        }

        let mut effects = Vec::new();
        let tile = bush.tile;
        bush.perform_use_action(&mut env.context(&mut effects), tile);
        sinks.apply(&name, effects, visible);
    }
}

/// Overnight: every bush ages a day, then nettles spread or are swept away.
/// Runs once per new day even if the day-end request arrives twice.
pub fn advance_bushes_on_day_end(
    mut events: EventReader<DayEndEvent>,
    mut locations: ResMut<Locations>,
    mut env: FeatureEnv,
    mut sinks: EffectSinks,
    mut last_day: Local<u32>,
) {
    let mut new_day = false;
    for _ in events.read() {
        new_day = true;
    }
    if !new_day || env.calendar.days_played <= *last_day {
        return;
    }
    *last_day = env.calendar.days_played;

    let mut names: Vec<String> = locations.by_name.keys().cloned().collect();
    names.sort();
    for name in &names {
        let Some(location) = locations.get_mut(name) else {
            continue;
        };
        let mut effects = Vec::new();
        for bush in location.large_features.iter_mut() {
            bush.day_update(&mut env.context(&mut effects));
        }
        sinks.apply(name, effects, false);
    }

    if env.config.nettles_enabled {
        let added = try_spawn_nettles(
            &mut locations,
            &env.config,
            *env.net,
            &env.calendar,
            &mut env.rng.0,
        );
        debug!("[Bushes] Overnight spawn placed {} nettles", added);
    } else {
        clear_nettles(&mut locations, &env.config);
    }
}

/// First morning of a season: let every bush pick its new look.
pub fn update_bushes_on_season_change(
    mut events: EventReader<SeasonChangeEvent>,
    mut locations: ResMut<Locations>,
    mut env: FeatureEnv,
) {
    for event in events.read() {
        info!("[Bushes] Season update for {:?}", event.new_season);
        let mut names: Vec<String> = locations.by_name.keys().cloned().collect();
        names.sort();
        for name in &names {
            let Some(location) = locations.get_mut(name) else {
                continue;
            };
            let mut effects = Vec::new();
            for bush in location.large_features.iter_mut() {
                bush.season_update(&mut env.context(&mut effects), false);
            }
        }
    }
}

/// Explicit request to strip nettles, independent of the overnight pass.
pub fn handle_clear_nettles(
    mut events: EventReader<ClearNettlesEvent>,
    mut locations: ResMut<Locations>,
    config: Res<HedgerowConfig>,
) {
    for _ in events.read() {
        let removed = clear_nettles(&mut locations, &config);
        info!("[Bushes] Cleared {} nettles on request", removed);
    }
}

/// Per-frame sway and fade for bushes in the player's location.
pub fn tick_bush_sway(
    time: Res<Time>,
    player_state: Res<PlayerState>,
    mut locations: ResMut<Locations>,
    mut accumulator: Local<f32>,
) {
    *accumulator += time.delta_secs();
    let mut frames = 0;
    while *accumulator >= FRAME_SECS {
        *accumulator -= FRAME_SECS;
        frames += 1;
    }
    let Some(location) = locations.get_mut(&player_state.current_location) else {
        return;
    };
    for _ in 0..frames {
        for bush in location.large_features.iter_mut() {
            bush.tick_update(player_state.tile);
        }
    }
}
