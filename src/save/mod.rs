use bevy::input::ButtonInput;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::bushes::{CustomBush, FeatureContext, TerrainFeature};
use crate::config::HedgerowConfig;
use crate::shared::*;
use crate::world::{GameLocation, Locations, WorldObject};

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SAVE_VERSION: u32 = 1;

/// Sent to write the world to a slot.
#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent {
    pub slot: u8,
}

/// Sent to replace the world with a slot's contents.
#[derive(Event, Debug, Clone)]
pub struct LoadRequestEvent {
    pub slot: u8,
}

/// One location as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedLocation {
    pub name: String,
    pub is_greenhouse: bool,
    pub width: i32,
    pub height: i32,
    pub objects: Vec<(IVec2, String)>,
    pub blocked: Vec<IVec2>,
    pub bushes: Vec<CustomBush>,
}

impl SavedLocation {
    fn capture(location: &GameLocation) -> Self {
        let mut objects: Vec<(IVec2, String)> = location
            .objects
            .iter()
            .map(|(tile, object)| (*tile, object.name.clone()))
            .collect();
        objects.sort_by_key(|(t, _)| (t.y, t.x));
        let mut blocked: Vec<IVec2> = location.blocked.iter().copied().collect();
        blocked.sort_by_key(|t| (t.y, t.x));
        Self {
            name: location.name.clone(),
            is_greenhouse: location.is_greenhouse,
            width: location.width,
            height: location.height,
            objects,
            blocked,
            bushes: location.large_features.clone(),
        }
    }

    fn into_location(self) -> GameLocation {
        GameLocation {
            name: self.name,
            is_greenhouse: self.is_greenhouse,
            width: self.width,
            height: self.height,
            objects: self
                .objects
                .into_iter()
                .map(|(tile, name)| (tile, WorldObject::new(name)))
                .collect(),
            blocked: self.blocked.into_iter().collect(),
            large_features: self.bushes,
            debris: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub world_seed: u64,
    pub calendar: Calendar,
    pub player_state: PlayerState,
    pub buffs: ActiveBuffs,
    pub locations: Vec<SavedLocation>,
}

impl SaveFile {
    pub fn capture(
        world_seed: u64,
        calendar: &Calendar,
        player_state: &PlayerState,
        buffs: &ActiveBuffs,
        locations: &Locations,
    ) -> Self {
        let mut saved: Vec<SavedLocation> =
            locations.by_name.values().map(SavedLocation::capture).collect();
        saved.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            version: SAVE_VERSION,
            world_seed,
            calendar: calendar.clone(),
            player_state: player_state.clone(),
            buffs: buffs.clone(),
            locations: saved,
        }
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Serialization failed: {}", e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: SaveFile =
            serde_json::from_str(json).map_err(|e| format!("Deserialization failed: {}", e))?;
        if file.version != SAVE_VERSION {
            warn!(
                "Save has version {} but current version is {}. Attempting to load anyway.",
                file.version, SAVE_VERSION
            );
        }
        Ok(file)
    }

    /// Rebuilds the location table. Bush sprites still need `reload_sprites`.
    pub fn take_locations(&mut self) -> Locations {
        let mut locations = Locations::default();
        for saved in self.locations.drain(..) {
            locations.insert(saved.into_location());
        }
        locations
    }
}

/// Re-derives every bush's sprite after a load; sway starts at rest.
pub fn reload_sprites(locations: &mut Locations, ctx: &mut FeatureContext<'_>) {
    for location in locations.by_name.values_mut() {
        for bush in location.large_features.iter_mut() {
            bush.load_sprite(ctx);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveRequestEvent>()
            .add_event::<LoadRequestEvent>()
            .add_systems(
                Update,
                (handle_save_request, handle_load_request)
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Paused))),
            )
            // Quick-save keybinds: F5 saves, F9 loads
            .add_systems(
                Update,
                quicksave_keybind
                    .run_if(in_state(GameState::Playing))
                    .run_if(resource_exists::<ButtonInput<KeyCode>>),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FILESYSTEM HELPERS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(not(target_arch = "wasm32"))]
fn saves_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    exe_dir.join("saves")
}

#[cfg(not(target_arch = "wasm32"))]
fn slot_path(slot: u8) -> PathBuf {
    saves_directory().join(format!("hedgerow_{}.json", slot))
}

#[cfg(not(target_arch = "wasm32"))]
fn write_save(slot: u8, file: &SaveFile) -> Result<(), String> {
    let dir = saves_directory();
    fs::create_dir_all(&dir).map_err(|e| format!("Could not create saves directory: {}", e))?;
    let json = file.to_json()?;
    let path = slot_path(slot);
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json)
        .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, &path).map_err(|e| format!("Rename failed: {}", e))?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn write_save(_slot: u8, _file: &SaveFile) -> Result<(), String> {
    Err("Saves not available in browser".to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn read_save(slot: u8) -> Result<SaveFile, String> {
    let path = slot_path(slot);
    if !path.exists() {
        return Err(format!("Save slot {} does not exist", slot));
    }
    let json = fs::read_to_string(&path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    SaveFile::from_json(&json)
}

#[cfg(target_arch = "wasm32")]
fn read_save(_slot: u8) -> Result<SaveFile, String> {
    Err("Saves not available in browser".to_string())
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    seed: Res<WorldSeed>,
    calendar: Res<Calendar>,
    player_state: Res<PlayerState>,
    buffs: Res<ActiveBuffs>,
    locations: Res<Locations>,
) {
    for ev in save_events.read() {
        let file = SaveFile::capture(seed.0, &calendar, &player_state, &buffs, &locations);
        match write_save(ev.slot, &file) {
            Ok(()) => info!("Save to slot {} succeeded.", ev.slot),
            Err(e) => error!("Save to slot {} failed: {}", ev.slot, e),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_load_request(
    mut load_events: EventReader<LoadRequestEvent>,
    mut seed: ResMut<WorldSeed>,
    mut calendar: ResMut<Calendar>,
    mut player_state: ResMut<PlayerState>,
    mut buffs: ResMut<ActiveBuffs>,
    mut locations: ResMut<Locations>,
    mut rng: ResMut<GameRng>,
    net: Res<NetRole>,
    config: Res<HedgerowConfig>,
) {
    for ev in load_events.read() {
        let mut file = match read_save(ev.slot) {
            Ok(file) => file,
            Err(e) => {
                error!("Load from slot {} failed: {}", ev.slot, e);
                continue;
            }
        };

        seed.0 = file.world_seed;
        *calendar = file.calendar.clone();
        *player_state = file.player_state.clone();
        *buffs = file.buffs.clone();
        *locations = file.take_locations();

        let mut effects = Vec::new();
        let mut ctx = FeatureContext {
            calendar: &calendar,
            rng: &mut rng.0,
            net: *net,
            world_seed: seed.0,
            player: &mut player_state,
            buffs: &mut buffs,
            config: &config,
            effects: &mut effects,
        };
        reload_sprites(&mut locations, &mut ctx);
        info!(
            "Loaded slot {}: Day {} {:?} Year {}",
            ev.slot, calendar.day, calendar.season, calendar.year
        );
    }
}

fn quicksave_keybind(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut save_events: EventWriter<SaveRequestEvent>,
    mut load_events: EventWriter<LoadRequestEvent>,
) {
    if keyboard.just_pressed(KeyCode::F5) {
        save_events.send(SaveRequestEvent { slot: 0 });
    }
    if keyboard.just_pressed(KeyCode::F9) {
        load_events.send(LoadRequestEvent { slot: 0 });
    }
}
