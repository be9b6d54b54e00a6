//! World domain plugin for Hedgerow.
//!
//! Responsible for:
//! - Holding every named location and its objects and large features
//! - Seeding the sandbox world while in the Loading state
//! - Moving the game into Playing once the world exists
//! - Landing thrown item debris on the ground

use bevy::prelude::*;
use rand::Rng;

use crate::bushes::{BushVariety, CustomBush};
use crate::shared::*;

pub mod location;

pub use location::{landing_tile, DroppedItem, GameLocation, Locations, WorldObject};

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Locations>()
            .add_systems(OnEnter(GameState::Loading), load_world)
            .add_systems(Update, land_item_debris);
    }
}

/// Size of every sandbox map, in tiles.
const SANDBOX_SIZE: IVec2 = IVec2::new(32, 24);
/// Weeds scattered on each wild map.
const SANDBOX_WEEDS: usize = 18;

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Builds the world if nothing loaded one, then starts play.
fn load_world(
    mut locations: ResMut<Locations>,
    calendar: Res<Calendar>,
    mut rng: ResMut<GameRng>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if locations.by_name.is_empty() {
        seed_sandbox(&mut locations, &calendar, &mut rng.0);
    }
    let features: usize = locations
        .by_name
        .values()
        .map(|l| l.large_features.len())
        .sum();
    info!(
        "[World] {} locations ready, {} large features",
        locations.by_name.len(),
        features
    );
    next_state.set(GameState::Playing);
}

/// Drops every thrown item onto the tile it lands on.
pub fn land_item_debris(
    mut events: EventReader<ItemDebrisEvent>,
    mut locations: ResMut<Locations>,
) {
    for event in events.read() {
        let Some(location) = locations.get_mut(&event.location) else {
            warn!("[World] Debris thrown into unknown location '{}'", event.location);
            continue;
        };
        let tile = landing_tile(event.origin, event.direction);
        debug!(
            "[World] {} ({:?}) landed at {} in {}",
            event.item_id, event.quality, tile, event.location
        );
        location.debris.push(DroppedItem {
            item_id: event.item_id.clone(),
            quality: event.quality,
            tile,
        });
    }
}

/// A farm, three wild maps for nettles to take over, and a greenhouse.
pub fn seed_sandbox(locations: &mut Locations, calendar: &Calendar, rng: &mut impl Rng) {
    let mut farm = GameLocation::new("Farm", SANDBOX_SIZE.x, SANDBOX_SIZE.y);
    for x in 0..SANDBOX_SIZE.x {
        farm.blocked.insert(IVec2::new(x, 0));
    }
    let redberry = CustomBush::new(
        IVec2::new(12, 6),
        &farm,
        BushVariety::Redberry,
        calendar,
        &mut *rng,
    );
    farm.large_features.push(redberry);
    locations.insert(farm);

    for name in ["Forest", "Mountain", "Woods"] {
        let mut wild = GameLocation::new(name, SANDBOX_SIZE.x, SANDBOX_SIZE.y);
        let mut placed = 0;
        while placed < SANDBOX_WEEDS {
            let tile = IVec2::new(
                rng.gen_range(1..SANDBOX_SIZE.x - 1),
                rng.gen_range(1..SANDBOX_SIZE.y - 1),
            );
            if wild.is_open(tile) {
                wild.objects.insert(tile, WorldObject::new("Weeds"));
                placed += 1;
            }
        }
        for _ in 0..4 {
            let tile = IVec2::new(
                rng.gen_range(0..SANDBOX_SIZE.x),
                rng.gen_range(0..SANDBOX_SIZE.y),
            );
            if wild.is_open(tile) {
                wild.objects.insert(tile, WorldObject::new("Stone"));
            }
        }
        locations.insert(wild);
    }

    let mut greenhouse = GameLocation::greenhouse("Greenhouse", 12, 10);
    let potted = CustomBush::new(
        IVec2::new(5, 4),
        &greenhouse,
        BushVariety::Redberry,
        calendar,
        &mut *rng,
    );
    greenhouse.large_features.push(potted);
    locations.insert(greenhouse);
}
