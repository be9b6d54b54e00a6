//! Named map areas and what sits on their tiles.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::{HashMap, HashSet};

use crate::bushes::CustomBush;
use crate::shared::*;

/// A small placed object (weeds, stones, forage) keyed by tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldObject {
    pub name: String,
}

impl WorldObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Objects named like "Weeds" are the anchors nettles sprout next to.
    pub fn is_weeds(&self) -> bool {
        self.name.eq_ignore_ascii_case("weeds")
    }

    pub fn is_nettle(&self) -> bool {
        self.name.to_lowercase().ends_with("nettles")
    }
}

/// An item lying on the ground, waiting to be picked up.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedItem {
    pub item_id: ItemId,
    pub quality: ItemQuality,
    pub tile: IVec2,
}

/// Tile a thrown item lands on: one step from where it was thrown.
pub fn landing_tile(origin_px: IVec2, direction: Facing) -> IVec2 {
    let step = match direction {
        Facing::Up => IVec2::NEG_Y,
        Facing::Down => IVec2::Y,
        Facing::Left => IVec2::NEG_X,
        Facing::Right => IVec2::X,
    };
    origin_px.div_euclid(IVec2::splat(TILE_PX)) + step
}

#[derive(Debug, Clone, Default)]
pub struct GameLocation {
    pub name: String,
    pub is_greenhouse: bool,
    /// Size in tiles.
    pub width: i32,
    pub height: i32,
    pub objects: HashMap<IVec2, WorldObject>,
    /// Impassable terrain: water, cliffs, buildings.
    pub blocked: HashSet<IVec2>,
    pub large_features: Vec<CustomBush>,
    pub debris: Vec<DroppedItem>,
}

impl GameLocation {
    pub fn new(name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            ..default()
        }
    }

    pub fn greenhouse(name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            is_greenhouse: true,
            ..Self::new(name, width, height)
        }
    }

    pub fn in_bounds(&self, tile: IVec2) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width && tile.y < self.height
    }

    pub fn feature_at(&self, tile: IVec2) -> Option<usize> {
        self.large_features.iter().position(|bush| bush.occupies(tile))
    }

    /// Walkable, empty, and not under any large feature.
    pub fn is_open(&self, tile: IVec2) -> bool {
        self.in_bounds(tile)
            && !self.blocked.contains(&tile)
            && !self.objects.contains_key(&tile)
            && self.feature_at(tile).is_none()
    }

    /// A random open tile among the four neighbours of `tile`, if any.
    pub fn random_adjacent_open_tile(&self, tile: IVec2, rng: &mut dyn RngCore) -> Option<IVec2> {
        let mut neighbours = [IVec2::NEG_Y, IVec2::X, IVec2::Y, IVec2::NEG_X].map(|d| tile + d);
        neighbours.shuffle(&mut *rng);
        neighbours.into_iter().find(|t| self.is_open(*t))
    }

    /// Weeds tiles in a stable order, so seeded runs are reproducible.
    pub fn weeds_tiles(&self) -> Vec<IVec2> {
        let mut tiles: Vec<IVec2> = self
            .objects
            .iter()
            .filter(|(_, object)| object.is_weeds())
            .map(|(tile, _)| *tile)
            .collect();
        tiles.sort_by_key(|t| (t.y, t.x));
        tiles
    }

    /// Nettle-named small objects. Nettle bushes are large features and do
    /// not count.
    pub fn nettle_count(&self) -> usize {
        self.objects.values().filter(|o| o.is_nettle()).count()
    }
}

/// Every loaded location, by name.
#[derive(Resource, Debug, Clone, Default)]
pub struct Locations {
    pub by_name: HashMap<String, GameLocation>,
}

impl Locations {
    pub fn insert(&mut self, location: GameLocation) {
        self.by_name.insert(location.name.clone(), location);
    }

    pub fn get(&self, name: &str) -> Option<&GameLocation> {
        self.by_name.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut GameLocation> {
        self.by_name.get_mut(name)
    }
}
