//! The two wild bush varieties and the constants each one fixes.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BushVariety {
    /// Stinging weed. Hurts on touch, one cut clears it.
    Nettle,
    /// Slow-growing berry shrub. Takes two cuts.
    Redberry,
}

/// Growth constants are `None` where the variety never matures or produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarietyTraits {
    /// Host footprint size class (collision, tile occupancy).
    pub size: u8,
    pub health: i32,
    pub effective_size: u32,
    pub days_to_mature: Option<u32>,
    pub days_between_produce_when_empty: Option<u32>,
    pub days_between_additional_produce: Option<u32>,
    pub held_item_id: &'static str,
    pub held_item_quantity: u32,
    /// Sprite cell edge in the custom sheet.
    pub cell: UVec2,
    /// Leaves per burst pass when destroyed.
    pub leaf_count: u32,
    /// Bounding box, in tiles.
    pub footprint: IVec2,
}

impl BushVariety {
    pub fn traits(self) -> VarietyTraits {
        match self {
            BushVariety::Nettle => VarietyTraits {
                size: 3,
                health: 20,
                effective_size: 0,
                days_to_mature: None,
                days_between_produce_when_empty: None,
                days_between_additional_produce: None,
                held_item_id: "nettles",
                held_item_quantity: 1,
                cell: UVec2::new(24, 24),
                leaf_count: 6,
                footprint: IVec2::new(1, 1),
            },
            BushVariety::Redberry => VarietyTraits {
                size: 2,
                health: 80,
                effective_size: 1,
                days_to_mature: Some(17),
                days_between_produce_when_empty: Some(4),
                days_between_additional_produce: Some(2),
                held_item_id: "redberry",
                held_item_quantity: 0,
                cell: UVec2::new(32, 32),
                leaf_count: 10,
                footprint: IVec2::new(2, 1),
            },
        }
    }

    /// Damage one qualifying tool hit deals.
    pub fn hit_damage(self) -> HitDamage {
        match self {
            BushVariety::Nettle => HitDamage::Fatal,
            BushVariety::Redberry => HitDamage::Amount(50),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BushVariety::Nettle => "Nettle",
            BushVariety::Redberry => "Redberry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitDamage {
    /// Health drops straight to the floor value.
    Fatal,
    Amount(i32),
}
