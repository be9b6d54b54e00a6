//! Daily world passes: nettles creeping out of weed patches, and the sweep
//! that removes them again when nettles are switched off.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::config::HedgerowConfig;
use crate::shared::*;
use crate::world::Locations;

use super::bush::CustomBush;
use super::variety::BushVariety;

/// Summer every day, spring and fall every third day, winter never.
pub fn is_nettle_spawn_day(season: Season, day_of_month: u8) -> bool {
    match season {
        Season::Summer => true,
        Season::Spring | Season::Fall => day_of_month % 3 == 1,
        Season::Winter => false,
    }
}

/// Rolls today's nettle target for one location: `[min, max)` minus the
/// nettles already there.
fn nettle_target(config: &HedgerowConfig, existing: usize, rng: &mut dyn RngCore) -> i32 {
    let (min, max) = config.nettles_added_range;
    let rolled = if max > min { rng.gen_range(min..max) } else { min };
    rolled - existing as i32
}

/// Places nettles beside weeds in every configured location. Returns how
/// many were placed in total. Only the authoritative peer changes the world.
pub fn try_spawn_nettles(
    locations: &mut Locations,
    config: &HedgerowConfig,
    net: NetRole,
    calendar: &Calendar,
    rng: &mut dyn RngCore,
) -> usize {
    if !net.is_authoritative() {
        return 0;
    }
    if !config.nettles_enabled || !is_nettle_spawn_day(calendar.season, calendar.day) {
        return 0;
    }

    let mut total = 0;
    for name in &config.nettle_locations {
        if rng.gen::<f64>() > config.nettle_daily_chance_per_location {
            debug!("[Bushes] Did not add nettles to {}", name);
            continue;
        }
        let Some(location) = locations.get_mut(name) else {
            warn!("[Bushes] Unknown nettle location '{}'", name);
            continue;
        };

        let target = nettle_target(config, location.nettle_count(), &mut *rng);
        let mut candidates = location.weeds_tiles();
        candidates.shuffle(&mut *rng);

        let mut added = 0;
        for weeds in candidates {
            if added >= target {
                break;
            }
            let Some(tile) = location.random_adjacent_open_tile(weeds, &mut *rng) else {
                debug!("[Bushes] No room for nettles beside weeds at {}", weeds);
                continue;
            };
            let nettle = CustomBush::new(tile, location, BushVariety::Nettle, calendar, &mut *rng);
            location.large_features.push(nettle);
            added += 1;
            debug!("[Bushes] Adding nettles at {} in {}", tile, name);
        }

        info!("[Bushes] Added {} nettles to {}", added, name);
        total += added as usize;
    }
    total
}

/// Removes every nettle bush from the configured locations. Redberries stay.
pub fn clear_nettles(locations: &mut Locations, config: &HedgerowConfig) -> usize {
    let mut total = 0;
    for name in &config.nettle_locations {
        let Some(location) = locations.get_mut(name) else {
            warn!("[Bushes] Unknown nettle location '{}'", name);
            continue;
        };
        let count = location.large_features.iter().filter(|b| b.is_nettle()).count();
        info!("[Bushes] Removing {} nettles from {}", count, name);
        for i in (0..location.large_features.len()).rev() {
            if location.large_features[i].is_nettle() {
                let removed = location.large_features.remove(i);
                debug!("[Bushes] Removing nettles at {}", removed.tile);
            }
        }
        total += count;
    }
    total
}
