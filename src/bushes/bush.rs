//! Wild bushes: the stinging nettle and the redberry shrub.
//!
//! A bush's look is derived, never set: the sprite rectangle is a function
//! of variety, season, age, greenhouse residency and the bloom offset, and
//! only `set_up_source_rectangle` writes it.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::shared::*;
use crate::world::GameLocation;

use super::feature::{FeatureContext, FeatureEffect, SheetId, SpriteDraw, Sway, TerrainFeature};
use super::particles::leaf_burst;
use super::variety::{BushVariety, HitDamage};

/// Flat damage a nettle deals on touch, before resilience.
pub const NETTLES_DAMAGE: i32 = 4;
/// Source tag on the sting debuff, so a fresh sting replaces the old one.
pub const NETTLE_BUFF_SOURCE: &str = "hedgerow.NettleBuff";
pub const NETTLE_BUFF_LABEL: &str = "Nettle sting";

/// Health after a fatal cut.
const FELLED_HEALTH: i32 = -100;
/// A bush at or below this health is destroyed.
const DESTROYED_AT: i32 = -1;
/// Redberries bloom from this day of the month.
const BLOOM_DAY: u8 = 22;
const DAY_BLOOM_CHANCE: f64 = 0.2;
const SUMMER_BLOOM_CHANCE: f64 = 0.5;
const RUSTLE_DELAY_MS: u32 = 100;

/// Menu icon cell in the stock bush texture.
const MENU_ICON_SOURCE: URect = URect {
    min: UVec2::new(32, 96),
    max: UVec2::new(48, 128),
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomBush {
    pub variety: BushVariety,
    pub tile: IVec2,
    /// Host footprint size class (collision), distinct from the bounding box.
    pub size: u8,
    pub health: i32,
    pub effective_size: u32,
    pub days_to_mature: Option<u32>,
    pub days_between_produce_when_empty: Option<u32>,
    pub days_between_additional_produce: Option<u32>,
    pub held_item_id: ItemId,
    pub held_item_quantity: u32,
    /// 1 while showing the blooming cell, else 0.
    pub sprite_offset: u32,
    pub greenhouse: bool,
    pub flipped: bool,
    pub draw_shadow: bool,
    pub date_planted: u32,
    #[serde(skip)]
    source_rect: URect,
    #[serde(skip)]
    pub sway: Sway,
}

impl CustomBush {
    pub fn new(
        tile: IVec2,
        location: &GameLocation,
        variety: BushVariety,
        calendar: &Calendar,
        rng: &mut dyn RngCore,
    ) -> Self {
        let traits = variety.traits();
        let mut bush = Self {
            variety,
            tile,
            size: traits.size,
            health: traits.health,
            effective_size: traits.effective_size,
            days_to_mature: traits.days_to_mature,
            days_between_produce_when_empty: traits.days_between_produce_when_empty,
            days_between_additional_produce: traits.days_between_additional_produce,
            held_item_id: traits.held_item_id.to_string(),
            held_item_quantity: traits.held_item_quantity,
            sprite_offset: 0,
            greenhouse: location.is_greenhouse,
            flipped: rng.gen_bool(0.5),
            draw_shadow: false,
            date_planted: calendar.days_played,
            source_rect: URect::default(),
            sway: Sway::default(),
        };
        bush.set_up_source_rectangle(calendar);
        bush
    }

    pub fn is_nettle(&self) -> bool {
        self.variety == BushVariety::Nettle
    }

    pub fn age(&self, days_played: u32) -> u32 {
        days_played.saturating_sub(self.date_planted)
    }

    pub fn is_mature(&self, days_played: u32) -> bool {
        match self.days_to_mature {
            Some(days) => self.age(days_played) >= days,
            None => false,
        }
    }

    /// Nettles never bloom. Redberries bloom late in the month once mature,
    /// and not outdoors in winter.
    pub fn in_bloom(&self, season: Season, day_of_month: u8, days_played: u32) -> bool {
        if self.variety == BushVariety::Nettle {
            return false;
        }
        let in_season =
            day_of_month >= BLOOM_DAY && (season != Season::Winter || self.greenhouse);
        self.is_mature(days_played) && in_season
    }

    pub fn blooming_now(&self, calendar: &Calendar) -> bool {
        self.in_bloom(calendar.season, calendar.day, calendar.days_played)
    }

    pub fn is_destroyable(&self) -> bool {
        true
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= DESTROYED_AT
    }

    /// True when the bush's bounding box covers `tile`.
    pub fn occupies(&self, tile: IVec2) -> bool {
        let bbox = self.bounding_box();
        let probe = tile * TILE_PX + IVec2::splat(TILE_PX / 2);
        probe.x >= bbox.min.x && probe.x < bbox.max.x && probe.y >= bbox.min.y && probe.y < bbox.max.y
    }

    pub fn source_rect(&self) -> URect {
        self.source_rect
    }

    pub fn set_up_source_rectangle(&mut self, calendar: &Calendar) {
        self.source_rect = source_rect_for(
            self.variety,
            calendar.season,
            self.age(calendar.days_played),
            self.sprite_offset,
            self.greenhouse,
        );
    }

    /// Starts a shake leaning away from the player. Redberries drop whatever
    /// they hold when a shake begins.
    pub fn shake(&mut self, ctx: &mut FeatureContext<'_>, tile: IVec2, force: bool) {
        let player_x = ctx.player.tile.x;
        let shake_left = player_x > tile.x || (player_x == tile.x && ctx.rng.gen_bool(0.5));
        if !self.sway.shake(shake_left, force) {
            return;
        }
        if self.variety == BushVariety::Redberry {
            let origin = tile * TILE_PX + IVec2::splat(TILE_PX / 2);
            for _ in 0..self.held_item_quantity {
                ctx.emit(FeatureEffect::Debris {
                    item_id: self.held_item_id.clone(),
                    quality: ItemQuality::Normal,
                    origin,
                    direction: Facing::Down,
                });
            }
        }
    }

    /// Drops, sounds and the leaf burst of a bush that has just been felled.
    fn shatter(&mut self, ctx: &mut FeatureContext<'_>, tile: IVec2) {
        let quantity = ctx
            .rng
            .gen_range(self.held_item_quantity..self.held_item_quantity + 1)
            + ctx.player.foraging_level / 4;
        let quality = if ctx.player.has_profession(Profession::Botanist) {
            ItemQuality::Iridium
        } else {
            ItemQuality::Normal
        };
        let origin = self.bounding_box().center();
        for _ in 0..quantity {
            let direction = Facing::from_index(ctx.rng.gen_range(0..4));
            ctx.emit(FeatureEffect::Debris {
                item_id: self.held_item_id.clone(),
                quality,
                origin,
                direction,
            });
        }

        if self.variety != BushVariety::Nettle {
            ctx.emit(FeatureEffect::Sound {
                cue: "treethud",
                tile: Some(tile),
            });
        }
        ctx.emit(FeatureEffect::DelayedSound {
            cue: "leafrustle",
            delay_ms: RUSTLE_DELAY_MS,
        });

        let season = ctx.calendar.season;
        let bbox = self.bounding_box();
        leaf_burst(&mut *ctx.rng, self.variety, bbox, tile, season, ctx.effects);
    }
}

/// Age bucket used by the sprite sheet: one column per ten days, capped at 2.
pub fn age_bucket(age: u32) -> u32 {
    (age / 10).min(2)
}

/// Sprite-sheet cell for a bush in the given state.
pub fn source_rect_for(
    variety: BushVariety,
    season: Season,
    age: u32,
    sprite_offset: u32,
    greenhouse: bool,
) -> URect {
    let cell = variety.traits().cell;
    match variety {
        BushVariety::Nettle => {
            let x = sprite_offset * cell.x;
            URect::new(x, 16, x + cell.x, 16 + cell.y)
        }
        BushVariety::Redberry => {
            let season_column = if greenhouse { 0 } else { season.index() as u32 };
            let x = (season_column + age_bucket(age) + sprite_offset) * cell.x;
            URect::new(x, 32, x + cell.x, 32 + cell.y)
        }
    }
}

impl TerrainFeature for CustomBush {
    fn day_update(&mut self, ctx: &mut FeatureContext<'_>) {
        if self.variety == BushVariety::Redberry {
            let blooming = self.blooming_now(ctx.calendar);
            if self.sprite_offset == 0 && ctx.rng.gen_bool(DAY_BLOOM_CHANCE) && blooming {
                self.sprite_offset = 1;
            } else if ctx.calendar.season != Season::Summer && !blooming {
                self.sprite_offset = 0;
            }
        }
        self.set_up_source_rectangle(ctx.calendar);
    }

    fn season_update(&mut self, ctx: &mut FeatureContext<'_>, _on_load: bool) -> bool {
        if !ctx.net.is_multiplayer() || ctx.net == NetRole::Host {
            // Every variety starts the season bare; only summer redberries may roll a bloom.
            self.sprite_offset = if self.variety == BushVariety::Redberry
                && ctx.calendar.season == Season::Summer
                && ctx.rng.gen_bool(SUMMER_BLOOM_CHANCE)
            {
                1
            } else {
                0
            };
            self.load_sprite(ctx);
        }
        false
    }

    fn is_actionable(&self) -> bool {
        true
    }

    fn perform_use_action(&mut self, ctx: &mut FeatureContext<'_>, tile: IVec2) -> bool {
        let audible = self.greenhouse
            || self.variety == BushVariety::Redberry
            || ctx.calendar.season != Season::Winter;
        if self.sway.is_at_rest() && audible {
            ctx.emit(FeatureEffect::Sound {
                cue: "leafrustle",
                tile: None,
            });
        }

        if self.variety == BushVariety::Nettle {
            ctx.emit(FeatureEffect::DelayedSound {
                cue: "leafrustle",
                delay_ms: RUSTLE_DELAY_MS,
            });
            // Net sting is a flat NETTLES_DAMAGE.
            let sting = NETTLES_DAMAGE + ctx.player.resilience;
            ctx.player.take_damage(sting);
            if ctx.player.health < 1 {
                ctx.player.health = 1;
            }
            ctx.buffs.refresh(Buff {
                source: NETTLE_BUFF_SOURCE.to_string(),
                label: NETTLE_BUFF_LABEL.to_string(),
                minutes_remaining: ctx.config.nettle_buff_minutes,
            });
        }

        self.shake(ctx, tile, true);
        true
    }

    fn perform_tool_action(
        &mut self,
        ctx: &mut FeatureContext<'_>,
        tool: Option<ToolKind>,
        explosion: i32,
        tile: IVec2,
    ) -> bool {
        if explosion > 0 {
            self.shake(ctx, tile, true);
            return false;
        }
        let Some(tool) = tool else {
            return false;
        };
        if !ctx.config.is_harvesting_tool(tool) || !self.is_destroyable() {
            return false;
        }

        ctx.emit(FeatureEffect::Sound {
            cue: "leafrustle",
            tile: Some(tile),
        });
        self.shake(ctx, tile, true);

        match self.variety.hit_damage() {
            HitDamage::Fatal => self.health = FELLED_HEALTH,
            HitDamage::Amount(amount) => self.health -= amount,
        }

        if self.is_destroyed() {
            self.shatter(ctx, tile);
            return true;
        }

        ctx.emit(FeatureEffect::Sound {
            cue: "axchop",
            tile: Some(tile),
        });
        false
    }

    fn bounding_box(&self) -> IRect {
        let origin = self.tile * TILE_PX;
        let extent = self.variety.traits().footprint * TILE_PX;
        IRect::from_corners(origin, origin + extent)
    }

    fn render_bounds(&self) -> IRect {
        let (rise, extent) = match self.variety {
            BushVariety::Nettle => (1, IVec2::new(TILE_PX, 160)),
            BushVariety::Redberry => (2, IVec2::new(TILE_PX * 2, 256)),
        };
        let origin = IVec2::new(self.tile.x * TILE_PX, (self.tile.y - rise) * TILE_PX);
        IRect::from_corners(origin, origin + extent)
    }

    fn load_sprite(&mut self, ctx: &mut FeatureContext<'_>) {
        let seed = (ctx.calendar.days_played as i64)
            .wrapping_add(ctx.world_seed as i64)
            .wrapping_add(self.tile.x as i64)
            .wrapping_add(self.tile.y as i64 * 777);
        let mut roll = StdRng::seed_from_u64(seed as u64);
        match self.variety {
            BushVariety::Nettle => {
                if roll.gen_bool(0.5) {
                    self.sprite_offset = 1;
                }
            }
            BushVariety::Redberry => {
                self.sprite_offset = u32::from(self.blooming_now(ctx.calendar));
            }
        }
        self.set_up_source_rectangle(ctx.calendar);
    }

    fn tick_update(&mut self, player_tile: IVec2) {
        self.sway.tick();
        let render = self.render_bounds();
        let probe = player_tile * TILE_PX + IVec2::splat(TILE_PX / 2);
        let inside_render = probe.x >= render.min.x
            && probe.x < render.max.x
            && probe.y >= render.min.y
            && probe.y < render.max.y;
        self.sway.fade(inside_render && !self.occupies(player_tile));
    }

    fn draw(&self) -> SpriteDraw {
        let source = self.source_rect;
        let position = Vec2::new(
            (self.tile.x * TILE_PX + TILE_PX / 2) as f32,
            ((self.tile.y + 1) * TILE_PX) as f32,
        );
        let layer_depth = (self.bounding_box().center().y + 48) as f32 / 10_000.0
            - self.tile.x as f32 / 1_000_000.0;
        SpriteDraw {
            sheet: SheetId::WildBushes,
            position,
            source,
            alpha: self.sway.alpha,
            rotation: self.sway.rotation,
            origin: Vec2::new((source.width() / 2) as f32, source.height() as f32),
            scale: PIXEL_ZOOM,
            flip_x: self.flipped,
            layer_depth,
        }
    }

    fn draw_in_menu(&self, position_on_screen: Vec2, scale: f32, layer_depth: f32) -> SpriteDraw {
        let layer_depth = layer_depth + position_on_screen.x / 100_000.0;
        SpriteDraw {
            sheet: SheetId::StockBushes,
            position: position_on_screen + Vec2::new(0.0, -64.0 * scale),
            source: MENU_ICON_SOURCE,
            alpha: 1.0,
            rotation: 0.0,
            origin: Vec2::ZERO,
            scale,
            flip_x: self.flipped,
            layer_depth: layer_depth + (position_on_screen.y + 448.0 * scale - 1.0) / 20_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HedgerowConfig;

    struct Harness {
        calendar: Calendar,
        rng: StdRng,
        net: NetRole,
        player: PlayerState,
        buffs: ActiveBuffs,
        config: HedgerowConfig,
        effects: Vec<FeatureEffect>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                calendar: Calendar::default(),
                rng: StdRng::seed_from_u64(42),
                net: NetRole::SinglePlayer,
                player: PlayerState::default(),
                buffs: ActiveBuffs::default(),
                config: HedgerowConfig::default(),
                effects: Vec::new(),
            }
        }

        fn ctx(&mut self) -> FeatureContext<'_> {
            FeatureContext {
                calendar: &self.calendar,
                rng: &mut self.rng,
                net: self.net,
                world_seed: 99,
                player: &mut self.player,
                buffs: &mut self.buffs,
                config: &self.config,
                effects: &mut self.effects,
            }
        }

        fn bush(&mut self, variety: BushVariety) -> CustomBush {
            let location = GameLocation::new("Forest", 16, 16);
            CustomBush::new(IVec2::new(3, 4), &location, variety, &self.calendar, &mut self.rng)
        }

        fn sounds(&self, wanted: &str) -> usize {
            self.effects
                .iter()
                .filter(|e| matches!(e, FeatureEffect::Sound { cue, .. } if *cue == wanted))
                .count()
        }

        fn debris(&self) -> usize {
            self.effects
                .iter()
                .filter(|e| matches!(e, FeatureEffect::Debris { .. }))
                .count()
        }
    }

    #[test]
    fn test_construction_sets_variety_constants() {
        let mut h = Harness::new();
        let nettle = h.bush(BushVariety::Nettle);
        assert_eq!(nettle.health, 20);
        assert_eq!(nettle.size, 3);
        assert_eq!(nettle.effective_size, 0);
        assert_eq!(nettle.held_item_id, "nettles");
        assert_eq!(nettle.held_item_quantity, 1);
        assert!(!nettle.draw_shadow);
        assert!(!nettle.greenhouse);

        let redberry = h.bush(BushVariety::Redberry);
        assert_eq!(redberry.health, 80);
        assert_eq!(redberry.size, 2);
        assert_eq!(redberry.held_item_id, "redberry");
        assert_eq!(redberry.held_item_quantity, 0);
        assert!(h.effects.is_empty(), "construction must not emit effects");
    }

    #[test]
    fn test_greenhouse_location_marks_residency() {
        let mut h = Harness::new();
        let greenhouse = GameLocation::greenhouse("Greenhouse", 10, 10);
        let bush = CustomBush::new(
            IVec2::new(2, 2),
            &greenhouse,
            BushVariety::Redberry,
            &h.calendar,
            &mut h.rng,
        );
        assert!(bush.greenhouse);
    }

    #[test]
    fn test_mirroring_is_roughly_even() {
        let mut h = Harness::new();
        let flipped = (0..400).filter(|_| h.bush(BushVariety::Nettle).flipped).count();
        assert!(flipped > 120 && flipped < 280, "flipped {} of 400", flipped);
    }

    #[test]
    fn test_nettle_never_matures() {
        let mut h = Harness::new();
        let nettle = h.bush(BushVariety::Nettle);
        for days in [0, 17, 100, 10_000] {
            assert!(!nettle.is_mature(days));
        }
    }

    #[test]
    fn test_redberry_matures_after_seventeen_days() {
        let mut h = Harness::new();
        let redberry = h.bush(BushVariety::Redberry);
        assert!(!redberry.is_mature(16));
        assert!(redberry.is_mature(17));
    }

    #[test]
    fn test_winter_blocks_outdoor_bloom() {
        let mut h = Harness::new();
        let redberry = h.bush(BushVariety::Redberry);
        for day in 1..=DAYS_PER_SEASON {
            assert!(!redberry.in_bloom(Season::Winter, day, 500));
        }
    }

    #[test]
    fn test_greenhouse_blooms_in_winter() {
        let mut h = Harness::new();
        let mut redberry = h.bush(BushVariety::Redberry);
        redberry.greenhouse = true;
        assert!(redberry.in_bloom(Season::Winter, 22, 500));
    }

    #[test]
    fn test_late_month_bloom_tracks_maturity() {
        let mut h = Harness::new();
        let redberry = h.bush(BushVariety::Redberry);
        for day in 22..=DAYS_PER_SEASON {
            assert!(redberry.in_bloom(Season::Fall, day, 17));
            assert!(!redberry.in_bloom(Season::Fall, day, 5));
        }
        assert!(!redberry.in_bloom(Season::Fall, 21, 17));
        let nettle = h.bush(BushVariety::Nettle);
        assert!(!nettle.in_bloom(Season::Summer, 25, 500));
    }

    #[test]
    fn test_age_bucket_is_clamped() {
        assert_eq!(age_bucket(0), 0);
        assert_eq!(age_bucket(9), 0);
        assert_eq!(age_bucket(10), 1);
        assert_eq!(age_bucket(19), 1);
        assert_eq!(age_bucket(20), 2);
        assert_eq!(age_bucket(400), 2);
    }

    #[test]
    fn test_source_rect_layout() {
        assert_eq!(
            source_rect_for(BushVariety::Nettle, Season::Fall, 50, 1, false),
            URect::new(24, 16, 48, 40)
        );
        // Fall column (2) + age bucket (1) + bloom (1) = column 4.
        assert_eq!(
            source_rect_for(BushVariety::Redberry, Season::Fall, 12, 1, false),
            URect::new(128, 32, 160, 64)
        );
        // The greenhouse pins the season column to spring.
        assert_eq!(
            source_rect_for(BushVariety::Redberry, Season::Winter, 0, 0, true),
            URect::new(0, 32, 32, 64)
        );
    }

    #[test]
    fn test_bounding_boxes_and_render_bounds() {
        let mut h = Harness::new();
        let nettle = h.bush(BushVariety::Nettle);
        assert_eq!(nettle.bounding_box(), IRect::new(192, 256, 256, 320));
        assert_eq!(nettle.render_bounds(), IRect::new(192, 192, 256, 352));
        let redberry = h.bush(BushVariety::Redberry);
        assert_eq!(redberry.bounding_box(), IRect::new(192, 256, 320, 320));
        assert_eq!(redberry.render_bounds(), IRect::new(192, 128, 320, 384));
        assert!(redberry.occupies(IVec2::new(4, 4)));
        assert!(!nettle.occupies(IVec2::new(4, 4)));
    }

    #[test]
    fn test_redberry_dies_on_second_hit() {
        let mut h = Harness::new();
        let mut redberry = h.bush(BushVariety::Redberry);
        let tile = redberry.tile;
        assert!(!redberry.perform_tool_action(&mut h.ctx(), Some(ToolKind::Scythe), 0, tile));
        assert_eq!(redberry.health, 30);
        assert_eq!(h.sounds("axchop"), 1);
        assert!(redberry.perform_tool_action(&mut h.ctx(), Some(ToolKind::Scythe), 0, tile));
        assert_eq!(redberry.health, -20);
        assert_eq!(h.sounds("treethud"), 1);
    }

    #[test]
    fn test_nettle_dies_on_first_hit() {
        let mut h = Harness::new();
        let mut nettle = h.bush(BushVariety::Nettle);
        let tile = nettle.tile;
        assert!(nettle.perform_tool_action(&mut h.ctx(), Some(ToolKind::Sword), 0, tile));
        assert_eq!(nettle.health, -100);
        assert_eq!(h.sounds("treethud"), 0);
        assert_eq!(h.sounds("axchop"), 0);
        assert_eq!(h.debris(), 1);
    }

    #[test]
    fn test_unlisted_or_missing_tool_does_nothing() {
        let mut h = Harness::new();
        let mut nettle = h.bush(BushVariety::Nettle);
        let tile = nettle.tile;
        assert!(!nettle.perform_tool_action(&mut h.ctx(), Some(ToolKind::Hoe), 0, tile));
        assert!(!nettle.perform_tool_action(&mut h.ctx(), None, 0, tile));
        assert_eq!(nettle.health, 20);
        assert!(h.effects.is_empty());
        assert!(nettle.sway.is_at_rest());
    }

    #[test]
    fn test_explosion_only_shakes() {
        let mut h = Harness::new();
        let mut nettle = h.bush(BushVariety::Nettle);
        let tile = nettle.tile;
        assert!(!nettle.perform_tool_action(&mut h.ctx(), Some(ToolKind::Scythe), 3, tile));
        assert_eq!(nettle.health, 20);
        assert!(!nettle.sway.is_at_rest());
        assert!(h.effects.is_empty());
    }

    #[test]
    fn test_drop_count_adds_foraging_quarter() {
        let mut h = Harness::new();
        h.player.foraging_level = 9;
        let mut redberry = h.bush(BushVariety::Redberry);
        let tile = redberry.tile;
        redberry.perform_tool_action(&mut h.ctx(), Some(ToolKind::Axe), 0, tile);
        redberry.perform_tool_action(&mut h.ctx(), Some(ToolKind::Axe), 0, tile);
        // 0 held + 9 / 4
        assert_eq!(h.debris(), 2);
    }

    #[test]
    fn test_botanist_drops_iridium() {
        let mut h = Harness::new();
        h.player.professions.insert(Profession::Botanist);
        let mut nettle = h.bush(BushVariety::Nettle);
        let tile = nettle.tile;
        nettle.perform_tool_action(&mut h.ctx(), Some(ToolKind::Scythe), 0, tile);
        let center = nettle.bounding_box().center();
        let drop = h.effects.iter().find_map(|e| match e {
            FeatureEffect::Debris { quality, origin, .. } => Some((*quality, *origin)),
            _ => None,
        });
        assert_eq!(drop, Some((ItemQuality::Iridium, center)));
    }

    #[test]
    fn test_nettle_sting_hurts_and_refreshes_buff() {
        let mut h = Harness::new();
        let mut nettle = h.bush(BushVariety::Nettle);
        let tile = nettle.tile;
        assert!(nettle.perform_use_action(&mut h.ctx(), tile));
        assert_eq!(h.player.health, MAX_HEALTH - NETTLES_DAMAGE);
        assert!(nettle.perform_use_action(&mut h.ctx(), tile));
        assert_eq!(h.buffs.count_from(NETTLE_BUFF_SOURCE), 1);
        assert_eq!(h.buffs.buffs[0].minutes_remaining, 10);
    }

    #[test]
    fn test_resilience_does_not_soften_sting() {
        let mut h = Harness::new();
        h.player.resilience = 3;
        let mut nettle = h.bush(BushVariety::Nettle);
        let tile = nettle.tile;
        nettle.perform_use_action(&mut h.ctx(), tile);
        assert_eq!(h.player.health, MAX_HEALTH - NETTLES_DAMAGE);
    }

    #[test]
    fn test_sting_never_knocks_out() {
        let mut h = Harness::new();
        h.player.health = 2;
        let mut nettle = h.bush(BushVariety::Nettle);
        let tile = nettle.tile;
        nettle.perform_use_action(&mut h.ctx(), tile);
        assert_eq!(h.player.health, 1);
    }

    #[test]
    fn test_rustle_only_when_still() {
        let mut h = Harness::new();
        let mut redberry = h.bush(BushVariety::Redberry);
        let tile = redberry.tile;
        redberry.perform_use_action(&mut h.ctx(), tile);
        redberry.perform_use_action(&mut h.ctx(), tile);
        assert_eq!(h.sounds("leafrustle"), 1);
        assert!(h.player.health == MAX_HEALTH);
    }

    #[test]
    fn test_winter_nettle_is_silent_outdoors() {
        let mut h = Harness::new();
        h.calendar.season = Season::Winter;
        let mut nettle = h.bush(BushVariety::Nettle);
        let tile = nettle.tile;
        nettle.perform_use_action(&mut h.ctx(), tile);
        assert_eq!(h.sounds("leafrustle"), 0);
        assert!(h
            .effects
            .iter()
            .any(|e| matches!(e, FeatureEffect::DelayedSound { cue: "leafrustle", .. })));
    }

    #[test]
    fn test_season_update_reports_not_regrown() {
        let mut h = Harness::new();
        h.calendar.season = Season::Summer;
        let mut redberry = h.bush(BushVariety::Redberry);
        assert!(!redberry.season_update(&mut h.ctx(), false));
    }

    #[test]
    fn test_season_update_skipped_on_clients() {
        let mut h = Harness::new();
        h.net = NetRole::Client;
        h.calendar.season = Season::Fall;
        let mut redberry = h.bush(BushVariety::Redberry);
        redberry.sprite_offset = 1;
        assert!(!redberry.season_update(&mut h.ctx(), false));
        assert_eq!(redberry.sprite_offset, 1);
    }

    #[test]
    fn test_nettle_season_update_rerolls_from_bare() {
        let mut h = Harness::new();
        h.calendar.season = Season::Fall;
        let mut reset = 0;
        for days_played in 0..50 {
            h.calendar.days_played = days_played;
            let mut nettle = h.bush(BushVariety::Nettle);
            let mut bare = nettle.clone();
            nettle.sprite_offset = 1;
            bare.sprite_offset = 0;
            nettle.season_update(&mut h.ctx(), false);
            bare.load_sprite(&mut h.ctx());
            assert_eq!(nettle.sprite_offset, bare.sprite_offset);
            if nettle.sprite_offset == 0 {
                reset += 1;
            }
        }
        assert!(reset > 0, "a failed roll must leave the nettle bare");
        assert!(reset < 50, "a passed roll must bring the offset back");
    }

    #[test]
    fn test_redberry_offset_resets_outside_summer_when_not_blooming() {
        let mut h = Harness::new();
        h.calendar.season = Season::Fall;
        h.calendar.day = 3;
        let mut redberry = h.bush(BushVariety::Redberry);
        redberry.sprite_offset = 1;
        redberry.day_update(&mut h.ctx());
        assert_eq!(redberry.sprite_offset, 0);
        assert_eq!(redberry.source_rect().min.x, 64);
    }

    #[test]
    fn test_nettle_day_update_keeps_offset() {
        let mut h = Harness::new();
        h.calendar.season = Season::Winter;
        let mut nettle = h.bush(BushVariety::Nettle);
        nettle.sprite_offset = 1;
        nettle.day_update(&mut h.ctx());
        assert_eq!(nettle.sprite_offset, 1);
        assert_eq!(nettle.source_rect(), URect::new(24, 16, 48, 40));
    }

    #[test]
    fn test_mature_redberry_eventually_blooms() {
        let mut h = Harness::new();
        let mut redberry = h.bush(BushVariety::Redberry);
        h.calendar.days_played = 40;
        h.calendar.day = 24;
        for _ in 0..200 {
            redberry.day_update(&mut h.ctx());
            if redberry.sprite_offset == 1 {
                break;
            }
        }
        assert_eq!(redberry.sprite_offset, 1);
    }

    #[test]
    fn test_load_sprite_is_deterministic() {
        let mut h = Harness::new();
        let mut a = h.bush(BushVariety::Nettle);
        let mut b = a.clone();
        a.load_sprite(&mut h.ctx());
        b.load_sprite(&mut h.ctx());
        assert_eq!(a.sprite_offset, b.sprite_offset);
        assert_eq!(a.source_rect(), b.source_rect());
    }

    #[test]
    fn test_draw_uses_sway_and_flip() {
        let mut h = Harness::new();
        let mut nettle = h.bush(BushVariety::Nettle);
        nettle.flipped = true;
        nettle.sway.alpha = 0.5;
        let draw = nettle.draw();
        assert_eq!(draw.sheet, SheetId::WildBushes);
        assert_eq!(draw.position, Vec2::new(224.0, 320.0));
        assert_eq!(draw.origin, Vec2::new(12.0, 24.0));
        assert_eq!(draw.scale, PIXEL_ZOOM);
        assert!(draw.flip_x);
        assert_eq!(draw.alpha, 0.5);
        let expected_depth = (288 + 48) as f32 / 10_000.0 - 3.0 / 1_000_000.0;
        assert!((draw.layer_depth - expected_depth).abs() < 1e-6);
    }

    #[test]
    fn test_menu_icon_uses_stock_texture() {
        let mut h = Harness::new();
        let bush = h.bush(BushVariety::Redberry);
        let draw = bush.draw_in_menu(Vec2::new(100.0, 200.0), 1.0, 0.5);
        assert_eq!(draw.sheet, SheetId::StockBushes);
        assert_eq!(draw.source, URect::new(32, 96, 48, 128));
        assert_eq!(draw.position, Vec2::new(100.0, 136.0));
    }

    #[test]
    fn test_player_behind_bush_fades_it() {
        let mut h = Harness::new();
        let mut redberry = h.bush(BushVariety::Redberry);
        // One tile above the bounding box, inside the render bounds.
        for _ in 0..20 {
            redberry.tick_update(IVec2::new(3, 3));
        }
        assert!(redberry.sway.alpha < 1.0);
        for _ in 0..20 {
            redberry.tick_update(IVec2::new(12, 12));
        }
        assert_eq!(redberry.sway.alpha, 1.0);
    }
}
