//! Leaf bursts and poofs thrown out when a bush is cut down.
//!
//! `leaf_burst` only describes the particles; the bush systems spawn them as
//! `TemporarySprite` entities and `animate_temporary_sprites` runs them.

use bevy::prelude::*;
use rand::{Rng, RngCore};

use crate::shared::*;

use super::feature::{FeatureEffect, SheetId};
use super::variety::BushVariety;

/// Rows in the animation sheet.
pub const DUST_POOF_ROW: u32 = 50;
pub const FLASH_POOF_ROW: u32 = 12;
/// Frame edge of the animation sheet.
pub const ANIMATION_CELL: u32 = 64;

/// Staggers leaf start times, per pass and per leaf.
const LEAF_DELAY_STEP_MS: f32 = 20.0;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct TemporarySprite {
    pub sheet: SheetId,
    /// First frame; later frames step right by the frame width.
    pub source: URect,
    /// y-down world pixels.
    pub position: Vec2,
    pub motion: Vec2,
    pub acceleration: Vec2,
    pub acceleration_change: Vec2,
    pub color: Color,
    pub alpha: f32,
    pub alpha_fade: f32,
    pub scale: f32,
    pub layer_depth: f32,
    pub animation_length: u32,
    pub total_loops: u32,
    pub interval_ms: f32,
    pub delay_ms: f32,
    pub frame: u32,
    pub loops_done: u32,
    pub frame_timer_ms: f32,
}

impl TemporarySprite {
    /// A tumbling leaf cut from the cursors sheet.
    pub fn leaf(source: URect, position: Vec2, color: Color) -> Self {
        Self {
            sheet: SheetId::Cursors,
            source,
            position,
            motion: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            acceleration_change: Vec2::ZERO,
            color,
            alpha: 1.0,
            alpha_fade: 0.01,
            scale: 1.0,
            layer_depth: 0.0,
            animation_length: 1,
            total_loops: 1,
            interval_ms: 100.0,
            delay_ms: 0.0,
            frame: 0,
            loops_done: 0,
            frame_timer_ms: 0.0,
        }
    }

    /// A one-shot animation-sheet row (dust, flashes).
    pub fn poof(row: u32, position: Vec2, color: Color) -> Self {
        Self {
            sheet: SheetId::Animations,
            source: URect::new(
                0,
                row * ANIMATION_CELL,
                ANIMATION_CELL,
                (row + 1) * ANIMATION_CELL,
            ),
            position,
            motion: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            acceleration_change: Vec2::ZERO,
            color,
            alpha: 1.0,
            alpha_fade: 0.0,
            scale: 1.0,
            layer_depth: 1.0,
            animation_length: 8,
            total_loops: 1,
            interval_ms: 100.0,
            delay_ms: 0.0,
            frame: 0,
            loops_done: 0,
            frame_timer_ms: 0.0,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.delay_ms > 0.0
    }

    /// Source rect of the frame currently showing.
    pub fn current_source(&self) -> URect {
        let width = self.source.width();
        let shift = UVec2::new(self.frame * width, 0);
        URect::from_corners(self.source.min + shift, self.source.max + shift)
    }

    /// Steps the simulation by `dt_ms`. Returns false once the sprite is done.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        if self.delay_ms > 0.0 {
            self.delay_ms -= dt_ms;
            return true;
        }

        let frames = dt_ms / (FRAME_SECS * 1000.0);
        self.position += self.motion * frames;
        self.motion += self.acceleration * frames;
        self.acceleration += self.acceleration_change * frames;
        self.alpha -= self.alpha_fade * frames;
        if self.alpha <= 0.0 {
            return false;
        }

        self.frame_timer_ms += dt_ms;
        while self.frame_timer_ms >= self.interval_ms {
            self.frame_timer_ms -= self.interval_ms;
            self.frame += 1;
            if self.frame >= self.animation_length {
                self.frame = 0;
                self.loops_done += 1;
                if self.loops_done >= self.total_loops {
                    return false;
                }
            }
        }
        true
    }
}

/// Leaf tint per season.
pub fn leaf_color(season: Season) -> Color {
    match season {
        Season::Spring => Color::srgb_u8(0, 128, 0),
        Season::Summer => Color::srgb_u8(34, 139, 34),
        Season::Fall => Color::srgb_u8(205, 92, 92),
        Season::Winter => Color::srgb_u8(0, 255, 255),
    }
}

/// Leaf cell in the cursors sheet; fall and winter use neighbouring rows.
pub fn leaf_source_rect(season: Season) -> URect {
    let y = match season {
        Season::Fall => 1216,
        Season::Winter => 1184,
        Season::Spring | Season::Summer => 1200,
    };
    URect::new(355, y, 355 + 16, y + 16)
}

/// Uniform point inside `rect`, excluding the max edges.
pub fn random_point_in(rect: IRect, rng: &mut dyn RngCore) -> Vec2 {
    let x = rect.min.x + rng.gen_range(0..rect.width().max(1));
    let y = rect.min.y + rng.gen_range(0..rect.height().max(1));
    Vec2::new(x as f32, y as f32)
}

/// Describes the burst for a destroyed bush: `effective_size + 1` passes of
/// leaves, with a dust poof and a flash poof opening each pass.
pub fn leaf_burst(
    rng: &mut dyn RngCore,
    variety: BushVariety,
    bounding_box: IRect,
    tile: IVec2,
    season: Season,
    out: &mut Vec<FeatureEffect>,
) {
    let traits = variety.traits();
    let color = leaf_color(season);
    let source = leaf_source_rect(season);
    let leaf_count = traits.leaf_count;
    let layer_depth = ((tile.y + 1) * TILE_PX) as f32 / 10_000.0;

    for pass in 0..=traits.effective_size {
        for i in 0..leaf_count {
            let position =
                random_point_in(bounding_box, rng) - Vec2::new(0.0, rng.gen_range(0..64) as f32);
            let mut leaf = TemporarySprite::leaf(source, position, color);
            leaf.motion = Vec2::new(
                rng.gen_range(-10..11) as f32 / 10.0,
                -(rng.gen_range(1..4) as f32),
            );
            leaf.acceleration = Vec2::new(0.0, rng.gen_range(13..17) as f32 / 100.0);
            leaf.acceleration_change = Vec2::new(0.0, -0.001);
            leaf.scale = 2.0;
            leaf.layer_depth = layer_depth;
            leaf.animation_length = 11;
            leaf.total_loops = 99;
            leaf.interval_ms = rng.gen_range(10..40) as f32;
            leaf.delay_ms = ((pass + 1) * i) as f32 * LEAF_DELAY_STEP_MS;
            out.push(FeatureEffect::Sprite(leaf));

            if i % leaf_count == 0 {
                let dust_at = random_point_in(bounding_box, rng)
                    - Vec2::new(32.0, rng.gen_range(32..64) as f32);
                out.push(FeatureEffect::Sprite(TemporarySprite::poof(
                    DUST_POOF_ROW,
                    dust_at,
                    color,
                )));
                let flash_at = random_point_in(bounding_box, rng)
                    - Vec2::new(32.0, rng.gen_range(32..64) as f32);
                out.push(FeatureEffect::Sprite(TemporarySprite::poof(
                    FLASH_POOF_ROW,
                    flash_at,
                    Color::WHITE,
                )));
            }
        }
    }
}

/// Runs every live temporary sprite and despawns the finished ones.
pub fn animate_temporary_sprites(
    mut commands: Commands,
    time: Res<Time>,
    mut sprites: Query<(Entity, &mut TemporarySprite, &mut Transform, &mut Visibility)>,
) {
    let dt_ms = time.delta_secs() * 1000.0;
    for (entity, mut sprite, mut transform, mut visibility) in sprites.iter_mut() {
        if !sprite.advance(dt_ms) {
            commands.entity(entity).despawn();
            continue;
        }
        *visibility = if sprite.is_waiting() {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
        transform.translation = world_px_to_translation(sprite.position, sprite.layer_depth);
        transform.scale = Vec3::splat(sprite.scale);
    }
}
