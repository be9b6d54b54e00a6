//! The terrain-feature hooks the world drives, and the context they run in.
//!
//! Handlers never reach for globals. Everything ambient (date, randomness,
//! network role, the player) arrives in a `FeatureContext`, and everything
//! a handler wants the world to do (sounds, drops, particles) leaves through
//! its effect outbox.

use bevy::prelude::*;
use rand::RngCore;
use std::f32::consts::PI;

use crate::config::HedgerowConfig;
use crate::shared::*;

use super::particles::TemporarySprite;

// ═══════════════════════════════════════════════════════════════════════
// CONTEXT & EFFECTS
// ═══════════════════════════════════════════════════════════════════════

pub struct FeatureContext<'a> {
    pub calendar: &'a Calendar,
    pub rng: &'a mut dyn RngCore,
    pub net: NetRole,
    pub world_seed: u64,
    pub player: &'a mut PlayerState,
    pub buffs: &'a mut ActiveBuffs,
    pub config: &'a HedgerowConfig,
    pub effects: &'a mut Vec<FeatureEffect>,
}

impl FeatureContext<'_> {
    pub fn emit(&mut self, effect: FeatureEffect) {
        self.effects.push(effect);
    }
}

/// Something a feature asks the owning location to do.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureEffect {
    /// `tile: None` is a local, non-positional cue.
    Sound {
        cue: &'static str,
        tile: Option<IVec2>,
    },
    DelayedSound {
        cue: &'static str,
        delay_ms: u32,
    },
    Debris {
        item_id: ItemId,
        quality: ItemQuality,
        origin: IVec2,
        direction: Facing,
    },
    Sprite(TemporarySprite),
}

// ═══════════════════════════════════════════════════════════════════════
// DRAW DESCRIPTORS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetId {
    /// The crate's own bush sprite sheet.
    WildBushes,
    /// The host's stock bush texture, used for menu icons.
    StockBushes,
    /// Loose UI/effect sprites (leaves).
    Cursors,
    /// Row-per-effect animation sheet (poofs).
    Animations,
}

/// One textured quad, positioned in y-down world pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    pub sheet: SheetId,
    pub position: Vec2,
    pub source: URect,
    pub alpha: f32,
    pub rotation: f32,
    /// Pivot within the source rect, in sheet pixels.
    pub origin: Vec2,
    pub scale: f32,
    pub flip_x: bool,
    pub layer_depth: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// SWAY: shake and fade state every bush carries
// ═══════════════════════════════════════════════════════════════════════

/// Peak rotation of a fresh shake.
pub const SHAKE_START: f32 = PI / 128.0;
/// Rotation change per frame while swinging.
pub const SHAKE_STEP: f32 = PI / 200.0;
/// Peak-rotation decay per frame.
pub const SHAKE_DECAY: f32 = 0.002_045_308_5;
/// Alpha a bush fades to while the player stands behind it.
pub const BEHIND_ALPHA: f32 = 0.4;
const ALPHA_STEP: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sway {
    pub rotation: f32,
    pub max_shake: f32,
    pub shake_left: bool,
    pub alpha: f32,
}

impl Default for Sway {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            max_shake: 0.0,
            shake_left: false,
            alpha: 1.0,
        }
    }
}

impl Sway {
    pub fn is_at_rest(&self) -> bool {
        self.max_shake.abs() < 0.001
    }

    /// Starts a shake unless one is running and `force` is off.
    /// Returns whether a shake started.
    pub fn shake(&mut self, shake_left: bool, force: bool) -> bool {
        if !self.is_at_rest() && !force {
            return false;
        }
        self.shake_left = shake_left;
        self.max_shake = SHAKE_START;
        true
    }

    /// One frame of swinging and decay.
    pub fn tick(&mut self) {
        if self.max_shake <= 0.0 {
            self.rotation = 0.0;
            return;
        }
        if self.shake_left {
            self.rotation -= SHAKE_STEP;
            if self.rotation <= -self.max_shake {
                self.shake_left = false;
            }
        } else {
            self.rotation += SHAKE_STEP;
            if self.rotation >= self.max_shake {
                self.shake_left = true;
            }
        }
        self.max_shake = (self.max_shake - SHAKE_DECAY).max(0.0);
        if self.max_shake == 0.0 {
            self.rotation = 0.0;
        }
    }

    /// Moves alpha one step toward the see-through or solid value.
    pub fn fade(&mut self, player_behind: bool) {
        let target = if player_behind { BEHIND_ALPHA } else { 1.0 };
        if self.alpha > target {
            self.alpha = (self.alpha - ALPHA_STEP).max(target);
        } else {
            self.alpha = (self.alpha + ALPHA_STEP).min(target);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TERRAIN FEATURE
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle hooks for a large, interactive piece of scenery.
pub trait TerrainFeature {
    /// Overnight update, after the calendar has moved to the new day.
    fn day_update(&mut self, ctx: &mut FeatureContext<'_>);

    /// First day of a new season. Returns true when the caller should treat
    /// the feature as regrown and do its own follow-up.
    fn season_update(&mut self, ctx: &mut FeatureContext<'_>, on_load: bool) -> bool;

    fn is_actionable(&self) -> bool;

    /// The player pressed "use" on the feature. Returns whether it was handled.
    fn perform_use_action(&mut self, ctx: &mut FeatureContext<'_>, tile: IVec2) -> bool;

    /// A tool or explosion hit the feature. Returns true when the feature is
    /// destroyed; the caller must then remove it from its location.
    fn perform_tool_action(
        &mut self,
        ctx: &mut FeatureContext<'_>,
        tool: Option<ToolKind>,
        explosion: i32,
        tile: IVec2,
    ) -> bool;

    /// Collision box in world pixels.
    fn bounding_box(&self) -> IRect;

    /// Area the sprite may cover, in world pixels.
    fn render_bounds(&self) -> IRect;

    /// Re-derives sprite state after load or a season change.
    fn load_sprite(&mut self, ctx: &mut FeatureContext<'_>);

    /// Per-frame animation.
    fn tick_update(&mut self, player_tile: IVec2);

    fn draw(&self) -> SpriteDraw;

    fn draw_in_menu(&self, position_on_screen: Vec2, scale: f32, layer_depth: f32) -> SpriteDraw;
}
