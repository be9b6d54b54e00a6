//! Shared components, resources, events, and states for Hedgerow.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain's internals directly.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Paused,
}

// ═══════════════════════════════════════════════════════════════════════
// CALENDAR
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn next(self) -> Self {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Fall,
            Season::Fall => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Fall => 2,
            Season::Winter => 3,
        }
    }
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub year: u32,
    pub season: Season,
    pub day: u8,           // 1-28
    pub hour: u8,          // 6-25 (25 = 1:00 AM next day)
    pub minute: u8,        // 0-59
    pub time_scale: f32,   // game-minutes per real-second (default ~10)
    pub time_paused: bool,
    pub elapsed_real_seconds: f32, // accumulator for sub-minute ticks
    /// Days completed since the save was created. Bush ages derive from it.
    pub days_played: u32,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            year: 1,
            season: Season::Spring,
            day: 1,
            hour: 6,
            minute: 0,
            time_scale: 10.0,
            time_paused: false,
            elapsed_real_seconds: 0.0,
            days_played: 0,
        }
    }
}

impl Calendar {
    /// Monotonic game-minute counter, used to tick buff durations.
    pub fn absolute_minute(&self) -> u32 {
        self.days_played * 24 * 60 + self.hour as u32 * 60 + self.minute as u32
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Default for Facing {
    fn default() -> Self {
        Facing::Down
    }
}

impl Facing {
    /// Maps 0..4 onto the four directions; anything else wraps.
    pub fn from_index(index: u32) -> Self {
        match index % 4 {
            0 => Facing::Up,
            1 => Facing::Right,
            2 => Facing::Down,
            _ => Facing::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Hoe,
    WateringCan,
    Axe,
    Pickaxe,
    FishingRod,
    Scythe,
    Sword,
}

/// Skill professions. Only the foraging branch matters to wild plants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profession {
    Forester,
    Gatherer,
    Lumberjack,
    Tapper,
    /// Foraged goods are always iridium quality.
    Botanist,
    Tracker,
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub health: i32,
    pub max_health: i32,
    pub resilience: i32,
    pub foraging_level: u32,
    pub professions: HashSet<Profession>,
    pub current_location: String,
    pub tile: IVec2,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            health: MAX_HEALTH,
            max_health: MAX_HEALTH,
            resilience: 0,
            foraging_level: 0,
            professions: HashSet::new(),
            current_location: "Farm".to_string(),
            tile: IVec2::new(8, 8),
        }
    }
}

impl PlayerState {
    /// Resilience soaks damage, but every hit deals at least 1.
    /// Returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let dealt = (amount - self.resilience).max(1);
        self.health -= dealt;
        dealt
    }

    pub fn has_profession(&self, profession: Profession) -> bool {
        self.professions.contains(&profession)
    }
}

/// A timed status effect. Effects from the same `source` replace each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub source: String,
    pub label: String,
    pub minutes_remaining: u32,
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveBuffs {
    pub buffs: Vec<Buff>,
}

impl ActiveBuffs {
    /// Drops any buff sharing the new buff's source, then adds the new one.
    pub fn refresh(&mut self, buff: Buff) {
        self.buffs.retain(|b| b.source != buff.source);
        self.buffs.push(buff);
    }

    pub fn count_from(&self, source: &str) -> usize {
        self.buffs.iter().filter(|b| b.source == source).count()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ITEMS
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for every item type in the game.
pub type ItemId = String;

/// Item quality affects sell price multiplier and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemQuality {
    #[default]
    Normal,
    Silver,
    Gold,
    Iridium,
}

impl ItemQuality {
    /// Numeric tier as stored on item stacks (iridium skips 3).
    pub fn tier(self) -> u8 {
        match self {
            ItemQuality::Normal => 0,
            ItemQuality::Silver => 1,
            ItemQuality::Gold => 2,
            ItemQuality::Iridium => 4,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SESSION: multiplayer role, randomness, world identity
// ═══════════════════════════════════════════════════════════════════════

/// Which peer this process is. Authority is a convention callers respect,
/// not a lock.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetRole {
    #[default]
    SinglePlayer,
    Host,
    Client,
}

impl NetRole {
    pub fn is_multiplayer(self) -> bool {
        !matches!(self, NetRole::SinglePlayer)
    }

    /// Single player or the hosting peer may mutate the shared world.
    pub fn is_authoritative(self) -> bool {
        !matches!(self, NetRole::Client)
    }
}

/// The game's shared random source.
#[derive(Resource)]
pub struct GameRng(pub StdRng);

impl Default for GameRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Per-save unique id, mixed into deterministic sprite rolls.
#[derive(Resource, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WorldSeed(pub u64);

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Sent with the day that just ended; the calendar advances on receipt.
#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    pub day: u8,
    pub season: Season,
    pub year: u32,
}

#[derive(Event, Debug, Clone)]
pub struct SeasonChangeEvent {
    pub new_season: Season,
    pub year: u32,
}

/// A tool swing (or explosion) landing on a tile. `location: None` means
/// the player's current location.
#[derive(Event, Debug, Clone)]
pub struct ToolUseEvent {
    pub tool: Option<ToolKind>,
    pub explosion: i32,
    pub tile: IVec2,
    pub location: Option<String>,
}

/// The player pressing "use" on a tile without a tool.
#[derive(Event, Debug, Clone)]
pub struct InteractEvent {
    pub tile: IVec2,
    pub location: Option<String>,
}

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
    /// Positional cue; `None` plays globally.
    pub tile: Option<IVec2>,
}

/// An item popping out of the world onto the ground.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ItemDebrisEvent {
    pub location: String,
    pub item_id: ItemId,
    pub quality: ItemQuality,
    /// World-pixel origin of the throw.
    pub origin: IVec2,
    pub direction: Facing,
}

/// Asks the world to strip wild nettles from every configured location.
#[derive(Event, Debug, Clone, Default)]
pub struct ClearNettlesEvent;

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

/// World pixels per tile edge.
pub const TILE_PX: i32 = 64;
/// Sprite sheet pixels are drawn this many world pixels wide.
pub const PIXEL_ZOOM: f32 = 4.0;
pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;

pub const DAYS_PER_SEASON: u8 = 28;

pub const MAX_HEALTH: i32 = 100;

/// Frame length the sway and particle simulations are tuned for.
pub const FRAME_SECS: f32 = 1.0 / 60.0;

/// Layer-depth values (0..1) are spread across this z range when drawn.
pub const Z_WORLD_RANGE: f32 = 100.0;

/// Converts a y-down world-pixel position into a Bevy translation.
pub fn world_px_to_translation(px: Vec2, layer_depth: f32) -> Vec3 {
    Vec3::new(px.x, -px.y, layer_depth * Z_WORLD_RANGE)
}
