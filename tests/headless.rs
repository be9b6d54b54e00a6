//! Headless integration tests for Hedgerow.
//!
//! These tests exercise the game's ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, register the domain
//! plugins (which skip their rendering and audio work when no asset server
//! exists), and verify the bush lifecycle end to end.
//!
//! Run with: `cargo test --test headless`

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use rand::rngs::StdRng;
use rand::SeedableRng;

use hedgerow::audio::SfxPlugin;
use hedgerow::bushes::{BushPlugin, BushVariety, CustomBush, TemporarySprite, NETTLE_BUFF_SOURCE};
use hedgerow::calendar::CalendarPlugin;
use hedgerow::config::HedgerowConfig;
use hedgerow::player::PlayerPlugin;
use hedgerow::save::SavePlugin;
use hedgerow::shared::*;
use hedgerow::world::{GameLocation, Locations, WorldObject, WorldPlugin};

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Events the bushes sent, in order.
#[derive(Resource, Default)]
struct Captured {
    sfx: Vec<PlaySfxEvent>,
    debris: Vec<ItemDebrisEvent>,
}

impl Captured {
    fn cue_count(&self, cue: &str) -> usize {
        self.sfx.iter().filter(|e| e.sfx_id == cue).count()
    }
}

fn capture_events(
    mut sfx: EventReader<PlaySfxEvent>,
    mut debris: EventReader<ItemDebrisEvent>,
    mut captured: ResMut<Captured>,
) {
    captured.sfx.extend(sfx.read().cloned());
    captured.debris.extend(debris.read().cloned());
}

/// Builds a minimal Bevy app with every shared resource, event and domain
/// plugin registered but NO rendering, windowing, or asset loading.
/// Each update advances exactly 50 ms of game time.
fn build_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)));

    // ── Game State ───────────────────────────────────────────────────────
    app.init_state::<GameState>();

    // ── Shared Resources (mirrors main.rs) ───────────────────────────────
    app.insert_resource(HedgerowConfig::default())
        .init_resource::<Calendar>()
        .init_resource::<PlayerState>()
        .init_resource::<ActiveBuffs>()
        .init_resource::<NetRole>()
        .insert_resource(GameRng::seeded(42))
        .insert_resource(WorldSeed(7));

    // ── Shared Events (mirrors main.rs) ──────────────────────────────────
    app.add_event::<DayEndEvent>()
        .add_event::<SeasonChangeEvent>()
        .add_event::<ToolUseEvent>()
        .add_event::<InteractEvent>()
        .add_event::<PlaySfxEvent>()
        .add_event::<ItemDebrisEvent>()
        .add_event::<ClearNettlesEvent>();

    // ── Domain plugins ───────────────────────────────────────────────────
    app.add_plugins((
        CalendarPlugin,
        PlayerPlugin,
        WorldPlugin,
        BushPlugin,
        SfxPlugin,
        SavePlugin,
    ));

    app.init_resource::<Captured>();
    app.add_systems(Update, capture_events);
    app
}

/// Installs a forest with the given bushes and weeds and puts the player in it.
fn install_forest(app: &mut App, bushes: &[(BushVariety, IVec2)], weeds: &[IVec2]) {
    let mut rng = StdRng::seed_from_u64(99);
    let calendar = app.world().resource::<Calendar>().clone();
    let mut forest = GameLocation::new("Forest", 24, 24);
    for &tile in weeds {
        forest.objects.insert(tile, WorldObject::new("Weeds"));
    }
    for &(variety, tile) in bushes {
        let bush = CustomBush::new(tile, &forest, variety, &calendar, &mut rng);
        forest.large_features.push(bush);
    }
    let mut locations = Locations::default();
    locations.insert(forest);
    app.insert_resource(locations);
    app.world_mut().resource_mut::<PlayerState>().current_location = "Forest".to_string();
}

/// Runs Loading (which keeps an installed world) and enters Playing.
fn boot(app: &mut App) {
    app.update();
    app.update();
    assert_eq!(
        app.world().resource::<State<GameState>>().get(),
        &GameState::Playing
    );
}

fn forest(app: &App) -> &GameLocation {
    app.world()
        .resource::<Locations>()
        .get("Forest")
        .expect("forest installed")
}

fn nettles_in_forest(app: &App) -> usize {
    forest(app).large_features.iter().filter(|b| b.is_nettle()).count()
}

fn spread_weeds() -> Vec<IVec2> {
    (0..8).map(|i| IVec2::new(2 + i * 2, 10)).collect()
}

fn summer_day(app: &mut App, day: u8) {
    let mut calendar = app.world_mut().resource_mut::<Calendar>();
    calendar.season = Season::Summer;
    calendar.day = day;
}

fn end_day(app: &mut App) {
    let calendar = app.world().resource::<Calendar>().clone();
    app.world_mut().send_event(DayEndEvent {
        day: calendar.day,
        season: calendar.season,
        year: calendar.year,
    });
    app.update();
}

fn hit(app: &mut App, tool: ToolKind, tile: IVec2) {
    app.world_mut().send_event(ToolUseEvent {
        tool: Some(tool),
        explosion: 0,
        tile,
        location: None,
    });
    app.update();
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_seeds_sandbox_and_ticks() {
    let mut app = build_test_app();
    boot(&mut app);

    let locations = app.world().resource::<Locations>();
    for name in ["Farm", "Forest", "Mountain", "Woods", "Greenhouse"] {
        assert!(locations.get(name).is_some(), "missing {}", name);
    }

    // Smoke: run a small frame budget in Playing without panic.
    for _ in 0..120 {
        app.update();
    }
    let calendar = app.world().resource::<Calendar>();
    assert!(calendar.hour > 6 || calendar.minute > 0, "clock should move");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool hits
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_redberry_falls_on_second_hit() {
    let mut app = build_test_app();
    let tile = IVec2::new(4, 4);
    install_forest(&mut app, &[(BushVariety::Redberry, tile)], &[]);
    app.world_mut().resource_mut::<PlayerState>().foraging_level = 4;
    boot(&mut app);

    hit(&mut app, ToolKind::Axe, tile);
    assert_eq!(forest(&app).large_features.len(), 1);
    assert_eq!(forest(&app).large_features[0].health, 30);

    // The second box tile of the shrub counts too.
    hit(&mut app, ToolKind::Axe, tile + IVec2::X);
    assert!(forest(&app).large_features.is_empty());

    let particles = app
        .world_mut()
        .query::<&TemporarySprite>()
        .iter(app.world())
        .count();
    assert!(particles > 0, "leaf burst should be on screen");

    for _ in 0..4 {
        app.update();
    }
    let captured = app.world().resource::<Captured>();
    // 0 held + 4 / 4 foraging bonus
    assert_eq!(captured.debris.len(), 1);
    assert_eq!(captured.debris[0].item_id, "redberry");
    assert_eq!(captured.debris[0].location, "Forest");
    assert_eq!(captured.cue_count("treethud"), 1);
    assert_eq!(captured.cue_count("axchop"), 1);
    // One per hit plus the delayed one after the fall.
    assert_eq!(captured.cue_count("leafrustle"), 3);
    assert_eq!(forest(&app).debris.len(), 1);
}

#[test]
fn test_unlisted_tool_leaves_bush_alone() {
    let mut app = build_test_app();
    let tile = IVec2::new(4, 4);
    install_forest(&mut app, &[(BushVariety::Nettle, tile)], &[]);
    boot(&mut app);

    hit(&mut app, ToolKind::Pickaxe, tile);
    app.update();
    assert_eq!(forest(&app).large_features.len(), 1);
    assert!(app.world().resource::<Captured>().sfx.is_empty());

    hit(&mut app, ToolKind::Scythe, tile);
    app.update();
    assert!(forest(&app).large_features.is_empty());
    let captured = app.world().resource::<Captured>();
    assert_eq!(captured.debris.len(), 1);
    assert_eq!(captured.debris[0].item_id, "nettles");
    assert_eq!(captured.cue_count("treethud"), 0);
}

#[test]
fn test_hits_in_other_locations_stay_there() {
    let mut app = build_test_app();
    let tile = IVec2::new(4, 4);
    install_forest(&mut app, &[(BushVariety::Nettle, tile)], &[]);
    boot(&mut app);

    app.world_mut().send_event(ToolUseEvent {
        tool: Some(ToolKind::Scythe),
        explosion: 0,
        tile,
        location: Some("Nowhere".to_string()),
    });
    app.update();
    assert_eq!(forest(&app).large_features.len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Touching nettles
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_nettle_sting_hurts_once_per_touch_and_keeps_one_buff() {
    let mut app = build_test_app();
    let tile = IVec2::new(6, 6);
    install_forest(&mut app, &[(BushVariety::Nettle, tile)], &[]);
    boot(&mut app);

    for _ in 0..2 {
        app.world_mut().send_event(InteractEvent {
            tile,
            location: None,
        });
        app.update();
    }

    let player = app.world().resource::<PlayerState>();
    assert_eq!(player.health, MAX_HEALTH - 2 * hedgerow::bushes::NETTLES_DAMAGE);
    let buffs = app.world().resource::<ActiveBuffs>();
    assert_eq!(buffs.count_from(NETTLE_BUFF_SOURCE), 1);
    assert!(buffs.buffs[0].minutes_remaining <= 10);
    assert!(!forest(&app).large_features[0].sway.is_at_rest());
}

#[test]
fn test_redberry_touch_does_not_hurt() {
    let mut app = build_test_app();
    let tile = IVec2::new(6, 6);
    install_forest(&mut app, &[(BushVariety::Redberry, tile)], &[]);
    boot(&mut app);

    app.world_mut().send_event(InteractEvent {
        tile,
        location: None,
    });
    app.update();
    app.update();

    assert_eq!(app.world().resource::<PlayerState>().health, MAX_HEALTH);
    assert!(app.world().resource::<ActiveBuffs>().buffs.is_empty());
    assert_eq!(app.world().resource::<Captured>().cue_count("leafrustle"), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Overnight passes
// ─────────────────────────────────────────────────────────────────────────────

fn certain_spawn_config(app: &mut App, range: (i32, i32)) {
    let mut config = app.world_mut().resource_mut::<HedgerowConfig>();
    config.nettle_locations = vec!["Forest".to_string()];
    config.nettle_daily_chance_per_location = 1.0;
    config.nettles_added_range = range;
}

#[test]
fn test_new_summer_day_spawns_nettles_by_weeds() {
    let mut app = build_test_app();
    install_forest(&mut app, &[], &spread_weeds());
    certain_spawn_config(&mut app, (3, 4));
    boot(&mut app);
    summer_day(&mut app, 5);

    end_day(&mut app);

    assert_eq!(app.world().resource::<Calendar>().day, 6);
    assert_eq!(nettles_in_forest(&app), 3);
}

#[test]
fn test_duplicate_day_end_runs_the_pass_once() {
    let mut app = build_test_app();
    install_forest(&mut app, &[], &spread_weeds());
    certain_spawn_config(&mut app, (3, 4));
    boot(&mut app);
    summer_day(&mut app, 5);

    let calendar = app.world().resource::<Calendar>().clone();
    for _ in 0..2 {
        app.world_mut().send_event(DayEndEvent {
            day: calendar.day,
            season: calendar.season,
            year: calendar.year,
        });
    }
    app.update();

    assert_eq!(app.world().resource::<Calendar>().days_played, 1);
    assert_eq!(nettles_in_forest(&app), 3);
}

#[test]
fn test_clients_do_not_spawn_overnight() {
    let mut app = build_test_app();
    install_forest(&mut app, &[], &spread_weeds());
    certain_spawn_config(&mut app, (3, 4));
    app.insert_resource(NetRole::Client);
    boot(&mut app);
    summer_day(&mut app, 5);

    end_day(&mut app);
    assert_eq!(nettles_in_forest(&app), 0);
}

#[test]
fn test_disabled_nettles_are_cleared_overnight() {
    let mut app = build_test_app();
    install_forest(
        &mut app,
        &[
            (BushVariety::Nettle, IVec2::new(1, 1)),
            (BushVariety::Redberry, IVec2::new(5, 5)),
            (BushVariety::Nettle, IVec2::new(9, 9)),
        ],
        &[],
    );
    certain_spawn_config(&mut app, (3, 4));
    app.world_mut().resource_mut::<HedgerowConfig>().nettles_enabled = false;
    boot(&mut app);

    end_day(&mut app);

    let features = &forest(&app).large_features;
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].variety, BushVariety::Redberry);
}

#[test]
fn test_clear_request_removes_only_nettles() {
    let mut app = build_test_app();
    install_forest(
        &mut app,
        &[
            (BushVariety::Redberry, IVec2::new(5, 5)),
            (BushVariety::Nettle, IVec2::new(9, 9)),
        ],
        &[],
    );
    certain_spawn_config(&mut app, (3, 4));
    boot(&mut app);

    app.world_mut().send_event(ClearNettlesEvent);
    app.update();

    assert_eq!(nettles_in_forest(&app), 0);
    assert_eq!(forest(&app).large_features.len(), 1);
}

#[test]
fn test_season_change_rederives_redberry_look() {
    let mut app = build_test_app();
    install_forest(&mut app, &[(BushVariety::Redberry, IVec2::new(5, 5))], &[]);
    app.world_mut().resource_mut::<HedgerowConfig>().nettle_locations.clear();
    boot(&mut app);
    {
        let mut calendar = app.world_mut().resource_mut::<Calendar>();
        calendar.day = DAYS_PER_SEASON;
    }
    if let Some(forest) = app.world_mut().resource_mut::<Locations>().get_mut("Forest") {
        forest.large_features[0].sprite_offset = 1;
    }

    end_day(&mut app);

    let calendar = app.world().resource::<Calendar>();
    assert_eq!(calendar.season, Season::Summer);
    assert_eq!(calendar.day, 1);
    // Day one of summer is not a bloom day, so the sprite load resets it.
    let redberry = &forest(&app).large_features[0];
    assert_eq!(redberry.sprite_offset, 0);
    assert_eq!(redberry.source_rect().min.x, 32);
}
