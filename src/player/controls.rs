use bevy::input::ButtonInput;
use bevy::prelude::*;
use crate::shared::*;
use crate::world::Locations;
use super::{facing_offset, PlayerControl, ToolCooldown, TOOL_ORDER};

/// Cycle the equipped tool forward (E) or backward (Q).
pub fn tool_cycle(keyboard: Res<ButtonInput<KeyCode>>, mut control: ResMut<PlayerControl>) {
    let current_idx = TOOL_ORDER
        .iter()
        .position(|t| *t == control.tool)
        .unwrap_or(0);

    if keyboard.just_pressed(KeyCode::KeyE) {
        let next = (current_idx + 1) % TOOL_ORDER.len();
        control.tool = TOOL_ORDER[next];
        info!("[Player] Equipped {:?}", control.tool);
    }

    if keyboard.just_pressed(KeyCode::KeyQ) {
        let prev = if current_idx == 0 {
            TOOL_ORDER.len() - 1
        } else {
            current_idx - 1
        };
        control.tool = TOOL_ORDER[prev];
        info!("[Player] Equipped {:?}", control.tool);
    }
}

/// One tile per arrow-key press. Tab hops to the next location.
pub fn player_step(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut control: ResMut<PlayerControl>,
    mut player_state: ResMut<PlayerState>,
    locations: Res<Locations>,
) {
    let pressed = [
        (KeyCode::ArrowUp, Facing::Up),
        (KeyCode::ArrowDown, Facing::Down),
        (KeyCode::ArrowLeft, Facing::Left),
        (KeyCode::ArrowRight, Facing::Right),
    ]
    .into_iter()
    .find(|(key, _)| keyboard.just_pressed(*key));

    if let Some((_, facing)) = pressed {
        control.facing = facing;
        let target = player_state.tile + facing_offset(facing);
        let walkable = locations
            .get(&player_state.current_location)
            .is_some_and(|loc| loc.is_open(target));
        if walkable {
            player_state.tile = target;
        }
    }

    if keyboard.just_pressed(KeyCode::Tab) {
        let mut names: Vec<&String> = locations.by_name.keys().collect();
        names.sort();
        let current = names
            .iter()
            .position(|n| **n == player_state.current_location)
            .unwrap_or(0);
        if let Some(next) = names.get((current + 1) % names.len().max(1)) {
            player_state.current_location = (*next).clone();
            info!("[Player] Walked to {}", player_state.current_location);
        }
    }
}

/// Swing the equipped tool at the faced tile (Space).
pub fn tool_use(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    control: Res<PlayerControl>,
    player_state: Res<PlayerState>,
    mut cooldown: ResMut<ToolCooldown>,
    mut tool_events: EventWriter<ToolUseEvent>,
) {
    cooldown.timer.tick(time.delta());
    if !keyboard.just_pressed(KeyCode::Space) || !cooldown.timer.finished() {
        return;
    }
    cooldown.timer.reset();
    tool_events.send(ToolUseEvent {
        tool: Some(control.tool),
        explosion: 0,
        tile: player_state.tile + facing_offset(control.facing),
        location: None,
    });
}

/// Touch whatever is on the faced tile (F).
pub fn interact(
    keyboard: Res<ButtonInput<KeyCode>>,
    control: Res<PlayerControl>,
    player_state: Res<PlayerState>,
    mut interact_events: EventWriter<InteractEvent>,
) {
    if keyboard.just_pressed(KeyCode::KeyF) {
        interact_events.send(InteractEvent {
            tile: player_state.tile + facing_offset(control.facing),
            location: None,
        });
    }
}
