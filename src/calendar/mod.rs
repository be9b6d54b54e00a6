//! Calendar domain: the clock every wild plant grows by.
//!
//! Responsible for:
//! - Advancing game time (minutes, hours)
//! - Requesting the end of the day at 2 AM
//! - Advancing day/season/year when a DayEndEvent arrives, from any sender
//! - Sending SeasonChangeEvent on season rollover
//! - Pausing / unpausing time based on GameState

use bevy::prelude::*;

use crate::shared::*;

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app
            // Pause time whenever we leave Playing state
            .add_systems(OnEnter(GameState::Playing), resume_time)
            .add_systems(OnExit(GameState::Playing), pause_time)
            // Core time tick: only runs while Playing and NOT paused
            .add_systems(
                Update,
                tick_time
                    .run_if(in_state(GameState::Playing))
                    .run_if(time_not_paused),
            )
            // The event can also come from outside (sleeping, tests), so the
            // rollover runs regardless of the pause flag.
            .add_systems(
                Update,
                process_day_end
                    .run_if(in_state(GameState::Playing))
                    .after(tick_time),
            );
    }
}

// ─── Run Conditions ───────────────────────────────────────────────────────────

fn time_not_paused(calendar: Res<Calendar>) -> bool {
    !calendar.time_paused
}

// ─── State transition hooks ───────────────────────────────────────────────────

fn resume_time(mut calendar: ResMut<Calendar>) {
    calendar.time_paused = false;
    info!("[Calendar] Time resumed at {}:{:02} Day {} {:?} Year {}",
        calendar.hour, calendar.minute, calendar.day, calendar.season, calendar.year);
}

fn pause_time(mut calendar: ResMut<Calendar>) {
    calendar.time_paused = true;
    info!("[Calendar] Time paused");
}

// ─── Main time-tick system ────────────────────────────────────────────────────

/// Accumulates real delta-seconds and converts them to in-game minutes.
///
/// Default time_scale = 10.0, meaning 1 real second = 10 game-minutes.
/// At 2:00 AM (hour 26) a DayEndEvent is sent and the tick stops for this
/// frame; `process_day_end` performs the actual rollover.
pub fn tick_time(
    time: Res<Time>,
    mut calendar: ResMut<Calendar>,
    mut day_end_writer: EventWriter<DayEndEvent>,
) {
    calendar.elapsed_real_seconds += time.delta_secs();

    // Guard against zero / negative time_scale
    let secs_per_game_minute = if calendar.time_scale > 0.0 {
        1.0 / calendar.time_scale
    } else {
        1.0 / 10.0
    };

    while calendar.elapsed_real_seconds >= secs_per_game_minute {
        calendar.elapsed_real_seconds -= secs_per_game_minute;
        if advance_one_minute(&mut calendar) {
            day_end_writer.send(DayEndEvent {
                day: calendar.day,
                season: calendar.season,
                year: calendar.year,
            });
            calendar.elapsed_real_seconds = 0.0;
            break;
        }
    }
}

/// Advances the clock by one game-minute. Returns true once the day is over.
pub fn advance_one_minute(calendar: &mut Calendar) -> bool {
    if calendar.hour >= 26 {
        return true;
    }
    calendar.minute += 1;
    if calendar.minute >= 60 {
        calendar.minute = 0;
        calendar.hour += 1;
    }
    calendar.hour >= 26
}

/// Moves the calendar to 6:00 AM of the next day. Returns the new season
/// when the day rollover also crossed a season boundary.
pub fn advance_day(calendar: &mut Calendar) -> Option<Season> {
    calendar.day += 1;
    calendar.hour = 6;
    calendar.minute = 0;
    calendar.elapsed_real_seconds = 0.0;
    calendar.days_played += 1;

    if calendar.day <= DAYS_PER_SEASON {
        return None;
    }

    calendar.day = 1;
    calendar.season = calendar.season.next();
    // Year rollover happens when Spring begins again
    if calendar.season == Season::Spring {
        calendar.year += 1;
    }
    Some(calendar.season)
}

// ─── Day-end event relay ──────────────────────────────────────────────────────

/// Reads DayEndEvent and advances the calendar, emitting SeasonChangeEvent on
/// rollover. Events describing a day the calendar already left are ignored so
/// a duplicate request cannot skip a day.
pub fn process_day_end(
    mut day_end_reader: EventReader<DayEndEvent>,
    mut season_writer: EventWriter<SeasonChangeEvent>,
    mut calendar: ResMut<Calendar>,
) {
    for event in day_end_reader.read() {
        let stale = event.day != calendar.day
            || event.season != calendar.season
            || event.year != calendar.year;
        if stale {
            warn!(
                "[Calendar] Ignoring stale DayEndEvent for Day {} {:?} Year {}",
                event.day, event.season, event.year
            );
            continue;
        }

        let old_season = calendar.season;
        if let Some(new_season) = advance_day(&mut calendar) {
            info!(
                "[Calendar] Season changed: {:?} -> {:?} (Year {})",
                old_season, new_season, calendar.year
            );
            season_writer.send(SeasonChangeEvent {
                new_season,
                year: calendar.year,
            });
        }

        info!(
            "[Calendar] New day: Day {} {:?} Year {} (day {} played)",
            calendar.day, calendar.season, calendar.year, calendar.days_played
        );
    }
}
