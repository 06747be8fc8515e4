//! Frame-driven simulation tick
//!
//! The platform calls [`tick`] once per rendered frame with the time since the
//! previous frame and the current timestamp. Nothing in here reads a clock.

use glam::Vec2;

use super::player::Action;
use super::state::{GamePhase, GameState};
use crate::consts::*;

/// A key transition routed to one player slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEvent {
    pub player: usize,
    pub action: Action,
    pub pressed: bool,
}

/// A pointer/touch request to fly a player somewhere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestRequest {
    pub player: usize,
    pub target: Vec2,
}

/// Input queued by the platform since the last tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub actions: Vec<ActionEvent>,
    pub destinations: Vec<DestRequest>,
    /// Start a match (ignored while one is running)
    pub start: bool,
    /// Switch between 1-on-1 and 2-on-2
    pub toggle_team_size: bool,
}

/// Advance the match by one frame
pub fn tick(state: &mut GameState, input: &TickInput, elapsed_ms: f32, now: u64) {
    state.events.clear();

    if input.toggle_team_size {
        state.toggle_num_players();
    }

    let n = state.num_players();
    if state.phase == GamePhase::Idle {
        // Title screen: players can still be set up before kickoff
        for event in input.actions.iter().filter(|e| e.player < n) {
            state.players[event.player].handle_idle_action(event.action, event.pressed);
        }
        if input.start {
            state.start(now);
        }
        return;
    }

    let elapsed_ms = elapsed_ms.clamp(0.0, MAX_ELAPSED_MS);

    for event in &input.actions {
        if event.player < n {
            state.players[event.player].handle_action(event.action, event.pressed, now);
        }
    }
    for request in &input.destinations {
        if request.player < n {
            state.players[request.player].set_dest(request.target);
        }
    }

    state.check_gold_release(now);
    state.move_flyers(elapsed_ms, now);
    state.check_collisions();
    let winner = state.check_caught();
    state.update_timers(elapsed_ms);

    if let Some(side) = winner {
        state.finish(side);
    }
}
