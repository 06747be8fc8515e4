//! Simulation module
//!
//! All gameplay logic lives here. This module must stay a pure function of
//! (state, input, elapsed time, timestamp):
//! - No clock reads: the caller supplies `elapsed_ms` and `now`
//! - One seeded RNG owned by the match
//! - Stable iteration order (players by slot, then balls)
//! - No rendering or platform dependencies

pub mod ball;
pub mod body;
pub mod collision;
pub mod player;
pub mod state;
pub mod tick;

pub use ball::{Ball, BallKind};
pub use body::{Body, Movable};
pub use player::{Action, Facing, HeldKeys, Player};
pub use state::{
    GameEvent, GamePhase, GameState, MatchResult, PLAYER_SLOTS, Side, teammate_of,
};
pub use tick::{ActionEvent, DestRequest, TickInput, tick};

/// Read-only view of any entity, for renderers that draw everything in one pass
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Player(&'a Player),
    Ball(&'a Ball),
}

impl Entity<'_> {
    pub fn body(&self) -> &Body {
        match self {
            Entity::Player(p) => &p.body,
            Entity::Ball(b) => &b.body,
        }
    }

    /// Sprite id
    pub fn model(&self) -> u8 {
        match self {
            Entity::Player(p) => p.model(),
            Entity::Ball(b) => b.model(),
        }
    }

    /// Hidden gold balls are not drawn
    pub fn visible(&self) -> bool {
        match self {
            Entity::Player(_) => true,
            Entity::Ball(b) => b.alive,
        }
    }
}

impl GameState {
    /// Active players then balls, in draw order
    pub fn entities(&self) -> impl Iterator<Item = Entity<'_>> {
        self.active_players()
            .iter()
            .map(Entity::Player)
            .chain(self.balls.iter().map(Entity::Ball))
    }
}
