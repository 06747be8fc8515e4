//! Broomsticks - a 2D arcade ball game on broomsticks
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (movement, bounds, catching, scoring, AI)
//! - `input`: Key bindings and key-to-action translation per player slot
//! - `settings`: Flat `key value` configuration file
//!
//! Rendering, windowing and audio are left to the embedding platform. The
//! simulation exposes read-only accessors and a stream of [`sim::GameEvent`]s.

pub mod input;
pub mod settings;
pub mod sim;

pub use input::{Action, InputMap, Key, KeyBindings, MatchCommand};
pub use settings::{ScreenMode, Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Reference frame length: velocities are pixels per 40 ms (25 fps)
    pub const REFERENCE_FRAME_MS: f32 = 40.0;
    /// Longest frame the simulation will integrate in one tick
    pub const MAX_ELAPSED_MS: f32 = 100.0;
    /// Wall-clock interval between AI / wandering decisions
    pub const DECISION_INTERVAL_MS: u64 = 100;

    /// Downward drift added per reference frame
    pub const GRAVITY: f32 = 0.1;
    /// Gravity only applies while vy is below this
    pub const GRAVITY_CUTOFF: f32 = 2.0;
    /// Nudge applied when a ceiling bounce leaves vy at exactly zero
    pub const CEILING_NUDGE: f32 = 0.1;

    /// Default movement tuning
    pub const DEFAULT_ACCEL: f32 = 2.0;
    pub const DEFAULT_MAX_SPEED: f32 = 6.0;

    /// Player sprite box
    pub const PLAYER_SIZE: f32 = 38.0;
    /// Red/black ball box
    pub const BALL_SIZE: f32 = 16.0;
    /// Gold ball box
    pub const GOLD_BALL_SIZE: f32 = 8.0;

    /// Hold time before a held direction key starts repeating
    pub const KEY_REPEAT_DELAY_MS: u64 = 300;

    /// AI skill range (lower value acts more often)
    pub const SKILL_MIN: u32 = 1;
    pub const SKILL_MAX: u32 = 30;
    pub const SKILL_STEP: u32 = 5;
    pub const DEFAULT_SKILL: u32 = 6;
    /// AI steers for goal until this close to the side wall
    pub const AI_GOAL_MARGIN: f32 = 50.0;
    /// AI only chases horizontally when the ball is this close vertically
    pub const AI_CHASE_RANGE: f32 = 100.0;
    /// AI horizontal dead zone around the ball
    pub const AI_ALIGN_TOLERANCE: f32 = 10.0;

    /// Number of cosmetic player models (ids wrap at this)
    pub const PLAYER_MODELS: u8 = 5;
    /// Ball model ids
    pub const GOLD_MODEL: u8 = 0;
    pub const BLACK_MODEL: u8 = 1;
    pub const RED_MODEL: u8 = 2;

    /// Wandering balls get pushed up when within this of the floor
    pub const BALL_FLOOR_MARGIN: f32 = 90.0;
    /// Wandering draws one of this many choices (3 of them move)
    pub const BALL_WANDER_CHOICES: u32 = 10;
    /// Gold ball flees players closer than this on both axes
    pub const GOLD_EVADE_RANGE: f32 = 100.0;

    /// Player-to-ball offset of the catch box
    pub const HAND_OFFSET: f32 = 8.0;
    /// Half-width of the catch / black-ball box
    pub const CATCH_RANGE: f32 = 20.0;
    /// Ball x offset when carried by a player facing right
    pub const CARRY_OFFSET_RIGHT: f32 = 18.0;
    /// Ball x offset when carried otherwise
    pub const CARRY_OFFSET_LEFT: f32 = 8.0;
    /// Ball y offset when carried
    pub const CARRY_OFFSET_Y: f32 = 15.0;

    /// Inset applied to player boxes in player-player collisions
    pub const BUMP_TOLERANCE: f32 = 10.0;
    /// Bumped players are sent here and land on the next bounds pass
    pub const BUMP_DROP_Y: f32 = 10000.0;
    /// Players this close to the floor cannot be bumped
    pub const BUMP_GROUND_MARGIN: f32 = 40.0;

    /// Pass speed in pixels per reference frame
    pub const PASS_SPEED: f32 = 8.0;
    /// Pass release lead, in frames of pass velocity
    pub const PASS_LEAD_FRAMES: f32 = 6.0;
    /// Pass jitter is drawn from 0..PASS_JITTER pixels per axis
    pub const PASS_JITTER: u32 = 5;

    /// Distance from the side wall that counts as reaching the goal
    pub const GOAL_MARGIN: f32 = 17.0;
    /// Half-height of the goal mouth around mid-height
    pub const GOAL_MOUTH: f32 = 20.0;
    /// Points for carrying a red ball into the goal
    pub const GOAL_POINTS: u32 = 10;
    /// Ticks the post-score timer runs
    pub const SCORE_TIMER_TICKS: u32 = 15;
    /// Score flash duration for the renderer
    pub const SCORE_FLASH_MS: u32 = 300;
}

/// Convert elapsed milliseconds into reference frames
#[inline]
pub fn frame_scale(elapsed_ms: f32) -> f32 {
    elapsed_ms / consts::REFERENCE_FRAME_MS
}
