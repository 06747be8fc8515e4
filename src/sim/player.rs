//! Players on broomsticks
//!
//! A player is steered by held keys, by the built-in robot, or by a pointer
//! destination. Keys arrive as abstract [`Action`]s; which physical key maps
//! to which action is the input layer's business.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{Body, Movable};
use super::state::Side;
use crate::consts::*;
use crate::frame_scale;

/// Abstract per-player input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Cycle the cosmetic model
    SwitchModel,
    /// Hand control to the robot, or take it back
    ToggleAi,
    /// Pass to the teammate when carrying the ball
    Pass,
}

/// Which way a sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Facing {
    Left,
    Right,
}

/// When each direction key went down, if it is still held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeldKeys {
    pub up: Option<u64>,
    pub down: Option<u64>,
    pub left: Option<u64>,
    pub right: Option<u64>,
}

impl HeldKeys {
    fn slot(&mut self, action: Action) -> Option<&mut Option<u64>> {
        match action {
            Action::Up => Some(&mut self.up),
            Action::Down => Some(&mut self.down),
            Action::Left => Some(&mut self.left),
            Action::Right => Some(&mut self.right),
            _ => None,
        }
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A player entity
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub body: Body,
    pub side: Side,
    model: u8,
    robot: bool,
    /// Robot decision spread: lower acts more often
    skill: u32,
    /// Ball index the robot chases
    target: Option<usize>,
    held: HeldKeys,
    /// Pointer target while in destination mode
    dest: Option<Vec2>,
    pass_requested: bool,
}

impl Player {
    pub fn new(side: Side, model: u8, pos: Vec2, arena: Vec2) -> Self {
        Self {
            body: Body::new(pos, Vec2::splat(PLAYER_SIZE), arena),
            side,
            model: model % PLAYER_MODELS,
            robot: false,
            skill: DEFAULT_SKILL,
            target: None,
            held: HeldKeys::default(),
            dest: None,
            pass_requested: false,
        }
    }

    pub fn model(&self) -> u8 {
        self.model
    }

    pub fn set_model(&mut self, model: u8) {
        self.model = model % PLAYER_MODELS;
    }

    pub fn switch_model(&mut self) {
        self.model = (self.model + 1) % PLAYER_MODELS;
    }

    pub fn is_robot(&self) -> bool {
        self.robot
    }

    pub fn set_robot(&mut self, robot: bool) {
        self.robot = robot;
    }

    /// Flip robot control; the horizontal drift stops either way
    pub fn toggle_robot(&mut self) {
        self.robot = !self.robot;
        self.body.vel.x = 0.0;
        log::debug!("{:?} player robot={}", self.side, self.robot);
    }

    pub fn skill(&self) -> u32 {
        self.skill
    }

    pub fn set_skill(&mut self, skill: u32) {
        self.skill = skill.clamp(SKILL_MIN, SKILL_MAX);
    }

    /// Lower the skill value, so the robot acts more often
    pub fn smarter(&mut self) {
        self.set_skill(self.skill.saturating_sub(SKILL_STEP));
    }

    /// Raise the skill value, so the robot acts less often
    pub fn dumber(&mut self) {
        self.set_skill(self.skill + SKILL_STEP);
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn set_target(&mut self, ball: Option<usize>) {
        self.target = ball;
    }

    pub fn held_keys(&self) -> HeldKeys {
        self.held
    }

    pub fn destination(&self) -> Option<Vec2> {
        self.dest
    }

    pub fn pass_requested(&self) -> bool {
        self.pass_requested
    }

    pub fn request_pass(&mut self) {
        self.pass_requested = true;
    }

    pub fn clear_pass(&mut self) {
        self.pass_requested = false;
    }

    /// Sprite facing, from horizontal velocity or the team's default
    pub fn facing(&self) -> Facing {
        if self.body.vel.x > 0.0 {
            Facing::Right
        } else if self.body.vel.x < 0.0 {
            Facing::Left
        } else {
            match self.side {
                Side::Left => Facing::Right,
                Side::Right => Facing::Left,
            }
        }
    }

    /// Climbing sprite while moving up
    pub fn is_climbing(&self) -> bool {
        self.body.vel.y < 0.0
    }

    /// Apply one key transition
    pub fn handle_action(&mut self, action: Action, pressed: bool, now: u64) {
        if !pressed {
            if let Some(held) = self.held.slot(action) {
                *held = None;
            }
            return;
        }

        if let Some(held) = self.held.slot(action) {
            held.get_or_insert(now);
        }

        if self.robot {
            match action {
                Action::Left => self.dumber(),
                Action::Right => self.smarter(),
                Action::ToggleAi => self.toggle_robot(),
                Action::Pass => self.request_pass(),
                _ => {}
            }
            return;
        }

        let steering = self.dest.is_none();
        match action {
            Action::Up if steering => self.up(),
            Action::Down if steering => self.down(),
            Action::Left if steering => self.left(),
            Action::Right if steering => self.right(),
            Action::ToggleAi => {
                self.robot = true;
                log::debug!("{:?} player robot=true", self.side);
            }
            Action::SwitchModel => self.switch_model(),
            Action::Pass => self.request_pass(),
            _ => {}
        }
    }

    /// Key handling on the title screen
    ///
    /// Setup keys (model, robot, robot skill) work; nothing starts moving.
    pub fn handle_idle_action(&mut self, action: Action, pressed: bool) {
        if !pressed {
            if let Some(held) = self.held.slot(action) {
                *held = None;
            }
            return;
        }

        match action {
            Action::ToggleAi => self.toggle_robot(),
            Action::SwitchModel if !self.robot => self.switch_model(),
            Action::Left if self.robot => self.dumber(),
            Action::Right if self.robot => self.smarter(),
            _ => {}
        }
    }

    /// Head for a pointer position at full speed
    ///
    /// Returns false (and leaves the player alone) if already there.
    pub fn set_dest(&mut self, target: Vec2) -> bool {
        let delta = target - self.body.pos;
        let dist = delta.length();
        if dist <= f32::EPSILON {
            return false;
        }
        self.body.vel = delta / dist * self.body.max_speed;
        self.dest = Some(target);
        true
    }

    /// Knock the player out of the air
    ///
    /// Players already near the floor stay put. Returns true if displaced.
    pub fn bump(&mut self) -> bool {
        if self.body.pos.y >= self.body.max.y - BUMP_GROUND_MARGIN {
            return false;
        }
        // Next bounds pass lands the player on the floor
        self.body.pos.y = BUMP_DROP_Y;
        self.dest = None;
        true
    }

    /// Advance one tick
    ///
    /// `team_has_ball` is this player's team possession from the last catch
    /// check; `target` is the tracked ball's position.
    pub fn step<R: Rng>(
        &mut self,
        elapsed_ms: f32,
        now: u64,
        team_has_ball: bool,
        target: Option<Vec2>,
        rng: &mut R,
    ) {
        if let Some(dest) = self.dest {
            self.body.glide(elapsed_ms);
            let remaining = (dest - self.body.pos).length();
            if remaining < self.body.max_speed * frame_scale(elapsed_ms) {
                self.dest = None;
            }
            if self.body.vel == Vec2::ZERO {
                self.dest = None;
            }
            return;
        }

        if self.robot {
            if let Some(target) = target.filter(|_| self.target.is_some()) {
                if self.body.decision_due(now) {
                    let choices = self.skill / 2 + 1;
                    if rng.random_range(0..choices) == 0 {
                        self.think(team_has_ball, target);
                    }
                }
            }
        } else {
            let held = self.held;
            let repeating = |since: Option<u64>| {
                since.is_some_and(|t| now.saturating_sub(t) > KEY_REPEAT_DELAY_MS)
            };
            if repeating(held.up) {
                self.up();
            }
            if repeating(held.down) {
                self.down();
            }
            if repeating(held.left) {
                self.left();
            }
            if repeating(held.right) {
                self.right();
            }
        }

        self.body.integrate(elapsed_ms);
    }

    /// One robot decision
    fn think(&mut self, team_has_ball: bool, target: Vec2) {
        let pos = self.body.pos;
        let mid_height = self.body.max.y / 2.0 - AI_ALIGN_TOLERANCE;

        if team_has_ball {
            match self.side {
                Side::Left => {
                    if pos.x < self.body.max.x - AI_GOAL_MARGIN {
                        self.right();
                    }
                }
                Side::Right => {
                    if pos.x > AI_GOAL_MARGIN {
                        self.left();
                    }
                }
            }
            if pos.y > mid_height {
                self.up();
            }
            return;
        }

        if target.y < pos.y {
            self.up();
        }
        if (target.y - pos.y).abs() < AI_CHASE_RANGE {
            if target.x < pos.x - AI_ALIGN_TOLERANCE {
                self.left();
            } else if target.x > pos.x + AI_ALIGN_TOLERANCE {
                self.right();
            }
        }
        if target.y > pos.y {
            self.down();
        }
    }
}

impl Movable for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn reset(&mut self) {
        self.body.reset();
        self.dest = None;
        self.held.clear();
        self.pass_requested = false;
    }
}
