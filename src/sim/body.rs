//! Shared motion state for everything that flies
//!
//! A [`Body`] holds position, velocity and arena bounds. Balls and players
//! embed one and get the steering/integration behaviour through the
//! [`Movable`] trait.

use glam::Vec2;
use serde::Serialize;

use crate::consts::*;
use crate::frame_scale;

/// Position, velocity and arena limits of a moving entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Body {
    /// Top-left corner, sub-pixel
    pub pos: Vec2,
    /// Where `reset()` puts the entity back
    pub init_pos: Vec2,
    /// Pixels per reference frame
    pub vel: Vec2,
    /// Width and height of the bounding box
    pub size: Vec2,
    pub accel: f32,
    pub max_speed: f32,
    /// Arena top-left
    pub min: Vec2,
    /// Arena bottom-right
    pub max: Vec2,
    /// Set while a pass is in flight; cleared by any wall contact
    pub pass_through: bool,
    /// Whether `down()` has any effect
    pub dive: bool,
    /// Timestamp of the last periodic decision
    pub last_decision_ms: u64,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2, arena: Vec2) -> Self {
        Self {
            pos,
            init_pos: pos,
            vel: Vec2::ZERO,
            size,
            accel: DEFAULT_ACCEL,
            max_speed: DEFAULT_MAX_SPEED,
            min: Vec2::ZERO,
            max: arena,
            pass_through: false,
            dive: true,
            last_decision_ms: 0,
        }
    }

    /// Integrate velocity over `elapsed_ms`, apply drift, then clamp to the arena
    pub fn integrate(&mut self, elapsed_ms: f32) {
        let scale = frame_scale(elapsed_ms);
        self.pos += self.vel * scale;
        if self.vel.y < GRAVITY_CUTOFF {
            self.vel.y += GRAVITY * scale;
        }
        self.bounds();
    }

    /// Integrate without drift (destination seeking)
    pub fn glide(&mut self, elapsed_ms: f32) {
        self.pos += self.vel * frame_scale(elapsed_ms);
        self.bounds();
    }

    /// Clamp into the arena. Side walls and the ceiling bounce; the floor stops.
    ///
    /// Returns true if any edge was hit.
    pub fn bounds(&mut self) -> bool {
        let mut hit = false;
        let limit = self.max - self.size;

        if self.pos.x < self.min.x {
            self.pos.x = self.min.x;
            self.vel.x = -self.vel.x;
            hit = true;
        }
        if self.pos.x > limit.x {
            self.pos.x = limit.x;
            self.vel.x = -self.vel.x;
            hit = true;
        }
        if self.pos.y < self.min.y {
            self.pos.y = self.min.y;
            self.vel.y = -self.vel.y;
            if self.vel.y == 0.0 {
                self.vel.y += CEILING_NUDGE;
            }
            hit = true;
        }
        if self.pos.y > limit.y {
            self.pos.y = limit.y;
            self.vel = Vec2::ZERO;
            hit = true;
        }

        if hit {
            self.pass_through = false;
        }
        hit
    }

    pub fn left(&mut self) {
        self.vel.x = (self.vel.x - self.accel).max(-self.max_speed);
    }

    pub fn right(&mut self) {
        self.vel.x = (self.vel.x + self.accel).min(self.max_speed);
    }

    pub fn up(&mut self) {
        self.vel.y = (self.vel.y - self.accel).max(-self.max_speed);
    }

    pub fn down(&mut self) {
        if !self.dive {
            return;
        }
        self.vel.y = (self.vel.y + self.accel).min(self.max_speed);
    }

    pub fn reset(&mut self) {
        self.pos = self.init_pos;
        self.vel = Vec2::ZERO;
    }

    /// True once per decision interval; records `now` when it fires
    pub fn decision_due(&mut self, now: u64) -> bool {
        if now.saturating_sub(self.last_decision_ms) >= DECISION_INTERVAL_MS {
            self.last_decision_ms = now;
            true
        } else {
            false
        }
    }

    /// Lowest y the box can reach
    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.max.y - self.size.y
    }
}

/// Capability set shared by balls and players
pub trait Movable {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn pos(&self) -> Vec2 {
        self.body().pos
    }

    fn vel(&self) -> Vec2 {
        self.body().vel
    }

    fn size(&self) -> Vec2 {
        self.body().size
    }

    fn left(&mut self) {
        self.body_mut().left();
    }

    fn right(&mut self) {
        self.body_mut().right();
    }

    fn up(&mut self) {
        self.body_mut().up();
    }

    fn down(&mut self) {
        self.body_mut().down();
    }

    fn reset(&mut self) {
        self.body_mut().reset();
    }

    fn bounds(&mut self) -> bool {
        self.body_mut().bounds()
    }
}

impl Movable for Body {
    fn body(&self) -> &Body {
        self
    }

    fn body_mut(&mut self) -> &mut Body {
        self
    }
}
