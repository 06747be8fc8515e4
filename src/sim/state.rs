//! Match state and the per-frame controller steps
//!
//! `GameState` owns every player and ball, the scores and the match phase.
//! The steps here (`move_flyers`, `check_collisions`, `check_caught`) are
//! sequenced by [`super::tick`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::ball::{Ball, BallKind};
use super::body::Movable;
use super::collision::{
    at_opposing_goal, ball_in_reach, carry_position, in_goal_mouth, players_overlap,
};
use super::player::Player;
use crate::consts::*;
use crate::settings::Settings;

/// Number of player slots; only the first `num_players` take part
pub const PLAYER_SLOTS: usize = 4;

/// Team side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    /// Defends the left goal, scores on the right
    Left,
    /// Defends the right goal, scores on the left
    Right,
}

impl Side {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Title screen, nothing moves
    Idle,
    /// Match running
    Playing,
}

/// Something the renderer or audio layer may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    /// A catchable ball was picked up (not just still held)
    Grab { player: usize, side: Side },
    /// Ball passed between teammates
    Pass { from: usize, to: usize },
    Score { side: Side, points: u32 },
    /// Match won; scores are the final ones before the reset
    Won { side: Side, scores: [u32; 2] },
    /// Player knocked to the floor
    Bump { player: usize },
    /// Gold balls came out of hiding
    GoldReleased,
}

/// How the last match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub winner: Side,
    pub scores: [u32; 2],
}

/// Fixed teammate pairing: 0 with 2, 1 with 3
pub fn teammate_of(player: usize) -> usize {
    assert!(player < PLAYER_SLOTS, "no teammate for player slot {player}");
    (player + 2) % PLAYER_SLOTS
}

/// Complete match state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Arena size in pixels
    pub arena: Vec2,
    pub phase: GamePhase,
    /// Active player count, 2 or 4
    num_players: usize,
    pub players: Vec<Player>,
    pub balls: Vec<Ball>,
    pub scores: [u32; 2],
    /// Per-team possession of a catchable ball, refreshed each catch check
    pub possession: [bool; 2],
    /// Ticks left on the post-score timer
    pub score_timer: u32,
    /// Per-team score flash remaining, for the renderer
    pub flash_ms: [u32; 2],
    pub win_score: u32,
    pub gold_points: u32,
    /// Match time before gold balls come out
    pub gold_delay_ms: u64,
    pub gold_released: bool,
    /// Timestamp the current match started
    pub started_at: u64,
    pub last_result: Option<MatchResult>,
    /// Events raised during the current tick
    pub events: Vec<GameEvent>,
    #[serde(skip)]
    rng: Pcg32,
}

impl GameState {
    /// Set up players and balls for the configured arena
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let (width, height) = settings.mode.dimensions();
        let arena = Vec2::new(width as f32, height as f32);
        let mid = arena / 2.0;

        let mut balls = Vec::new();
        for _ in 0..settings.red {
            balls.push(Ball::new(
                BallKind::Red,
                Vec2::new(mid.x, mid.y - 20.0),
                arena,
                settings.accel,
                settings.max_speed,
            ));
        }
        for _ in 0..settings.black {
            balls.push(Ball::new(
                BallKind::Black,
                Vec2::new(mid.x, mid.y + 20.0),
                arena,
                settings.accel,
                settings.max_speed,
            ));
        }
        for i in 0..settings.gold {
            balls.push(Ball::new(
                BallKind::Gold,
                Vec2::new(mid.x, 100.0 + 30.0 * i as f32),
                arena,
                settings.accel,
                settings.max_speed,
            ));
        }
        for ball in &mut balls {
            ball.body.dive = ball.body.dive && (settings.dive || ball.kind == BallKind::Gold);
        }

        // Robots chase the first scoring ball
        let target = balls.iter().position(|b| b.kind == BallKind::Red);
        let slots = [
            (Side::Left, 4, 100.0),
            (Side::Right, 1, arena.x - 100.0),
            (Side::Left, 2, 200.0),
            (Side::Right, 2, arena.x - 200.0),
        ];
        let players = slots
            .into_iter()
            .map(|(side, model, x)| {
                let mut player = Player::new(side, model, Vec2::new(x, mid.y), arena);
                player.body.accel = settings.accel;
                player.body.max_speed = settings.max_speed;
                player.body.dive = settings.dive;
                player.set_target(target);
                player
            })
            .collect();

        Self {
            arena,
            phase: GamePhase::Idle,
            num_players: 2,
            players,
            balls,
            scores: [0; 2],
            possession: [false; 2],
            score_timer: 0,
            flash_ms: [0; 2],
            win_score: settings.win_score,
            gold_points: settings.gold_points,
            gold_delay_ms: u64::from(settings.duration) * 1000,
            gold_released: false,
            started_at: 0,
            last_result: None,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn num_players(&self) -> usize {
        self.num_players
    }

    /// Choose 1-on-1 or 2-on-2
    pub fn set_num_players(&mut self, num: usize) {
        assert!(num == 2 || num == 4, "matches need 2 or 4 players, got {num}");
        if num != self.num_players {
            log::info!("Switching to {} players", num);
        }
        self.num_players = num;
    }

    pub fn toggle_num_players(&mut self) {
        self.set_num_players(if self.num_players == 2 { 4 } else { 2 });
    }

    /// Players currently taking part
    pub fn active_players(&self) -> &[Player] {
        &self.players[..self.num_players]
    }

    pub fn mid_height(&self) -> f32 {
        self.arena.y / 2.0
    }

    /// Idle -> Playing
    pub fn start(&mut self, now: u64) {
        if self.phase == GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::Playing;
        self.scores = [0; 2];
        self.possession = [false; 2];
        self.flash_ms = [0; 2];
        self.score_timer = 0;
        self.gold_released = false;
        self.started_at = now;
        self.last_result = None;
        log::info!("Match started with {} players", self.num_players);
    }

    /// Stop the match and put everything back at its spawn
    pub fn game_over(&mut self) {
        self.phase = GamePhase::Idle;
        for player in &mut self.players {
            player.reset();
        }
        for ball in &mut self.balls {
            ball.reset();
        }
        self.scores = [0; 2];
        self.possession = [false; 2];
        self.score_timer = 0;
        self.flash_ms = [0; 2];
        self.gold_released = false;
        log::info!("Game over");
    }

    /// Move every active player, then every ball
    pub fn move_flyers(&mut self, elapsed_ms: f32, now: u64) {
        let n = self.num_players;
        for player in &mut self.players[..n] {
            let target = player.target().and_then(|i| self.balls.get(i)).map(|b| b.body.pos);
            let has_ball = self.possession[player.side.index()];
            player.step(elapsed_ms, now, has_ball, target, &mut self.rng);
        }

        let positions: Vec<Vec2> = self.players[..n].iter().map(|p| p.body.pos).collect();
        for ball in &mut self.balls {
            ball.step(elapsed_ms, now, &positions, &mut self.rng);
        }
    }

    /// Release gold balls once the match has run long enough
    pub fn check_gold_release(&mut self, now: u64) {
        if self.gold_released || now.saturating_sub(self.started_at) < self.gold_delay_ms {
            return;
        }
        let mut any = false;
        for ball in self.balls.iter_mut().filter(|b| b.kind == BallKind::Gold) {
            ball.alive = true;
            any = true;
        }
        self.gold_released = true;
        if any {
            log::info!("Gold ball released");
            self.events.push(GameEvent::GoldReleased);
        }
    }

    /// Bump players that collide with each other or with black balls
    pub fn check_collisions(&mut self) {
        let n = self.num_players;
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.players[i].body, &self.players[j].body);
                if !players_overlap(a, b) {
                    continue;
                }
                // The one underneath loses
                let loser = if a.pos.y < b.pos.y {
                    j
                } else if b.pos.y < a.pos.y {
                    i
                } else {
                    continue;
                };
                if self.players[loser].bump() {
                    self.events.push(GameEvent::Bump { player: loser });
                }
            }
        }

        for i in 0..n {
            let hit = self.balls.iter().any(|ball| {
                ball.alive && !ball.is_catchable() && ball_in_reach(&self.players[i].body, &ball.body)
            });
            if hit && self.players[i].bump() {
                self.events.push(GameEvent::Bump { player: i });
            }
        }
    }

    /// Catching, passing and scoring
    ///
    /// Returns the winning side if a score ended the match.
    pub fn check_caught(&mut self) -> Option<Side> {
        self.possession = [false; 2];
        for ball in self.balls.iter_mut().filter(|b| b.is_catchable()) {
            ball.reset_caught();
        }

        let n = self.num_players;
        let mut winner = None;

        for i in 0..n {
            for j in 0..self.balls.len() {
                let ball = &self.balls[j];
                // First player to reach a ball this tick keeps it
                if !ball.alive || !ball.is_catchable() || ball.is_caught() {
                    continue;
                }
                if !ball_in_reach(&self.players[i].body, &ball.body) {
                    continue;
                }
                if let Some(side) = self.carry(i, j) {
                    winner = winner.or(Some(side));
                }
            }
            self.players[i].clear_pass();
        }

        winner
    }

    /// Player `i` holds ball `j` this tick
    fn carry(&mut self, i: usize, j: usize) -> Option<Side> {
        let side = self.players[i].side;
        self.balls[j].body.pos = carry_position(&self.players[i].body);
        self.possession[side.index()] = true;

        if self.num_players > 2 && self.players[i].pass_requested() {
            self.pass(i, j);
        }

        if self.balls[j].set_caught() {
            self.events.push(GameEvent::Grab { player: i, side });
        }

        if !at_opposing_goal(&self.players[i].body, side, self.arena.x)
            || !in_goal_mouth(self.balls[j].body.pos.y, self.mid_height())
        {
            return None;
        }
        self.score(side, j)
    }

    /// Throw ball `j` from player `i` to their teammate
    fn pass(&mut self, i: usize, j: usize) {
        let mate = teammate_of(i);
        let delta = self.players[mate].body.pos - self.players[i].body.pos;
        let dist = delta.length();
        if dist <= f32::EPSILON {
            return;
        }

        let jitter = Vec2::new(
            self.rng.random_range(0..PASS_JITTER) as f32,
            self.rng.random_range(0..PASS_JITTER) as f32,
        );
        let body = &mut self.balls[j].body;
        body.pass_through = true;
        body.vel = delta / dist * PASS_SPEED;
        body.pos += body.vel * PASS_LEAD_FRAMES + jitter;
        self.events.push(GameEvent::Pass { from: i, to: mate });
    }

    /// Award a goal with ball `j`; returns the side if the match is won
    fn score(&mut self, side: Side, j: usize) -> Option<Side> {
        let team = side.index();
        // With gold in play only the gold catch ends the match
        let gold_match = self.balls.iter().any(|b| b.kind == BallKind::Gold);
        let ball = &mut self.balls[j];

        if ball.kind == BallKind::Gold {
            ball.alive = false;
            self.scores[team] = self.scores[team].saturating_add(self.gold_points);
            log::info!("{:?} caught the gold ball for {} points", side, self.gold_points);
            self.events.push(GameEvent::Score { side, points: self.gold_points });
            return Some(side);
        }

        ball.body.pos.x = self.arena.x / 2.0;
        self.scores[team] = self.scores[team].saturating_add(GOAL_POINTS);
        self.flash_ms[team] = SCORE_FLASH_MS;
        self.score_timer = SCORE_TIMER_TICKS;
        log::info!("{:?} scores: {} - {}", side, self.scores[0], self.scores[1]);
        self.events.push(GameEvent::Score { side, points: GOAL_POINTS });

        (!gold_match && self.scores[team] >= self.win_score).then_some(side)
    }

    /// Record the result, announce it and reset the match
    pub fn finish(&mut self, winner: Side) {
        let scores = self.scores;
        log::info!("{:?} wins {} - {}", winner, scores[0], scores[1]);
        self.last_result = Some(MatchResult { winner, scores });
        self.events.push(GameEvent::Won { side: winner, scores });
        self.game_over();
    }

    /// Count down the post-score timers
    pub fn update_timers(&mut self, elapsed_ms: f32) {
        self.score_timer = self.score_timer.saturating_sub(1);
        let elapsed = elapsed_ms as u32;
        for flash in &mut self.flash_ms {
            *flash = flash.saturating_sub(elapsed);
        }
    }

    /// Take the events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_state() -> GameState {
        GameState::new(&Settings::default(), 42)
    }

    /// Red ball only, no black obstacles
    fn red_only_state() -> GameState {
        let settings = Settings {
            black: 0,
            ..Settings::default()
        };
        GameState::new(&settings, 42)
    }

    #[test]
    fn test_initial_layout() {
        let state = default_state();
        assert_eq!(state.arena, Vec2::new(640.0, 480.0));
        assert_eq!(state.players.len(), PLAYER_SLOTS);
        assert_eq!(state.num_players(), 2);
        assert_eq!(state.players[0].body.pos, Vec2::new(100.0, 240.0));
        assert_eq!(state.players[1].body.pos, Vec2::new(540.0, 240.0));
        assert_eq!(state.players[1].side, Side::Right);
        assert_eq!(state.balls.len(), 3);
        assert_eq!(state.balls.iter().filter(|b| b.is_catchable()).count(), 1);
        assert_eq!(state.balls[0].body.pos, Vec2::new(320.0, 220.0));
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_teammates() {
        assert_eq!(teammate_of(0), 2);
        assert_eq!(teammate_of(1), 3);
        assert_eq!(teammate_of(2), 0);
        assert_eq!(teammate_of(3), 1);
    }

    #[test]
    #[should_panic]
    fn test_teammate_out_of_range() {
        teammate_of(4);
    }

    #[test]
    #[should_panic]
    fn test_bad_team_size() {
        default_state().set_num_players(3);
    }

    #[test]
    fn test_catch_snaps_ball_and_sets_possession() {
        let mut state = red_only_state();
        state.start(0);
        state.players[0].body.pos = Vec2::new(312.0, 212.0);

        assert_eq!(state.check_caught(), None);
        assert!(state.possession[0]);
        assert!(!state.possession[1]);
        assert_eq!(state.balls[0].body.pos, Vec2::new(320.0, 227.0));
        assert_eq!(
            state.events,
            vec![GameEvent::Grab { player: 0, side: Side::Left }]
        );

        // Still held next tick: no second grab
        state.events.clear();
        state.check_caught();
        assert!(state.possession[0]);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_first_catcher_wins_contested_ball() {
        let mut state = red_only_state();
        state.start(0);
        state.players[0].body.pos = Vec2::new(312.0, 212.0);
        state.players[1].body.pos = Vec2::new(314.0, 214.0);

        state.check_caught();
        assert!(state.balls[0].is_caught());
        assert!(!state.balls[0].last_caught());
        let grabs = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Grab { .. }))
            .count();
        assert_eq!(grabs, 1);
        assert!(state.possession[0]);
        assert!(!state.possession[1]);
    }

    #[test]
    fn test_carry_into_goal_scores() {
        let mut state = red_only_state();
        state.start(0);
        // At the right goal wall, ball carried at mid-height
        let player = &mut state.players[0];
        player.body.pos = Vec2::new(590.0, 225.0);
        state.balls[0].body.pos = Vec2::new(598.0, 233.0);

        assert_eq!(state.check_caught(), None);
        assert_eq!(state.scores, [10, 0]);
        assert_eq!(state.balls[0].body.pos.x, 320.0);
        assert_eq!(state.score_timer, SCORE_TIMER_TICKS);
        assert_eq!(state.flash_ms, [SCORE_FLASH_MS, 0]);
        assert!(state.events.contains(&GameEvent::Score { side: Side::Left, points: 10 }));
    }

    #[test]
    fn test_no_score_outside_goal_mouth() {
        let mut state = red_only_state();
        state.start(0);
        state.players[0].body.pos = Vec2::new(590.0, 300.0);
        state.balls[0].body.pos = Vec2::new(598.0, 308.0);
        state.check_caught();
        assert_eq!(state.scores, [0, 0]);
        assert!(state.possession[0]);
    }

    #[test]
    fn test_reaching_win_score_ends_match() {
        let mut state = red_only_state();
        state.start(0);
        state.scores = [40, 0];
        state.players[0].body.pos = Vec2::new(590.0, 225.0);
        state.balls[0].body.pos = Vec2::new(598.0, 233.0);

        let winner = state.check_caught();
        assert_eq!(winner, Some(Side::Left));
        assert_eq!(state.scores, [50, 0]);

        state.finish(Side::Left);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.scores, [0, 0]);
        assert_eq!(
            state.last_result,
            Some(MatchResult { winner: Side::Left, scores: [50, 0] })
        );
        assert_eq!(state.players[0].body.pos, Vec2::new(100.0, 240.0));
        assert_eq!(state.balls[0].body.pos, Vec2::new(320.0, 220.0));
    }

    #[test]
    fn test_pass_aims_at_teammate() {
        let mut state = red_only_state();
        state.set_num_players(4);
        state.start(0);
        state.players[0].body.pos = Vec2::new(312.0, 212.0);
        state.players[2].body.pos = Vec2::new(152.0, 92.0);
        state.players[0].request_pass();

        state.check_caught();
        let ball = &state.balls[0].body;
        // Direction (-160, -120) normalised to the pass speed
        assert!((ball.vel.x + 6.4).abs() < 1e-4);
        assert!((ball.vel.y + 4.8).abs() < 1e-4);
        assert!(ball.pass_through);
        assert!(!state.players[0].pass_requested());
        assert!(state.events.contains(&GameEvent::Pass { from: 0, to: 2 }));
    }

    #[test]
    fn test_no_pass_in_one_on_one() {
        let mut state = red_only_state();
        state.start(0);
        state.players[0].body.pos = Vec2::new(312.0, 212.0);
        state.players[0].request_pass();
        state.check_caught();
        assert_eq!(state.balls[0].body.vel, Vec2::ZERO);
        assert!(!state.players[0].pass_requested());
    }

    #[test]
    fn test_pass_to_teammate_in_same_spot_is_skipped() {
        let mut state = red_only_state();
        state.set_num_players(4);
        state.start(0);
        state.players[0].body.pos = Vec2::new(312.0, 212.0);
        state.players[2].body.pos = Vec2::new(312.0, 212.0);
        state.players[0].request_pass();

        state.check_caught();
        let ball = &state.balls[0].body;
        assert!(ball.vel.is_finite());
        assert_eq!(ball.vel, Vec2::ZERO);
        assert!(!ball.pass_through);
        assert_eq!(ball.pos, Vec2::new(320.0, 227.0));
        assert!(!state.events.iter().any(|e| matches!(e, GameEvent::Pass { .. })));
        assert!(!state.players[0].pass_requested());
    }

    #[test]
    fn test_red_goals_do_not_end_gold_match() {
        let settings = Settings {
            black: 0,
            gold: 1,
            ..Settings::default()
        };
        let mut state = GameState::new(&settings, 9);
        state.start(0);
        state.scores = [40, 0];
        state.players[0].body.pos = Vec2::new(590.0, 225.0);
        state.balls[0].body.pos = Vec2::new(598.0, 233.0);

        assert_eq!(state.check_caught(), None);
        assert_eq!(state.scores, [50, 0]);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.events.iter().any(|e| matches!(e, GameEvent::Won { .. })));
    }

    #[test]
    fn test_gold_points_saturate() {
        let settings = Settings {
            black: 0,
            gold: 1,
            gold_points: u32::MAX,
            duration: 0,
            ..Settings::default()
        };
        let mut state = GameState::new(&settings, 9);
        state.start(0);
        state.check_gold_release(0);
        state.scores = [10, 0];
        state.players[0].body.pos = Vec2::new(590.0, 225.0);
        state.balls[1].body.pos = Vec2::new(598.0, 233.0);

        assert_eq!(state.check_caught(), Some(Side::Left));
        assert_eq!(state.scores, [u32::MAX, 0]);
    }

    #[test]
    fn test_lower_player_gets_bumped() {
        let mut state = red_only_state();
        state.start(0);
        state.players[0].body.pos = Vec2::new(200.0, 200.0);
        state.players[1].body.pos = Vec2::new(210.0, 215.0);

        state.check_collisions();
        assert_eq!(state.players[0].body.pos, Vec2::new(200.0, 200.0));
        assert_eq!(state.players[1].body.pos.y, BUMP_DROP_Y);
        assert_eq!(state.events, vec![GameEvent::Bump { player: 1 }]);

        state.players[1].body.bounds();
        assert_eq!(state.players[1].body.pos.y, 480.0 - PLAYER_SIZE);
    }

    #[test]
    fn test_black_ball_bumps_player() {
        let mut state = default_state();
        state.start(0);
        let black = state.balls[1].body.pos;
        state.players[0].body.pos = black - Vec2::splat(HAND_OFFSET);
        state.check_collisions();
        assert_eq!(state.players[0].body.pos.y, BUMP_DROP_Y);
    }

    #[test]
    fn test_gold_release_and_capture() {
        let settings = Settings {
            black: 0,
            gold: 1,
            duration: 5,
            ..Settings::default()
        };
        let mut state = GameState::new(&settings, 9);
        state.start(1000);
        state.check_gold_release(5999);
        assert!(!state.balls[1].alive);
        state.check_gold_release(6000);
        assert!(state.balls[1].alive);
        assert!(state.events.contains(&GameEvent::GoldReleased));

        state.players[0].body.pos = Vec2::new(590.0, 225.0);
        state.balls[1].body.pos = Vec2::new(598.0, 233.0);
        assert_eq!(state.check_caught(), Some(Side::Left));
        assert_eq!(state.scores, [150, 0]);
        assert!(!state.balls[1].alive);
    }

    #[test]
    fn test_timers_count_down() {
        let mut state = default_state();
        state.score_timer = 2;
        state.flash_ms = [300, 20];
        state.update_timers(40.0);
        assert_eq!(state.score_timer, 1);
        assert_eq!(state.flash_ms, [260, 0]);
    }
}
