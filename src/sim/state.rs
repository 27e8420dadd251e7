//! Game state and core simulation types
//!
//! The state is owned by the host and passed by reference to the frame step and
//! the input handlers. Phase transitions live here; per-frame rules live in
//! [`super::tick`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::palette::PALETTE_SIZE;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Start screen, nothing simulated yet
    Idle,
    /// Active gameplay
    Playing,
    /// Run ended by a lethal collision
    GameOver,
}

/// Something the host may want to react to (HUD, sound, feedback)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ObstacleSpawned { id: u32 },
    /// Obstacle left through the bottom edge
    ObstaclePassed { id: u32 },
    /// Obstacle caught with a matching color
    ObstacleMatched { id: u32 },
    ColorChanged { color_index: usize },
    GameOver { score: u64, new_high_score: bool },
}

/// The player's circle. Only the color changes during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Center position
    pub pos: Vec2,
    pub radius: f32,
    pub color_index: usize,
}

/// A falling bar
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    /// Spawn-ordered id
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub color_index: usize,
    /// Pixels per frame
    pub speed: f32,
}

impl Obstacle {
    pub fn new(id: u32, pos: Vec2, size: Vec2, color_index: usize, speed: f32) -> Self {
        Self {
            id,
            pos,
            size,
            color_index: color_index % PALETTE_SIZE,
            speed,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub score: u64,
    /// Best score seen, kept across resets
    pub high_score: u64,
    /// Whether the last finished run set a new high score
    pub new_high_score: bool,
    /// Current base fall speed for new obstacles
    pub obstacle_speed: f32,
    /// Current per-frame spawn probability
    pub spawn_rate: f32,
    pub player: Player,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Frames simulated in the current run
    pub frame_count: u64,
    /// Pending events, drained by the host
    events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create an idle game with the given seed and balance
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let player = Player {
            pos: Vec2::new(tuning.canvas_width / 2.0, tuning.player_y()),
            radius: tuning.player_radius,
            color_index: 0,
        };
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            obstacle_speed: tuning.base_speed,
            spawn_rate: tuning.base_spawn_rate,
            tuning,
            phase: GamePhase::Idle,
            score: 0,
            high_score: 0,
            new_high_score: false,
            player,
            obstacles: Vec::new(),
            frame_count: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Clear the run: score, obstacles, difficulty and player. High score survives.
    pub fn reset(&mut self) {
        self.score = 0;
        self.obstacles.clear();
        self.obstacle_speed = self.tuning.base_speed;
        self.spawn_rate = self.tuning.base_spawn_rate;
        self.player.color_index = self.rng.random_range(0..PALETTE_SIZE);
        self.player.pos = Vec2::new(self.tuning.canvas_width / 2.0, self.tuning.player_y());
        self.player.radius = self.tuning.player_radius;
        self.new_high_score = false;
        self.frame_count = 0;
        self.events.clear();
    }

    /// Idle -> Playing. Returns false if not idle.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }
        self.reset();
        self.phase = GamePhase::Playing;
        log::info!("Run started (seed {})", self.seed);
        true
    }

    /// GameOver -> Playing. Returns false if the run hasn't ended.
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.reset();
        self.phase = GamePhase::Playing;
        log::info!("Run restarted");
        true
    }

    /// GameOver -> Idle (back to the start screen)
    pub fn return_to_menu(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.phase = GamePhase::Idle;
        true
    }

    /// Playing -> GameOver, folding the score into the high score
    pub fn game_over(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.new_high_score = self.score > self.high_score;
        if self.new_high_score {
            self.high_score = self.score;
        }
        self.events.push(GameEvent::GameOver {
            score: self.score,
            new_high_score: self.new_high_score,
        });
        log::info!(
            "Game over: score {} (high score {}{})",
            self.score,
            self.high_score,
            if self.new_high_score { ", new!" } else { "" }
        );
    }

    /// Step to the next palette color (activate input)
    pub fn cycle_player_color(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.player.color_index = (self.player.color_index + 1) % PALETTE_SIZE;
        self.events.push(GameEvent::ColorChanged {
            color_index: self.player.color_index,
        });
    }

    /// Spawn an obstacle with the configured size at the spawn line
    pub fn spawn_obstacle(&mut self, x: f32, color_index: usize, speed: f32) -> u32 {
        let id = self.next_entity_id();
        let size = Vec2::new(self.tuning.obstacle_width, self.tuning.obstacle_height);
        self.obstacles.push(Obstacle::new(
            id,
            Vec2::new(x, self.tuning.spawn_y),
            size,
            color_index,
            speed,
        ));
        self.events.push(GameEvent::ObstacleSpawned { id });
        id
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_idle() {
        let state = GameState::new(1, Tuning::default());
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.player.pos, Vec2::new(400.0, 520.0));
        assert_eq!(state.player.radius, 15.0);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_state_machine() {
        let mut state = GameState::new(7, Tuning::default());
        assert!(!state.restart());
        assert!(state.start());
        assert!(!state.start());
        assert_eq!(state.phase, GamePhase::Playing);

        state.game_over();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!state.start());

        assert!(state.restart());
        assert_eq!(state.phase, GamePhase::Playing);

        state.game_over();
        assert!(state.return_to_menu());
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.start());
    }

    #[test]
    fn test_cycle_color_wraps_after_palette_size() {
        let mut state = GameState::new(3, Tuning::default());
        state.start();
        let start_color = state.player.color_index;
        for _ in 0..PALETTE_SIZE {
            state.cycle_player_color();
        }
        assert_eq!(state.player.color_index, start_color);
    }

    #[test]
    fn test_cycle_color_ignored_outside_playing() {
        let mut state = GameState::new(3, Tuning::default());
        let start_color = state.player.color_index;
        state.cycle_player_color();
        assert_eq!(state.player.color_index, start_color);

        state.start();
        state.game_over();
        let at_game_over = state.player.color_index;
        state.cycle_player_color();
        assert_eq!(state.player.color_index, at_game_over);
    }

    #[test]
    fn test_reset_keeps_high_score() {
        let mut state = GameState::new(11, Tuning::default());
        state.start();
        state.score = 37;
        state.spawn_obstacle(100.0, 0, 3.0);
        state.game_over();
        assert_eq!(state.high_score, 37);
        assert!(state.new_high_score);

        state.reset();
        assert_eq!(state.score, 0);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.high_score, 37);
        assert_eq!(state.obstacle_speed, state.tuning.base_speed);
        assert_eq!(state.spawn_rate, state.tuning.base_spawn_rate);
    }

    #[test]
    fn test_lower_score_does_not_replace_high_score() {
        let mut state = GameState::new(11, Tuning::default());
        state.high_score = 50;
        state.start();
        state.score = 12;
        state.game_over();
        assert_eq!(state.high_score, 50);
        assert!(!state.new_high_score);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::GameOver {
                score: 12,
                new_high_score: false
            }]
        );
    }

    #[test]
    fn test_obstacle_ids_follow_spawn_order() {
        let mut state = GameState::new(5, Tuning::default());
        let a = state.spawn_obstacle(100.0, 1, 3.0);
        let b = state.spawn_obstacle(200.0, 2, 3.0);
        assert!(a < b);
        assert_eq!(state.obstacles[0].pos.y, state.tuning.spawn_y);
        assert_eq!(state.obstacles[1].size, Vec2::new(80.0, 20.0));
    }
}
