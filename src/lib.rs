//! Color Switch Runner - A falling-obstacle color matching arcade game
//!
//! Core modules:
//! - `sim`: Game loop engine (obstacles, collisions, difficulty, state machine)
//! - `game`: Host session wiring the simulation to persistence and score reporting
//! - `renderer`: Renderer interface and WebGPU pipeline
//! - `platform`: Frame scheduling (animation frames / manual ticks) and clock
//! - `persistence`: Key-value save blob with graceful fallback
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use game::{Game, ScoreReport};
pub use highscores::HighScores;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Identifier reported alongside scores to the hosting page
    pub const GAME_ID: &str = "color-switch-runner";

    /// Playfield dimensions (pixels, origin top-left, y grows downward)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Player circle diameter
    pub const PLAYER_SIZE: f32 = 30.0;
    /// Distance of the player's center above the bottom edge
    pub const PLAYER_BOTTOM_OFFSET: f32 = 80.0;

    /// Obstacle speed bounds (pixels per frame)
    pub const OBSTACLE_SPEED_MIN: f32 = 3.0;
    pub const OBSTACLE_SPEED_MAX: f32 = 8.0;
    /// Extra per-obstacle speed drawn from [0, jitter)
    pub const OBSTACLE_SPEED_JITTER: f32 = 2.0;

    /// Per-frame spawn probability at difficulty 0, and its ceiling
    pub const OBSTACLE_SPAWN_RATE: f32 = 0.02;
    pub const OBSTACLE_SPAWN_RATE_MAX: f32 = 0.08;

    /// Obstacle bar geometry
    pub const OBSTACLE_WIDTH: f32 = 80.0;
    pub const OBSTACLE_HEIGHT: f32 = 20.0;
    /// Spawn y (top edge), above the visible area
    pub const OBSTACLE_SPAWN_Y: f32 = -50.0;
    /// Horizontal spawn margin on each side
    pub const OBSTACLE_SPAWN_MARGIN: f32 = 40.0;

    /// Score needed per difficulty level
    pub const POINTS_PER_LEVEL: u64 = 10;
    /// Speed / spawn-rate increase per difficulty level
    pub const SPEED_STEP: f32 = 0.5;
    pub const SPAWN_RATE_STEP: f32 = 0.01;

    /// Points for an obstacle leaving the bottom edge
    pub const PASS_POINTS: u64 = 1;
    /// Points for catching a same-colored obstacle
    pub const MATCH_POINTS: u64 = 2;

    /// Number of entries shown on the leaderboard
    pub const LEADERBOARD_SIZE: usize = 5;
}

/// Difficulty level for a score (one level per `POINTS_PER_LEVEL` points)
#[inline]
pub fn difficulty_level(score: u64, points_per_level: u64) -> u64 {
    score / points_per_level.max(1)
}
