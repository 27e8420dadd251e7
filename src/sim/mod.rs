//! Game loop engine
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - One discrete step per frame
//! - Seeded RNG only
//! - Obstacles processed in spawn order

pub mod collision;
pub mod palette;
pub mod state;
pub mod tick;

pub use collision::{Aabb, Contact, obstacle_contact};
pub use palette::{PALETTE, PALETTE_SIZE, PaletteColor};
pub use state::{GameEvent, GamePhase, GameState, Obstacle, Player};
pub use tick::{
    Difficulty, TickInput, advance_frame, autopilot_wants_switch, difficulty_for_score, tick,
};
