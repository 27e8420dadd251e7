//! Per-frame simulation step
//!
//! One call to [`advance_frame`] per rendered frame: spawn, fall, score the
//! obstacles that leave the field, resolve contacts with the player, then
//! rescale difficulty from the new score.

use rand::Rng;

use super::collision::{Contact, obstacle_contact};
use super::palette::PALETTE_SIZE;
use super::state::{GameEvent, GameState};
use crate::difficulty_level;
use crate::tuning::Tuning;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Color cycles requested since the last frame (click/tap/space each)
    pub activations: u32,
}

impl TickInput {
    /// Input with `activations` presses
    pub fn pressed(activations: u32) -> Self {
        Self { activations }
    }
}

/// Difficulty knobs derived from the score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    pub level: u64,
    pub obstacle_speed: f32,
    pub spawn_rate: f32,
}

/// Speed and spawn rate for a score, both capped by the tuning maxima
pub fn difficulty_for_score(score: u64, tuning: &Tuning) -> Difficulty {
    let level = difficulty_level(score, tuning.points_per_level);
    let steps = level as f32;
    Difficulty {
        level,
        obstacle_speed: (tuning.base_speed + steps * tuning.speed_step).min(tuning.max_speed),
        spawn_rate: (tuning.base_spawn_rate + steps * tuning.spawn_rate_step)
            .min(tuning.max_spawn_rate),
    }
}

/// Apply the frame's input, then advance the simulation
pub fn tick(state: &mut GameState, input: &TickInput) {
    for _ in 0..input.activations {
        state.cycle_player_color();
    }
    advance_frame(state);
}

/// Advance the simulation by one frame. No-op unless playing.
pub fn advance_frame(state: &mut GameState) {
    if !state.is_playing() {
        return;
    }
    state.frame_count += 1;

    spawn_obstacles(state);

    for obstacle in &mut state.obstacles {
        obstacle.pos.y += obstacle.speed;
    }

    remove_passed_obstacles(state);
    resolve_contacts(state);

    let difficulty = difficulty_for_score(state.score, &state.tuning);
    state.obstacle_speed = difficulty.obstacle_speed;
    state.spawn_rate = difficulty.spawn_rate;
}

fn spawn_obstacles(state: &mut GameState) {
    if state.rng.random::<f32>() >= state.spawn_rate {
        return;
    }
    let span = state.tuning.canvas_width - 2.0 * state.tuning.spawn_margin;
    let x = state.rng.random::<f32>() * span + state.tuning.spawn_margin;
    let color_index = state.rng.random_range(0..PALETTE_SIZE);
    let speed = state.obstacle_speed + state.rng.random::<f32>() * state.tuning.speed_jitter;
    state.spawn_obstacle(x, color_index, speed);
}

/// Drop obstacles whose top edge is below the field, one pass point each
fn remove_passed_obstacles(state: &mut GameState) {
    let floor = state.tuning.canvas_height;
    let mut passed = Vec::new();
    state.obstacles.retain(|o| {
        if o.pos.y > floor {
            passed.push(o.id);
            false
        } else {
            true
        }
    });

    for id in passed {
        state.score += state.tuning.pass_points;
        state.push_event(GameEvent::ObstaclePassed { id });
    }
}

/// Check obstacles in spawn order; a lethal contact ends the run immediately
fn resolve_contacts(state: &mut GameState) {
    let mut i = 0;
    while i < state.obstacles.len() {
        match obstacle_contact(&state.obstacles[i], &state.player) {
            Some(Contact::Match) => {
                let caught = state.obstacles.remove(i);
                state.score += state.tuning.match_points;
                state.push_event(GameEvent::ObstacleMatched { id: caught.id });
            }
            Some(Contact::Lethal) => {
                state.game_over();
                return;
            }
            None => i += 1,
        }
    }
}

/// Demo/idle autopilot: should the player switch color before the next frame?
///
/// Looks `lookahead` frames ahead for the first obstacle (in spawn order) that
/// will reach the player and wants to switch if its color differs.
pub fn autopilot_wants_switch(state: &GameState, lookahead: u32) -> bool {
    if !state.is_playing() {
        return false;
    }
    let player = state.player.bounds();
    state
        .obstacles
        .iter()
        .find(|o| {
            let mut future = o.bounds();
            future.max.y += o.speed * lookahead as f32;
            future.min.y += o.speed;
            future.overlaps(&player)
        })
        .is_some_and(|o| o.color_index != state.player.color_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GamePhase, Obstacle};
    use glam::Vec2;
    use proptest::prelude::*;

    /// Balance with spawning disabled so tests control every obstacle
    fn quiet_tuning() -> Tuning {
        Tuning {
            base_spawn_rate: 0.0,
            spawn_rate_step: 0.0,
            ..Tuning::default()
        }
    }

    fn playing_state(tuning: Tuning) -> GameState {
        let mut state = GameState::new(42, tuning);
        assert!(state.start());
        state
    }

    /// Obstacle overlapping the player after one frame of movement
    fn overlapping(state: &mut GameState, color_index: usize) {
        let id = state.next_entity_id();
        let pos = state.player.pos - Vec2::new(40.0, 10.0) - Vec2::new(0.0, 3.0);
        state
            .obstacles
            .push(Obstacle::new(id, pos, Vec2::new(80.0, 20.0), color_index, 3.0));
    }

    #[test]
    fn test_difficulty_thresholds() {
        let tuning = Tuning::default();
        let expected = [(0, 3.0, 0.02), (10, 3.5, 0.03), (20, 4.0, 0.04), (19, 3.5, 0.03)];
        for (score, speed, rate) in expected {
            let d = difficulty_for_score(score, &tuning);
            assert!((d.obstacle_speed - speed).abs() < 1e-5, "speed at {score}");
            assert!((d.spawn_rate - rate).abs() < 1e-5, "rate at {score}");
        }
    }

    #[test]
    fn test_difficulty_caps() {
        let tuning = Tuning::default();
        let d = difficulty_for_score(1_000, &tuning);
        assert_eq!(d.level, 100);
        assert_eq!(d.obstacle_speed, 8.0);
        assert_eq!(d.spawn_rate, 0.08);

        // Spawn rate caps at level 6, speed at level 10
        let d = difficulty_for_score(70, &tuning);
        assert!((d.obstacle_speed - 6.5).abs() < 1e-5);
        assert_eq!(d.spawn_rate, 0.08);
    }

    #[test]
    fn test_matching_overlap_scores_two() {
        let mut state = playing_state(quiet_tuning());
        let color = state.player.color_index;
        overlapping(&mut state, color);

        advance_frame(&mut state);

        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, 2);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_mismatched_overlap_ends_run() {
        let mut state = playing_state(quiet_tuning());
        let color = (state.player.color_index + 1) % PALETTE_SIZE;
        overlapping(&mut state, color);

        advance_frame(&mut state);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.score, 0);
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_game_over_freezes_frames_until_restart() {
        let mut state = playing_state(quiet_tuning());
        let color = (state.player.color_index + 1) % PALETTE_SIZE;
        overlapping(&mut state, color);
        advance_frame(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);

        let frozen_y = state.obstacles[0].pos.y;
        let frames = state.frame_count;
        for _ in 0..10 {
            tick(&mut state, &TickInput::pressed(1));
        }
        assert_eq!(state.obstacles[0].pos.y, frozen_y);
        assert_eq!(state.frame_count, frames);

        assert!(state.restart());
        assert!(state.obstacles.is_empty());
        advance_frame(&mut state);
        assert_eq!(state.frame_count, 1);
    }

    #[test]
    fn test_obstacle_leaving_field_scores_one() {
        let mut state = playing_state(quiet_tuning());
        let id = state.next_entity_id();
        // Far from the player horizontally, just above the floor
        state.obstacles.push(Obstacle::new(
            id,
            Vec2::new(0.0, 598.0),
            Vec2::new(80.0, 20.0),
            0,
            3.0,
        ));

        advance_frame(&mut state);

        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, 1);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::ObstaclePassed { id })
        );
    }

    #[test]
    fn test_obstacle_at_floor_is_kept() {
        let mut state = playing_state(quiet_tuning());
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle::new(
            id,
            Vec2::new(0.0, 597.0),
            Vec2::new(80.0, 20.0),
            0,
            3.0,
        ));

        advance_frame(&mut state);

        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_lethal_contact_stops_processing() {
        let mut state = playing_state(quiet_tuning());
        let player_color = state.player.color_index;
        overlapping(&mut state, (player_color + 1) % PALETTE_SIZE);
        overlapping(&mut state, player_color);

        advance_frame(&mut state);

        // The later matching obstacle is never reached
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.obstacles.len(), 2);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_matches_before_lethal_still_count() {
        let mut state = playing_state(quiet_tuning());
        let player_color = state.player.color_index;
        overlapping(&mut state, player_color);
        overlapping(&mut state, (player_color + 1) % PALETTE_SIZE);

        advance_frame(&mut state);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.score, 2);
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_difficulty_follows_score() {
        let mut state = playing_state(Tuning::default());
        state.score = 20;
        advance_frame(&mut state);
        if state.is_playing() {
            assert!(state.obstacle_speed >= 4.0);
            assert!(state.spawn_rate >= 0.04 - 1e-6);
        }
    }

    #[test]
    fn test_spawns_stay_in_bounds() {
        let tuning = Tuning {
            base_spawn_rate: 1.0,
            max_spawn_rate: 1.0,
            // Keep the player out of the way so the run never ends
            player_bottom_offset: -1_000.0,
            ..Tuning::default()
        };
        let mut state = playing_state(tuning);
        for _ in 0..300 {
            advance_frame(&mut state);
        }
        assert!(state.is_playing());
        assert!(!state.obstacles.is_empty());
        for obstacle in &state.obstacles {
            assert!(obstacle.pos.x >= 40.0 && obstacle.pos.x < 760.0);
            assert!(obstacle.speed >= 3.0 && obstacle.speed < 10.0);
            assert!(obstacle.color_index < PALETTE_SIZE);
        }
        // Every spawned obstacle eventually passes for a point
        assert!(state.score > 0);
    }

    #[test]
    fn test_autopilot_switches_only_for_mismatch() {
        let mut state = playing_state(quiet_tuning());
        assert!(!autopilot_wants_switch(&state, 5));

        let color = state.player.color_index;
        let id = state.next_entity_id();
        // Three frames above the player at speed 3
        let pos = state.player.pos - Vec2::new(40.0, 15.0 + 20.0 + 8.0);
        state
            .obstacles
            .push(Obstacle::new(id, pos, Vec2::new(80.0, 20.0), color, 3.0));
        assert!(!autopilot_wants_switch(&state, 5));

        state.obstacles[0].color_index = (color + 1) % PALETTE_SIZE;
        assert!(autopilot_wants_switch(&state, 5));
        // Too far away for a one-frame lookahead
        assert!(!autopilot_wants_switch(&state, 1));
    }

    #[test]
    fn test_autopilot_survives_longer() {
        let mut state = playing_state(Tuning::default());
        for _ in 0..2_000 {
            let switch = autopilot_wants_switch(&state, 6);
            tick(&mut state, &TickInput::pressed(u32::from(switch)));
            if !state.is_playing() {
                break;
            }
        }
        assert!(state.score > 0);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99_999, Tuning::default());
        let mut state2 = GameState::new(99_999, Tuning::default());
        state1.start();
        state2.start();

        for frame in 0..500 {
            let input = TickInput::pressed(u32::from(frame % 37 == 0));
            tick(&mut state1, &input);
            tick(&mut state2, &input);
        }

        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.obstacles, state2.obstacles);
    }

    #[test]
    fn test_each_press_cycles_once() {
        let mut state = playing_state(quiet_tuning());
        let start_color = state.player.color_index;
        tick(&mut state, &TickInput::pressed(2));
        assert_eq!(state.player.color_index, (start_color + 2) % PALETTE_SIZE);
        let changes = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ColorChanged { .. }))
            .count();
        assert_eq!(changes, 2);
    }

    proptest! {
        #[test]
        fn prop_score_never_decreases(seed in any::<u64>(), presses in prop::collection::vec(0u32..3, 1..400)) {
            let mut state = GameState::new(seed, Tuning::default());
            state.start();
            let mut last = state.score;
            for activations in presses {
                tick(&mut state, &TickInput::pressed(activations));
                prop_assert!(state.score >= last);
                prop_assert!(state.player.color_index < PALETTE_SIZE);
                prop_assert!(state.obstacles.iter().all(|o| o.color_index < PALETTE_SIZE));
                last = state.score;
            }
        }

        #[test]
        fn prop_cycle_is_cyclic(seed in any::<u64>(), rounds in 1usize..5) {
            let mut state = GameState::new(seed, Tuning::default());
            state.start();
            let start_color = state.player.color_index;
            for _ in 0..rounds * PALETTE_SIZE {
                state.cycle_player_color();
            }
            prop_assert_eq!(state.player.color_index, start_color);
        }
    }
}
