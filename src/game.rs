//! Host session
//!
//! Owns the simulation state and the persistence adapter, turns UI actions into
//! state transitions, and tells subscribers when a finished run should be
//! reported to whatever is hosting the game.

use std::cell::RefCell;
use std::rc::Rc;

use crate::consts::GAME_ID;
use crate::highscores::{HighScores, ScoreRecord};
use crate::persistence::{PersistenceAdapter, Storage};
use crate::platform::{self, LoopHandle, TickSource};
use crate::renderer::Renderer;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Name used when the player leaves the name field blank
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// A score handed to the hosting context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    pub game_id: &'static str,
    pub player_name: String,
    pub score: u64,
}

type ScoreListener = Box<dyn FnMut(&ScoreReport)>;

/// One player's session: many runs, one persistence adapter
pub struct Game {
    pub state: GameState,
    /// One-shot inputs for the next frame
    pub input: TickInput,
    persistence: PersistenceAdapter<Box<dyn Storage>>,
    player_name: String,
    listeners: Vec<ScoreListener>,
    /// Leaderboard pushed by the host page, preferred over local history
    remote_scores: Option<HighScores>,
    /// Events from the frames since the last drain
    events: Vec<GameEvent>,
}

impl Game {
    /// Create an idle session, reading the saved high score
    pub fn new(storage: Box<dyn Storage>, tuning: Tuning, seed: u64) -> Self {
        let mut persistence = PersistenceAdapter::new(storage);
        let saved = persistence.load().clone();

        let mut state = GameState::new(seed, tuning);
        state.high_score = saved.high_score;

        Self {
            state,
            input: TickInput::default(),
            persistence,
            player_name: saved.last_player_name,
            listeners: Vec::new(),
            remote_scores: None,
            events: Vec::new(),
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Name from the start screen; blank falls back to [`DEFAULT_PLAYER_NAME`]
    pub fn set_player_name(&mut self, raw: &str) {
        let trimmed = raw.trim();
        self.player_name = if trimmed.is_empty() {
            DEFAULT_PLAYER_NAME.to_string()
        } else {
            trimmed.to_string()
        };
    }

    /// Subscribe to score reports (game over with a score, and close)
    pub fn on_score_reported(&mut self, listener: impl FnMut(&ScoreReport) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Start screen -> playing. The name is only taken when the run starts.
    pub fn start(&mut self, raw_name: &str) -> bool {
        if self.state.phase != GamePhase::Idle {
            return false;
        }
        self.set_player_name(raw_name);
        self.input = TickInput::default();
        self.events.clear();
        self.state.start()
    }

    /// Game over screen -> playing
    pub fn restart(&mut self) -> bool {
        self.input = TickInput::default();
        self.events.clear();
        self.state.restart()
    }

    /// Game over screen -> start screen
    pub fn return_to_menu(&mut self) -> bool {
        self.state.return_to_menu()
    }

    /// Click / tap / space. Ignored unless a run is in progress.
    /// Every press between two frames counts.
    pub fn activate(&mut self) {
        if self.state.is_playing() {
            self.input.activations += 1;
        }
    }

    /// Advance one frame. Returns whether the run is still going.
    pub fn frame(&mut self) -> bool {
        let input = std::mem::take(&mut self.input);
        tick(&mut self.state, &input);

        let events = self.state.drain_events();
        let finished = events
            .iter()
            .find_map(|e| match e {
                GameEvent::GameOver { score, .. } => Some(*score),
                _ => None,
            });
        self.events.extend(events);

        if let Some(score) = finished {
            self.finish_run(score);
        }
        self.state.is_playing()
    }

    /// Persist and report a finished run that earned points
    fn finish_run(&mut self, score: u64) {
        if score == 0 || self.player_name.is_empty() {
            return;
        }
        let name = self.player_name.clone();
        self.persistence.save(&name, score, platform::now_ms());
        self.report(score);
    }

    /// Leaving the game reports whatever the current score is
    pub fn close(&mut self) {
        log::info!("Closing game at score {}", self.state.score);
        self.report(self.state.score);
    }

    fn report(&mut self, score: u64) {
        let report = ScoreReport {
            game_id: GAME_ID,
            player_name: self.player_name.clone(),
            score,
        };
        for listener in &mut self.listeners {
            listener(&report);
        }
    }

    /// Take events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn high_score(&self) -> u64 {
        self.state.high_score
    }

    /// Replace the leaderboard with scores supplied by the host page
    pub fn set_remote_scores(&mut self, records: Vec<ScoreRecord>) {
        self.remote_scores = Some(HighScores::from_records(records));
    }

    /// Leaderboard lines, from the host page when it has sent any
    pub fn leaderboard_lines(&self) -> Vec<String> {
        match &self.remote_scores {
            Some(remote) => remote.leaderboard_lines(),
            None => self.persistence.data().scores.leaderboard_lines(),
        }
    }
}

/// Drive `game` from `source`: advance, render, then `after_frame`.
///
/// The loop ends on its own when the run ends; the handle stops it early.
pub fn run_loop<T, R, F>(
    game: Rc<RefCell<Game>>,
    source: &mut T,
    renderer: Rc<RefCell<R>>,
    mut after_frame: F,
) -> LoopHandle
where
    T: TickSource,
    R: Renderer + ?Sized + 'static,
    F: FnMut(&mut Game) + 'static,
{
    source.start(Box::new(move || {
        let mut game = game.borrow_mut();
        let playing = game.frame();
        renderer
            .borrow_mut()
            .render(&game.state.player, &game.state.obstacles);
        after_frame(&mut *game);
        playing
    }))
}
