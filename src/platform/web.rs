//! Browser binding: the page drives frames and keys, draws the JSON snapshot

use wasm_bindgen::prelude::*;

use super::input::KeyState;
use super::storage::Store;
use crate::highscores::HighScores;
use crate::session::{Epoch, Observer, Outcome, Session, Standings};
use crate::sim::World;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::info!("Asteroid Arena core loaded");
}

/// Records the human's result when a round ends
struct Scorekeeper<'a> {
    high_scores: &'a mut HighScores,
    store: &'a Store,
}

impl Observer for Scorekeeper<'_> {
    fn ended(&mut self, standings: &Standings) {
        if let Some(rank) = self.high_scores.record(standings, js_sys::Date::now()) {
            log::info!("New high score, rank {rank}");
            if let Err(e) = self.high_scores.save(self.store) {
                log::warn!("Could not save high scores: {e}");
            }
        }
    }
}

/// One session per page
#[wasm_bindgen]
pub struct ArenaHandle {
    session: Session,
    epoch: Option<Epoch>,
    keys: KeyState,
    high_scores: HighScores,
    store: Store,
}

#[wasm_bindgen]
impl ArenaHandle {
    /// `tuning_json` may be empty for the reference balance
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<ArenaHandle, JsValue> {
        let tuning = match tuning_json.as_deref() {
            Some(json) if !json.trim().is_empty() => {
                Tuning::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            _ => Tuning::default(),
        };
        let session = Session::new(tuning).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let store = Store::local();
        Ok(Self {
            session,
            epoch: None,
            keys: KeyState::new(),
            high_scores: HighScores::load(&store),
            store,
        })
    }

    /// Start (or restart) a round; the old round's timers die with its epoch
    pub fn start(&mut self, username: &str, seed: u32) {
        self.keys.clear();
        self.epoch = Some(self.session.start(username, u64::from(seed), js_sys::Date::now()));
    }

    pub fn stop(&mut self) {
        self.session.stop();
        self.epoch = None;
    }

    pub fn key_down(&mut self, key: &str) {
        self.keys.key_down(key);
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.key_up(key);
    }

    /// Call from `requestAnimationFrame`. Returns false once the round is over.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let Some(epoch) = self.epoch else {
            return false;
        };
        let mut keeper = Scorekeeper {
            high_scores: &mut self.high_scores,
            store: &self.store,
        };

        let wall_ms = js_sys::Date::now();
        let outcome = match self.session.poll_timers(epoch, wall_ms, &mut keeper) {
            Outcome::Running => {
                let input = self.keys.snapshot();
                self.session.frame(epoch, now_ms, &input, &mut keeper)
            }
            other => other,
        };

        if outcome == Outcome::Running {
            true
        } else {
            self.epoch = None;
            false
        }
    }

    /// The world to draw, as JSON
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        let world: Option<&World> = self.session.world();
        serde_json::to_string(&world).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Final results of the last round, or `null`
    pub fn standings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.standings())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn high_scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.high_scores).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
