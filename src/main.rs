//! Asteroid Arena entry point
//!
//! Native: runs one headless round with a scripted pilot at 60 Hz of simulated
//! time and prints the standings. Web: the page loads the library and drives
//! `ArenaHandle` itself.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use asteroid_arena::platform::{KeyState, Store};
    use asteroid_arena::sim::World;
    use asteroid_arena::{HighScores, Observer, Outcome, Session, Standings, Tuning};

    /// Simulated frame length (60 Hz)
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Pilot reverses direction this often
    const SWEEP_FRAMES: u64 = 90;

    /// Logs progress once a second and prints the final board
    #[derive(Default)]
    struct Console {
        frames: u64,
    }

    impl Observer for Console {
        fn rendered(&mut self, world: &World) {
            self.frames += 1;
            if self.frames.is_multiple_of(60) {
                let human = world.human().map(|p| (p.score, p.lives)).unwrap_or_default();
                log::info!(
                    "t-{}s: {} asteroids, {} bullets, human {} pts / {} lives",
                    world.time_remaining,
                    world.asteroids.len(),
                    world.bullets.len(),
                    human.0,
                    human.1
                );
            }
        }

        fn ended(&mut self, standings: &Standings) {
            println!("Round over: {:?}", standings.reason);
            for (rank, s) in standings.entries.iter().enumerate() {
                let tag = if s.automated { " (AI)" } else { "" };
                println!(
                    "{:>2}. {}{}: {} points, {} lives",
                    rank + 1,
                    s.name,
                    tag,
                    s.score,
                    s.lives
                );
            }
        }
    }

    fn unix_ms() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or_default()
    }

    fn load_tuning() -> Tuning {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var("ARENA_TUNING").ok())
            .map(PathBuf::from);
        let Some(path) = path else {
            return Tuning::default();
        };
        match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Using default tuning ({}: {e})", path.display());
                Tuning::default()
            }
        }
    }

    fn seed() -> u64 {
        std::env::var("ARENA_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| unix_ms() as u64)
    }

    /// Hold fire and sweep side to side
    fn pilot(keys: &mut KeyState, frame: u64) {
        keys.key_down(" ");
        if (frame / SWEEP_FRAMES).is_multiple_of(2) {
            keys.key_up("ArrowLeft");
            keys.key_down("ArrowRight");
        } else {
            keys.key_up("ArrowRight");
            keys.key_down("ArrowLeft");
        }
    }

    pub fn run() {
        env_logger::init();
        log::info!("Asteroid Arena (native) starting...");

        let tuning = load_tuning();
        let seed = seed();
        let store = Store::in_dir(
            std::env::var("ARENA_DATA_DIR").unwrap_or_else(|_| ".asteroid-arena".to_string()),
        );
        let mut high_scores = HighScores::load(&store);

        let mut session = match Session::new(tuning) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Cannot start: {e}");
                return;
            }
        };
        let mut console = Console::default();
        let mut keys = KeyState::new();
        let epoch = session.start("Pilot", seed, 0.0);

        let mut frame = 0u64;
        loop {
            let now = frame as f64 * FRAME_MS;
            if session.poll_timers(epoch, now, &mut console) != Outcome::Running {
                break;
            }
            pilot(&mut keys, frame);
            if session.frame(epoch, now, &keys.snapshot(), &mut console) != Outcome::Running {
                break;
            }
            frame += 1;
        }

        if let Some(standings) = session.standings() {
            if let Some(rank) = high_scores.record(standings, unix_ms()) {
                println!("New high score! Rank {rank}");
                if let Err(e) = high_scores.save(&store) {
                    log::warn!("Could not save high scores: {e}");
                }
            }
        }
        if let Some(best) = high_scores.top_score() {
            println!("Best: {best} points");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is ArenaHandle, started from the page
}
