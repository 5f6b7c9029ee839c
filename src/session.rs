//! Session lifecycle: one World at a time, its timers, and its end
//!
//! The host owns the clocks (a display-synced frame callback and a wall-clock
//! timestamp); the session owns everything they drive. Every host callback is
//! stamped with the [`Epoch`] it was scheduled under. Starting, stopping or
//! finishing a round moves to a new epoch, so a late callback from an old
//! round is rejected before it can touch the current World.

use serde::Serialize;

use crate::consts::MAX_TIMER_CATCH_UP;
use crate::error::Result;
use crate::sim::{EndReason, InputState, PlayerId, World, spawn_asteroid, step, tick_countdown};
use crate::tuning::Tuning;

/// Generation token carried by host callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(u64);

/// What a frame or timer poll did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The round goes on
    Running,
    /// This call ended the round; observers have been notified
    Finished,
    /// The epoch is no longer current (or nothing is running); nothing changed
    Stale,
}

/// Rendering and session-end sinks
pub trait Observer {
    /// Called after every step with the state to draw
    fn rendered(&mut self, _world: &World) {}
    /// Called once when a round ends on its own (not on `stop`)
    fn ended(&mut self, _standings: &Standings) {}
}

impl Observer for () {}

/// Fixed-period timer measured against the host's wall clock (ms)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub period_ms: f64,
    pub next_due_ms: f64,
}

impl Interval {
    /// First fire is one period after `now_ms`
    pub fn new(period_ms: f64, now_ms: f64) -> Self {
        Self {
            period_ms,
            next_due_ms: now_ms + period_ms,
        }
    }

    pub fn is_due(&self, now_ms: f64) -> bool {
        self.next_due_ms <= now_ms
    }

    fn advance(&mut self) {
        self.next_due_ms += self.period_ms;
    }

    /// Drop missed fires after a long stall (hidden tab, debugger)
    fn reanchor(&mut self, now_ms: f64) {
        if self.is_due(now_ms) {
            self.next_due_ms = now_ms + self.period_ms;
        }
    }
}

/// One row of the final scoreboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub score: u32,
    pub lives: u8,
    pub automated: bool,
}

/// Final results, best score first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standings {
    pub entries: Vec<Standing>,
    pub reason: EndReason,
    pub time_remaining: u32,
    pub human_id: PlayerId,
    /// Seconds of the round that were played
    pub seconds_played: u32,
}

impl Standings {
    /// Results of a finished world; `None` while it is still active
    pub fn from_world(world: &World) -> Option<Self> {
        let reason = world.end_reason()?;
        let mut entries: Vec<Standing> = world
            .players
            .values()
            .map(|p| Standing {
                id: p.id.clone(),
                name: p.name.clone(),
                color: p.color.clone(),
                score: p.score,
                lives: p.lives,
                automated: p.automated,
            })
            .collect();
        // Stable sort over id-ordered players: ties keep id order
        entries.sort_by(|a, b| b.score.cmp(&a.score));

        Some(Self {
            entries,
            reason,
            time_remaining: world.time_remaining,
            human_id: world.human_id.clone(),
            seconds_played: world.tuning.round_seconds.saturating_sub(world.time_remaining),
        })
    }

    pub fn winner(&self) -> Option<&Standing> {
        self.entries.first()
    }

    pub fn human(&self) -> Option<&Standing> {
        self.entries.iter().find(|s| s.id == self.human_id)
    }
}

/// Live round: the world plus the timers that drive it
#[derive(Debug)]
struct Run {
    world: World,
    spawn: Interval,
    countdown: Interval,
    last_frame_ms: Option<f64>,
}

#[derive(Clone, Copy)]
enum TimerKind {
    Spawn,
    Countdown,
}

/// Owner of the single active World
#[derive(Debug)]
pub struct Session {
    tuning: Tuning,
    epoch: Epoch,
    run: Option<Run>,
    /// Last finished world, readable until the next start
    finished: Option<World>,
    standings: Option<Standings>,
}

impl Session {
    /// Fails if `tuning` does not validate; a bad probability would otherwise
    /// panic mid-round
    pub fn new(tuning: Tuning) -> Result<Self> {
        tuning.validate()?;
        Ok(Self {
            tuning,
            epoch: Epoch(0),
            run: None,
            finished: None,
            standings: None,
        })
    }

    /// Current epoch; only callbacks carrying it are honoured
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Begin a fresh round, stopping (and cancelling the timers of) any current one
    pub fn start(&mut self, human_name: &str, seed: u64, now_ms: f64) -> Epoch {
        self.stop();
        self.finished = None;
        self.standings = None;

        let world = World::new(human_name, seed, &self.tuning);
        log::info!(
            "Round started for {} with seed {} ({}s)",
            world.human().map(|p| p.name.as_str()).unwrap_or_default(),
            seed,
            world.time_remaining
        );
        self.run = Some(Run {
            world,
            spawn: Interval::new(self.tuning.asteroid_spawn_period_ms, now_ms),
            countdown: Interval::new(self.tuning.countdown_period_ms, now_ms),
            last_frame_ms: None,
        });
        self.bump_epoch()
    }

    /// Abort the current round. Timers are cancelled and the epoch moves on
    /// before the world is handed back; observers are not told.
    pub fn stop(&mut self) -> Option<World> {
        let run = self.run.take()?;
        self.bump_epoch();
        log::info!("Round stopped at tick {}", run.world.tick_count);
        Some(run.world)
    }

    /// The running world, or the last finished one
    pub fn world(&self) -> Option<&World> {
        self.run
            .as_ref()
            .map(|r| &r.world)
            .or(self.finished.as_ref())
    }

    /// Mutable access to the running world (scripted scenes, tests)
    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.run.as_mut().map(|r| &mut r.world)
    }

    /// Results of the last finished round
    pub fn standings(&self) -> Option<&Standings> {
        self.standings.as_ref()
    }

    /// Fire every timer that has come due by `now_ms`, earliest first
    /// (spawn before countdown on a tie), at most `MAX_TIMER_CATCH_UP` each.
    pub fn poll_timers(
        &mut self,
        epoch: Epoch,
        now_ms: f64,
        observer: &mut impl Observer,
    ) -> Outcome {
        let Some(run) = self.current_run(epoch) else {
            return Outcome::Stale;
        };

        let mut spawned = 0;
        let mut counted = 0;
        while !run.world.is_terminal() {
            let spawn_due = spawned < MAX_TIMER_CATCH_UP && run.spawn.is_due(now_ms);
            let count_due = counted < MAX_TIMER_CATCH_UP && run.countdown.is_due(now_ms);
            let kind = match (spawn_due, count_due) {
                (false, false) => break,
                (true, false) => TimerKind::Spawn,
                (false, true) => TimerKind::Countdown,
                (true, true) if run.spawn.next_due_ms <= run.countdown.next_due_ms => {
                    TimerKind::Spawn
                }
                (true, true) => TimerKind::Countdown,
            };
            match kind {
                TimerKind::Spawn => {
                    spawn_asteroid(&mut run.world);
                    run.spawn.advance();
                    spawned += 1;
                }
                TimerKind::Countdown => {
                    tick_countdown(&mut run.world);
                    run.countdown.advance();
                    counted += 1;
                }
            }
        }

        if run.spawn.is_due(now_ms) || run.countdown.is_due(now_ms) {
            log::warn!("Timers fell behind at {now_ms:.0}ms, skipping missed fires");
        }
        run.spawn.reanchor(now_ms);
        run.countdown.reanchor(now_ms);

        self.settle(observer)
    }

    /// Step the world once and hand it to the renderer
    pub fn frame(
        &mut self,
        epoch: Epoch,
        now_ms: f64,
        input: &InputState,
        observer: &mut impl Observer,
    ) -> Outcome {
        let Some(run) = self.current_run(epoch) else {
            return Outcome::Stale;
        };

        let elapsed = run
            .last_frame_ms
            .map(|last| (now_ms - last).max(0.0))
            .unwrap_or(0.0);
        run.last_frame_ms = Some(now_ms);

        step(&mut run.world, input, elapsed);
        observer.rendered(&run.world);

        self.settle(observer)
    }

    fn current_run(&mut self, epoch: Epoch) -> Option<&mut Run> {
        if epoch != self.epoch {
            log::warn!("Rejected callback from stale epoch {:?} (now {:?})", epoch, self.epoch);
            return None;
        }
        self.run.as_mut()
    }

    /// Finish the round if the world has gone terminal
    fn settle(&mut self, observer: &mut impl Observer) -> Outcome {
        let terminal = self.run.as_ref().is_some_and(|r| r.world.is_terminal());
        if !terminal {
            return Outcome::Running;
        }
        let Some(run) = self.run.take() else {
            return Outcome::Running;
        };
        self.bump_epoch();

        let standings = Standings::from_world(&run.world);
        if let Some(standings) = &standings {
            log::info!(
                "Round finished ({:?}); winner: {}",
                standings.reason,
                standings.winner().map(|s| s.name.as_str()).unwrap_or("nobody")
            );
            observer.ended(standings);
        }
        self.standings = standings;
        self.finished = Some(run.world);
        Outcome::Finished
    }

    fn bump_epoch(&mut self) -> Epoch {
        self.epoch = Epoch(self.epoch.0 + 1);
        self.epoch
    }
}
