//! Session - one game start's worth of engines, link and listeners
//!
//! A session owns one engine (solo) or two engines joined by a [`VersusLink`]. Every
//! call goes through the session so that events can be routed as soon as they commit:
//! after each engine call the session drains that engine's events, hands each one to
//! every listener in subscription order, and forwards garbage to the peer before any
//! other engine advances.

use arrayvec::ArrayVec;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::replay::{Replay, ReplayStep};
use crate::types::{EngineEvent, InputCommand, Player};
use crate::versus::VersusLink;

/// Number of boards in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Solo,
    #[default]
    Versus,
}

impl Mode {
    pub fn players(self) -> &'static [Player] {
        match self {
            Mode::Solo => &[Player::One],
            Mode::Versus => &[Player::One, Player::Two],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Solo => "solo",
            Mode::Versus => "versus",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "solo" => Some(Mode::Solo),
            "versus" => Some(Mode::Versus),
            _ => None,
        }
    }
}

/// Receives every engine event, tagged with the board it came from.
pub trait EventListener {
    fn on_event(&mut self, player: Player, event: EngineEvent);
}

impl<F> EventListener for F
where
    F: FnMut(Player, EngineEvent),
{
    fn on_event(&mut self, player: Player, event: EngineEvent) {
        self(player, event)
    }
}

/// Per-board seeds derived from the session seed.
pub fn player_seeds(seed: u64) -> [u64; 2] {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    [rng.gen(), rng.gen()]
}

pub struct Session {
    mode: Mode,
    seed: u64,
    engines: ArrayVec<Engine, 2>,
    link: Option<VersusLink>,
    listeners: Vec<Box<dyn EventListener>>,
    recorder: Option<Replay>,
    /// False for sessions built around prepared engines; a replay can only rebuild
    /// boards from the session seed.
    replayable: bool,
}

impl Session {
    pub fn new(mode: Mode, seed: u64) -> Self {
        let seeds = player_seeds(seed);
        let engines = mode
            .players()
            .iter()
            .map(|p| Engine::new(seeds[p.index()]))
            .collect();
        Self::from_parts(mode, seed, engines, true)
    }

    pub fn solo(seed: u64) -> Self {
        Self::new(Mode::Solo, seed)
    }

    pub fn versus(seed: u64) -> Self {
        Self::new(Mode::Versus, seed)
    }

    /// Build around prepared engines. Two engines are linked for versus play.
    ///
    /// The session seed is taken from player one's engine. These sessions cannot be
    /// recorded.
    pub fn with_engines(one: Engine, two: Option<Engine>) -> Self {
        let seed = one.seed();
        let mut engines = ArrayVec::new();
        engines.push(one);
        let mode = match two {
            Some(two) => {
                engines.push(two);
                Mode::Versus
            }
            None => Mode::Solo,
        };
        Self::from_parts(mode, seed, engines, false)
    }

    fn from_parts(
        mode: Mode,
        seed: u64,
        engines: ArrayVec<Engine, 2>,
        replayable: bool,
    ) -> Self {
        let link = (engines.len() == 2).then(VersusLink::new);
        Self {
            mode,
            seed,
            engines,
            link,
            listeners: Vec::new(),
            recorder: None,
            replayable,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn players(&self) -> &'static [Player] {
        self.mode.players()
    }

    pub fn engine(&self, player: Player) -> Option<&Engine> {
        self.engines.get(player.index())
    }

    pub fn engines(&self) -> &[Engine] {
        &self.engines
    }

    pub fn link(&self) -> Option<VersusLink> {
        self.link
    }

    /// True once every board is in game over.
    pub fn all_over(&self) -> bool {
        self.engines.iter().all(Engine::is_game_over)
    }

    /// In versus, the last board standing once the other is out.
    pub fn winner(&self) -> Option<Player> {
        if self.mode != Mode::Versus {
            return None;
        }
        let out: ArrayVec<bool, 2> = self.engines.iter().map(Engine::is_game_over).collect();
        match out.as_slice() {
            [true, false] => Some(Player::Two),
            [false, true] => Some(Player::One),
            _ => None,
        }
    }

    pub fn subscribe(&mut self, listener: impl EventListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Record every following step. Call before the first step for a faithful replay.
    ///
    /// Returns false, and records nothing, for sessions made by [`Session::with_engines`].
    pub fn start_recording(&mut self) -> bool {
        if self.replayable {
            self.recorder = Some(Replay::new(self.mode, self.seed));
        }
        self.replayable
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn take_recording(&mut self) -> Option<Replay> {
        self.recorder.take()
    }

    fn record(&mut self, step: ReplayStep) {
        if let Some(replay) = self.recorder.as_mut() {
            replay.push(step);
        }
    }

    /// Feed one command to one board. Unknown players (player two in solo) are ignored.
    pub fn apply(&mut self, player: Player, command: InputCommand) {
        self.record(ReplayStep::Input { player, command });
        if let Some(engine) = self.engines.get_mut(player.index()) {
            engine.apply(command);
            self.flush(player);
        }
    }

    pub fn start_all(&mut self) {
        self.record(ReplayStep::StartAll);
        self.each(Engine::start);
    }

    pub fn toggle_pause_all(&mut self) {
        self.record(ReplayStep::PauseAll);
        self.each(Engine::toggle_pause);
    }

    pub fn restart_all(&mut self) {
        self.record(ReplayStep::RestartAll);
        self.each(Engine::restart);
    }

    /// Advance every board by `dt` ms, player one first.
    pub fn tick(&mut self, dt: u32) {
        self.record(ReplayStep::Tick { dt_ms: dt });
        self.each(|engine| engine.tick(dt));
    }

    fn each(&mut self, mut op: impl FnMut(&mut Engine)) {
        for &player in self.mode.players() {
            if let Some(engine) = self.engines.get_mut(player.index()) {
                op(engine);
                self.flush(player);
            }
        }
    }

    /// Route `player`'s pending events, forwarding garbage as it is found.
    fn flush(&mut self, player: Player) {
        let Some(engine) = self.engines.get_mut(player.index()) else {
            return;
        };
        let events: Vec<EngineEvent> = engine.drain_events().collect();

        for event in events {
            for listener in &mut self.listeners {
                listener.on_event(player, event);
            }
            if let Some(link) = self.link {
                if link.route(player, event, &mut self.engines) {
                    self.flush(link.peer(player));
                }
            }
        }
    }
}
