//! Replay - recorded session steps and headless playback
//!
//! A replay is the session mode and seed plus every step the session saw, in order.
//! Because engines are deterministic, running the steps against a fresh session
//! rebuilds the same boards.
//!
//! Files are JSON:
//!
//! ```json
//! {"mode":"versus","seed":42,"steps":[{"step":"startAll"},{"step":"tick","dtMs":16}]}
//! ```

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::session::{Mode, Session};
use crate::types::{InputCommand, Player};

/// One session-level call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReplayStep {
    Input {
        player: Player,
        command: InputCommand,
    },
    StartAll,
    PauseAll,
    RestartAll,
    Tick {
        dt_ms: u32,
    },
}

impl ReplayStep {
    /// Perform this step on `session`.
    pub fn apply_to(self, session: &mut Session) {
        match self {
            ReplayStep::Input { player, command } => session.apply(player, command),
            ReplayStep::StartAll => session.start_all(),
            ReplayStep::PauseAll => session.toggle_pause_all(),
            ReplayStep::RestartAll => session.restart_all(),
            ReplayStep::Tick { dt_ms } => session.tick(dt_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    pub mode: Mode,
    pub seed: u64,
    pub steps: Vec<ReplayStep>,
}

impl Replay {
    pub fn new(mode: Mode, seed: u64) -> Self {
        Self {
            mode,
            seed,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, step: ReplayStep) {
        self.steps.push(step);
    }

    /// Total simulated time in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.steps
            .iter()
            .map(|step| match step {
                ReplayStep::Tick { dt_ms } => *dt_ms as u64,
                _ => 0,
            })
            .sum()
    }

    /// Build a fresh session and play every step into it.
    pub fn run(&self) -> Session {
        let mut session = Session::new(self.mode, self.seed);
        self.run_into(&mut session);
        session
    }

    /// Play every step into an existing session (listeners already subscribed).
    pub fn run_into(&self, session: &mut Session) {
        for &step in &self.steps {
            step.apply_to(session);
        }
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }

    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}
