//! Game loop - turns wall-clock frames into session ticks
//!
//! Call [`GameLoop::frame`] once per display frame. The elapsed time since the previous
//! frame is measured in whole milliseconds; the sub-millisecond remainder stays on the
//! clock and counts toward the next frame.
//!
//! By default each frame is one variable-length tick. [`StepMode::Fixed`] instead
//! accumulates time and runs whole fixed steps, at most [`MAX_CATCH_UP_STEPS`] per frame.

use std::time::{Duration, Instant};

use crate::session::Session;

/// Fixed-step frames never run more steps than this; older backlog is dropped.
pub const MAX_CATCH_UP_STEPS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepMode {
    /// One tick per frame with the measured delta.
    #[default]
    Variable,
    /// Whole ticks of `step_ms`.
    Fixed { step_ms: u32 },
}

#[derive(Debug, Clone)]
pub struct GameLoop {
    mode: StepMode,
    last: Option<Instant>,
    accumulator_ms: u32,
}

impl GameLoop {
    pub fn new(mode: StepMode) -> Self {
        Self {
            mode,
            last: None,
            accumulator_ms: 0,
        }
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }

    /// Forget the previous frame time, e.g. after a long blocking prompt.
    pub fn reset(&mut self) {
        self.last = None;
        self.accumulator_ms = 0;
    }

    /// Time until the next fixed step is due. `None` in variable mode, where any
    /// frame length works.
    pub fn until_next_step(&self) -> Option<Duration> {
        match self.mode {
            StepMode::Variable => None,
            StepMode::Fixed { step_ms } => Some(Duration::from_millis(
                step_ms.max(1).saturating_sub(self.accumulator_ms) as u64,
            )),
        }
    }

    /// Run one display frame at `now`. Returns the whole milliseconds consumed.
    ///
    /// The first frame only starts the clock.
    pub fn frame(&mut self, now: Instant, session: &mut Session) -> u32 {
        let Some(last) = self.last else {
            self.last = Some(now);
            return 0;
        };

        let elapsed = now.saturating_duration_since(last);
        let dt = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
        self.last = Some(last + Duration::from_millis(dt as u64));
        self.advance(dt, session);
        dt
    }

    /// Feed `dt` ms into the session. Returns the number of ticks run.
    pub fn advance(&mut self, dt: u32, session: &mut Session) -> u32 {
        match self.mode {
            StepMode::Variable => {
                if dt == 0 {
                    return 0;
                }
                session.tick(dt);
                1
            }
            StepMode::Fixed { step_ms } => {
                let step = step_ms.max(1);
                self.accumulator_ms = self.accumulator_ms.saturating_add(dt);

                let mut steps = 0;
                while self.accumulator_ms >= step && steps < MAX_CATCH_UP_STEPS {
                    session.tick(step);
                    self.accumulator_ms -= step;
                    steps += 1;
                }
                if self.accumulator_ms >= step {
                    self.accumulator_ms %= step;
                }
                steps
            }
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(StepMode::default())
    }
}
