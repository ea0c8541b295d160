//! Engine module - the per-player game state machine
//!
//! Ties together board, bag, rotation and scoring. Everything is driven by two kinds of
//! calls: input operations (move, rotate, drop, lifecycle) and `tick(dt)`. Neither ever
//! fails; a rejected operation is a silent no-op and game over is a latch.
//!
//! Observable changes are queued as [`EngineEvent`]s in the order they commit. Whoever
//! owns the engine drains them after each call.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::board::Board;
use crate::pieces::{self, ActivePiece};
use crate::rng::Bag;
use crate::scoring::{
    calculate_level, calculate_line_clear_score, drop_interval_ms, garbage_for_clear,
    soft_drop_interval_ms,
};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::{
    EngineEvent, HorizontalDir, InputCommand, PieceKind, RotateDir, DEFAULT_ARR_MS,
    DEFAULT_DAS_MS,
};

/// ChaCha stream used for garbage holes, separate from the bag's shuffles.
const GARBAGE_STREAM: u64 = 1;

/// Where the engine is in the spawn/fall/lock cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Created, waiting for `start()`.
    Idle,
    /// Transient: resolved to `Falling` or `GameOver` within the same call.
    Spawning,
    Falling,
    /// Transient: only held inside one lock, never visible between calls.
    Locking,
    /// Transient, like `Locking`.
    LineClearing,
    /// Spawn failed. Terminal.
    GameOver,
}

/// Horizontal auto-repeat timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Held time before auto-repeat starts.
    pub das_ms: u32,
    /// Interval between repeats once DAS has elapsed.
    pub arr_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            das_ms: DEFAULT_DAS_MS,
            arr_ms: DEFAULT_ARR_MS,
        }
    }
}

/// One player's game.
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    active: Option<ActivePiece>,
    next: PieceKind,
    bag: Bag,
    garbage_rng: ChaCha8Rng,
    seed: u64,
    score: u32,
    level: u32,
    lines: u32,
    drop_interval: u32,
    gravity_ms: u32,
    horizontal: Option<HorizontalDir>,
    left_held: bool,
    right_held: bool,
    das_timer_ms: u32,
    arr_accumulator_ms: u32,
    soft_drop: bool,
    running: bool,
    paused: bool,
    phase: Phase,
    timing: Timing,
    events: Vec<EngineEvent>,
}

impl Engine {
    /// Create a new engine with the given RNG seed
    pub fn new(seed: u64) -> Self {
        Self::with_timing(seed, Timing::default())
    }

    pub fn with_timing(seed: u64, timing: Timing) -> Self {
        let mut bag = Bag::new(seed);
        let next = bag.draw();
        let mut garbage_rng = ChaCha8Rng::seed_from_u64(seed);
        garbage_rng.set_stream(GARBAGE_STREAM);

        Self {
            board: Board::new(),
            active: None,
            next,
            bag,
            garbage_rng,
            seed,
            score: 0,
            level: 1,
            lines: 0,
            drop_interval: drop_interval_ms(1),
            gravity_ms: 0,
            horizontal: None,
            left_held: false,
            right_held: false,
            das_timer_ms: 0,
            arr_accumulator_ms: 0,
            soft_drop: false,
            running: false,
            paused: false,
            phase: Phase::Idle,
            timing,
            events: Vec::new(),
        }
    }

    /// Start from a prepared board instead of an empty one.
    pub fn with_board(seed: u64, board: Board) -> Self {
        Self {
            board,
            ..Self::new(seed)
        }
    }

    // ---- accessors ----

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    /// Kind that will spawn after the active piece locks.
    pub fn next(&self) -> PieceKind {
        self.next
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Gravity interval at the current level, ignoring soft drop.
    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval
    }

    /// Gravity interval in effect right now.
    pub fn effective_interval_ms(&self) -> u32 {
        if self.soft_drop {
            soft_drop_interval_ms(self.drop_interval)
        } else {
            self.drop_interval
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn is_soft_dropping(&self) -> bool {
        self.soft_drop
    }

    /// Direction currently auto-repeating, if any.
    pub fn held_direction(&self) -> Option<HorizontalDir> {
        self.horizontal
    }

    /// Events queued since the last drain.
    pub fn pending_events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Take the queued events, oldest first.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, EngineEvent> {
        self.events.drain(..)
    }

    fn playable(&self) -> bool {
        self.running && !self.paused && self.phase != Phase::GameOver
    }

    fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    // ---- lifecycle ----

    /// Start the game and spawn the first piece
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.running = true;
        self.spawn();
    }

    /// Throw this game away and start a fresh one.
    ///
    /// The new seed is derived from the old game's bag, so a replayed session restarts
    /// into the same sequence. Timing carries over. Works from game over too.
    pub fn restart(&mut self) {
        let seed = self.bag.next_seed();
        let events = std::mem::take(&mut self.events);
        *self = Self::with_timing(seed, self.timing);
        self.events = events;
        self.start();
    }

    /// Flip the pause flag. Held controls are dropped either way.
    pub fn toggle_pause(&mut self) {
        if !self.running || self.phase == Phase::GameOver {
            return;
        }
        self.paused = !self.paused;
        self.clear_held();
    }

    fn clear_held(&mut self) {
        self.horizontal = None;
        self.left_held = false;
        self.right_held = false;
        self.das_timer_ms = 0;
        self.arr_accumulator_ms = 0;
        self.soft_drop = false;
    }

    // ---- input operations ----

    /// Dispatch one primitive command.
    pub fn apply(&mut self, command: InputCommand) {
        match command {
            InputCommand::PressLeft => self.press_horizontal(HorizontalDir::Left),
            InputCommand::ReleaseLeft => self.release_horizontal(HorizontalDir::Left),
            InputCommand::PressRight => self.press_horizontal(HorizontalDir::Right),
            InputCommand::ReleaseRight => self.release_horizontal(HorizontalDir::Right),
            InputCommand::PressDown => self.press_down(),
            InputCommand::ReleaseDown => self.release_down(),
            InputCommand::RotateCw => {
                self.rotate(RotateDir::Cw);
            }
            InputCommand::RotateCcw => {
                self.rotate(RotateDir::Ccw);
            }
            InputCommand::HardDrop => self.hard_drop(),
            InputCommand::TogglePause => self.toggle_pause(),
            InputCommand::Start => self.start(),
            InputCommand::Restart => self.restart(),
        }
    }

    /// Shift one column. Resets the auto-repeat timer whether or not the shift fits.
    pub fn move_horizontal(&mut self, dir: HorizontalDir) -> bool {
        if !self.playable() {
            return false;
        }
        self.das_timer_ms = 0;
        self.arr_accumulator_ms = 0;
        self.shift(dir)
    }

    fn shift(&mut self, dir: HorizontalDir) -> bool {
        if self.try_move(dir.dx(), 0) {
            self.emit(EngineEvent::Move);
            true
        } else {
            false
        }
    }

    /// Start holding a direction (last press wins) and move once.
    pub fn press_horizontal(&mut self, dir: HorizontalDir) {
        if !self.playable() {
            return;
        }
        match dir {
            HorizontalDir::Left => self.left_held = true,
            HorizontalDir::Right => self.right_held = true,
        }
        self.horizontal = Some(dir);
        self.move_horizontal(dir);
    }

    /// Stop holding a direction; repeat falls back to the other one if still held.
    pub fn release_horizontal(&mut self, dir: HorizontalDir) {
        match dir {
            HorizontalDir::Left => self.left_held = false,
            HorizontalDir::Right => self.right_held = false,
        }
        if self.horizontal != Some(dir) {
            return;
        }

        let other = dir.opposite();
        let other_held = match other {
            HorizontalDir::Left => self.left_held,
            HorizontalDir::Right => self.right_held,
        };
        self.horizontal = other_held.then_some(other);
        self.das_timer_ms = 0;
        self.arr_accumulator_ms = 0;
    }

    /// Begin soft drop: faster gravity plus one immediate step.
    pub fn press_down(&mut self) {
        if !self.playable() {
            return;
        }
        self.soft_drop = true;
        self.gravity_ms = 0;
        self.try_move(0, 1);
    }

    pub fn release_down(&mut self) {
        self.soft_drop = false;
    }

    /// Drop straight down and lock.
    pub fn hard_drop(&mut self) {
        if !self.playable() || self.active.is_none() {
            return;
        }
        while self.try_move(0, 1) {}
        self.emit(EngineEvent::Drop);
        self.lock();
    }

    /// Rotate with kicks. Returns whether the rotation committed.
    pub fn rotate(&mut self, dir: RotateDir) -> bool {
        if !self.playable() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let board = &self.board;
        match pieces::rotate(&active, dir, |x, y| board.is_free(x, y)) {
            Some(rotated) => {
                self.active = Some(rotated);
                self.emit(EngineEvent::Rotate);
                true
            }
            None => false,
        }
    }

    /// Insert `lines` garbage rows at the bottom.
    ///
    /// The falling piece is left where it is, even if garbage now overlaps it.
    pub fn add_garbage(&mut self, lines: u8) {
        if self.phase == Phase::GameOver || lines == 0 {
            return;
        }
        let inserted = self
            .board
            .insert_garbage_rows(lines as usize, &mut self.garbage_rng);
        self.emit(EngineEvent::GarbageReceived {
            lines: inserted as u8,
        });
    }

    // ---- simulation ----

    /// Advance by `dt` milliseconds: horizontal auto-repeat, then gravity.
    pub fn tick(&mut self, dt: u32) {
        if !self.playable() {
            return;
        }
        self.tick_horizontal(dt);
        self.tick_gravity(dt);
    }

    fn tick_horizontal(&mut self, dt: u32) {
        let Some(dir) = self.horizontal else {
            return;
        };

        let das = self.timing.das_ms;
        let prev_das = self.das_timer_ms;
        self.das_timer_ms = self.das_timer_ms.saturating_add(dt);
        if self.das_timer_ms < das {
            return;
        }

        let excess = if prev_das < das {
            self.das_timer_ms - das
        } else {
            dt
        };
        self.arr_accumulator_ms = self.arr_accumulator_ms.saturating_add(excess);

        let arr = self.timing.arr_ms.max(1);
        while self.arr_accumulator_ms >= arr {
            self.arr_accumulator_ms -= arr;
            if !self.shift(dir) {
                // Against a wall: don't bank repeats for later.
                self.arr_accumulator_ms = 0;
                break;
            }
        }
    }

    fn tick_gravity(&mut self, dt: u32) {
        if self.active.is_none() {
            return;
        }
        self.gravity_ms = self.gravity_ms.saturating_add(dt);
        if self.gravity_ms < self.effective_interval_ms() {
            return;
        }
        self.gravity_ms = 0;
        if !self.try_move(0, 1) {
            self.lock();
        }
    }

    /// Try to move the active piece
    fn try_move(&mut self, dx: i8, dy: i8) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let moved = active.shifted(dx, dy);
        if moved.fits(&self.board) {
            self.active = Some(moved);
            true
        } else {
            false
        }
    }

    /// Fold the active piece into the board, clear rows, score, then spawn.
    fn lock(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        self.phase = Phase::Locking;
        self.board.stamp_piece(&piece.cells(), piece.kind);
        self.emit(EngineEvent::Lock);

        self.phase = Phase::LineClearing;
        let cleared = self.board.clear_full_rows().len();
        if cleared > 0 {
            self.score += calculate_line_clear_score(cleared, self.level).total;
            self.lines += cleared as u32;
            self.emit(EngineEvent::LineClear {
                count: cleared as u8,
            });

            let level = calculate_level(self.lines);
            if level != self.level {
                self.level = level;
                self.drop_interval = drop_interval_ms(level);
            }

            let garbage = garbage_for_clear(cleared);
            if garbage > 0 {
                self.emit(EngineEvent::GarbageSent { lines: garbage });
            }
        }

        self.spawn();
    }

    /// Spawn the queued piece at the default origin, or one row higher.
    fn spawn(&mut self) {
        self.phase = Phase::Spawning;
        let kind = self.next;
        self.next = self.bag.draw();
        self.gravity_ms = 0;

        let piece = ActivePiece::spawn(kind);
        let placed = [piece, piece.shifted(0, -1)]
            .into_iter()
            .find(|candidate| candidate.fits(&self.board));

        match placed {
            Some(piece) => {
                self.active = Some(piece);
                self.phase = Phase::Falling;
            }
            None => {
                self.active = None;
                self.running = false;
                self.clear_held();
                self.phase = Phase::GameOver;
                self.emit(EngineEvent::GameOver);
            }
        }
    }

    /// Row the active piece would land on (origin y), if there is one.
    pub fn ghost_y(&self) -> Option<i8> {
        let mut ghost = self.active?;
        loop {
            let below = ghost.shifted(0, 1);
            if !below.fits(&self.board) {
                return Some(ghost.y);
            }
            ghost = below;
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_u8_grid(&mut out.board);
        out.active = self.active.map(ActiveSnapshot::from);
        out.ghost_y = self.ghost_y();
        out.next = self.next;
        out.score = self.score;
        out.level = self.level;
        out.lines = self.lines;
        out.running = self.running;
        out.paused = self.paused;
        out.game_over = self.is_game_over();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(1)
    }
}
