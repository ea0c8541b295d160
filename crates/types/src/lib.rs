//! Core types module - shared data structures and constants
//!
//! This crate defines the fundamental types used throughout the workspace.
//! Everything here is plain data: the engine, the input adapter, the terminal
//! renderer and the replay format all speak these types.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Height**: 20 rows (indexed 0-19, top to bottom)
//! - **Spawn origin**: (3, 0)
//!
//! # Timing Constants
//!
//! All timing values are whole milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Step used by the fixed-step loop (~60 FPS) |
//! | `DEFAULT_DAS_MS` | 150 | Held time before horizontal auto-repeat starts |
//! | `DEFAULT_ARR_MS` | 50 | Interval between horizontal auto-repeats |
//! | `SOFT_DROP_DIVISOR` | 10 | Soft drop runs at 1/10 of the gravity interval |
//! | `SOFT_DROP_FLOOR_MS` | 20 | Soft drop interval never goes below this |
//!
//! # Drop Intervals by Level
//!
//! | Level | Interval |
//! |-------|----------|
//! | 1 | 1000ms |
//! | 2 | 800ms |
//! | 3 | 650ms |
//! | 4 | 500ms |
//! | 5 | 400ms |
//! | 6 | 320ms |
//! | 7 | 250ms |
//! | 8 | 200ms |
//! | 9 | 160ms |
//! | 10+ | 120ms floor |
//!
//! # Examples
//!
//! ```
//! use duel_tetris_types::{InputCommand, PieceKind, Player, Rotation, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(Player::One.peer(), Player::Two);
//!
//! let cmd = InputCommand::from_str("hardDrop").unwrap();
//! assert_eq!(cmd, InputCommand::HardDrop);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

use serde::{Deserialize, Serialize};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Spawn origin column for every piece.
pub const SPAWN_X: i8 = 3;

/// Spawn origin row for every piece.
pub const SPAWN_Y: i8 = 0;

/// Step length used by the fixed-step loop and by headless drivers (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Gravity interval at level 1.
pub const BASE_DROP_MS: u32 = 1000;

/// Drop intervals by level (milliseconds per row)
///
/// Index 0 = Level 1, Index 8 = Level 9. Levels past the table use
/// [`DROP_INTERVAL_FLOOR_MS`].
pub const DROP_INTERVALS: [u32; 9] = [BASE_DROP_MS, 800, 650, 500, 400, 320, 250, 200, 160];

/// Gravity interval floor.
pub const DROP_INTERVAL_FLOOR_MS: u32 = 120;

/// Soft drop runs at `interval / SOFT_DROP_DIVISOR`.
pub const SOFT_DROP_DIVISOR: u32 = 10;

/// Soft drop interval floor.
pub const SOFT_DROP_FLOOR_MS: u32 = 20;

/// DAS (Delayed Auto Shift) delay in milliseconds.
pub const DEFAULT_DAS_MS: u32 = 150;

/// ARR (Auto Repeat Rate) in milliseconds.
pub const DEFAULT_ARR_MS: u32 = 50;

/// Lines needed per level step.
pub const LINES_PER_LEVEL: u32 = 10;

/// Clear bonus indexed by rows cleared in one lock (0-4), scaled by level.
pub const LINE_CLEAR_BONUS: [u32; 5] = [0, 100, 300, 500, 800];

/// Additional points per cleared row, scaled by level.
///
/// Applied on top of [`LINE_CLEAR_BONUS`]; both terms are part of the scoring rule.
pub const PER_LINE_POINTS: u32 = 10;

/// The seven tetromino piece kinds
///
/// - **I**: Cyan, horizontal bar
/// - **O**: Yellow, 2x2 square
/// - **T**: Magenta, T-shaped
/// - **S**: Green, S-shaped
/// - **Z**: Red, Z-shaped (mirror of S)
/// - **J**: Blue, J-shaped
/// - **L**: Orange, L-shaped (mirror of J)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// Every kind, in a fixed order. A fresh bag starts from this order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Position in [`PieceKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::O => 1,
            PieceKind::T => 2,
            PieceKind::S => 3,
            PieceKind::Z => 4,
            PieceKind::J => 5,
            PieceKind::L => 6,
        }
    }

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use duel_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Single uppercase letter, as shown in the next-piece panel.
    pub fn letter(self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::J => "J",
            PieceKind::L => "L",
        }
    }
}

/// Rotation states
///
/// The cycle goes North → East → South → West → North; North is the spawn
/// orientation and maps to state index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// State index in `0..4`.
    pub fn index(self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Inverse of [`Rotation::index`]; the index is taken modulo 4.
    pub fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }

    /// Target state for a turn: `(state + dir + 4) mod 4`.
    pub fn turned(self, dir: RotateDir) -> Self {
        let target = (self.index() as i8 + dir.delta() + 4) % 4;
        Self::from_index(target as u8)
    }

    /// Rotate clockwise (90°)
    ///
    /// ```
    /// use duel_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(self) -> Self {
        self.turned(RotateDir::Cw)
    }

    /// Rotate counter-clockwise (-90°)
    ///
    /// ```
    /// use duel_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_ccw(), Rotation::West);
    /// ```
    pub fn rotate_ccw(self) -> Self {
        self.turned(RotateDir::Ccw)
    }
}

/// Rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotateDir {
    Cw,
    Ccw,
}

impl RotateDir {
    /// `+1` for clockwise, `-1` for counter-clockwise.
    pub fn delta(self) -> i8 {
        match self {
            RotateDir::Cw => 1,
            RotateDir::Ccw => -1,
        }
    }
}

/// Horizontal movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HorizontalDir {
    Left,
    Right,
}

impl HorizontalDir {
    pub fn dx(self) -> i8 {
        match self {
            HorizontalDir::Left => -1,
            HorizontalDir::Right => 1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            HorizontalDir::Left => HorizontalDir::Right,
            HorizontalDir::Right => HorizontalDir::Left,
        }
    }
}

/// Contents of an occupied board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    /// Locked cell of a piece, keeps the piece color.
    Piece(PieceKind),
    /// Cell of a garbage row sent by the opponent.
    Garbage,
}

impl Block {
    /// Compact grid code: 1-7 for piece kinds (in [`PieceKind::ALL`] order), 8 for garbage.
    pub fn code(self) -> u8 {
        match self {
            Block::Piece(kind) => kind.index() as u8 + 1,
            Block::Garbage => GARBAGE_CODE,
        }
    }

    /// Inverse of [`Block::code`]; `0` and unknown codes are empty.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=7 => Some(Block::Piece(PieceKind::ALL[(code - 1) as usize])),
            GARBAGE_CODE => Some(Block::Garbage),
            _ => None,
        }
    }
}

/// Grid code used for garbage cells in snapshots.
pub const GARBAGE_CODE: u8 = 8;

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(Block)`: Occupied by a locked piece cell or by garbage
pub type Cell = Option<Block>;

/// Seat at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// The other seat.
    pub fn peer(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Short tag used in logs and panel titles.
    pub fn tag(self) -> &'static str {
        match self {
            Player::One => "p1",
            Player::Two => "p2",
        }
    }
}

/// Primitive engine command set.
///
/// This is what an input layer produces. Held controls come as press/release
/// pairs; everything else is a one-shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputCommand {
    PressLeft,
    ReleaseLeft,
    PressRight,
    ReleaseRight,
    PressDown,
    ReleaseDown,
    RotateCw,
    RotateCcw,
    HardDrop,
    TogglePause,
    Start,
    Restart,
}

impl InputCommand {
    pub const ALL: [InputCommand; 12] = [
        InputCommand::PressLeft,
        InputCommand::ReleaseLeft,
        InputCommand::PressRight,
        InputCommand::ReleaseRight,
        InputCommand::PressDown,
        InputCommand::ReleaseDown,
        InputCommand::RotateCw,
        InputCommand::RotateCcw,
        InputCommand::HardDrop,
        InputCommand::TogglePause,
        InputCommand::Start,
        InputCommand::Restart,
    ];

    /// Parse a command name (case-insensitive camelCase)
    ///
    /// ```
    /// use duel_tetris_types::InputCommand;
    ///
    /// assert_eq!(InputCommand::from_str("pressLeft"), Some(InputCommand::PressLeft));
    /// assert_eq!(InputCommand::from_str("ROTATECCW"), Some(InputCommand::RotateCcw));
    /// assert_eq!(InputCommand::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.as_str().to_lowercase() == lower)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputCommand::PressLeft => "pressLeft",
            InputCommand::ReleaseLeft => "releaseLeft",
            InputCommand::PressRight => "pressRight",
            InputCommand::ReleaseRight => "releaseRight",
            InputCommand::PressDown => "pressDown",
            InputCommand::ReleaseDown => "releaseDown",
            InputCommand::RotateCw => "rotateCw",
            InputCommand::RotateCcw => "rotateCcw",
            InputCommand::HardDrop => "hardDrop",
            InputCommand::TogglePause => "togglePause",
            InputCommand::Start => "start",
            InputCommand::Restart => "restart",
        }
    }
}

/// Named engine events, emitted at the moment the underlying change commits.
///
/// Audio, logging and the versus link all consume these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Successful one-column shift (manual or auto-repeat).
    Move,
    /// Successful rotation.
    Rotate,
    /// Hard drop, regardless of distance travelled.
    Drop,
    /// Active piece written into the board.
    Lock,
    /// Rows removed by the last lock.
    LineClear { count: u8 },
    /// Spawn failed; the engine is latched.
    GameOver,
    /// Garbage owed to the opponent by the last lock.
    GarbageSent { lines: u8 },
    /// Garbage rows inserted into this board.
    GarbageReceived { lines: u8 },
}

impl EngineEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineEvent::Move => "move",
            EngineEvent::Rotate => "rotate",
            EngineEvent::Drop => "drop",
            EngineEvent::Lock => "lock",
            EngineEvent::LineClear { .. } => "line_clear",
            EngineEvent::GameOver => "game_over",
            EngineEvent::GarbageSent { .. } => "garbage_sent",
            EngineEvent::GarbageReceived { .. } => "garbage_received",
        }
    }
}
