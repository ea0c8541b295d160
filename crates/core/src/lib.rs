//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains all the game rules, state management, and simulation logic.
//! It has **zero dependencies** on terminals or I/O beyond `std::io` traits for replay files:
//!
//! - **Deterministic**: Same seed and the same command/tick stream produce identical boards
//! - **Testable**: Every operation is infallible and observable through events and snapshots
//! - **Portable**: Can run in any environment (terminal, headless replay, benchmarks)
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid with collision checks, line clearing and garbage rows
//! - [`pieces`]: Tetromino shape tables and the kick search
//! - [`rng`]: 7-bag random piece generation
//! - [`scoring`]: Clear points, leveling and gravity speed
//! - [`engine`]: One player's state machine
//! - [`versus`]: Garbage forwarding between two engines
//! - [`session`]: Engines, link and event listeners for one game start
//! - [`game_loop`]: Frame timing, variable or fixed step
//! - [`replay`]: Recorded steps and headless playback
//! - [`snapshot`]: Read model for renderers
//!
//! # Game Rules
//!
//! - **7-Bag Randomizer**: every run of seven pieces from a bag boundary holds each kind once
//! - **Rotation**: fixed kick list (in place, right, left, up, down, two right, two left)
//! - **No lock delay**: a piece locks on the first gravity step that cannot descend
//! - **Scoring**: clear bonus times level plus ten points per row times level
//! - **Garbage**: clearing `n` rows sends `n - 1` rows to the opponent
//!
//! # Example
//!
//! ```
//! use duel_tetris_core::Session;
//! use duel_tetris_types::{InputCommand, Player};
//!
//! let mut session = Session::versus(12345);
//! session.start_all();
//!
//! session.apply(Player::One, InputCommand::PressRight);
//! session.apply(Player::One, InputCommand::RotateCw);
//! session.apply(Player::One, InputCommand::HardDrop);
//! session.tick(16);
//!
//! let one = session.engine(Player::One).unwrap();
//! assert_eq!(one.board().occupied_count(), 4);
//! ```
//!
//! # Timing
//!
//! Time is whole milliseconds. Gravity depends on level (1000ms at level 1, 120ms floor);
//! soft drop runs at a tenth of that, never below 20ms. Horizontal auto-repeat waits
//! 150ms, then repeats every 50ms.

pub mod board;
pub mod engine;
pub mod game_loop;
pub mod pieces;
pub mod replay;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod versus;

pub use duel_tetris_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use engine::{Engine, Phase, Timing};
pub use game_loop::{GameLoop, StepMode};
pub use pieces::{rotate, shape, ActivePiece};
pub use replay::{Replay, ReplayStep};
pub use rng::Bag;
pub use scoring::{calculate_line_clear_score, ScoreResult};
pub use session::{EventListener, Mode, Session};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
pub use versus::VersusLink;
