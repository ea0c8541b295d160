//! duel-tetris (workspace facade crate).
//!
//! The engine, input mapping and terminal renderer live in dedicated crates under
//! `crates/`; this package re-exports them as `duel_tetris::{core,input,term,types}` and
//! adds the pieces only the binaries need: environment configuration and the event log.

pub mod config;
pub mod event_log;

pub use duel_tetris_core as core;
pub use duel_tetris_input as input;
pub use duel_tetris_term as term;
pub use duel_tetris_types as types;
