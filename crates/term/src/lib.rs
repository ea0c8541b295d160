//! Terminal rendering for duel-tetris.
//!
//! Boards are drawn into a plain framebuffer first (pure, testable), then flushed to the
//! terminal as a full redraw or a per-board diff. No widget toolkit: every glyph is
//! placed explicitly, which keeps the 2:1 cell aspect ratio under control.

pub mod board_view;
pub mod fb;
pub mod renderer;

pub use duel_tetris_core as core;
pub use duel_tetris_types as types;

pub use board_view::{block_color, piece_color, Regions, SessionView, Viewport};
pub use fb::{FrameBuffer, Glyph, Rect, Rgb, Style};
pub use renderer::{dirty_spans, encode_diff_into, encode_full_into, Span, TerminalRenderer};
