//! Terminal input (engine-facing).
//!
//! Maps `crossterm` key events onto the engine's primitive command set for one or two
//! players, and synthesizes release events for terminals that never send them.
//! Nothing here touches an engine; callers route the results into a session.

pub mod held;
pub mod map;

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::{KeyEvent, KeyEventKind};

pub use duel_tetris_types as types;

pub use held::{HeldKeys, DEFAULT_KEY_RELEASE_TIMEOUT_MS};
pub use map::{map_key, should_quit, Control, KeyAction, Layout};

use types::{InputCommand, Player};

/// Result of one key event or one expiry pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Routed {
    Command(Player, InputCommand),
    StartAll,
    PauseAll,
    RestartAll,
    Quit,
}

/// Key event router: layout plus held-key state.
#[derive(Debug, Clone)]
pub struct KeyInput {
    layout: Layout,
    held: HeldKeys,
}

impl KeyInput {
    pub fn new(layout: Layout, release_timeout: Option<Duration>) -> Self {
        Self {
            layout,
            held: HeldKeys::new(release_timeout),
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn held(&self) -> &HeldKeys {
        &self.held
    }

    pub fn set_release_timeout(&mut self, timeout: Option<Duration>) {
        self.held.set_release_timeout(timeout);
    }

    /// Route one key event received at `now`.
    pub fn handle(&mut self, key: KeyEvent, now: Instant) -> Option<Routed> {
        let action = map_key(self.layout, key)?;

        match (action, key.kind) {
            (KeyAction::Player(player, control), KeyEventKind::Press) => self
                .held
                .press(player, control, now)
                .map(|cmd| Routed::Command(player, cmd)),
            // Terminal auto-repeat keeps held keys alive but never re-fires one-shots.
            (KeyAction::Player(player, control), KeyEventKind::Repeat) => {
                if control.is_held() {
                    self.held
                        .press(player, control, now)
                        .map(|cmd| Routed::Command(player, cmd))
                } else {
                    None
                }
            }
            (KeyAction::Player(player, control), KeyEventKind::Release) => self
                .held
                .release(player, control)
                .map(|cmd| Routed::Command(player, cmd)),
            (_, KeyEventKind::Release | KeyEventKind::Repeat) => None,
            (KeyAction::Start, KeyEventKind::Press) => Some(Routed::StartAll),
            (KeyAction::Pause, KeyEventKind::Press) => Some(Routed::PauseAll),
            (KeyAction::Restart, KeyEventKind::Press) => Some(Routed::RestartAll),
            (KeyAction::Quit, KeyEventKind::Press) => Some(Routed::Quit),
        }
    }

    /// Synthesized releases for keys that went stale.
    pub fn expire(&mut self, now: Instant) -> ArrayVec<Routed, 6> {
        self.held
            .expire(now)
            .into_iter()
            .map(|(player, cmd)| Routed::Command(player, cmd))
            .collect()
    }

    /// Release every held key (used on pause and restart).
    pub fn release_all(&mut self) -> ArrayVec<Routed, 6> {
        self.held
            .release_all()
            .into_iter()
            .map(|(player, cmd)| Routed::Command(player, cmd))
            .collect()
    }
}

impl Default for KeyInput {
    fn default() -> Self {
        Self::new(
            Layout::default(),
            Some(Duration::from_millis(DEFAULT_KEY_RELEASE_TIMEOUT_MS as u64)),
        )
    }
}
