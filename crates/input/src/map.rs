//! Key mapping from terminal events to player controls.
//!
//! Two layouts: `Solo` gives player one the arrows and the WASD family; `Versus` splits
//! the keyboard so the two players' key sets never overlap.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::{HorizontalDir, InputCommand, Player, RotateDir};

/// Keyboard split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    Solo,
    #[default]
    Versus,
}

/// A player-facing control, before press/release is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Shift(HorizontalDir),
    Down,
    Rotate(RotateDir),
    HardDrop,
}

impl Control {
    /// Held controls come as press/release pairs; the rest fire once.
    pub fn is_held(self) -> bool {
        matches!(self, Control::Shift(_) | Control::Down)
    }

    pub fn press_command(self) -> InputCommand {
        match self {
            Control::Shift(HorizontalDir::Left) => InputCommand::PressLeft,
            Control::Shift(HorizontalDir::Right) => InputCommand::PressRight,
            Control::Down => InputCommand::PressDown,
            Control::Rotate(RotateDir::Cw) => InputCommand::RotateCw,
            Control::Rotate(RotateDir::Ccw) => InputCommand::RotateCcw,
            Control::HardDrop => InputCommand::HardDrop,
        }
    }

    /// Release command for held controls.
    pub fn release_command(self) -> Option<InputCommand> {
        match self {
            Control::Shift(HorizontalDir::Left) => Some(InputCommand::ReleaseLeft),
            Control::Shift(HorizontalDir::Right) => Some(InputCommand::ReleaseRight),
            Control::Down => Some(InputCommand::ReleaseDown),
            _ => None,
        }
    }
}

/// What a key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Player(Player, Control),
    /// Start every board.
    Start,
    /// Pause or resume every board.
    Pause,
    /// Restart every board.
    Restart,
    Quit,
}

const LEFT: Control = Control::Shift(HorizontalDir::Left);
const RIGHT: Control = Control::Shift(HorizontalDir::Right);
const CW: Control = Control::Rotate(RotateDir::Cw);
const CCW: Control = Control::Rotate(RotateDir::Ccw);

/// Map a key to its action under `layout`.
pub fn map_key(layout: Layout, key: KeyEvent) -> Option<KeyAction> {
    if should_quit(key) {
        return Some(KeyAction::Quit);
    }
    if let Some(global) = map_global(key.code) {
        return Some(global);
    }

    let (player, control) = match layout {
        Layout::Solo => (Player::One, map_solo(key.code)?),
        Layout::Versus => map_versus(key.code)?,
    };
    Some(KeyAction::Player(player, control))
}

fn map_global(code: KeyCode) -> Option<KeyAction> {
    match code {
        KeyCode::Char('g') | KeyCode::Char('G') => Some(KeyAction::Start),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(KeyAction::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(KeyAction::Restart),
        _ => None,
    }
}

fn map_solo(code: KeyCode) -> Option<Control> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(LEFT),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(RIGHT),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Control::Down),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(CW),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Char('z') | KeyCode::Char('Z') => {
            Some(CCW)
        }
        KeyCode::Char(' ') | KeyCode::Enter => Some(Control::HardDrop),
        _ => None,
    }
}

fn map_versus(code: KeyCode) -> Option<(Player, Control)> {
    let mapped = match code {
        // Player one: left hand
        KeyCode::Char('a') | KeyCode::Char('A') => (Player::One, LEFT),
        KeyCode::Char('d') | KeyCode::Char('D') => (Player::One, RIGHT),
        KeyCode::Char('s') | KeyCode::Char('S') => (Player::One, Control::Down),
        KeyCode::Char('w') | KeyCode::Char('W') => (Player::One, CW),
        KeyCode::Char('q') | KeyCode::Char('Q') => (Player::One, CCW),
        KeyCode::Char(' ') => (Player::One, Control::HardDrop),

        // Player two: arrows
        KeyCode::Left => (Player::Two, LEFT),
        KeyCode::Right => (Player::Two, RIGHT),
        KeyCode::Down => (Player::Two, Control::Down),
        KeyCode::Up => (Player::Two, CW),
        KeyCode::Char('.') => (Player::Two, CCW),
        KeyCode::Enter => (Player::Two, Control::HardDrop),

        _ => return None,
    };
    Some(mapped)
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            && key.modifiers.contains(KeyModifiers::CONTROL))
}
