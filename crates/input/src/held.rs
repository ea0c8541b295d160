//! Held-key tracking for terminal environments.
//!
//! The engine wants press/release pairs for Left, Right and Down. Terminals with the
//! keyboard enhancement protocol report real releases; the rest only send presses (and
//! OS auto-repeat presses while a key stays down). For those, a held key is released
//! automatically once no press has refreshed it for the timeout.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;

use crate::map::Control;
use crate::types::{HorizontalDir, InputCommand, Player};

// In terminals without key-release events, a short timeout prevents a single tap
// from turning into a sustained "held" state that triggers DAS/ARR repeats.
pub const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

const HELD_CONTROLS: [Control; 3] = [
    Control::Shift(HorizontalDir::Left),
    Control::Shift(HorizontalDir::Right),
    Control::Down,
];

/// Release commands produced in one call, at most one per held control per player.
pub type Releases = ArrayVec<(Player, InputCommand), 6>;

fn slot(control: Control) -> Option<usize> {
    HELD_CONTROLS.iter().position(|&c| c == control)
}

/// Tracks held input state per player.
#[derive(Debug, Clone)]
pub struct HeldKeys {
    /// Last press (or refresh) time per player per held control.
    held: [[Option<Instant>; 3]; 2],
    release_timeout: Option<Duration>,
}

impl HeldKeys {
    /// `None` disables auto-release; use it when the terminal reports key releases.
    pub fn new(release_timeout: Option<Duration>) -> Self {
        Self {
            held: [[None; 3]; 2],
            release_timeout,
        }
    }

    pub fn release_timeout(&self) -> Option<Duration> {
        self.release_timeout
    }

    pub fn set_release_timeout(&mut self, timeout: Option<Duration>) {
        self.release_timeout = timeout;
    }

    pub fn is_held(&self, player: Player, control: Control) -> bool {
        slot(control).is_some_and(|i| self.held[player.index()][i].is_some())
    }

    /// A key went down (or auto-repeated).
    ///
    /// Held controls emit their press command only on the first press; later presses
    /// just refresh the timeout. One-shot controls always fire.
    pub fn press(&mut self, player: Player, control: Control, now: Instant) -> Option<InputCommand> {
        let Some(i) = slot(control) else {
            return Some(control.press_command());
        };

        let entry = &mut self.held[player.index()][i];
        let first = entry.is_none();
        *entry = Some(now);
        first.then(|| control.press_command())
    }

    /// A real release event arrived.
    pub fn release(&mut self, player: Player, control: Control) -> Option<InputCommand> {
        let i = slot(control)?;
        self.held[player.index()][i].take()?;
        control.release_command()
    }

    /// Release every key whose last press is older than the timeout.
    pub fn expire(&mut self, now: Instant) -> Releases {
        let mut out = Releases::new();
        let Some(timeout) = self.release_timeout else {
            return out;
        };

        for player in Player::ALL {
            for (i, control) in HELD_CONTROLS.into_iter().enumerate() {
                let entry = &mut self.held[player.index()][i];
                let stale = entry.is_some_and(|t| now.saturating_duration_since(t) > timeout);
                if stale {
                    *entry = None;
                    if let Some(cmd) = control.release_command() {
                        out.push((player, cmd));
                    }
                }
            }
        }
        out
    }

    /// Release everything, e.g. on pause or focus loss.
    pub fn release_all(&mut self) -> Releases {
        let mut out = Releases::new();
        for player in Player::ALL {
            for (i, control) in HELD_CONTROLS.into_iter().enumerate() {
                if self.held[player.index()][i].take().is_some() {
                    if let Some(cmd) = control.release_command() {
                        out.push((player, cmd));
                    }
                }
            }
        }
        out
    }
}

impl Default for HeldKeys {
    fn default() -> Self {
        Self::new(Some(Duration::from_millis(
            DEFAULT_KEY_RELEASE_TIMEOUT_MS as u64,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RotateDir;

    const LEFT: Control = Control::Shift(HorizontalDir::Left);

    #[test]
    fn test_repeated_press_only_refreshes() {
        let mut held = HeldKeys::default();
        let t0 = Instant::now();

        assert_eq!(
            held.press(Player::One, LEFT, t0),
            Some(InputCommand::PressLeft)
        );
        assert_eq!(held.press(Player::One, LEFT, t0 + Duration::from_millis(30)), None);
        assert!(held.is_held(Player::One, LEFT));
        assert!(!held.is_held(Player::Two, LEFT));
    }

    #[test]
    fn test_one_shot_controls_always_fire() {
        let mut held = HeldKeys::default();
        let t0 = Instant::now();
        let cw = Control::Rotate(RotateDir::Cw);

        assert_eq!(held.press(Player::Two, cw, t0), Some(InputCommand::RotateCw));
        assert_eq!(held.press(Player::Two, cw, t0), Some(InputCommand::RotateCw));
        assert_eq!(held.release(Player::Two, cw), None);
    }

    #[test]
    fn test_real_release_emits_once() {
        let mut held = HeldKeys::new(None);
        let t0 = Instant::now();
        held.press(Player::One, Control::Down, t0);

        assert_eq!(
            held.release(Player::One, Control::Down),
            Some(InputCommand::ReleaseDown)
        );
        assert_eq!(held.release(Player::One, Control::Down), None);
    }

    #[test]
    fn test_auto_release_after_timeout() {
        let mut held = HeldKeys::new(Some(Duration::from_millis(50)));
        let t0 = Instant::now();
        held.press(Player::One, LEFT, t0);
        held.press(Player::Two, Control::Down, t0 + Duration::from_millis(40));

        assert!(held.expire(t0 + Duration::from_millis(50)).is_empty());

        let released = held.expire(t0 + Duration::from_millis(51));
        assert_eq!(released.as_slice(), &[(Player::One, InputCommand::ReleaseLeft)]);

        let released = held.expire(t0 + Duration::from_millis(91));
        assert_eq!(released.as_slice(), &[(Player::Two, InputCommand::ReleaseDown)]);
    }

    #[test]
    fn test_no_timeout_never_expires() {
        let mut held = HeldKeys::new(None);
        let t0 = Instant::now();
        held.press(Player::One, LEFT, t0);
        assert!(held.expire(t0 + Duration::from_secs(60)).is_empty());
        assert!(held.is_held(Player::One, LEFT));
    }

    #[test]
    fn test_release_all() {
        let mut held = HeldKeys::default();
        let t0 = Instant::now();
        held.press(Player::One, LEFT, t0);
        held.press(Player::Two, Control::Down, t0);

        let released = held.release_all();
        assert_eq!(released.len(), 2);
        assert!(held.release_all().is_empty());
    }
}
