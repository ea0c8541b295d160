//! Versus link - garbage forwarding between two engines
//!
//! The link is only a pairing: it holds no queue. Garbage owed by one board is handed
//! to the other in the same call that produced it, unless the receiver is already out.

use crate::engine::Engine;
use crate::types::{EngineEvent, Player};

/// Pairs player one with player two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersusLink;

impl VersusLink {
    pub fn new() -> Self {
        Self
    }

    /// The board that receives garbage sent by `from`.
    pub fn peer(&self, from: Player) -> Player {
        from.peer()
    }

    /// Deliver `lines` garbage rows from `from` to its peer.
    ///
    /// `engines` is indexed by [`Player::index`]. Returns false when nothing was
    /// delivered (no peer, peer in game over, or zero lines).
    pub fn forward(&self, from: Player, lines: u8, engines: &mut [Engine]) -> bool {
        let Some(target) = engines.get_mut(self.peer(from).index()) else {
            return false;
        };
        if lines == 0 || target.is_game_over() {
            return false;
        }
        target.add_garbage(lines);
        true
    }

    /// Forward `event` if it is a garbage attack. Returns whether the peer changed.
    pub fn route(&self, from: Player, event: EngineEvent, engines: &mut [Engine]) -> bool {
        match event {
            EngineEvent::GarbageSent { lines } => self.forward(from, lines, engines),
            _ => false,
        }
    }
}
