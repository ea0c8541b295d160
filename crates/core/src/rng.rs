//! RNG module - 7-bag random piece generation
//!
//! Implements the "7-bag" randomization algorithm used in modern Tetris.
//! Each bag contains one of each piece (I, O, T, S, Z, J, L), shuffled.
//! Draws from the bag until empty, then generates a new bag.
//!
//! Shuffles come from a seeded ChaCha8 stream, so a seed fully determines the
//! sequence.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::PieceKind;

const BAG_SIZE: usize = PieceKind::ALL.len();

/// 7-bag piece generator
///
/// Infinite: also usable as an `Iterator` that never returns `None`.
#[derive(Debug, Clone)]
pub struct Bag {
    /// Current bag of pieces
    bag: [PieceKind; BAG_SIZE],
    /// Index of the next piece to draw; `BAG_SIZE` means exhausted
    bag_index: usize,
    /// RNG for shuffling
    rng: ChaCha8Rng,
}

impl Bag {
    /// Create a new bag with the given seed. The first permutation is shuffled on the
    /// first draw.
    pub fn new(seed: u64) -> Self {
        Self {
            bag: PieceKind::ALL,
            bag_index: BAG_SIZE,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn shuffled(rng: &mut ChaCha8Rng) -> [PieceKind; BAG_SIZE] {
        let mut bag = PieceKind::ALL;
        bag.shuffle(rng);
        bag
    }

    /// Draw the next piece from the queue
    pub fn draw(&mut self) -> PieceKind {
        if self.bag_index >= BAG_SIZE {
            self.bag = Self::shuffled(&mut self.rng);
            self.bag_index = 0;
        }

        let piece = self.bag[self.bag_index];
        self.bag_index += 1;
        piece
    }

    /// Peek at the next piece without removing it
    ///
    /// When the bag is exhausted this previews the next permutation on a copy of the
    /// RNG, so the result always matches the following `draw()`.
    pub fn peek(&self) -> PieceKind {
        if self.bag_index < BAG_SIZE {
            return self.bag[self.bag_index];
        }
        let mut preview = self.rng.clone();
        Self::shuffled(&mut preview)[0]
    }

    /// Pieces left in the current permutation.
    pub fn remaining(&self) -> &[PieceKind] {
        &self.bag[self.bag_index..]
    }

    /// Discard the partially consumed bag and reseed.
    pub fn reset(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Derive a fresh seed from this bag's stream (used for restarts).
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}

impl Iterator for Bag {
    type Item = PieceKind;

    fn next(&mut self) -> Option<PieceKind> {
        Some(self.draw())
    }
}

impl Default for Bag {
    fn default() -> Self {
        Self::new(1)
    }
}
