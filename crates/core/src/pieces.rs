//! Pieces module - Tetromino shapes and the rotation system
//!
//! Every kind has four rotation states of exactly four cell offsets, relative to the
//! piece origin (top-left of its bounding box). O is the same in every state.
//!
//! Rotation uses one kick list for every kind: the target state is tried in place,
//! then nudged right, left, up, down, and finally two columns right or left. The first
//! offset whose cells are all in bounds and free wins.

use crate::board::Board;
use crate::types::{PieceKind, RotateDir, Rotation, SPAWN_X, SPAWN_Y};

/// Offset of a single mino relative to piece origin
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets from piece origin
pub type PieceShape = [MinoOffset; 4];

/// Shape table indexed by `[kind.index()][rotation.index()]`.
const SHAPES: [[PieceShape; 4]; 7] = [
    // I
    [
        [(0, 1), (1, 1), (2, 1), (3, 1)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(1, 0), (1, 1), (1, 2), (1, 3)],
    ],
    // O
    [
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
    ],
    // T
    [
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // S
    [
        [(1, 0), (2, 0), (0, 1), (1, 1)],
        [(1, 0), (1, 1), (2, 1), (2, 2)],
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // Z
    [
        [(0, 0), (1, 0), (1, 1), (2, 1)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(1, 0), (0, 1), (1, 1), (0, 2)],
    ],
    // J
    [
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
    ],
    // L
    [
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
        [(0, 1), (1, 1), (2, 1), (0, 2)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
    ],
];

/// Kick offsets in the order they are tried.
pub const KICK_OFFSETS: [(i8, i8); 7] = [(0, 0), (1, 0), (-1, 0), (0, -1), (0, 1), (2, 0), (-2, 0)];

/// Get the shape (mino offsets) for a piece kind and rotation
pub fn shape(kind: PieceKind, rotation: Rotation) -> &'static PieceShape {
    &SHAPES[kind.index()][rotation.index() as usize]
}

/// The falling piece: kind, rotation state and origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl ActivePiece {
    /// A piece at the default spawn origin, North facing.
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }

    /// Absolute board cells.
    pub fn cells(&self) -> [(i8, i8); 4] {
        let offsets = *shape(self.kind, self.rotation);
        offsets.map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// Same piece translated by (dx, dy).
    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// True when every cell is in bounds and free on `board`.
    pub fn fits(&self, board: &Board) -> bool {
        self.fits_with(|x, y| board.is_free(x, y))
    }

    fn fits_with(&self, is_free: impl Fn(i8, i8) -> bool) -> bool {
        self.cells().iter().all(|&(x, y)| is_free(x, y))
    }
}

/// Try to rotate a piece, resolving collisions with the kick list.
///
/// Returns the committed piece (origin moved by the winning offset, new state), or
/// `None` if every offset collides.
pub fn rotate(
    piece: &ActivePiece,
    dir: RotateDir,
    is_free: impl Fn(i8, i8) -> bool,
) -> Option<ActivePiece> {
    let target = ActivePiece {
        rotation: piece.rotation.turned(dir),
        ..*piece
    };

    KICK_OFFSETS
        .iter()
        .map(|&(dx, dy)| target.shifted(dx, dy))
        .find(|candidate| candidate.fits_with(&is_free))
}
