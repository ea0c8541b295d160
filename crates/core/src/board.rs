//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell is empty, a locked piece cell, or garbage.
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).
//!
//! Row count never changes: clearing rows refills from the top, garbage pushes rows out
//! of the top.

use arrayvec::ArrayVec;
use rand::Rng;

use crate::types::{Block, Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

const WIDTH: usize = BOARD_WIDTH as usize;
const HEIGHT: usize = BOARD_HEIGHT as usize;

/// Total number of cells on the board
const BOARD_SIZE: usize = WIDTH * HEIGHT;

/// Row indices removed by one [`Board::clear_full_rows`] call, bottom to top.
pub type ClearedRows = ArrayVec<usize, HEIGHT>;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * WIDTH + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Cell at (x, y), or `None` when out of bounds.
    pub fn cell_at(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at (x, y). Returns false if out of bounds.
    pub fn set_cell(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// In bounds and empty.
    pub fn is_free(&self, x: i8, y: i8) -> bool {
        matches!(self.cell_at(x, y), Some(None))
    }

    /// In bounds and filled.
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.cell_at(x, y), Some(Some(_)))
    }

    /// One row as a slice. Panics if `y` is out of range.
    pub fn row(&self, y: usize) -> &[Cell] {
        let start = y * WIDTH;
        &self.cells[start..start + WIDTH]
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(WIDTH)
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= HEIGHT {
            return false;
        }
        self.row(y).iter().all(|cell| cell.is_some())
    }

    /// Clear all full rows and return the row indices that were cleared (bottom to top).
    ///
    /// Surviving rows keep their relative order and slide down; the same number of
    /// empty rows appear at the top. Two-pointer compaction, no allocation.
    pub fn clear_full_rows(&mut self) -> ClearedRows {
        let mut cleared_rows = ClearedRows::new();
        let mut write_y = HEIGHT;

        for read_y in (0..HEIGHT).rev() {
            if self.is_row_full(read_y) {
                cleared_rows.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * WIDTH;
                    self.cells
                        .copy_within(src_start..src_start + WIDTH, write_y * WIDTH);
                }
            }
        }

        self.cells[..write_y * WIDTH].fill(None);
        cleared_rows
    }

    /// Push `n` garbage rows in from the bottom, each with one random hole.
    ///
    /// Returns the number of rows actually inserted (`n` clamped to the board height).
    pub fn insert_garbage_rows<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) -> usize {
        self.push_garbage_rows(n, |_| rng.gen_range(0..WIDTH))
    }

    /// Push `n` garbage rows in from the bottom with caller-chosen holes.
    ///
    /// `hole` receives the index of the new row (0 = first inserted, which ends up
    /// highest) and returns the empty column; values are taken modulo the width.
    /// The top `n` rows are discarded.
    pub fn push_garbage_rows(&mut self, n: usize, mut hole: impl FnMut(usize) -> usize) -> usize {
        let n = n.min(HEIGHT);
        if n == 0 {
            return 0;
        }

        self.cells.copy_within(n * WIDTH.., 0);

        for i in 0..n {
            let y = HEIGHT - n + i;
            let start = y * WIDTH;
            let row = &mut self.cells[start..start + WIDTH];
            row.fill(Some(Block::Garbage));
            row[hole(i) % WIDTH] = None;
        }

        n
    }

    /// Write a locked piece into the board.
    ///
    /// In-bounds cells are written even when already occupied; returns false if any
    /// cell was out of bounds or overlapped an existing block.
    pub fn stamp_piece(&mut self, cells: &[(i8, i8)], kind: PieceKind) -> bool {
        let mut clean = true;
        for &(x, y) in cells {
            if !self.is_free(x, y) {
                clean = false;
            }
            self.set_cell(x, y, Some(Block::Piece(kind)));
        }
        clean
    }

    /// Export the grid as compact codes (0 empty, 1-7 pieces, 8 garbage).
    pub fn write_u8_grid(&self, out: &mut [[u8; WIDTH]; HEIGHT]) {
        for (y, row) in self.rows().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                out[y][x] = cell.map_or(0, Block::code);
            }
        }
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Build a board from rows of text, bottom-aligned.
    ///
    /// `.` is empty, `#` is garbage, piece letters are locked piece cells. Fewer than
    /// 20 rows leaves the top empty. Panics on malformed input; meant for tests and
    /// scenario setup.
    pub fn from_rows(rows: &[&str]) -> Self {
        assert!(rows.len() <= HEIGHT, "too many rows: {}", rows.len());
        let mut board = Self::new();
        let top = HEIGHT - rows.len();
        for (i, line) in rows.iter().enumerate() {
            assert_eq!(line.len(), WIDTH, "row {i} must have {WIDTH} columns");
            for (x, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '.' => None,
                    '#' => Some(Block::Garbage),
                    other => Some(Block::Piece(
                        PieceKind::from_str(&other.to_string())
                            .unwrap_or_else(|| panic!("unknown cell {other:?}")),
                    )),
                };
                board.set_cell(x as i8, (top + i) as i8, cell);
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
