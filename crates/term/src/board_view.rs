//! SessionView: maps one or two engine snapshots into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use arrayvec::ArrayVec;

use crate::core::GameSnapshot;
use crate::fb::{FrameBuffer, Rect, Rgb, Style};
use crate::types::{Block, PieceKind, Player, BOARD_HEIGHT, BOARD_WIDTH};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

const PLAY_BG: Rgb = Rgb::new(30, 30, 40);
const SCREEN_BG: Rgb = Rgb::new(0, 0, 0);
/// Columns reserved for the stats panel to the right of each board.
const PANEL_W: u16 = 12;
/// Gap between a board frame and its panel.
const PANEL_GAP: u16 = 2;
/// Gap between the two players' blocks.
const BLOCK_GAP: u16 = 4;

/// Screen areas one frame can change: each player's block, then the hint line.
pub type Regions = ArrayVec<Rect, 3>;

/// Board layout for a session: boards side by side, each with its own panel.
pub struct SessionView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for SessionView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
        }
    }
}

impl SessionView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    fn frame_size(&self) -> (u16, u16) {
        (
            BOARD_WIDTH as u16 * self.cell_w + 2,
            BOARD_HEIGHT as u16 * self.cell_h + 2,
        )
    }

    fn block_w(&self) -> u16 {
        self.frame_size().0 + PANEL_GAP + PANEL_W
    }

    fn block_origins(&self, count: u16, viewport: Viewport) -> (u16, u16) {
        let (_, frame_h) = self.frame_size();
        let total_w = count * self.block_w() + count.saturating_sub(1) * BLOCK_GAP;
        (
            viewport.width.saturating_sub(total_w) / 2,
            viewport.height.saturating_sub(frame_h + 1) / 2,
        )
    }

    /// Where `boards` boards land on `viewport`: one rect per player block (frame,
    /// panel and overlay), then the hint line. Nothing outside these changes between
    /// frames of the same size.
    pub fn regions(&self, boards: usize, viewport: Viewport) -> Regions {
        let mut regions = Regions::new();
        let count = boards.min(Player::ALL.len()) as u16;
        if count == 0 {
            return regions;
        }

        let (_, frame_h) = self.frame_size();
        let (origin_x, origin_y) = self.block_origins(count, viewport);
        for i in 0..count {
            let x = origin_x + i * (self.block_w() + BLOCK_GAP);
            regions.push(
                Rect::new(x, origin_y, self.block_w(), frame_h)
                    .clipped(viewport.width, viewport.height),
            );
        }
        regions.push(
            Rect::new(0, origin_y + frame_h, viewport.width, 1)
                .clipped(viewport.width, viewport.height),
        );
        regions
    }

    /// Render every board into an existing framebuffer.
    ///
    /// `boards` is in player order. Callers can reuse a framebuffer across frames.
    pub fn render_into(&self, boards: &[GameSnapshot], viewport: Viewport, fb: &mut FrameBuffer) {
        fb.reset(viewport.width, viewport.height);

        let count = boards.len().min(Player::ALL.len()) as u16;
        if count == 0 {
            return;
        }

        let (_, frame_h) = self.frame_size();
        let (origin_x, origin_y) = self.block_origins(count, viewport);

        for (i, (snap, player)) in boards.iter().zip(Player::ALL).enumerate() {
            let x = origin_x + i as u16 * (self.block_w() + BLOCK_GAP);
            let rival_out = count == 2 && boards[player.peer().index()].game_over;
            self.draw_board(fb, snap, player, x, origin_y, rival_out);
        }

        let hint = if count == 2 {
            "G start  P pause  R restart  Esc quit"
        } else {
            "G start  P pause  R restart  Esc quit  arrows/WASD move"
        };
        let hint_x = viewport.width.saturating_sub(hint.chars().count() as u16) / 2;
        fb.put_str(
            hint_x,
            origin_y + frame_h,
            hint,
            Style::new(Rgb::new(120, 120, 130), SCREEN_BG),
        );
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, boards: &[GameSnapshot], viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(boards, viewport, &mut fb);
        fb
    }

    fn draw_board(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        player: Player,
        start_x: u16,
        start_y: u16,
        rival_out: bool,
    ) {
        let (frame_w, frame_h) = self.frame_size();

        let frame = Rect::new(start_x, start_y, frame_w, frame_h);
        fb.fill(
            Rect::new(start_x + 1, start_y + 1, frame_w - 2, frame_h - 2),
            Style::new(PLAY_BG, PLAY_BG).glyph(' '),
        );
        fb.draw_box(frame, Style::new(Rgb::new(200, 200, 200), SCREEN_BG));

        // Locked cells.
        for (y, row) in snap.board.iter().enumerate() {
            for (x, &code) in row.iter().enumerate() {
                let (ch, style) = match Block::from_code(code) {
                    Some(block) => ('█', Style::new(block_color(block), PLAY_BG)),
                    None => ('·', Style::new(Rgb::new(90, 90, 100), PLAY_BG).dim()),
                };
                self.fill_cell(fb, start_x, start_y, x as i8, y as i8, ch, style);
            }
        }

        if let Some(active) = snap.active {
            if let Some(ghost_y) = snap.ghost_y {
                let ghost = Style::new(Rgb::new(140, 140, 140), PLAY_BG).dim();
                for (x, y) in active.ghost_cells(ghost_y) {
                    self.fill_cell(fb, start_x, start_y, x, y, '░', ghost);
                }
            }
            let style = Style::new(piece_color(active.kind), PLAY_BG).bold();
            for (x, y) in active.cells {
                self.fill_cell(fb, start_x, start_y, x, y, '█', style);
            }
        }

        self.draw_panel(fb, snap, player, start_x + frame_w + PANEL_GAP, start_y);

        let overlay = if snap.game_over {
            Some("GAME OVER")
        } else if rival_out {
            Some("WINNER")
        } else if snap.paused {
            Some("PAUSED")
        } else if !snap.running {
            Some("PRESS G")
        } else {
            None
        };
        if let Some(text) = overlay {
            let text_w = text.chars().count() as u16;
            let x = start_x + frame_w.saturating_sub(text_w) / 2;
            fb.put_str(
                x,
                start_y + frame_h / 2,
                text,
                Style::new(Rgb::new(255, 255, 255), SCREEN_BG).bold(),
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_cell(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        x: i8,
        y: i8,
        ch: char,
        style: Style,
    ) {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return;
        }
        let px = start_x + 1 + x as u16 * self.cell_w;
        let py = start_y + 1 + y as u16 * self.cell_h;
        fb.fill(Rect::new(px, py, self.cell_w, self.cell_h), style.glyph(ch));
    }

    fn draw_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        player: Player,
        x: u16,
        start_y: u16,
    ) {
        let label = Style::default().bold();
        let value = Style::new(Rgb::new(200, 200, 200), SCREEN_BG);

        let title = match player {
            Player::One => "PLAYER 1",
            Player::Two => "PLAYER 2",
        };
        fb.put_str(x, start_y, title, label);

        let mut y = start_y + 2;
        for (name, n) in [
            ("SCORE", snap.score),
            ("LEVEL", snap.level),
            ("LINES", snap.lines),
        ] {
            fb.put_str(x, y, name, label);
            fb.put_u32(x, y + 1, n, value);
            y += 3;
        }

        fb.put_str(x, y, "NEXT", label);
        fb.put_str(
            x,
            y + 1,
            snap.next.letter(),
            Style::new(piece_color(snap.next), SCREEN_BG).bold(),
        );
    }
}

pub fn piece_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb::new(80, 220, 220),
        PieceKind::O => Rgb::new(240, 220, 80),
        PieceKind::T => Rgb::new(200, 120, 220),
        PieceKind::S => Rgb::new(100, 220, 120),
        PieceKind::Z => Rgb::new(220, 80, 80),
        PieceKind::J => Rgb::new(80, 120, 220),
        PieceKind::L => Rgb::new(255, 165, 0),
    }
}

pub fn block_color(block: Block) -> Rgb {
    match block {
        Block::Piece(kind) => piece_color(kind),
        Block::Garbage => Rgb::new(110, 110, 110),
    }
}
