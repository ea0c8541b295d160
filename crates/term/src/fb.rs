//! Glyph framebuffer the session view draws into.
//!
//! Storage is row-major and every row is a contiguous slice, so the renderer can compare
//! a board row of the previous and next frame in one go.

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

const DEFAULT_FG: Rgb = Rgb::new(220, 220, 220);
const DEFAULT_BG: Rgb = Rgb::new(0, 0, 0);

/// Colors plus the two intensity attributes the view uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
    pub dim: bool,
}

impl Style {
    pub const fn new(fg: Rgb, bg: Rgb) -> Self {
        Self {
            fg,
            bg,
            bold: false,
            dim: false,
        }
    }

    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub const fn dim(self) -> Self {
        Self { dim: true, ..self }
    }

    pub const fn glyph(self, ch: char) -> Glyph {
        Glyph { ch, style: self }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(DEFAULT_FG, DEFAULT_BG)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub style: Style,
}

impl Default for Glyph {
    fn default() -> Self {
        Style::default().glyph(' ')
    }
}

/// Screen rectangle in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// The part of `self` that lies on a `width` x `height` screen.
    pub fn clipped(self, width: u16, height: u16) -> Rect {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Rect {
            x,
            y,
            w: self.right().min(width) - x,
            h: self.bottom().min(height) - y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    glyphs: Vec<Glyph>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let mut fb = Self {
            width: 0,
            height: 0,
            glyphs: Vec::new(),
        };
        fb.reset(width, height);
        fb
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Take new dimensions and blank every glyph. The allocation is reused.
    pub fn reset(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.glyphs.clear();
        self.glyphs
            .resize(width as usize * height as usize, Glyph::default());
    }

    /// One screen row; empty past the bottom edge.
    pub fn row(&self, y: u16) -> &[Glyph] {
        let w = self.width as usize;
        let start = y as usize * w;
        self.glyphs.get(start..start + w).unwrap_or(&[])
    }

    fn row_mut(&mut self, y: u16) -> Option<&mut [Glyph]> {
        let w = self.width as usize;
        let start = y as usize * w;
        self.glyphs.get_mut(start..start + w)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Glyph> {
        self.row(y).get(x as usize).copied()
    }

    /// Off-screen writes are dropped.
    pub fn set(&mut self, x: u16, y: u16, glyph: Glyph) {
        if let Some(slot) = self.row_mut(y).and_then(|row| row.get_mut(x as usize)) {
            *slot = glyph;
        }
    }

    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: Style) {
        self.set(x, y, style.glyph(ch));
    }

    /// Write `s` from `(x, y)`, cut at the right edge. Returns the column after the
    /// last glyph written.
    pub fn put_str(&mut self, x: u16, y: u16, s: &str, style: Style) -> u16 {
        let Some(row) = self.row_mut(y) else {
            return x;
        };
        let mut end = x;
        for (slot, ch) in row.iter_mut().skip(x as usize).zip(s.chars()) {
            *slot = style.glyph(ch);
            end += 1;
        }
        end
    }

    /// Decimal digits without allocating.
    pub fn put_u32(&mut self, x: u16, y: u16, value: u32, style: Style) -> u16 {
        let mut digits = [b'0'; 10];
        let mut start = digits.len();
        let mut n = value;
        loop {
            start -= 1;
            digits[start] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        let text = std::str::from_utf8(&digits[start..]).unwrap_or("?");
        self.put_str(x, y, text, style)
    }

    /// Fill the on-screen part of `rect` with one glyph.
    pub fn fill(&mut self, rect: Rect, glyph: Glyph) {
        let rect = rect.clipped(self.width, self.height);
        for y in rect.y..rect.bottom() {
            if let Some(row) = self.row_mut(y) {
                row[rect.x as usize..rect.right() as usize].fill(glyph);
            }
        }
    }

    /// Single-line box along the edge of `rect`.
    pub fn draw_box(&mut self, rect: Rect, style: Style) {
        if rect.w < 2 || rect.h < 2 {
            return;
        }
        let (left, top) = (rect.x, rect.y);
        let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);

        self.fill(Rect::new(left + 1, top, rect.w - 2, 1), style.glyph('─'));
        self.fill(Rect::new(left + 1, bottom, rect.w - 2, 1), style.glyph('─'));
        self.fill(Rect::new(left, top + 1, 1, rect.h - 2), style.glyph('│'));
        self.fill(Rect::new(right, top + 1, 1, rect.h - 2), style.glyph('│'));

        self.put_char(left, top, '┌', style);
        self.put_char(right, top, '┐', style);
        self.put_char(left, bottom, '└', style);
        self.put_char(right, bottom, '┘', style);
    }

    /// Characters of one row, for tests and debugging.
    pub fn row_text(&self, y: u16) -> String {
        self.row(y).iter().map(|g| g.ch).collect()
    }
}
