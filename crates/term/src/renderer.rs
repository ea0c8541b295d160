//! TerminalRenderer: flushes session frames to a real terminal.
//!
//! The first frame, and any frame after a resize, repaints every row. After that the
//! renderer walks the regions the view reports (one per board plus the hint line) and
//! skips every region whose glyphs match the previous frame. Inside a changed region
//! each changed row is rewritten as one span, first changed column to last, so a board
//! nobody touched this frame costs no output at all.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{FrameBuffer, Rect, Rgb, Style};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
    key_release_events: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(64 * 1024),
            key_release_events: false,
        }
    }

    /// Enter raw mode and the alternate screen.
    ///
    /// Also asks for key press/release reporting when the terminal supports the
    /// keyboard enhancement protocol; see [`Self::key_release_events`].
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.key_release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);

        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        if self.key_release_events {
            self.buf.queue(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        }
        self.flush_buf()?;
        self.last = None;
        Ok(())
    }

    /// Whether the terminal will send key release events.
    pub fn key_release_events(&self) -> bool {
        self.key_release_events
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        if self.key_release_events {
            self.buf.queue(PopKeyboardEnhancementFlags)?;
        }
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw.
    ///
    /// Useful on terminal resize events.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw a framebuffer, swapping it into internal state.
    ///
    /// `regions` are the areas that may differ from the previous frame (see
    /// `SessionView::regions`); an empty list means the whole screen. Callers keep one
    /// `FrameBuffer` and pass it in every frame; after the call it holds the previous
    /// frame, ready to be drawn over.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer, regions: &[Rect]) -> Result<()> {
        self.buf.clear();
        let mut prev = match self.last.take() {
            Some(prev) if prev.width() == fb.width() && prev.height() == fb.height() => {
                encode_diff_into(&prev, fb, regions, &mut self.buf)?;
                prev
            }
            stale => {
                encode_full_into(fb, &mut self.buf)?;
                stale.unwrap_or_else(|| FrameBuffer::new(0, 0))
            }
        };
        self.flush_buf()?;

        std::mem::swap(&mut prev, fb);
        self.last = Some(prev);
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// One changed stretch of a screen row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub x: u16,
    pub y: u16,
    pub len: u16,
}

/// Changed span of each row inside `region`, top to bottom. Empty when nothing in the
/// region changed.
///
/// Rows missing from `prev` (it was smaller) count as fully changed.
pub fn dirty_spans<'a>(
    prev: &'a FrameBuffer,
    next: &'a FrameBuffer,
    region: Rect,
) -> impl Iterator<Item = Span> + 'a {
    let region = region.clipped(next.width(), next.height());
    let (x0, x1) = (region.x as usize, region.right() as usize);

    (region.y..region.bottom()).filter_map(move |y| {
        let new = next.row(y).get(x0..x1)?;
        let Some(old) = prev.row(y).get(x0..x1) else {
            return Some(Span {
                x: region.x,
                y,
                len: region.w,
            });
        };
        let first = old.iter().zip(new).position(|(a, b)| a != b)?;
        let last = old.iter().zip(new).rposition(|(a, b)| a != b)?;
        Some(Span {
            x: (x0 + first) as u16,
            y,
            len: (last - first + 1) as u16,
        })
    })
}

/// Repaint every row of `fb` into `out`.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let mut pen = Pen::default();
    for y in 0..fb.height() {
        let row = Span {
            x: 0,
            y,
            len: fb.width(),
        };
        print_span(fb, row, &mut pen, out)?;
    }
    finish(out)
}

/// Write the changed spans of `regions` into `out`. Returns how many regions changed.
pub fn encode_diff_into(
    prev: &FrameBuffer,
    next: &FrameBuffer,
    regions: &[Rect],
    out: &mut Vec<u8>,
) -> Result<usize> {
    let whole = [next.area()];
    let regions = if regions.is_empty() { &whole[..] } else { regions };

    let mut pen = Pen::default();
    let mut dirty = 0;
    for &region in regions {
        let mut touched = false;
        for span in dirty_spans(prev, next, region) {
            touched = true;
            print_span(next, span, &mut pen, out)?;
        }
        dirty += usize::from(touched);
    }

    if dirty > 0 {
        finish(out)?;
    }
    Ok(dirty)
}

fn print_span(fb: &FrameBuffer, span: Span, pen: &mut Pen, out: &mut Vec<u8>) -> Result<()> {
    let start = span.x as usize;
    let Some(glyphs) = fb.row(span.y).get(start..start + span.len as usize) else {
        return Ok(());
    };
    out.queue(cursor::MoveTo(span.x, span.y))?;
    for glyph in glyphs {
        pen.apply(glyph.style, out)?;
        out.queue(Print(glyph.ch))?;
    }
    Ok(())
}

fn finish(out: &mut Vec<u8>) -> Result<()> {
    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// Style the terminal is currently drawing with. Starts from the reset state every
/// encode call leaves behind.
#[derive(Debug, Default)]
struct Pen {
    fg: Option<Rgb>,
    bg: Option<Rgb>,
    bold: bool,
    dim: bool,
}

impl Pen {
    /// Send only the parts of `style` that differ from the pen.
    fn apply(&mut self, style: Style, out: &mut Vec<u8>) -> Result<()> {
        if (self.bold, self.dim) != (style.bold, style.dim) {
            out.queue(SetAttribute(Attribute::NormalIntensity))?;
            if style.bold {
                out.queue(SetAttribute(Attribute::Bold))?;
            }
            if style.dim {
                out.queue(SetAttribute(Attribute::Dim))?;
            }
            self.bold = style.bold;
            self.dim = style.dim;
        }
        if self.fg != Some(style.fg) {
            out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
            self.fg = Some(style.fg);
        }
        if self.bg != Some(style.bg) {
            out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
            self.bg = Some(style.bg);
        }
        Ok(())
    }
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
