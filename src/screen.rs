//! Terminal presentation: half-block pixel rendering, bitmap glyphs, key
//! polling, and raw-mode lifecycle.
//!
//! The canvas is a plain `RgbImage`; every cell of the terminal shows two
//! vertically stacked pixels via the ▀ character.

use crossterm::{
    cursor,
    event::{self, Event, KeyCode},
    execute, queue,
    style::{self, Color},
    terminal,
};
use image::{Rgb, RgbImage, imageops};
use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const GRAY: Rgb<u8> = Rgb([140, 140, 140]);
pub const GREEN: Rgb<u8> = Rgb([60, 220, 60]);
pub const RED: Rgb<u8> = Rgb([230, 50, 40]);

// ── Canvas drawing ──────────────────────────────────────────────────────────

pub fn lerp(a: Rgb<u8>, b: Rgb<u8>, t_256: u32) -> Rgb<u8> {
    let t = t_256.min(256) as i32;
    let mix = |a: u8, b: u8| (a as i32 + (b as i32 - a as i32) * t / 256) as u8;
    Rgb([mix(a.0[0], b.0[0]), mix(a.0[1], b.0[1]), mix(a.0[2], b.0[2])])
}

fn put(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
        canvas.put_pixel(x as u32, y as u32, color);
    }
}

/// Pastes `src` onto the canvas with its top-left corner at (x, y), clipped
/// to the canvas bounds.
pub fn blit(canvas: &mut RgbImage, src: &RgbImage, x: i32, y: i32) {
    for (sx, sy, px) in src.enumerate_pixels() {
        put(canvas, x + sx as i32, y + sy as i32, *px);
    }
}

/// Halves every channel. Used for the kill-screen flash.
pub fn dim(canvas: &mut RgbImage) {
    for px in canvas.pixels_mut() {
        px.0 = [px.0[0] / 2, px.0[1] / 2, px.0[2] / 2];
    }
}

// ── 3x5 bitmap glyphs ───────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
const LETTERS: [[u8; 15]; 26] = [
    [0,1,0, 1,0,1, 1,1,1, 1,0,1, 1,0,1], // a
    [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,1,0], // b
    [0,1,1, 1,0,0, 1,0,0, 1,0,0, 0,1,1], // c
    [1,1,0, 1,0,1, 1,0,1, 1,0,1, 1,1,0], // d
    [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,1,1], // e
    [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,0,0], // f
    [0,1,1, 1,0,0, 1,0,1, 1,0,1, 0,1,1], // g
    [1,0,1, 1,0,1, 1,1,1, 1,0,1, 1,0,1], // h
    [1,1,1, 0,1,0, 0,1,0, 0,1,0, 1,1,1], // i
    [0,0,1, 0,0,1, 0,0,1, 1,0,1, 0,1,0], // j
    [1,0,1, 1,0,1, 1,1,0, 1,0,1, 1,0,1], // k
    [1,0,0, 1,0,0, 1,0,0, 1,0,0, 1,1,1], // l
    [1,0,1, 1,1,1, 1,0,1, 1,0,1, 1,0,1], // m
    [1,1,0, 1,0,1, 1,0,1, 1,0,1, 1,0,1], // n
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // o
    [1,1,0, 1,0,1, 1,1,0, 1,0,0, 1,0,0], // p
    [0,1,0, 1,0,1, 1,0,1, 1,1,0, 0,1,1], // q
    [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,0,1], // r
    [0,1,1, 1,0,0, 0,1,0, 0,0,1, 1,1,0], // s
    [1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0], // t
    [1,0,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // u
    [1,0,1, 1,0,1, 1,0,1, 1,0,1, 0,1,0], // v
    [1,0,1, 1,0,1, 1,0,1, 1,1,1, 1,0,1], // w
    [1,0,1, 1,0,1, 0,1,0, 1,0,1, 1,0,1], // x
    [1,0,1, 1,0,1, 0,1,0, 0,1,0, 0,1,0], // y
    [1,1,1, 0,0,1, 0,1,0, 1,0,0, 1,1,1], // z
];

fn glyph(ch: char) -> Option<&'static [u8; 15]> {
    match ch {
        '0'..='9' => Some(&DIGITS[ch as usize - '0' as usize]),
        'a'..='z' => Some(&LETTERS[ch as usize - 'a' as usize]),
        _ => None,
    }
}

fn draw_glyph(canvas: &mut RgbImage, x: i32, y: i32, glyph: &[u8; 15], color: Rgb<u8>) {
    let shadow = Rgb([30, 30, 30]);
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                put(canvas, px + 1, py + 1, shadow);
                put(canvas, px, py, color);
            }
        }
    }
}

/// Glyph cell advance: 3 pixels plus 1 of spacing.
pub const GLYPH_ADVANCE: i32 = 4;

/// Draws digits and lowercase letters; anything else advances as a space.
pub fn draw_text(canvas: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
    for (i, ch) in text.chars().enumerate() {
        if let Some(g) = glyph(ch) {
            draw_glyph(canvas, x + i as i32 * GLYPH_ADVANCE, y, g, color);
        }
    }
}

// ── Terminal ────────────────────────────────────────────────────────────────

/// The terminal as a pixel display. Raw mode and the alternate screen are
/// entered on `open` and unconditionally restored on `close` or drop.
pub struct Screen {
    out: Stdout,
    width: u32,
    height: u32,
    open: bool,
}

impl Screen {
    pub fn open() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
        )?;
        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            width: cols as u32,
            height: rows as u32 * 2,
            open: true,
        })
    }

    /// Canvas size in pixels: terminal columns × twice the rows.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Draws `image` over the whole terminal, scaling it first if it is not
    /// already canvas-sized.
    pub fn present(&mut self, image: &RgbImage) -> io::Result<()> {
        if (image.width(), image.height()) == (self.width, self.height) {
            render(&mut self.out, image)
        } else {
            let scaled = imageops::resize(
                image,
                self.width.max(1),
                self.height.max(2),
                imageops::FilterType::Triangle,
            );
            render(&mut self.out, &scaled)
        }
    }

    /// Waits up to `timeout` for a key press; resize events are absorbed and
    /// update the canvas size.
    pub fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyCode>> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => return Ok(Some(key.code)),
                Event::Resize(cols, rows) => {
                    self.width = cols as u32;
                    self.height = rows as u32 * 2;
                }
                _ => {}
            }
        }
        Ok(None)
    }

    /// Blocks until any key is pressed.
    pub fn wait_key(&mut self) -> io::Result<KeyCode> {
        loop {
            if let Some(key) = self.poll_key(Duration::from_millis(250))? {
                return Ok(key);
            }
        }
    }

    pub fn close(&mut self) -> io::Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        execute!(
            self.out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn term_color(px: Rgb<u8>) -> Color {
    Color::Rgb {
        r: px.0[0],
        g: px.0[1],
        b: px.0[2],
    }
}

/// Half-block renderer: each terminal row carries two pixel rows, with color
/// changes only emitted when they differ from the previous cell.
fn render(out: &mut impl Write, image: &RgbImage) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 0))?;
    let rows = image.height() / 2;
    let mut prev_fg: Option<Rgb<u8>> = None;
    let mut prev_bg: Option<Rgb<u8>> = None;

    for row in 0..rows {
        for col in 0..image.width() {
            let top = *image.get_pixel(col, row * 2);
            let bot = *image.get_pixel(col, row * 2 + 1);

            if top == bot {
                if prev_bg != Some(top) {
                    queue!(out, style::SetBackgroundColor(term_color(top)))?;
                    prev_bg = Some(top);
                }
                queue!(out, style::Print(' '))?;
            } else {
                if prev_fg != Some(top) {
                    queue!(out, style::SetForegroundColor(term_color(top)))?;
                    prev_fg = Some(top);
                }
                if prev_bg != Some(bot) {
                    queue!(out, style::SetBackgroundColor(term_color(bot)))?;
                    prev_bg = Some(bot);
                }
                queue!(out, style::Print('\u{2580}'))?; // ▀
            }
        }
        if row < rows.saturating_sub(1) {
            queue!(out, style::ResetColor, style::Print("\r\n"))?;
            prev_fg = None;
            prev_bg = None;
        }
    }
    queue!(out, style::ResetColor)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_clips_at_canvas_edges() {
        let mut canvas = RgbImage::from_pixel(8, 8, Rgb([0, 0, 0]));
        let patch = RgbImage::from_pixel(4, 4, WHITE);
        blit(&mut canvas, &patch, 6, 6);
        assert_eq!(*canvas.get_pixel(7, 7), WHITE);
        assert_eq!(*canvas.get_pixel(5, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(GREEN, RED, 0), GREEN);
        assert_eq!(lerp(GREEN, RED, 256), RED);
    }

    #[test]
    fn every_sequence_letter_has_a_glyph() {
        for ch in 'a'..='z' {
            assert!(glyph(ch).is_some(), "missing glyph for {ch}");
        }
        for ch in '0'..='9' {
            assert!(glyph(ch).is_some());
        }
        assert!(glyph(' ').is_none());
    }

    #[test]
    fn draw_text_marks_pixels_and_leaves_spaces_blank() {
        let mut canvas = RgbImage::from_pixel(40, 8, Rgb([0, 0, 0]));
        draw_text(&mut canvas, 1, 1, "a b", WHITE);
        let lit = canvas.pixels().filter(|p| **p == WHITE).count();
        assert!(lit > 0);
        // The space cell (columns 5..8) stays untouched.
        for x in 5..8 {
            for y in 0..8 {
                assert_ne!(*canvas.get_pixel(x, y), WHITE);
            }
        }
    }
}
