/// RGB pixel canvas presented as terminal half-block cells
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;

use facet_core::{Canvas, Rgb};

/// Upper half block: foreground paints the top pixel of a cell, background
/// the bottom one. Each terminal cell covers two near-square pixels.
const HALF_BLOCK: char = '\u{2580}';

/// A width x height pixel buffer where height is twice the terminal row
/// count.
pub struct PixelCanvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl PixelCanvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let width = cols as usize;
        let height = rows as usize * 2;
        Self {
            width,
            height,
            pixels: vec![Rgb::new(0, 0, 0); width * height],
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.width = cols as usize;
        self.height = rows as usize * 2;
        self.pixels.clear();
        self.pixels.resize(self.width * self.height, Rgb::new(0, 0, 0));
    }

    /// Width in pixels (same as terminal columns).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels (twice the terminal rows).
    pub fn height(&self) -> usize {
        self.height
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = color;
    }

    fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    /// Writes the frame as half-block cells. Consecutive cells with the
    /// same color pair skip the color escapes to keep the stream short.
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let rows = self.height / 2;
        let mut last: Option<(Rgb, Rgb)> = None;
        for row in 0..rows {
            writer.queue(cursor::MoveTo(0, row as u16))?;
            for col in 0..self.width {
                let top = self.pixel(col, row * 2);
                let bottom = self.pixel(col, row * 2 + 1);
                if last != Some((top, bottom)) {
                    writer.queue(SetForegroundColor(to_color(top)))?;
                    writer.queue(SetBackgroundColor(to_color(bottom)))?;
                    last = Some((top, bottom));
                }
                writer.queue(Print(HALF_BLOCK))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn to_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

impl Canvas for PixelCanvas {
    fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    fn fill_triangle(&mut self, a: [f32; 2], b: [f32; 2], c: [f32; 2], color: Rgb) {
        // Bounding box, clipped to the canvas
        let min_x = (a[0].min(b[0]).min(c[0]).floor() as i32).max(0);
        let max_x = (a[0].max(b[0]).max(c[0]).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (a[1].min(b[1]).min(c[1]).floor() as i32).max(0);
        let max_y = (a[1].max(b[1]).max(c[1]).ceil() as i32).min(self.height as i32 - 1);

        let denom = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
        if denom.abs() < 1e-6 {
            return;
        }

        for y in min_y..=max_y {
            let py = y as f32 + 0.5;
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;

                // Barycentric sign test against each edge
                let w0 = ((b[1] - c[1]) * (px - c[0]) + (c[0] - b[0]) * (py - c[1])) / denom;
                let w1 = ((c[1] - a[1]) * (px - c[0]) + (a[0] - c[0]) * (py - c[1])) / denom;
                let w2 = 1.0 - w0 - w1;
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    fn draw_line(&mut self, from: [f32; 2], to: [f32; 2], color: Rgb) {
        // Bresenham stepping; set_pixel clips, so off-screen spans are
        // walked but harmless.
        let mut x0 = from[0].round() as i32;
        let mut y0 = from[1].round() as i32;
        let x1 = to[0].round() as i32;
        let y1 = to[1].round() as i32;

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.set_pixel(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}
