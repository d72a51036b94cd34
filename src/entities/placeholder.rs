//! Synthetic stand-in frames used when a sequence cannot be loaded.
//!
//! Output is a pure function of (index, style): the same failed panel always
//! looks the same. Frame `i` gets a diagonal gradient from `hsl(15i, 70%, 80%)`
//! to the opposite hue, a saturated disc that drifts right and pulses with `i`,
//! and `i + 1` pips along the bottom edge so frames can be told apart.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::frame::{Frame, FrameOrigin, FrameSequence};

const COVER_BG: [u8; 3] = [0xe7, 0xf3, 0xff];
const COVER_ACCENT: [u8; 3] = [0x00, 0x7a, 0xcc];
const INK: [u8; 3] = [0x33, 0x33, 0x33];

/// Pips per row along the bottom edge
const PIPS_PER_ROW: u32 = 12;

/// Placeholder tile size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderStyle {
    pub width: u32,
    pub height: u32,
}

impl Default for PlaceholderStyle {
    fn default() -> Self {
        Self { width: 400, height: 400 }
    }
}

impl PlaceholderStyle {
    /// Layout unit relative to the 400px reference tile
    fn unit(&self) -> f32 {
        self.width.min(self.height).max(1) as f32 / 400.0
    }
}

/// Full placeholder sequence: one cover plus `count` numbered frames
pub fn sequence(count: usize, style: PlaceholderStyle) -> FrameSequence {
    let frames = (0..count).map(|i| frame(i, style)).collect();
    FrameSequence::new(cover(style), frames)
}

/// Light tile with an accent band
pub fn cover(style: PlaceholderStyle) -> Frame {
    let (w, h) = (style.width.max(1), style.height.max(1));
    let mut img = RgbaImage::from_pixel(w, h, rgba(COVER_BG));

    let band_top = (h as f32 * 0.42) as u32;
    let band_bottom = (h as f32 * 0.50) as u32;
    fill_rect(&mut img, 0, band_top, w, band_bottom, rgba(COVER_ACCENT));

    let rule_top = (h as f32 * 0.55) as u32;
    let rule_bottom = ((h as f32 * 0.57) as u32).max(rule_top + 1);
    fill_rect(&mut img, (w as f32 * 0.3) as u32, rule_top, (w as f32 * 0.7) as u32, rule_bottom, rgba(INK));

    Frame::new(img, "cover (placeholder)", FrameOrigin::Placeholder)
}

/// Numbered, hue-rotated frame tile
pub fn frame(index: usize, style: PlaceholderStyle) -> Frame {
    let (w, h) = (style.width.max(1), style.height.max(1));
    let hue = (index as f32 * 15.0) % 360.0;
    let from = hsl_to_rgb(hue, 0.7, 0.8);
    let to = hsl_to_rgb((hue + 180.0) % 360.0, 0.7, 0.8);

    let span = (w + h).saturating_sub(2).max(1) as f32;
    let mut img = RgbaImage::from_fn(w, h, |x, y| {
        let t = (x + y) as f32 / span;
        rgba(lerp_rgb(from, to, t))
    });

    let unit = style.unit();
    let radius = (20.0 + 15.0 * (index as f32 * 0.3).sin()) * unit;
    let cx = (80.0 + index as f32 * 5.0) * unit;
    let cy = 80.0 * unit;
    fill_disc(&mut img, cx, cy, radius, rgba(hsl_to_rgb(hue, 1.0, 0.5)));

    draw_pips(&mut img, index as u32 + 1, unit);

    Frame::new(img, format!("frame {} (placeholder)", index + 1), FrameOrigin::Placeholder)
}

fn draw_pips(img: &mut RgbaImage, count: u32, unit: f32) {
    let size = ((8.0 * unit) as u32).max(2);
    let gap = (size / 2).max(1);
    let margin = ((16.0 * unit) as u32).max(1);
    let rows = count.div_ceil(PIPS_PER_ROW);

    for n in 0..count {
        let row = n / PIPS_PER_ROW;
        let col = n % PIPS_PER_ROW;
        let x0 = margin + col * (size + gap);
        // Last row sits on the bottom margin, earlier rows stack above it
        let from_bottom = rows - row;
        let Some(y0) = img
            .height()
            .checked_sub(margin + from_bottom * (size + gap))
        else {
            continue;
        };
        fill_rect(img, x0, y0, x0 + size, y0 + size, rgba(INK));
    }
}

fn fill_rect(img: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>) {
    let x1 = x1.min(img.width());
    let y1 = y1.min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

fn fill_disc(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    if radius <= 0.0 {
        return;
    }
    let x0 = (cx - radius).floor().max(0.0) as u32;
    let y0 = (cy - radius).floor().max(0.0) as u32;
    let x1 = ((cx + radius).ceil().max(0.0) as u32).min(img.width());
    let y1 = ((cy + radius).ceil().max(0.0) as u32).min(img.height());
    let r2 = radius * radius;
    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                img.put_pixel(x, y, color);
            }
        }
    }
}

fn rgba(rgb: [u8; 3]) -> Rgba<u8> {
    Rgba([rgb[0], rgb[1], rgb[2], 255])
}

fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// HSL to sRGB bytes. Hue in degrees, saturation and lightness in 0..=1.
fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let hp = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [byte(r), byte(g), byte(b)]
}
