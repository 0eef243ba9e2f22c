use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};

use crate::caption::domain::caption_layout::CaptionLayout;
use crate::caption::domain::caption_style::{CaptionStyle, GLYPH_PX};
use crate::shared::frame::Frame;

const FALLBACK: char = '?';

/// 8x8 bitmap for `c`, falling back to `?` for characters the font lacks.
pub fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get(FALLBACK))
        .unwrap_or([0; 8])
}

/// Draws one line of text with its top-left corner at `(x, y)`.
///
/// Each glyph pixel becomes a `scale` x `scale` block. Bold repeats the
/// stroke shifted right. Anything outside the frame is clipped.
pub fn draw_text(
    frame: &mut Frame,
    text: &str,
    x: i64,
    y: i64,
    scale: u32,
    color: [u8; 3],
    bold: bool,
) {
    let advance = (GLYPH_PX * scale) as i64;
    let bold_offset = (scale / 3).max(1) as i64;

    for (i, c) in text.chars().enumerate() {
        let gx = x + i as i64 * advance;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_PX {
                // Bit 0 is the leftmost pixel.
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = gx + (col * scale) as i64;
                let py = y + (row as u32 * scale) as i64;
                frame.fill_rect(px, py, scale, scale, color);
                if bold {
                    frame.fill_rect(px + bold_offset, py, scale, scale, color);
                }
            }
        }
    }
}

/// Paints the caption box and its lines.
pub fn draw_caption(frame: &mut Frame, layout: &CaptionLayout, style: &CaptionStyle) {
    frame.fill_rect(
        layout.box_x,
        layout.box_y,
        layout.box_width,
        layout.box_height,
        style.box_color,
    );
    for (i, line) in layout.lines.iter().enumerate() {
        let (x, y) = layout.line_origin(i);
        draw_text(frame, line, x, y, layout.scale, style.text_color, style.bold);
    }
}
