/// Height and width of one unscaled glyph in the embedded bitmap font.
pub const GLYPH_PX: u32 = 8;

/// Narrowest acceptable line, in glyphs, before the text is scaled down.
pub const MIN_GLYPHS_PER_LINE: usize = 12;

/// How caption text is drawn onto frames.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionStyle {
    /// Target glyph height in pixels; rounded down to a multiple of 8.
    pub font_px: u32,
    pub text_color: [u8; 3],
    pub box_color: [u8; 3],
    /// Space between the text and the box edge, in pixels.
    pub padding: u32,
    pub bold: bool,
    pub max_lines: usize,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_px: 48,
            text_color: [255, 0, 0],
            box_color: [255, 255, 255],
            padding: 6,
            bold: true,
            max_lines: 3,
        }
    }
}

impl CaptionStyle {
    /// Integer glyph scale for the configured size, at least 1.
    pub fn scale(&self) -> u32 {
        (self.font_px / GLYPH_PX).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_bold_red_on_white() {
        let style = CaptionStyle::default();
        assert_eq!(style.text_color, [255, 0, 0]);
        assert_eq!(style.box_color, [255, 255, 255]);
        assert!(style.bold);
        assert_eq!(style.max_lines, 3);
        assert_eq!(style.scale(), 6);
    }

    #[test]
    fn test_tiny_font_keeps_scale_one() {
        let style = CaptionStyle {
            font_px: 3,
            ..CaptionStyle::default()
        };
        assert_eq!(style.scale(), 1);
    }
}
