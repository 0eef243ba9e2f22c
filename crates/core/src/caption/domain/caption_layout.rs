use super::caption_style::{CaptionStyle, GLYPH_PX, MIN_GLYPHS_PER_LINE};

const ELLIPSIS: &str = "...";

/// Where and how large a caption box sits on a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptionLayout {
    pub lines: Vec<String>,
    pub scale: u32,
    pub box_x: i64,
    pub box_y: i64,
    pub box_width: u32,
    pub box_height: u32,
    pub padding: u32,
}

impl CaptionLayout {
    pub fn glyph_size(&self) -> u32 {
        GLYPH_PX * self.scale
    }

    /// Vertical distance between consecutive baselines.
    pub fn line_height(&self) -> u32 {
        line_height(self.scale)
    }

    /// Top-left corner of line `i`, centered in the box.
    pub fn line_origin(&self, i: usize) -> (i64, i64) {
        let line_width = self.lines[i].chars().count() as u32 * self.glyph_size();
        let x = self.box_x + (self.box_width.saturating_sub(line_width) / 2) as i64;
        let y = self.box_y + self.padding as i64 + (i as u32 * self.line_height()) as i64;
        (x, y)
    }
}

fn line_height(scale: u32) -> u32 {
    (GLYPH_PX + 2) * scale
}

/// Lays out `text` at the bottom-center of a `frame_width` x `frame_height`
/// frame. Returns `None` for blank text: no box is drawn.
pub fn layout_caption(
    text: &str,
    frame_width: u32,
    frame_height: u32,
    style: &CaptionStyle,
) -> Option<CaptionLayout> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    let available = frame_width.saturating_sub(2 * style.padding);
    let mut scale = style.scale();
    if (available / (GLYPH_PX * scale)) < MIN_GLYPHS_PER_LINE as u32 {
        scale = (available / (GLYPH_PX * MIN_GLYPHS_PER_LINE as u32)).clamp(1, scale);
    }
    let per_line = ((available / (GLYPH_PX * scale)) as usize).max(1);

    let lines = truncate_lines(wrap_words(&words, per_line), style.max_lines.max(1), per_line);

    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    let box_width = (longest * GLYPH_PX * scale + 2 * style.padding).min(frame_width);
    let box_height = lines.len() as u32 * line_height(scale) + 2 * style.padding;

    Some(CaptionLayout {
        box_x: ((frame_width - box_width) / 2) as i64,
        box_y: frame_height as i64 - box_height as i64,
        lines,
        scale,
        box_width,
        box_height,
        padding: style.padding,
    })
}

/// Greedy word wrap; words longer than a line are split across lines.
pub fn wrap_words(words: &[&str], per_line: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in words {
        let chars: Vec<char> = word.chars().collect();
        let needed = if current_len == 0 { chars.len() } else { current_len + 1 + chars.len() };

        if needed <= per_line {
            if current_len > 0 {
                current.push(' ');
            }
            current.extend(chars.iter());
            current_len = needed;
            continue;
        }

        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        let mut pieces = chars.chunks(per_line).peekable();
        while let Some(piece) = pieces.next() {
            if pieces.peek().is_some() {
                lines.push(piece.iter().collect());
            } else {
                current = piece.iter().collect();
                current_len = piece.len();
            }
        }
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Keeps at most `max_lines`; when anything is dropped the last kept line
/// ends with `...` and still fits in `per_line`.
pub fn truncate_lines(mut lines: Vec<String>, max_lines: usize, per_line: usize) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);

    if let Some(last) = lines.last_mut() {
        let keep = per_line.saturating_sub(ELLIPSIS.len());
        let mut shortened: String = last.chars().take(keep).collect();
        shortened.truncate(shortened.trim_end().len());
        shortened.push_str(ELLIPSIS);
        *last = shortened.chars().take(per_line).collect();
    }
    lines
}
