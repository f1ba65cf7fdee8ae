use crate::fonts::{BuiltinFont, FontMetrics};

/// A bounding rectangle in PDF page coordinates (origin bottom-left).
/// `y` is the top edge; content flows downward from it.
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Y coordinate of the bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y - self.height
    }
}

/// Horizontal alignment of text within a cell or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Font and size for a run of text.
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub font: BuiltinFont,
    pub font_size: f64,
}

impl TextStyle {
    pub fn new(font: BuiltinFont, font_size: f64) -> Self {
        TextStyle { font, font_size }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font: BuiltinFont::Helvetica,
            font_size: 12.0,
        }
    }
}

/// Word-wrap `text` into lines that fit within `avail_width` points.
///
/// Splits on whitespace; explicit newlines force breaks. A single word wider
/// than the available width gets a line of its own and overflows it — cell
/// widths in this document are chosen so that does not happen in practice.
pub(crate) fn wrap_text(text: &str, avail_width: f64, style: &TextStyle) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for para in text.split('\n') {
        wrap_paragraph(para.trim(), avail_width, style, &mut lines);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_paragraph(text: &str, avail_width: f64, style: &TextStyle, out: &mut Vec<String>) {
    if text.is_empty() {
        out.push(String::new());
        return;
    }
    let space_w = FontMetrics::measure_text(" ", style.font, style.font_size);
    let mut current = String::new();
    let mut current_w = 0.0_f64;

    for word in text.split_whitespace() {
        let word_w = FontMetrics::measure_text(word, style.font, style.font_size);
        let needed = if current.is_empty() {
            word_w
        } else {
            current_w + space_w + word_w
        };

        if needed > avail_width && !current.is_empty() {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
            current_w = word_w;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_w = needed;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle::new(BuiltinFont::Helvetica, 10.0)
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_text("Masala Chai", 200.0, &style());
        assert_eq!(lines, vec!["Masala Chai"]);
    }

    #[test]
    fn long_text_wraps() {
        let lines = wrap_text(
            "alpha beta gamma delta epsilon zeta eta theta iota kappa",
            80.0,
            &style(),
        );
        assert!(lines.len() > 1);
        // No word is lost or duplicated by wrapping.
        let rejoined = lines.join(" ");
        assert_eq!(
            rejoined,
            "alpha beta gamma delta epsilon zeta eta theta iota kappa"
        );
    }

    #[test]
    fn empty_text_yields_one_empty_line() {
        assert_eq!(wrap_text("", 100.0, &style()), vec![String::new()]);
    }

    #[test]
    fn newline_forces_break() {
        let lines = wrap_text("first\nsecond", 500.0, &style());
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn oversize_word_gets_own_line() {
        let lines = wrap_text("ok Supercalifragilistic ok", 40.0, &style());
        assert!(lines.contains(&"Supercalifragilistic".to_string()));
    }

    #[test]
    fn rect_bottom() {
        let r = Rect { x: 10.0, y: 700.0, width: 100.0, height: 50.0 };
        assert!((r.bottom() - 650.0).abs() < 1e-9);
    }
}
