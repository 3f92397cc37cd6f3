//! Text measurement seam and word wrapping.
//!
//! Layout never rasterizes glyphs. It asks a `TextMeasure` for pixel widths
//! and wraps on whitespace; the drawing collaborator supplies a measure that
//! matches its fonts.

const ELLIPSIS: &str = "...";

/// Pixel width oracle supplied by the drawing collaborator.
pub trait TextMeasure {
    /// Rendered width of `text` in pixels.
    fn text_width(&self, text: &str) -> u32;

    /// Number of lines `text` needs when wrapped at `max_width`.
    fn line_count(&self, text: &str, max_width: u32) -> usize {
        wrap_text(text, max_width, usize::MAX, self).len()
    }
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> u32,
{
    fn text_width(&self, text: &str) -> u32 {
        self(text)
    }
}

/// Fixed-advance measure, one `char_width` per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceMeasure {
    pub char_width: u32,
}

impl MonospaceMeasure {
    pub fn new(char_width: u32) -> Self {
        Self { char_width }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn text_width(&self, text: &str) -> u32 {
        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        chars.saturating_mul(self.char_width)
    }
}

/// Greedy whitespace wrap limited to `max_lines`.
///
/// A word wider than `max_width` is truncated with `...`. When words are left
/// over after `max_lines`, the last line is ellipsized.
pub fn wrap_text<M>(text: &str, max_width: u32, max_lines: usize, measure: &M) -> Vec<String>
where
    M: TextMeasure + ?Sized,
{
    let mut lines = Vec::new();
    if max_lines == 0 {
        return lines;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let mut current = String::new();
    let mut consumed = 0;

    for word in &words {
        let candidate = if current.is_empty() {
            (*word).to_string()
        } else {
            format!("{current} {word}")
        };
        if measure.text_width(&candidate) <= max_width {
            current = candidate;
            consumed += 1;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            if lines.len() >= max_lines {
                break;
            }
        }

        consumed += 1;
        if measure.text_width(word) <= max_width {
            current = (*word).to_string();
        } else {
            lines.push(truncate_text(word, max_width, measure));
            if lines.len() >= max_lines {
                break;
            }
        }
    }

    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }

    if consumed < words.len() {
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(last, max_width, measure);
        }
    }
    lines
}

/// Shortens `text` with a trailing `...` until it fits `max_width`.
pub fn truncate_text<M>(text: &str, max_width: u32, measure: &M) -> String
where
    M: TextMeasure + ?Sized,
{
    if measure.text_width(text) <= max_width {
        return text.to_string();
    }
    ellipsize(text, max_width, measure)
}

fn ellipsize<M>(text: &str, max_width: u32, measure: &M) -> String
where
    M: TextMeasure + ?Sized,
{
    let mut kept = text.trim_end().to_string();
    loop {
        let candidate = format!("{kept}{ELLIPSIS}");
        if kept.is_empty() || measure.text_width(&candidate) <= max_width {
            return candidate;
        }
        kept.pop();
        kept.truncate(kept.trim_end().len());
    }
}
