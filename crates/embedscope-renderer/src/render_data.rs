use serde::{Deserialize, Serialize};

use embedscope_core::{PointIndex, Rgb};

use crate::viewport::Pixel;

/// Marker appended to truncated label text.
pub const ELLIPSIS: &str = "...";

/// Cut `text` to at most `budget` characters, appending [`ELLIPSIS`] when cut.
pub fn truncate(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((byte, _)) => format!("{}{}", &text[..byte], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Greedy word wrap to lines of at most `max_chars` characters.
/// Words longer than a line are split.
pub fn wrap_lines(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(max_chars);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        let word_len = chars.len();
        if word_len == 0 {
            continue;
        }
        let needed = if current_len == 0 { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += word_len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Visual parameters of a label box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub font_size: f64,
    pub line_height: f64,
    /// Fixed box width in pixels; text wraps inside it.
    pub box_width: f64,
    pub padding: f64,
    /// Average glyph advance as a fraction of the font size.
    pub char_advance: f64,
    pub corner_radius: f64,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub text_color: Rgb,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            line_height: 1.2,
            box_width: 250.0,
            padding: 8.0,
            char_advance: 0.6,
            corner_radius: 5.0,
            fill: Rgb::new(0x12, 0x12, 0x12),
            stroke: Rgb::new(0x55, 0x55, 0x55),
            text_color: Rgb::new(0xff, 0xff, 0xff),
        }
    }
}

impl LabelStyle {
    /// Characters that fit on one line of the box.
    pub fn chars_per_line(&self) -> usize {
        let inner = (self.box_width - 2.0 * self.padding).max(0.0);
        ((inner / (self.font_size * self.char_advance)).floor() as usize).max(1)
    }
}

/// A label to place: already truncated text anchored at a pixel position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelItem {
    pub index: PointIndex,
    pub anchor: Pixel,
    pub text: String,
    pub fresh: bool,
}

/// A laid-out label: backing rectangle plus the text lines drawn on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelBox {
    pub index: PointIndex,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub lines: Vec<String>,
    pub fresh: bool,
}

/// The on-canvas label overlay.
///
/// Every update clears the layer and redraws it in full.
#[derive(Debug, Clone, Default)]
pub struct LabelLayer {
    style: LabelStyle,
    boxes: Vec<LabelBox>,
    clears: u64,
}

impl LabelLayer {
    pub fn new(style: LabelStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// Remove every label.
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.clears += 1;
    }

    /// Replace the layer's contents with `items`.
    pub fn draw(&mut self, items: &[LabelItem]) {
        self.clear();
        let per_line = self.style.chars_per_line();
        for item in items {
            let lines = wrap_lines(&item.text, per_line);
            let text_height = lines.len() as f64 * self.style.font_size * self.style.line_height;
            self.boxes.push(LabelBox {
                index: item.index,
                x: item.anchor.x,
                y: item.anchor.y,
                width: self.style.box_width,
                height: text_height + 2.0 * self.style.padding,
                lines,
                fresh: item.fresh,
            });
        }
    }

    pub fn boxes(&self) -> &[LabelBox] {
        &self.boxes
    }

    /// Indices of the labelled points, in draw order.
    pub fn indices(&self) -> Vec<PointIndex> {
        self.boxes.iter().map(|b| b.index).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    /// Number of clears so far, including the implicit clear of every draw.
    pub fn clear_count(&self) -> u64 {
        self.clears
    }
}
