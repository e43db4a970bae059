//! PDF content stream builder.
//!
//! Accumulates graphics and text operators (PDF spec ISO 32000-1:2008
//! Sections 8-9) into a byte buffer and records which document resources the
//! stream references. Appending an operator never fails: operands are plain
//! numbers and pre-validated handles, and the buffer is in memory.

use crate::fonts::FontId;
use crate::writer::document::PatternId;
use indexmap::{IndexMap, IndexSet};
use std::fmt::Write as _;

/// Resources referenced by a single content stream, by category.
///
/// Built once when the owning draw context is committed; the document
/// resolves the ids to indirect object references during serialization.
#[derive(Debug, Default, Clone)]
pub struct ResourceDictionary {
    /// Fonts used, each with the set of glyph ids shown through it.
    /// Builtin fonts appear with an empty glyph set.
    pub(crate) fonts: IndexMap<FontId, IndexSet<u16>>,
    /// Tiling patterns referenced as fill color.
    pub(crate) patterns: IndexSet<PatternId>,
}

impl ResourceDictionary {
    /// Whether no resources are referenced at all.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty() && self.patterns.is_empty()
    }

    /// Fonts referenced by the stream, in first-use order.
    pub fn font_ids(&self) -> impl Iterator<Item = FontId> + '_ {
        self.fonts.keys().copied()
    }

    /// Patterns referenced by the stream, in first-use order.
    pub fn pattern_ids(&self) -> impl Iterator<Item = PatternId> + '_ {
        self.patterns.iter().copied()
    }
}

/// One element of a kerned show-with-position (`TJ`) array, already encoded
/// for the current font.
#[derive(Debug, Clone)]
pub(crate) enum TjItem {
    /// Escaped literal string (builtin fonts).
    Literal(String),
    /// Glyph id run, hex encoded (embedded fonts).
    Glyphs(Vec<u16>),
    /// Positioning adjustment in thousandths of text space, subtracted from
    /// the current position along the writing axis.
    Adjustment(f64),
}

/// Builder for one content stream.
///
/// Owned by a draw context. [`finish`](Self::finish) produces the final
/// `(ResourceDictionary, bytes)` pair and resets the builder to empty, so a
/// single accumulation can only be committed once.
#[derive(Debug, Default)]
pub struct ContentStreamBuilder {
    buffer: String,
    resources: ResourceDictionary,
    current_font: Option<FontId>,
}

impl ContentStreamBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append one formatted operator line.
    fn op(&mut self, args: std::fmt::Arguments) {
        self.buffer
            .write_fmt(args)
            .expect("formatting into a String cannot fail");
        self.buffer.push('\n');
    }

    /// Bytes accumulated so far (final newline included).
    #[cfg(test)]
    pub(crate) fn bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Whether nothing has been appended since creation or the last commit.
    pub(crate) fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consume the accumulated state, returning the resource dictionary and
    /// the raw command bytes. The builder is reset to empty.
    pub(crate) fn finish(&mut self) -> (ResourceDictionary, Vec<u8>) {
        let resources = std::mem::take(&mut self.resources);
        let commands = std::mem::take(&mut self.buffer).into_bytes();
        self.current_font = None;
        (resources, commands)
    }

    // === Graphics state ===

    pub(crate) fn save_state(&mut self) {
        self.op(format_args!("q"));
    }

    pub(crate) fn restore_state(&mut self) {
        self.op(format_args!("Q"));
    }

    pub(crate) fn concat_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.op(format_args!("{} {} {} {} {} {} cm", a, b, c, d, e, f));
    }

    pub(crate) fn set_line_width(&mut self, width: f64) {
        self.op(format_args!("{} w", width));
    }

    // === Path construction and painting ===

    pub(crate) fn move_to(&mut self, x: f64, y: f64) {
        self.op(format_args!("{} {} m", x, y));
    }

    pub(crate) fn line_to(&mut self, x: f64, y: f64) {
        self.op(format_args!("{} {} l", x, y));
    }

    pub(crate) fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.op(format_args!("{} {} {} {} re", x, y, w, h));
    }

    pub(crate) fn close_path(&mut self) {
        self.op(format_args!("h"));
    }

    pub(crate) fn stroke(&mut self) {
        self.op(format_args!("S"));
    }

    pub(crate) fn fill(&mut self) {
        self.op(format_args!("f"));
    }

    // === Color ===

    pub(crate) fn set_fill_gray(&mut self, g: f64) {
        self.op(format_args!("{} g", g));
    }

    pub(crate) fn set_stroke_gray(&mut self, g: f64) {
        self.op(format_args!("{} G", g));
    }

    pub(crate) fn set_fill_rgb(&mut self, r: f64, g: f64, b: f64) {
        self.op(format_args!("{} {} {} rg", r, g, b));
    }

    pub(crate) fn set_stroke_rgb(&mut self, r: f64, g: f64, b: f64) {
        self.op(format_args!("{} {} {} RG", r, g, b));
    }

    pub(crate) fn set_fill_pattern(&mut self, pattern: PatternId) {
        self.resources.patterns.insert(pattern);
        self.op(format_args!("/Pattern cs"));
        self.op(format_args!("/P{} scn", pattern.index()));
    }

    // === Text ===

    pub(crate) fn begin_text(&mut self) {
        self.op(format_args!("BT"));
    }

    pub(crate) fn end_text(&mut self) {
        self.op(format_args!("ET"));
    }

    pub(crate) fn set_font(&mut self, font: FontId, size: f64) {
        self.resources.fonts.entry(font).or_default();
        self.current_font = Some(font);
        self.op(format_args!("/F{} {} Tf", font.index(), size));
    }

    pub(crate) fn move_text(&mut self, dx: f64, dy: f64) {
        self.op(format_args!("{} {} Td", dx, dy));
    }

    pub(crate) fn set_leading(&mut self, leading: f64) {
        self.op(format_args!("{} TL", leading));
    }

    pub(crate) fn next_line(&mut self) {
        self.op(format_args!("T*"));
    }

    pub(crate) fn set_char_spacing(&mut self, spacing: f64) {
        self.op(format_args!("{} Tc", spacing));
    }

    pub(crate) fn set_word_spacing(&mut self, spacing: f64) {
        self.op(format_args!("{} Tw", spacing));
    }

    pub(crate) fn set_horizontal_scaling(&mut self, percent: f64) {
        self.op(format_args!("{} Tz", percent));
    }

    pub(crate) fn set_rise(&mut self, rise: f64) {
        self.op(format_args!("{} Ts", rise));
    }

    /// Show an escaped literal string (builtin font encoding).
    pub(crate) fn show_literal(&mut self, text: &str) {
        let escaped = escape_literal(text);
        self.op(format_args!("({}) Tj", escaped));
    }

    /// Show a glyph id run as a hex string (embedded font encoding).
    pub(crate) fn show_glyphs(&mut self, glyphs: &[u16]) {
        self.record_glyphs(glyphs);
        let hex = hex_glyphs(glyphs);
        self.op(format_args!("<{}> Tj", hex));
    }

    /// Show a kerned run as a single bracketed `TJ` array.
    pub(crate) fn show_kerned(&mut self, items: &[TjItem]) {
        let mut line = String::from("[");
        for item in items {
            match item {
                TjItem::Literal(text) => {
                    line.push('(');
                    line.push_str(&escape_literal(text));
                    line.push(')');
                },
                TjItem::Glyphs(glyphs) => {
                    self.record_glyphs(glyphs);
                    line.push('<');
                    line.push_str(&hex_glyphs(glyphs));
                    line.push('>');
                },
                TjItem::Adjustment(adj) => {
                    let _ = write!(line, "{}", adj);
                },
            }
            line.push(' ');
        }
        line.push_str("] TJ");
        self.op(format_args!("{}", line));
    }

    fn record_glyphs(&mut self, glyphs: &[u16]) {
        if let Some(font) = self.current_font {
            self.resources.fonts.entry(font).or_default().extend(glyphs.iter().copied());
        }
    }
}

/// Escape a string for a PDF literal string object.
pub(crate) fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for b in text.chars() {
        match b {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(b),
        }
    }
    out
}

fn hex_glyphs(glyphs: &[u16]) -> String {
    let mut out = String::with_capacity(glyphs.len() * 4);
    for g in glyphs {
        let _ = write!(out, "{:04X}", g);
    }
    out
}
