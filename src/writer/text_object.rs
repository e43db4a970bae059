//! Buffered text objects.
//!
//! A [`TextObject`] records text-showing operations in authoring order and is
//! replayed verbatim into content-stream operators between a `BT`/`ET` pair.
//! No state-change elision happens: if the caller sets the same spacing
//! twice, two operators are emitted. The replay itself lives on
//! [`DrawContext::render_text`](crate::writer::DrawContext::render_text),
//! which consults the font engine for glyph encoding.

use crate::fonts::FontId;

/// One element of a kerned run shown with the `TJ` operator.
#[derive(Debug, Clone)]
pub enum KernedItem {
    /// A run of characters, encoded per the current font's byte encoding.
    Text(String),
    /// Positioning adjustment in thousandths of text-space units, subtracted
    /// from the current position along the writing axis.
    Adjustment(f64),
}

/// A buffered text operation.
#[derive(Debug, Clone)]
pub enum TextOp {
    /// Select font and size (`Tf`).
    SetFont(FontId, f64),
    /// Move the text position by an offset (`Td`).
    MoveText(f64, f64),
    /// Set text leading (`TL`).
    SetLeading(f64),
    /// Move to the next line using the current leading (`T*`).
    NextLine,
    /// Set character spacing (`Tc`).
    SetCharSpacing(f64),
    /// Set word spacing (`Tw`).
    SetWordSpacing(f64),
    /// Set horizontal scaling percentage (`Tz`).
    SetHorizontalScaling(f64),
    /// Set text rise (`Ts`).
    SetRise(f64),
    /// Show a string (`Tj`).
    ShowText(String),
    /// Show a kerned run as one bracketed array (`TJ`).
    ShowKerned(Vec<KernedItem>),
}

/// An ordered sequence of text operations.
///
/// Operations are stored exactly as issued and serialized in the same order.
#[derive(Debug, Clone, Default)]
pub struct TextObject {
    ops: Vec<TextOp>,
}

impl TextObject {
    /// Create an empty text object.
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffered operations, in authoring order.
    pub fn ops(&self) -> &[TextOp] {
        &self.ops
    }

    /// Select the font and size for subsequent text.
    pub fn set_font(&mut self, font: FontId, size: f64) -> &mut Self {
        self.ops.push(TextOp::SetFont(font, size));
        self
    }

    /// Move the text position by `(dx, dy)`.
    pub fn move_text(&mut self, dx: f64, dy: f64) -> &mut Self {
        self.ops.push(TextOp::MoveText(dx, dy));
        self
    }

    /// Set the leading used by [`next_line`](Self::next_line).
    pub fn set_leading(&mut self, leading: f64) -> &mut Self {
        self.ops.push(TextOp::SetLeading(leading));
        self
    }

    /// Move to the start of the next line.
    pub fn next_line(&mut self) -> &mut Self {
        self.ops.push(TextOp::NextLine);
        self
    }

    /// Set additional spacing between characters.
    pub fn set_char_spacing(&mut self, spacing: f64) -> &mut Self {
        self.ops.push(TextOp::SetCharSpacing(spacing));
        self
    }

    /// Set additional spacing applied to word separators.
    pub fn set_word_spacing(&mut self, spacing: f64) -> &mut Self {
        self.ops.push(TextOp::SetWordSpacing(spacing));
        self
    }

    /// Set horizontal scaling as a percentage (100 = no scaling).
    pub fn set_horizontal_scaling(&mut self, percent: f64) -> &mut Self {
        self.ops.push(TextOp::SetHorizontalScaling(percent));
        self
    }

    /// Raise (or lower, if negative) the baseline.
    pub fn set_rise(&mut self, rise: f64) -> &mut Self {
        self.ops.push(TextOp::SetRise(rise));
        self
    }

    /// Show a string with the current font.
    pub fn show(&mut self, text: impl Into<String>) -> &mut Self {
        self.ops.push(TextOp::ShowText(text.into()));
        self
    }

    /// Show a kerned run: character runs interleaved with manual positioning
    /// adjustments, emitted as a single `TJ` operator.
    pub fn show_kerned(&mut self, items: Vec<KernedItem>) -> &mut Self {
        self.ops.push(TextOp::ShowKerned(items));
        self
    }

    /// Whether no operations have been buffered.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
