//! Draw contexts: the per-page and per-pattern drawing surfaces.
//!
//! A [`DrawContext`] owns a [`ContentStreamBuilder`] and validates operator
//! legality for its context type. Committing a context (through
//! [`Generator::add_page`](crate::generator::Generator::add_page) or
//! [`Generator::add_pattern`](crate::generator::Generator::add_pattern))
//! consumes the accumulated stream and clears the context back to an empty
//! but valid shell, so accidental reuse cannot replay stale content.

use crate::error::{Error, Result};
use crate::fonts::{FontEngine, FontEntry, FontId};
use crate::writer::content_stream::{ContentStreamBuilder, ResourceDictionary, TjItem};
use crate::writer::document::PatternId;
use crate::writer::text_object::{KernedItem, TextObject, TextOp};

/// The kind of content stream a draw context produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextType {
    /// A document page.
    Page,
    /// A tiling pattern cell.
    TilingPattern,
}

/// Mutable drawing surface for one page or pattern cell.
#[derive(Debug)]
pub struct DrawContext {
    context_type: ContextType,
    builder: ContentStreamBuilder,
}

impl DrawContext {
    pub(crate) fn new(context_type: ContextType) -> Self {
        Self {
            context_type,
            builder: ContentStreamBuilder::new(),
        }
    }

    /// The context type this surface was created with.
    pub fn context_type(&self) -> ContextType {
        self.context_type
    }

    /// Whether nothing has been drawn since creation or the last commit.
    pub fn is_empty(&self) -> bool {
        self.builder.is_empty()
    }

    /// Consume the accumulated stream, leaving the context empty.
    pub(crate) fn serialize(&mut self) -> (ResourceDictionary, Vec<u8>) {
        self.builder.finish()
    }

    // === Graphics state ===

    /// Save the graphics state (`q`).
    pub fn save_state(&mut self) {
        self.builder.save_state();
    }

    /// Restore the graphics state (`Q`).
    pub fn restore_state(&mut self) {
        self.builder.restore_state();
    }

    /// Concatenate a transformation matrix (`cm`).
    pub fn concat_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.builder.concat_matrix(a, b, c, d, e, f);
    }

    /// Translate the coordinate system.
    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.concat_matrix(1.0, 0.0, 0.0, 1.0, tx, ty);
    }

    /// Set the stroking line width (`w`).
    pub fn set_line_width(&mut self, width: f64) {
        self.builder.set_line_width(width);
    }

    // === Paths ===

    /// Start a new subpath at `(x, y)` (`m`).
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.builder.move_to(x, y);
    }

    /// Line to `(x, y)` (`l`).
    pub fn line_to(&mut self, x: f64, y: f64) {
        self.builder.line_to(x, y);
    }

    /// Append a rectangle (`re`).
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.builder.rect(x, y, w, h);
    }

    /// Close the current subpath (`h`).
    pub fn close_path(&mut self) {
        self.builder.close_path();
    }

    /// Stroke the current path (`S`).
    pub fn stroke(&mut self) {
        self.builder.stroke();
    }

    /// Fill the current path (`f`).
    pub fn fill(&mut self) {
        self.builder.fill();
    }

    // === Color ===

    /// Set the fill color in DeviceGray (`g`).
    pub fn set_fill_gray(&mut self, gray: f64) {
        self.builder.set_fill_gray(gray);
    }

    /// Set the stroke color in DeviceGray (`G`).
    pub fn set_stroke_gray(&mut self, gray: f64) {
        self.builder.set_stroke_gray(gray);
    }

    /// Set the fill color in DeviceRGB (`rg`).
    pub fn set_fill_rgb(&mut self, r: f64, g: f64, b: f64) {
        self.builder.set_fill_rgb(r, g, b);
    }

    /// Set the stroke color in DeviceRGB (`RG`).
    pub fn set_stroke_rgb(&mut self, r: f64, g: f64, b: f64) {
        self.builder.set_stroke_rgb(r, g, b);
    }

    /// Use a tiling pattern as the fill color.
    ///
    /// # Panics
    ///
    /// Panics when called on a tiling-pattern context. A pattern cell cannot
    /// reference another pattern as its fill; doing so is a caller bug, not a
    /// data condition.
    pub fn set_fill_pattern(&mut self, pattern: PatternId) {
        assert_eq!(
            self.context_type,
            ContextType::Page,
            "pattern fills are only legal on page contexts"
        );
        self.builder.set_fill_pattern(pattern);
    }

    // === Text ===

    /// Serialize a buffered text object into this context's stream.
    ///
    /// Emits the full `BT` ... `ET` framing and replays every buffered
    /// operation in authoring order. Text shown through an embedded font is
    /// encoded as glyph ids; builtin fonts take escaped literal strings and
    /// accept ASCII only.
    pub fn render_text(&mut self, text: &TextObject, engine: &FontEngine) -> Result<()> {
        let mut current: Option<FontId> = None;
        self.builder.begin_text();
        for op in text.ops() {
            match op {
                TextOp::SetFont(font, size) => {
                    engine.entry(*font)?;
                    current = Some(*font);
                    self.builder.set_font(*font, *size);
                },
                TextOp::MoveText(dx, dy) => self.builder.move_text(*dx, *dy),
                TextOp::SetLeading(leading) => self.builder.set_leading(*leading),
                TextOp::NextLine => self.builder.next_line(),
                TextOp::SetCharSpacing(s) => self.builder.set_char_spacing(*s),
                TextOp::SetWordSpacing(s) => self.builder.set_word_spacing(*s),
                TextOp::SetHorizontalScaling(s) => self.builder.set_horizontal_scaling(*s),
                TextOp::SetRise(rise) => self.builder.set_rise(*rise),
                TextOp::ShowText(s) => {
                    let font = current.ok_or(Error::NoCurrentFont)?;
                    match engine.entry(font)? {
                        FontEntry::Builtin(_) => {
                            ensure_ascii(s)?;
                            self.builder.show_literal(s);
                        },
                        FontEntry::Embedded(face) => {
                            let glyphs = engine.face_program(*face).encode_text(s);
                            self.builder.show_glyphs(&glyphs);
                        },
                    }
                },
                TextOp::ShowKerned(items) => {
                    let font = current.ok_or(Error::NoCurrentFont)?;
                    let encoded = encode_kerned(items, font, engine)?;
                    self.builder.show_kerned(&encoded);
                },
            }
        }
        self.builder.end_text();
        Ok(())
    }

    /// Show a single string at a position: shorthand for a one-run text
    /// object with `Tf`, `Td` and `Tj`.
    pub fn render_text_at(
        &mut self,
        text: &str,
        font: FontId,
        point_size: f64,
        x: f64,
        y: f64,
        engine: &FontEngine,
    ) -> Result<()> {
        let mut obj = TextObject::new();
        obj.set_font(font, point_size).move_text(x, y).show(text);
        self.render_text(&obj, engine)
    }
}

fn ensure_ascii(text: &str) -> Result<()> {
    match text.chars().find(|c| !c.is_ascii()) {
        Some(c) => Err(Error::UnsupportedCharacter(c)),
        None => Ok(()),
    }
}

fn encode_kerned(items: &[KernedItem], font: FontId, engine: &FontEngine) -> Result<Vec<TjItem>> {
    let entry = engine.entry(font)?;
    items
        .iter()
        .map(|item| match item {
            KernedItem::Adjustment(adj) => Ok(TjItem::Adjustment(*adj)),
            KernedItem::Text(text) => match entry {
                FontEntry::Builtin(_) => {
                    ensure_ascii(text)?;
                    Ok(TjItem::Literal(text.clone()))
                },
                FontEntry::Embedded(face) => {
                    Ok(TjItem::Glyphs(engine.face_program(*face).encode_text(text)))
                },
            },
        })
        .collect()
}

/// Builder for a tiling pattern: a pattern-type draw context plus the cell
/// size. The cell's bounding box and tiling step are both `width` x
/// `height`; no independent step size is supported.
#[derive(Debug)]
pub struct TilingPatternBuilder {
    pub(crate) ctx: DrawContext,
    width: f64,
    height: f64,
}

impl TilingPatternBuilder {
    pub(crate) fn new(width: f64, height: f64) -> Self {
        Self {
            ctx: DrawContext::new(ContextType::TilingPattern),
            width,
            height,
        }
    }

    /// Pattern cell width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Pattern cell height.
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl std::ops::Deref for TilingPatternBuilder {
    type Target = DrawContext;

    fn deref(&self) -> &DrawContext {
        &self.ctx
    }
}

impl std::ops::DerefMut for TilingPatternBuilder {
    fn deref_mut(&mut self) -> &mut DrawContext {
        &mut self.ctx
    }
}
