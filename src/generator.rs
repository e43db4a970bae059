//! Top-level document generator.
//!
//! A [`Generator`] ties together the font engine, the in-memory document,
//! and the output path. Typical use:
//!
//! ```no_run
//! use pdfpress::{Generator, GeneratorConfig, BuiltinFont};
//!
//! # fn main() -> pdfpress::Result<()> {
//! let mut gen = Generator::new("out.pdf", GeneratorConfig::default());
//! let font = gen.builtin_font(BuiltinFont::Helvetica);
//! {
//!     let mut page = gen.guarded_page_context();
//!     page.draw_text_at("Hello", font, 24.0, 72.0, 700.0)?;
//! } // page committed here
//! gen.write()?;
//! # Ok(())
//! # }
//! ```

use crate::codepoints::CodepointIter;
use crate::error::{Error, Result};
use crate::fonts::{BuiltinFont, FontEngine, FontId};
use crate::writer::document::{GeneratorConfig, PageId, PatternId, PdfDocument};
use crate::writer::draw_context::{ContextType, DrawContext, TilingPatternBuilder};
use crate::writer::text_object::TextObject;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Builds a PDF document and writes it out atomically.
#[derive(Debug)]
pub struct Generator {
    path: PathBuf,
    document: PdfDocument,
    engine: FontEngine,
}

impl Generator {
    /// Create a generator targeting `path`.
    ///
    /// Nothing touches the filesystem until [`write`](Self::write).
    pub fn new(path: impl Into<PathBuf>, config: GeneratorConfig) -> Self {
        Self {
            path: path.into(),
            document: PdfDocument::new(config),
            engine: FontEngine::new(),
        }
    }

    /// The output path this generator writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages committed so far.
    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// The configuration this generator was created with.
    pub fn config(&self) -> &GeneratorConfig {
        self.document.config()
    }

    /// The font engine owning all loaded font programs.
    pub fn font_engine(&self) -> &FontEngine {
        &self.engine
    }

    // === Fonts ===

    /// Load an embedded font from a file on disk.
    pub fn load_font(&mut self, path: impl AsRef<Path>) -> Result<FontId> {
        let data = std::fs::read(path)?;
        self.engine.load(data)
    }

    /// Load an embedded font from raw font file bytes.
    pub fn load_font_bytes(&mut self, data: Vec<u8>) -> Result<FontId> {
        self.engine.load(data)
    }

    /// Get a handle to one of the 14 standard fonts.
    ///
    /// Repeated calls with the same font return the same handle.
    pub fn builtin_font(&mut self, font: BuiltinFont) -> FontId {
        self.engine.builtin(font)
    }

    // === Contexts ===

    /// Create a page drawing context.
    ///
    /// The context must be handed back through [`add_page`](Self::add_page)
    /// to become part of the document.
    pub fn page_context(&self) -> DrawContext {
        DrawContext::new(ContextType::Page)
    }

    /// Create a page context that commits itself when dropped.
    pub fn guarded_page_context(&mut self) -> PageGuard<'_> {
        PageGuard {
            ctx: DrawContext::new(ContextType::Page),
            gen: self,
        }
    }

    /// Create a tiling pattern builder with the given cell size.
    pub fn pattern_builder(&self, width: f64, height: f64) -> TilingPatternBuilder {
        TilingPatternBuilder::new(width, height)
    }

    /// Commit a page context, clearing it for reuse.
    ///
    /// Committing the same context again without drawing in between appends
    /// an empty page; content is never duplicated.
    ///
    /// # Panics
    ///
    /// Panics if `ctx` is not a page context. Pattern contexts go through
    /// [`add_pattern`](Self::add_pattern).
    pub fn add_page(&mut self, ctx: &mut DrawContext) -> PageId {
        assert_eq!(
            ctx.context_type(),
            ContextType::Page,
            "add_page requires a page context"
        );
        let (resources, commands) = ctx.serialize();
        self.document.add_page(resources, commands)
    }

    /// Commit a tiling pattern, consuming its builder.
    ///
    /// The returned handle can be passed to
    /// [`DrawContext::set_fill_pattern`] on any page context.
    pub fn add_pattern(&mut self, mut builder: TilingPatternBuilder) -> PatternId {
        let width = builder.width();
        let height = builder.height();
        let (resources, commands) = builder.ctx.serialize();
        self.document.add_pattern(resources, commands, width, height)
    }

    // === Text rendering and metrics ===

    /// Serialize a buffered text object into a context's stream.
    pub fn render_text(&self, ctx: &mut DrawContext, text: &TextObject) -> Result<()> {
        ctx.render_text(text, &self.engine)
    }

    /// Show a single string at a position on a context.
    pub fn render_text_at(
        &self,
        ctx: &mut DrawContext,
        text: &str,
        font: FontId,
        point_size: f64,
        x: f64,
        y: f64,
    ) -> Result<()> {
        ctx.render_text_at(text, font, point_size, x, y, &self.engine)
    }

    /// Show an ASCII string through a builtin font, registering the font
    /// handle as needed.
    pub fn render_text_builtin(
        &mut self,
        ctx: &mut DrawContext,
        text: &str,
        font: BuiltinFont,
        point_size: f64,
        x: f64,
        y: f64,
    ) -> Result<()> {
        let id = self.engine.builtin(font);
        ctx.render_text_at(text, id, point_size, x, y, &self.engine)
    }

    /// Measure the width of `text` in points when shown with an embedded
    /// font at `point_size`.
    ///
    /// Glyph advances are scaled to the point size. Kern pair adjustments
    /// from the font's kern table are applied between adjacent code points.
    /// Builtin fonts carry no metrics here and yield
    /// [`Error::BuiltinFontNotSupported`]; a code point absent from the cmap
    /// yields [`Error::MissingGlyph`].
    pub fn text_width(&self, text: &str, font: FontId, point_size: f64) -> Result<f64> {
        let program = self.engine.program(font)?;
        let mut width = 0.0;
        let mut previous: Option<u32> = None;
        for (codepoint, _) in CodepointIter::new(text) {
            if program.has_kerning() {
                if let Some(prev) = previous {
                    if let Some(kern) = program.kerning(prev, codepoint) {
                        // TODO: kern deltas are divided by units-per-em but
                        // not multiplied by the point size, so kerned widths
                        // drift from rendered output at sizes other than 1pt.
                        width += kern / program.units_per_em();
                    }
                }
            }
            width += program.advance(codepoint, point_size)?;
            previous = Some(codepoint);
        }
        Ok(width)
    }

    // === Output ===

    /// Serialize the document to bytes without touching the filesystem.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.document.render(&self.engine)
    }

    /// Serialize the document and write it to the target path atomically.
    ///
    /// The bytes go to a sibling temporary file (the target name with `~`
    /// appended) which is flushed, synced, and then renamed over the target,
    /// so the target is either the previous file or the complete new one.
    /// On failure the temporary file is left behind for inspection.
    pub fn write(&self) -> Result<()> {
        let bytes = self.document.render(&self.engine)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push("~");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = std::fs::File::create(&tmp_path).map_err(|source| Error::Create {
            path: tmp_path.clone(),
            source,
        })?;
        file.write_all(&bytes).map_err(Error::WriteFailed)?;
        file.flush().map_err(Error::Flush)?;
        file.sync_all().map_err(Error::Sync)?;
        drop(file);

        std::fs::rename(&tmp_path, &self.path).map_err(|source| Error::Rename {
            path: self.path.clone(),
            source,
        })?;

        log::info!(
            "Wrote {} ({} pages, {} bytes)",
            self.path.display(),
            self.document.page_count(),
            bytes.len()
        );
        Ok(())
    }
}

/// A page context that commits itself to the generator when dropped.
///
/// Dereferences to [`DrawContext`] for drawing; text helpers that need the
/// font engine live on the guard itself.
#[derive(Debug)]
pub struct PageGuard<'a> {
    gen: &'a mut Generator,
    ctx: DrawContext,
}

impl PageGuard<'_> {
    /// Serialize a buffered text object into this page.
    pub fn draw_text(&mut self, text: &TextObject) -> Result<()> {
        self.ctx.render_text(text, &self.gen.engine)
    }

    /// Show a single string at a position on this page.
    pub fn draw_text_at(
        &mut self,
        text: &str,
        font: FontId,
        point_size: f64,
        x: f64,
        y: f64,
    ) -> Result<()> {
        self.ctx.render_text_at(text, font, point_size, x, y, &self.gen.engine)
    }
}

impl std::ops::Deref for PageGuard<'_> {
    type Target = DrawContext;

    fn deref(&self) -> &DrawContext {
        &self.ctx
    }
}

impl std::ops::DerefMut for PageGuard<'_> {
    fn deref_mut(&mut self) -> &mut DrawContext {
        &mut self.ctx
    }
}

impl Drop for PageGuard<'_> {
    fn drop(&mut self) {
        assert_eq!(
            self.ctx.context_type(),
            ContextType::Page,
            "page guard holds a non-page context"
        );
        let (resources, commands) = self.ctx.serialize();
        self.gen.document.add_page(resources, commands);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pages_is_an_error() {
        let gen = Generator::new("unused.pdf", GeneratorConfig::default());
        assert!(matches!(gen.to_bytes(), Err(Error::NoPages)));
    }

    #[test]
    fn test_guard_commits_on_drop() {
        let mut gen = Generator::new("unused.pdf", GeneratorConfig::default());
        {
            let mut page = gen.guarded_page_context();
            page.move_to(0.0, 0.0);
            page.line_to(10.0, 10.0);
            page.stroke();
        }
        assert_eq!(gen.page_count(), 1);
    }

    #[test]
    fn test_explicit_commit_clears_context() {
        let mut gen = Generator::new("unused.pdf", GeneratorConfig::default());
        let mut ctx = gen.page_context();
        ctx.rect(0.0, 0.0, 10.0, 10.0);
        ctx.fill();

        let first = gen.add_page(&mut ctx);
        // Second commit without drawing appends an empty page.
        let second = gen.add_page(&mut ctx);
        assert_ne!(first, second);
        assert_eq!(gen.page_count(), 2);
    }

    #[test]
    #[should_panic(expected = "add_page requires a page context")]
    fn test_add_page_rejects_pattern_context() {
        let mut gen = Generator::new("unused.pdf", GeneratorConfig::default());
        let mut ctx = DrawContext::new(ContextType::TilingPattern);
        gen.add_page(&mut ctx);
    }

    #[test]
    fn test_builtin_metrics_unsupported() {
        let mut gen = Generator::new("unused.pdf", GeneratorConfig::default());
        let font = gen.builtin_font(BuiltinFont::Helvetica);
        assert!(matches!(
            gen.text_width("Hello", font, 12.0),
            Err(Error::BuiltinFontNotSupported)
        ));
    }

    #[test]
    fn test_unknown_font_width() {
        let gen = Generator::new("unused.pdf", GeneratorConfig::default());
        assert!(matches!(
            gen.text_width("x", FontId(9), 12.0),
            Err(Error::BadFontId(9))
        ));
    }
}
