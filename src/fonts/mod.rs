//! Font handling for PDF generation.
//!
//! Two kinds of fonts exist in a document:
//!
//! - **Embedded fonts**: TrueType/OpenType programs loaded from raw bytes and
//!   shipped inside the PDF. Metrics (glyph advances, kern pairs) come from
//!   the font tables via `ttf-parser`.
//! - **Builtin fonts**: the 14 standard fonts every PDF viewer provides.
//!   They carry no outline data here, so text through them is restricted to
//!   ASCII and they cannot answer metrics queries.
//!
//! All loaded font programs are owned by the [`FontEngine`], which lives as
//! long as the [`Generator`](crate::generator::Generator) that created it.

use crate::error::{Error, Result};
use ttf_parser::{Face, GlyphId};

/// Opaque handle to a font registered with a generator.
///
/// Stable for the lifetime of the document; indexes an append-only table and
/// is never recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub(crate) usize);

impl FontId {
    /// Raw index of this handle in the document font table.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The 14 standard PDF fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFont {
    /// Helvetica (sans-serif)
    Helvetica,
    /// Helvetica Bold
    HelveticaBold,
    /// Helvetica Oblique
    HelveticaOblique,
    /// Helvetica Bold Oblique
    HelveticaBoldOblique,
    /// Times Roman (serif)
    TimesRoman,
    /// Times Bold
    TimesBold,
    /// Times Italic
    TimesItalic,
    /// Times Bold Italic
    TimesBoldItalic,
    /// Courier (monospace)
    Courier,
    /// Courier Bold
    CourierBold,
    /// Courier Oblique
    CourierOblique,
    /// Courier Bold Oblique
    CourierBoldOblique,
    /// Symbol
    Symbol,
    /// ZapfDingbats
    ZapfDingbats,
}

impl BuiltinFont {
    /// PDF base font name for this builtin font.
    pub fn base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::HelveticaOblique => "Helvetica-Oblique",
            BuiltinFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            BuiltinFont::TimesRoman => "Times-Roman",
            BuiltinFont::TimesBold => "Times-Bold",
            BuiltinFont::TimesItalic => "Times-Italic",
            BuiltinFont::TimesBoldItalic => "Times-BoldItalic",
            BuiltinFont::Courier => "Courier",
            BuiltinFont::CourierBold => "Courier-Bold",
            BuiltinFont::CourierOblique => "Courier-Oblique",
            BuiltinFont::CourierBoldOblique => "Courier-BoldOblique",
            BuiltinFont::Symbol => "Symbol",
            BuiltinFont::ZapfDingbats => "ZapfDingbats",
        }
    }
}

/// A parsed, embeddable font program.
///
/// Owns the raw font bytes; table access re-parses the face on demand, which
/// is cheap because `ttf-parser` only reads table directories lazily.
/// Metrics queries never mutate the program.
#[derive(Debug)]
pub struct FontProgram {
    data: Vec<u8>,
    units_per_em: u16,
    has_kerning: bool,
    postscript_name: String,
}

impl FontProgram {
    /// Parse and validate a font program from raw bytes.
    pub(crate) fn parse(data: Vec<u8>) -> Result<Self> {
        let face = Face::parse(&data, 0).map_err(|e| Error::MalformedFont(e.to_string()))?;
        let units_per_em = face.units_per_em();
        let has_kerning = face.tables().kern.is_some();
        let glyph_count = face.number_of_glyphs();
        let postscript_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|n| n.to_string())
            .map(|n| n.replace(' ', "-"))
            .unwrap_or_else(|| "Embedded".to_string());
        log::debug!(
            "Loaded font {} ({} glyphs, {} units/em, kerning: {})",
            postscript_name,
            glyph_count,
            units_per_em,
            has_kerning
        );
        drop(face);
        Ok(Self {
            data,
            units_per_em,
            has_kerning,
            postscript_name,
        })
    }

    /// Re-parse the face over the owned bytes.
    pub(crate) fn face(&self) -> Face<'_> {
        // Parsed successfully at load time; failure here is state corruption.
        Face::parse(&self.data, 0).expect("font data was validated at load time")
    }

    /// Raw font file bytes (for embedding as FontFile2).
    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// PostScript name from the name table, or a placeholder.
    pub(crate) fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    /// Design units per em, as a float for width arithmetic.
    pub fn units_per_em(&self) -> f64 {
        f64::from(self.units_per_em)
    }

    /// Whether the font declares a kern table.
    pub fn has_kerning(&self) -> bool {
        self.has_kerning
    }

    /// Glyph index for a code point, if the cmap covers it.
    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        let c = char::from_u32(codepoint)?;
        self.face().glyph_index(c).map(|g| g.0)
    }

    /// Advance width of the glyph for `codepoint`, scaled to `point_size`.
    ///
    /// Fails with [`Error::MissingGlyph`] when the cmap has no entry or the
    /// glyph has no horizontal advance.
    pub fn advance(&self, codepoint: u32, point_size: f64) -> Result<f64> {
        let face = self.face();
        let gid = char::from_u32(codepoint)
            .and_then(|c| face.glyph_index(c))
            .ok_or(Error::MissingGlyph(codepoint))?;
        let advance = face
            .glyph_hor_advance(gid)
            .ok_or(Error::MissingGlyph(codepoint))?;
        Ok(f64::from(advance) / self.units_per_em() * point_size)
    }

    /// Kerning adjustment between two code points, in raw font units.
    ///
    /// Returns `None` when either glyph is unmapped or no horizontal kern
    /// subtable declares the pair. Only meaningful when [`has_kerning`]
    /// reports true; callers treat `None` as zero.
    ///
    /// [`has_kerning`]: Self::has_kerning
    pub fn kerning(&self, left: u32, right: u32) -> Option<f64> {
        let face = self.face();
        let kern = face.tables().kern?;
        let l = GlyphId(self.glyph_id(left)?);
        let r = GlyphId(self.glyph_id(right)?);
        for subtable in kern.subtables {
            if !subtable.horizontal || subtable.variable {
                continue;
            }
            if let Some(value) = subtable.glyphs_kerning(l, r) {
                return Some(f64::from(value));
            }
        }
        None
    }

    /// Encode a string as glyph IDs in the font's byte encoding.
    ///
    /// Unmapped code points fall back to glyph 0 (.notdef) so that showing
    /// text never fails mid-stream; measurement reports the miss instead.
    pub(crate) fn encode_text(&self, text: &str) -> Vec<u16> {
        let face = self.face();
        text.chars()
            .map(|c| match face.glyph_index(c) {
                Some(gid) => gid.0,
                None => {
                    log::debug!("No glyph for {c:?} in {}; using .notdef", self.postscript_name);
                    0
                },
            })
            .collect()
    }
}

/// An entry in the document font table.
#[derive(Debug)]
pub(crate) enum FontEntry {
    /// One of the standard 14 fonts, referenced by name only.
    Builtin(BuiltinFont),
    /// An embedded font program, by index into the engine's face list.
    Embedded(usize),
}

/// Owner of all loaded font programs for one generator.
///
/// Constructed when the generator is created and torn down with it; every
/// metrics query during the generator's lifetime borrows this single engine.
#[derive(Debug, Default)]
pub struct FontEngine {
    faces: Vec<FontProgram>,
    table: Vec<FontEntry>,
}

impl FontEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Load an embedded font from raw file bytes.
    pub(crate) fn load(&mut self, data: Vec<u8>) -> Result<FontId> {
        let program = FontProgram::parse(data)?;
        self.faces.push(program);
        self.table.push(FontEntry::Embedded(self.faces.len() - 1));
        Ok(FontId(self.table.len() - 1))
    }

    /// Register (or look up) a builtin font handle.
    pub(crate) fn builtin(&mut self, font: BuiltinFont) -> FontId {
        let existing = self.table.iter().position(|e| match e {
            FontEntry::Builtin(b) => *b == font,
            FontEntry::Embedded(_) => false,
        });
        match existing {
            Some(i) => FontId(i),
            None => {
                self.table.push(FontEntry::Builtin(font));
                FontId(self.table.len() - 1)
            },
        }
    }

    /// Resolve a font handle to its table entry.
    pub(crate) fn entry(&self, id: FontId) -> Result<&FontEntry> {
        self.table.get(id.0).ok_or(Error::BadFontId(id.0))
    }

    /// Resolve a font handle to an embedded font program.
    ///
    /// Builtin fonts have no program and yield
    /// [`Error::BuiltinFontNotSupported`].
    pub(crate) fn program(&self, id: FontId) -> Result<&FontProgram> {
        match self.entry(id)? {
            FontEntry::Builtin(_) => Err(Error::BuiltinFontNotSupported),
            FontEntry::Embedded(i) => Ok(&self.faces[*i]),
        }
    }

    /// All font table entries, in registration order.
    pub(crate) fn entries(&self) -> &[FontEntry] {
        &self.table
    }

    /// Font program for a raw face index.
    pub(crate) fn face_program(&self, index: usize) -> &FontProgram {
        &self.faces[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_base_names() {
        assert_eq!(BuiltinFont::Helvetica.base_name(), "Helvetica");
        assert_eq!(BuiltinFont::TimesBoldItalic.base_name(), "Times-BoldItalic");
        assert_eq!(BuiltinFont::ZapfDingbats.base_name(), "ZapfDingbats");
    }

    #[test]
    fn test_builtin_registration_dedupes() {
        let mut engine = FontEngine::new();
        let a = engine.builtin(BuiltinFont::Helvetica);
        let b = engine.builtin(BuiltinFont::Courier);
        let c = engine.builtin(BuiltinFont::Helvetica);
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(engine.entries().len(), 2);
    }

    #[test]
    fn test_builtin_has_no_program() {
        let mut engine = FontEngine::new();
        let id = engine.builtin(BuiltinFont::Helvetica);
        assert!(matches!(engine.program(id), Err(Error::BuiltinFontNotSupported)));
    }

    #[test]
    fn test_unknown_font_id() {
        let engine = FontEngine::new();
        assert!(matches!(engine.entry(FontId(3)), Err(Error::BadFontId(3))));
    }

    #[test]
    fn test_malformed_font_rejected() {
        let mut engine = FontEngine::new();
        let result = engine.load(vec![0u8; 16]);
        assert!(matches!(result, Err(Error::MalformedFont(_))));
    }
}
