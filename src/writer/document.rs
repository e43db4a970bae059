//! In-memory document model and final PDF serialization.
//!
//! Pages and patterns accumulate as committed content streams; nothing is
//! written until [`PdfDocument::render`] assembles the complete file:
//! header, body objects, xref table, and trailer.

use crate::error::{Error, Result};
use crate::fonts::{FontEngine, FontEntry, FontId};
use crate::writer::content_stream::{escape_literal, ResourceDictionary};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::io::Write as _;

/// Opaque handle to a committed page.
///
/// Indexes an append-only list; handles are never recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub(crate) usize);

impl PageId {
    /// Raw index of this page in document order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Opaque handle to a committed tiling pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(pub(crate) usize);

impl PatternId {
    /// Raw index of this pattern in registration order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Configuration for PDF generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// PDF version written into the header (e.g., "1.7").
    pub version: String,
    /// Document title for the Info dictionary.
    pub title: Option<String>,
    /// Document author for the Info dictionary.
    pub author: Option<String>,
    /// Producer application name.
    pub producer: Option<String>,
    /// Default page width in points.
    pub page_width: f64,
    /// Default page height in points.
    pub page_height: f64,
    /// Whether to compress content streams with FlateDecode.
    pub compress: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            title: None,
            author: None,
            producer: Some(format!("{} {}", crate::NAME, crate::VERSION)),
            // A4 in points
            page_width: 595.28,
            page_height: 841.89,
            compress: true,
        }
    }
}

impl GeneratorConfig {
    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the page size in points.
    pub fn with_page_size(mut self, width: f64, height: f64) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Enable or disable FlateDecode compression of content streams.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Compress data for a FlateDecode stream filter.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// A committed page: its content bytes and the resources they reference.
#[derive(Debug)]
struct PageRecord {
    resources: ResourceDictionary,
    commands: Vec<u8>,
}

/// A committed tiling pattern cell.
#[derive(Debug)]
struct PatternRecord {
    resources: ResourceDictionary,
    commands: Vec<u8>,
    width: f64,
    height: f64,
}

/// The document being built.
///
/// Owned by the [`Generator`](crate::generator::Generator); pages and
/// patterns are appended through commits and serialized all at once.
#[derive(Debug)]
pub(crate) struct PdfDocument {
    config: GeneratorConfig,
    pages: Vec<PageRecord>,
    patterns: Vec<PatternRecord>,
    /// Glyph ids shown through each embedded font, across the whole
    /// document. Drives the /W width arrays.
    used_glyphs: BTreeMap<FontId, BTreeSet<u16>>,
}

impl PdfDocument {
    pub(crate) fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            patterns: Vec::new(),
            used_glyphs: BTreeMap::new(),
        }
    }

    pub(crate) fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn record_usage(&mut self, resources: &ResourceDictionary) {
        for (font, glyphs) in &resources.fonts {
            self.used_glyphs
                .entry(*font)
                .or_default()
                .extend(glyphs.iter().copied());
        }
    }

    /// Append a committed page content stream.
    pub(crate) fn add_page(&mut self, resources: ResourceDictionary, commands: Vec<u8>) -> PageId {
        self.record_usage(&resources);
        self.pages.push(PageRecord {
            resources,
            commands,
        });
        PageId(self.pages.len() - 1)
    }

    /// Append a committed tiling pattern cell.
    pub(crate) fn add_pattern(
        &mut self,
        resources: ResourceDictionary,
        commands: Vec<u8>,
        width: f64,
        height: f64,
    ) -> PatternId {
        self.record_usage(&resources);
        self.patterns.push(PatternRecord {
            resources,
            commands,
            width,
            height,
        });
        PatternId(self.patterns.len() - 1)
    }

    /// Serialize the complete document to bytes.
    ///
    /// Fails with [`Error::NoPages`] on an empty document; a PDF without a
    /// page tree is not viewable.
    pub(crate) fn render(&self, engine: &FontEngine) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(Error::NoPages);
        }

        let mut output = Vec::new();
        let mut xref_offsets: Vec<(u32, usize)> = Vec::new();

        writeln!(output, "%PDF-{}", self.config.version)?;
        // Binary marker so transfer tools treat the file as binary
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        // Pre-allocate object ids so resource dictionaries can reference
        // fonts and patterns before those objects are written.
        let catalog_id: u32 = 1;
        let pages_root_id: u32 = 2;
        let mut next_id: u32 = 3;
        let mut alloc = |n: u32| {
            let id = next_id;
            next_id += n;
            id
        };

        // One referenced id per font table entry. Embedded fonts take four
        // consecutive objects: Type0, CIDFontType2, FontDescriptor, FontFile2.
        let font_object_ids: Vec<u32> = engine
            .entries()
            .iter()
            .map(|entry| match entry {
                FontEntry::Builtin(_) => alloc(1),
                FontEntry::Embedded(_) => alloc(4),
            })
            .collect();
        let pattern_object_ids: Vec<u32> =
            self.patterns.iter().map(|_| alloc(1)).collect();
        let page_object_ids: Vec<(u32, u32)> =
            self.pages.iter().map(|_| (alloc(1), alloc(1))).collect();
        let info_id = alloc(1);
        let object_count = next_id;

        // Catalog and page tree root
        xref_offsets.push((catalog_id, output.len()));
        writeln!(
            output,
            "{} 0 obj\n<< /Type /Catalog /Pages {} 0 R >>\nendobj",
            catalog_id, pages_root_id
        )?;

        let kids = page_object_ids
            .iter()
            .map(|(page_id, _)| format!("{} 0 R", page_id))
            .collect::<Vec<_>>()
            .join(" ");
        xref_offsets.push((pages_root_id, output.len()));
        writeln!(
            output,
            "{} 0 obj\n<< /Type /Pages /Kids [ {} ] /Count {} >>\nendobj",
            pages_root_id,
            kids,
            self.pages.len()
        )?;

        // Fonts
        for (index, entry) in engine.entries().iter().enumerate() {
            let id = font_object_ids[index];
            match entry {
                FontEntry::Builtin(builtin) => {
                    xref_offsets.push((id, output.len()));
                    writeln!(
                        output,
                        "{} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>\nendobj",
                        id,
                        builtin.base_name()
                    )?;
                },
                FontEntry::Embedded(face_index) => {
                    let program = engine.face_program(*face_index);
                    let glyphs = self
                        .used_glyphs
                        .get(&FontId(index))
                        .cloned()
                        .unwrap_or_default();
                    self.write_embedded_font(&mut output, &mut xref_offsets, id, program, &glyphs)?;
                },
            }
        }

        // Tiling patterns
        for (index, pattern) in self.patterns.iter().enumerate() {
            let id = pattern_object_ids[index];
            let resources = resource_dict(&pattern.resources, &font_object_ids, &pattern_object_ids);
            let dict = format!(
                "/Type /Pattern /PatternType 1 /PaintType 1 /TilingType 1 /BBox [ 0 0 {} {} ] /XStep {} /YStep {} /Resources {}",
                pattern.width, pattern.height, pattern.width, pattern.height, resources
            );
            xref_offsets.push((id, output.len()));
            self.write_stream_object(&mut output, id, &dict, &pattern.commands)?;
        }

        // Pages and their content streams
        for (index, page) in self.pages.iter().enumerate() {
            let (page_id, content_id) = page_object_ids[index];
            let resources = resource_dict(&page.resources, &font_object_ids, &pattern_object_ids);

            xref_offsets.push((page_id, output.len()));
            writeln!(
                output,
                "{} 0 obj\n<< /Type /Page /Parent {} 0 R /MediaBox [ 0 0 {} {} ] /Contents {} 0 R /Resources {} >>\nendobj",
                page_id,
                pages_root_id,
                self.config.page_width,
                self.config.page_height,
                content_id,
                resources
            )?;

            xref_offsets.push((content_id, output.len()));
            self.write_stream_object(&mut output, content_id, "", &page.commands)?;
        }

        // Info dictionary
        let mut info = String::new();
        if let Some(title) = &self.config.title {
            let _ = write!(info, "/Title {} ", metadata_string(title));
        }
        if let Some(author) = &self.config.author {
            let _ = write!(info, "/Author {} ", metadata_string(author));
        }
        if let Some(producer) = &self.config.producer {
            let _ = write!(info, "/Producer {} ", metadata_string(producer));
        }
        let _ = write!(
            info,
            "/CreationDate (D:{})",
            chrono::Utc::now().format("%Y%m%d%H%M%SZ")
        );
        xref_offsets.push((info_id, output.len()));
        writeln!(output, "{} 0 obj\n<< {} >>\nendobj", info_id, info)?;

        // Cross-reference table
        let xref_start = output.len();
        writeln!(output, "xref")?;
        writeln!(output, "0 {}", object_count)?;
        writeln!(output, "0000000000 65535 f ")?;
        xref_offsets.sort_by_key(|(id, _)| *id);
        for (_, offset) in &xref_offsets {
            writeln!(output, "{:010} 00000 n ", offset)?;
        }

        let file_id = trailer_id(&output);
        writeln!(output, "trailer")?;
        writeln!(
            output,
            "<< /Size {} /Root {} 0 R /Info {} 0 R /ID [ <{}> <{}> ] >>",
            object_count, catalog_id, info_id, file_id, file_id
        )?;
        writeln!(output, "startxref")?;
        writeln!(output, "{}", xref_start)?;
        write!(output, "%%EOF")?;

        log::debug!(
            "Rendered document: {} pages, {} patterns, {} objects, {} bytes",
            self.pages.len(),
            self.patterns.len(),
            object_count - 1,
            output.len()
        );
        Ok(output)
    }

    /// Write one stream object, compressing per config with an uncompressed
    /// fallback. `extra_dict` carries entries beyond /Length and /Filter.
    fn write_stream_object(
        &self,
        output: &mut Vec<u8>,
        id: u32,
        extra_dict: &str,
        data: &[u8],
    ) -> Result<()> {
        let (bytes, compressed) = if self.config.compress {
            match compress_data(data) {
                Ok(c) => (c, true),
                Err(_) => (data.to_vec(), false),
            }
        } else {
            (data.to_vec(), false)
        };

        let mut dict = String::new();
        if !extra_dict.is_empty() {
            let _ = write!(dict, "{} ", extra_dict);
        }
        let _ = write!(dict, "/Length {}", bytes.len());
        if compressed {
            dict.push_str(" /Filter /FlateDecode");
        }

        writeln!(output, "{} 0 obj\n<< {} >>\nstream", id, dict)?;
        output.extend_from_slice(&bytes);
        writeln!(output, "\nendstream\nendobj")?;
        Ok(())
    }

    /// Write the four objects of an embedded Type0 font.
    ///
    /// Layout: `id` Type0 font, `id+1` CIDFontType2 descendant, `id+2`
    /// FontDescriptor, `id+3` FontFile2 stream. Widths cover exactly the
    /// glyphs shown somewhere in the document.
    fn write_embedded_font(
        &self,
        output: &mut Vec<u8>,
        xref_offsets: &mut Vec<(u32, usize)>,
        id: u32,
        program: &crate::fonts::FontProgram,
        used: &BTreeSet<u16>,
    ) -> Result<()> {
        let cid_id = id + 1;
        let descriptor_id = id + 2;
        let file_id = id + 3;
        let name = program.postscript_name();

        xref_offsets.push((id, output.len()));
        writeln!(
            output,
            "{} 0 obj\n<< /Type /Font /Subtype /Type0 /BaseFont /{} /Encoding /Identity-H /DescendantFonts [ {} 0 R ] >>\nendobj",
            id, name, cid_id
        )?;

        let widths = width_array(program, used);
        xref_offsets.push((cid_id, output.len()));
        writeln!(
            output,
            "{} 0 obj\n<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> /FontDescriptor {} 0 R /CIDToGIDMap /Identity /DW 1000 /W [ {} ] >>\nendobj",
            cid_id, name, descriptor_id, widths
        )?;

        let face = program.face();
        let scale = 1000.0 / program.units_per_em();
        let bbox = face.global_bounding_box();
        let ascent = (f64::from(face.ascender()) * scale).round();
        let descent = (f64::from(face.descender()) * scale).round();
        let cap_height = face
            .capital_height()
            .map(|h| (f64::from(h) * scale).round())
            .unwrap_or(ascent);
        xref_offsets.push((descriptor_id, output.len()));
        writeln!(
            output,
            "{} 0 obj\n<< /Type /FontDescriptor /FontName /{} /Flags 4 /FontBBox [ {} {} {} {} ] /ItalicAngle 0 /Ascent {} /Descent {} /CapHeight {} /StemV 80 /FontFile2 {} 0 R >>\nendobj",
            descriptor_id,
            name,
            (f64::from(bbox.x_min) * scale).round(),
            (f64::from(bbox.y_min) * scale).round(),
            (f64::from(bbox.x_max) * scale).round(),
            (f64::from(bbox.y_max) * scale).round(),
            ascent,
            descent,
            cap_height,
            file_id
        )?;

        xref_offsets.push((file_id, output.len()));
        let length1 = format!("/Length1 {}", program.data().len());
        self.write_stream_object(output, file_id, &length1, program.data())?;
        Ok(())
    }
}

/// Format a page or pattern /Resources dictionary, resolving font and
/// pattern handles to the object ids chosen for this render.
fn resource_dict(
    resources: &ResourceDictionary,
    font_object_ids: &[u32],
    pattern_object_ids: &[u32],
) -> String {
    let mut out = String::from("<< ");
    if !resources.fonts.is_empty() {
        out.push_str("/Font << ");
        for font in resources.font_ids() {
            let _ = write!(out, "/F{} {} 0 R ", font.index(), font_object_ids[font.index()]);
        }
        out.push_str(">> ");
    }
    if !resources.patterns.is_empty() {
        out.push_str("/Pattern << ");
        for pattern in resources.pattern_ids() {
            let _ = write!(
                out,
                "/P{} {} 0 R ",
                pattern.index(),
                pattern_object_ids[pattern.index()]
            );
        }
        out.push_str(">> ");
    }
    out.push_str(">>");
    out
}

/// Encode a metadata text string for the Info dictionary.
///
/// ASCII text goes out as an escaped literal string. Anything else is
/// encoded as UTF-16BE with a byte order mark in a hex string, which is the
/// PDF text-string form readers decode for non-ASCII metadata; raw UTF-8 in
/// a literal would be misread as PDFDocEncoding.
fn metadata_string(text: &str) -> String {
    if text.is_ascii() {
        return format!("({})", escape_literal(text));
    }
    let mut out = String::with_capacity(text.len() * 4 + 6);
    out.push_str("<FEFF");
    for unit in text.encode_utf16() {
        let _ = write!(out, "{:04X}", unit);
    }
    out.push('>');
    out
}

/// Derive the 16-byte file identifier for the trailer /ID array from the
/// serialized body and the current time. Both array entries are the same
/// value for a freshly generated file.
fn trailer_id(bytes: &[u8]) -> String {
    use std::hash::{Hash, Hasher};

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    bytes.hash(&mut hasher);
    let content = hasher.finish();
    let stamp = chrono::Utc::now().timestamp_micros() as u64;
    format!("{:016X}{:016X}", content, stamp)
}

/// Build a /W entry list from the glyphs actually shown through the font,
/// advances scaled to the 1000-unit glyph space.
fn width_array(program: &crate::fonts::FontProgram, used: &BTreeSet<u16>) -> String {
    let face = program.face();
    let scale = 1000.0 / program.units_per_em();
    let mut out = String::new();
    for gid in used {
        let advance = face
            .glyph_hor_advance(ttf_parser::GlyphId(*gid))
            .unwrap_or(0);
        let _ = write!(out, "{} [ {} ] ", gid, (f64::from(advance) * scale).round());
    }
    out
}
