//! Shared test fixtures.
//!
//! Builds a minimal but well-formed TrueType font in memory so the tests
//! need no binary fixture files. The font has three glyphs:
//!
//! - gid 0: .notdef, advance 500
//! - gid 1: 'A', advance 600
//! - gid 2: 'B', advance 700
//!
//! with 1000 units per em, a PostScript name of `TestFont`, and a single
//! horizontal kern pair ('A', 'B') = -50 units.

use byteorder::{BigEndian, WriteBytesExt};

pub const UNITS_PER_EM: u16 = 1000;
pub const ADVANCE_A: u16 = 600;
pub const ADVANCE_B: u16 = 700;
pub const KERN_AB: i16 = -50;

fn head() -> Vec<u8> {
    let mut t = Vec::new();
    t.write_u32::<BigEndian>(0x0001_0000).unwrap(); // version
    t.write_u32::<BigEndian>(0).unwrap(); // fontRevision
    t.write_u32::<BigEndian>(0).unwrap(); // checkSumAdjustment
    t.write_u32::<BigEndian>(0x5F0F_3CF5).unwrap(); // magicNumber
    t.write_u16::<BigEndian>(0).unwrap(); // flags
    t.write_u16::<BigEndian>(UNITS_PER_EM).unwrap();
    t.write_u64::<BigEndian>(0).unwrap(); // created
    t.write_u64::<BigEndian>(0).unwrap(); // modified
    t.write_i16::<BigEndian>(0).unwrap(); // xMin
    t.write_i16::<BigEndian>(-200).unwrap(); // yMin
    t.write_i16::<BigEndian>(800).unwrap(); // xMax
    t.write_i16::<BigEndian>(800).unwrap(); // yMax
    t.write_u16::<BigEndian>(0).unwrap(); // macStyle
    t.write_u16::<BigEndian>(8).unwrap(); // lowestRecPPEM
    t.write_i16::<BigEndian>(2).unwrap(); // fontDirectionHint
    t.write_i16::<BigEndian>(0).unwrap(); // indexToLocFormat
    t.write_i16::<BigEndian>(0).unwrap(); // glyphDataFormat
    t
}

fn hhea() -> Vec<u8> {
    let mut t = Vec::new();
    t.write_u32::<BigEndian>(0x0001_0000).unwrap(); // version
    t.write_i16::<BigEndian>(800).unwrap(); // ascender
    t.write_i16::<BigEndian>(-200).unwrap(); // descender
    t.write_i16::<BigEndian>(0).unwrap(); // lineGap
    t.write_u16::<BigEndian>(ADVANCE_B).unwrap(); // advanceWidthMax
    t.write_i16::<BigEndian>(0).unwrap(); // minLeftSideBearing
    t.write_i16::<BigEndian>(0).unwrap(); // minRightSideBearing
    t.write_i16::<BigEndian>(0).unwrap(); // xMaxExtent
    t.write_i16::<BigEndian>(1).unwrap(); // caretSlopeRise
    t.write_i16::<BigEndian>(0).unwrap(); // caretSlopeRun
    t.write_i16::<BigEndian>(0).unwrap(); // caretOffset
    for _ in 0..4 {
        t.write_i16::<BigEndian>(0).unwrap(); // reserved
    }
    t.write_i16::<BigEndian>(0).unwrap(); // metricDataFormat
    t.write_u16::<BigEndian>(3).unwrap(); // numberOfHMetrics
    t
}

fn maxp() -> Vec<u8> {
    let mut t = Vec::new();
    t.write_u32::<BigEndian>(0x0000_5000).unwrap(); // version 0.5
    t.write_u16::<BigEndian>(3).unwrap(); // numGlyphs
    t
}

fn hmtx() -> Vec<u8> {
    let mut t = Vec::new();
    for advance in [500, ADVANCE_A, ADVANCE_B] {
        t.write_u16::<BigEndian>(advance).unwrap();
        t.write_i16::<BigEndian>(0).unwrap(); // leftSideBearing
    }
    t
}

/// Format 4 cmap mapping 'A' -> gid 1 and 'B' -> gid 2.
fn cmap() -> Vec<u8> {
    let mut t = Vec::new();
    t.write_u16::<BigEndian>(0).unwrap(); // version
    t.write_u16::<BigEndian>(1).unwrap(); // numTables
    t.write_u16::<BigEndian>(3).unwrap(); // platformID: Windows
    t.write_u16::<BigEndian>(1).unwrap(); // encodingID: Unicode BMP
    t.write_u32::<BigEndian>(12).unwrap(); // subtable offset

    // Two segments: 'A'..='B' and the 0xFFFF terminator.
    t.write_u16::<BigEndian>(4).unwrap(); // format
    t.write_u16::<BigEndian>(32).unwrap(); // length
    t.write_u16::<BigEndian>(0).unwrap(); // language
    t.write_u16::<BigEndian>(4).unwrap(); // segCountX2
    t.write_u16::<BigEndian>(4).unwrap(); // searchRange
    t.write_u16::<BigEndian>(1).unwrap(); // entrySelector
    t.write_u16::<BigEndian>(0).unwrap(); // rangeShift
    t.write_u16::<BigEndian>(0x0042).unwrap(); // endCode: 'B'
    t.write_u16::<BigEndian>(0xFFFF).unwrap();
    t.write_u16::<BigEndian>(0).unwrap(); // reservedPad
    t.write_u16::<BigEndian>(0x0041).unwrap(); // startCode: 'A'
    t.write_u16::<BigEndian>(0xFFFF).unwrap();
    t.write_i16::<BigEndian>(1 - 0x41).unwrap(); // idDelta: 'A' -> 1
    t.write_i16::<BigEndian>(1).unwrap(); // idDelta: 0xFFFF -> 0
    t.write_u16::<BigEndian>(0).unwrap(); // idRangeOffset
    t.write_u16::<BigEndian>(0).unwrap();
    t
}

/// Format 0 horizontal kern subtable with the single pair (1, 2) = -50.
fn kern() -> Vec<u8> {
    let mut t = Vec::new();
    t.write_u16::<BigEndian>(0).unwrap(); // version
    t.write_u16::<BigEndian>(1).unwrap(); // nTables
    t.write_u16::<BigEndian>(0).unwrap(); // subtable version
    t.write_u16::<BigEndian>(20).unwrap(); // subtable length
    t.write_u16::<BigEndian>(0x0001).unwrap(); // format 0, horizontal
    t.write_u16::<BigEndian>(1).unwrap(); // nPairs
    t.write_u16::<BigEndian>(6).unwrap(); // searchRange
    t.write_u16::<BigEndian>(0).unwrap(); // entrySelector
    t.write_u16::<BigEndian>(0).unwrap(); // rangeShift
    t.write_u16::<BigEndian>(1).unwrap(); // left: 'A'
    t.write_u16::<BigEndian>(2).unwrap(); // right: 'B'
    t.write_i16::<BigEndian>(KERN_AB).unwrap();
    t
}

/// Name table holding only the PostScript name (id 6) as `TestFont`.
fn name() -> Vec<u8> {
    let postscript: Vec<u8> = "TestFont"
        .encode_utf16()
        .flat_map(|u| u.to_be_bytes())
        .collect();
    let mut t = Vec::new();
    t.write_u16::<BigEndian>(0).unwrap(); // format
    t.write_u16::<BigEndian>(1).unwrap(); // count
    t.write_u16::<BigEndian>(18).unwrap(); // stringOffset
    t.write_u16::<BigEndian>(3).unwrap(); // platformID: Windows
    t.write_u16::<BigEndian>(1).unwrap(); // encodingID: Unicode BMP
    t.write_u16::<BigEndian>(0x0409).unwrap(); // languageID: en-US
    t.write_u16::<BigEndian>(6).unwrap(); // nameID: PostScript name
    t.write_u16::<BigEndian>(postscript.len() as u16).unwrap();
    t.write_u16::<BigEndian>(0).unwrap(); // string offset within storage
    t.extend_from_slice(&postscript);
    t
}

/// Assemble the complete font file.
pub fn test_font() -> Vec<u8> {
    // Directory entries must be sorted by tag.
    let tables: Vec<([u8; 4], Vec<u8>)> = vec![
        (*b"cmap", cmap()),
        (*b"head", head()),
        (*b"hhea", hhea()),
        (*b"hmtx", hmtx()),
        (*b"kern", kern()),
        (*b"maxp", maxp()),
        (*b"name", name()),
    ];

    let num_tables = tables.len() as u16;
    let mut font = Vec::new();
    font.write_u32::<BigEndian>(0x0001_0000).unwrap(); // sfnt version
    font.write_u16::<BigEndian>(num_tables).unwrap();
    let entry_selector = (num_tables as f32).log2().floor() as u16;
    let search_range = 16 * (1 << entry_selector);
    font.write_u16::<BigEndian>(search_range).unwrap();
    font.write_u16::<BigEndian>(entry_selector).unwrap();
    font.write_u16::<BigEndian>(num_tables * 16 - search_range).unwrap();

    let mut offset = 12 + 16 * tables.len();
    for (tag, data) in &tables {
        font.extend_from_slice(tag);
        font.write_u32::<BigEndian>(0).unwrap(); // checksum (unchecked)
        font.write_u32::<BigEndian>(offset as u32).unwrap();
        font.write_u32::<BigEndian>(data.len() as u32).unwrap();
        offset += (data.len() + 3) & !3;
    }
    for (_, data) in &tables {
        font.extend_from_slice(data);
        for _ in 0..((4 - data.len() % 4) % 4) {
            font.push(0);
        }
    }
    font
}
