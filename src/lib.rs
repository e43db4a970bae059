#![warn(missing_docs)]

//! # pdfpress
//!
//! A PDF generation library: content streams, text layout, and atomic
//! document output.
//!
//! ## Core Features
//!
//! - **Page Drawing**: path, color, and transformation operators through a
//!   typed [`DrawContext`]
//! - **Text Layout**: buffered [`TextObject`]s with positioning, spacing,
//!   leading, rise, and kerned `TJ` runs
//! - **Fonts**: the 14 builtin Type1 fonts, plus TrueType/OpenType embedding
//!   as Type0/CIDFontType2 with width arrays derived from used glyphs
//! - **Metrics**: kern-aware text width measurement from font tables
//! - **Tiling Patterns**: pattern cells drawn with the same context API and
//!   used as fill color
//! - **Atomic Output**: documents land via write-to-temporary-then-rename,
//!   so the target path never holds a half-written file
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfpress::{Generator, GeneratorConfig, BuiltinFont};
//!
//! fn main() -> pdfpress::Result<()> {
//!     let config = GeneratorConfig::default().with_title("Hello");
//!     let mut gen = Generator::new("hello.pdf", config);
//!     let font = gen.builtin_font(BuiltinFont::Helvetica);
//!
//!     let mut page = gen.page_context();
//!     gen.render_text_at(&mut page, "Hello, world!", font, 24.0, 72.0, 700.0)?;
//!     gen.add_page(&mut page);
//!
//!     gen.write()
//! }
//! ```

pub mod codepoints;
pub mod error;
pub mod fonts;
pub mod generator;
pub mod writer;

pub use codepoints::CodepointIter;
pub use error::{Error, Result};
pub use fonts::{BuiltinFont, FontEngine, FontId, FontProgram};
pub use generator::{Generator, PageGuard};
pub use writer::{
    ContextType, DrawContext, GeneratorConfig, KernedItem, PageId, PatternId,
    ResourceDictionary, TextObject, TextOp, TilingPatternBuilder,
};

/// Library version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        // VERSION is populated from CARGO_PKG_VERSION at compile time
        assert!(VERSION.starts_with("0."));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "pdfpress");
    }
}
