//! Error types for the PDF generation library.
//!
//! Recoverable data and environment conditions are reported through [`Error`].
//! Misuse of the API (for example committing a tiling-pattern context through
//! the page path) is a programming defect and panics instead of returning an
//! error value.

use std::path::PathBuf;

/// Result type alias for PDF generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or writing a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A document must contain at least one page before it can be written.
    #[error("Document has no pages")]
    NoPages,

    /// The font file could not be parsed.
    #[error("Malformed font file: {0}")]
    MalformedFont(String),

    /// The font has no glyph (or no advance data) for the given code point.
    #[error("Font has no glyph for code point U+{0:04X}")]
    MissingGlyph(u32),

    /// Builtin (standard 14) fonts carry no outline data and cannot be used
    /// where embedded font metrics are required.
    #[error("Builtin fonts only support ASCII text and have no outline metrics")]
    BuiltinFontNotSupported,

    /// A builtin font was asked to show a code point outside its subset.
    #[error("Character {0:?} is not supported by builtin fonts")]
    UnsupportedCharacter(char),

    /// A font handle did not resolve to a loaded font.
    #[error("Unknown font id: {0}")]
    BadFontId(usize),

    /// A text object tried to show text before any set-font operation.
    #[error("Text shown without a current font")]
    NoCurrentFont,

    /// Could not create the temporary output file.
    #[error("Could not create temporary file {path}: {source}")]
    Create {
        /// Path of the temporary file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing the document bytes to the temporary file failed.
    #[error("Writing output failed: {0}")]
    WriteFailed(std::io::Error),

    /// Flushing buffered output failed.
    #[error("Flushing output failed: {0}")]
    Flush(std::io::Error),

    /// Forcing the temporary file to stable storage failed.
    #[error("Syncing output to disk failed: {0}")]
    Sync(std::io::Error),

    /// Atomically renaming the temporary file over the destination failed.
    #[error("Renaming temporary file to {path} failed: {source}")]
    Rename {
        /// Final destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// IO error during document serialization.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_glyph_message() {
        let err = Error::MissingGlyph(0x1F600);
        let msg = format!("{}", err);
        assert!(msg.contains("U+1F600"));
    }

    #[test]
    fn test_bad_font_id_message() {
        let err = Error::BadFontId(7);
        assert!(format!("{}", err).contains('7'));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
