//! Document construction and serialization.
//!
//! The flow is: draw into a [`DrawContext`], commit it to the document
//! (getting a [`PageId`] or [`PatternId`] back), and serialize everything at
//! the end. [`ContentStreamBuilder`] holds the operator-level encoding;
//! [`TextObject`] buffers text runs so glyph encoding can happen against the
//! font engine in one place.

pub mod content_stream;
pub mod document;
pub mod draw_context;
pub mod text_object;

pub use content_stream::{ContentStreamBuilder, ResourceDictionary};
pub use document::{GeneratorConfig, PageId, PatternId};
pub use draw_context::{ContextType, DrawContext, TilingPatternBuilder};
pub use text_object::{KernedItem, TextObject, TextOp};
