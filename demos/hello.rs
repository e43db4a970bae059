//! Minimal document demo: one page of text over a tiling pattern.
//!
//! Run with `cargo run --example hello`; writes `hello.pdf` to the current
//! directory. Set `RUST_LOG=debug` to watch the generation steps.

use pdfpress::{BuiltinFont, Generator, GeneratorConfig, TextObject};

fn main() -> pdfpress::Result<()> {
    env_logger::init();

    let config = GeneratorConfig::default()
        .with_title("Hello from pdfpress")
        .with_page_size(595.28, 841.89);
    let mut gen = Generator::new("hello.pdf", config);
    let font = gen.builtin_font(BuiltinFont::Helvetica);

    // A light checkerboard cell used as page background fill.
    let mut cell = gen.pattern_builder(16.0, 16.0);
    cell.set_fill_rgb(0.85, 0.9, 1.0);
    cell.rect(0.0, 0.0, 8.0, 8.0);
    cell.rect(8.0, 8.0, 8.0, 8.0);
    cell.fill();
    let pattern = gen.add_pattern(cell);

    let mut page = gen.page_context();
    page.save_state();
    page.set_fill_pattern(pattern);
    page.rect(72.0, 72.0, 451.0, 698.0);
    page.fill();
    page.restore_state();

    let mut text = TextObject::new();
    text.set_font(font, 24.0)
        .move_text(100.0, 700.0)
        .set_leading(28.0)
        .show("Hello, world!")
        .next_line()
        .show("Second line, same leading.");
    gen.render_text(&mut page, &text)?;
    gen.add_page(&mut page);

    gen.write()
}
