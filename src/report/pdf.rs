//! Render a [`ReportDocument`] to PDF bytes with `printpdf`.
//!
//! Layout is a single flowing column on US-letter pages. Each block reserves
//! its height first; a block that would cross the bottom margin starts a new
//! page instead.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};
use tracing::{debug, warn};

use super::document::{Block, ReportDocument, TableRow};
use super::ReportError;

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 25.4;
const MM_PER_INCH: f32 = 25.4;
const MM_PER_PT: f32 = 25.4 / 72.0;

const LABEL_COL: f32 = 2.0 * MM_PER_INCH;
const VALUE_COL: f32 = 4.0 * MM_PER_INCH;
const ROW_PADDING: f32 = 2.1;
const TABLE_FONT_SIZE: f32 = 10.0;
const TABLE_LINE: f32 = 4.5;
const VALUE_WRAP_CHARS: usize = 60;

const IMAGE_DPI: f32 = 100.0;

/// PDF bytes plus the number of pages the layout used.
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// Cursor over the current page, measured in mm from the page bottom.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl<'a> PageWriter<'a> {
    fn reserve(&mut self, height: f32) {
        if self.y - height >= MARGIN {
            return;
        }
        // A block taller than a whole page still gets a fresh page to itself.
        if self.y >= PAGE_HEIGHT - MARGIN {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {} Layer 1", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn text(&self, text: &str, size: f32, x: f32, baseline: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), Mm(baseline), font);
    }

    fn rect_outline(&self, x: f32, top: f32, width: f32, height: f32) {
        let bottom = top - height;
        let points = vec![
            (Point::new(Mm(x), Mm(top)), false),
            (Point::new(Mm(x + width), Mm(top)), false),
            (Point::new(Mm(x + width), Mm(bottom)), false),
            (Point::new(Mm(x), Mm(bottom)), false),
        ];
        self.layer.add_line(Line {
            points,
            is_closed: true,
        });
    }
}

pub fn render_pdf(document: &ReportDocument) -> Result<RenderedPdf, ReportError> {
    let (doc, page1, layer1) =
        PdfDocument::new(&document.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: builtin_font(&doc, BuiltinFont::Helvetica)?,
        bold: builtin_font(&doc, BuiltinFont::HelveticaBold)?,
        italic: builtin_font(&doc, BuiltinFont::HelveticaOblique)?,
    };

    let mut writer = PageWriter {
        doc: &doc,
        layer: doc.get_page(page1).get_layer(layer1),
        y: PAGE_HEIGHT - MARGIN,
        pages: 1,
    };

    for block in &document.blocks {
        match block {
            Block::Title(text) => draw_heading(&mut writer, text, 24.0, &fonts.bold),
            Block::Heading(text) => draw_heading(&mut writer, text, 14.0, &fonts.bold),
            Block::Table(rows) => draw_table(&mut writer, rows, &fonts),
            Block::Image {
                path,
                width_in,
                height_in,
            } => draw_image(&mut writer, path, *width_in, *height_in),
            Block::Spacer(points) => {
                writer.y -= points * MM_PER_PT;
            }
            Block::Note(text) => {
                for line in wrap_text(text, 95) {
                    writer.reserve(TABLE_LINE);
                    writer.y -= TABLE_LINE;
                    writer.text(&line, 9.0, MARGIN, writer.y, &fonts.italic);
                }
            }
        }
    }

    let pages = writer.pages;
    drop(writer);
    debug!(pages, blocks = document.blocks.len(), "Report laid out");

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("PDF save error: {e}")))?;
    let bytes = buf
        .into_inner()
        .map_err(|e| ReportError::Pdf(format!("PDF buffer error: {e}")))?;

    Ok(RenderedPdf { bytes, pages })
}

fn builtin_font(
    doc: &PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, ReportError> {
    doc.add_builtin_font(font)
        .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))
}

fn draw_heading(writer: &mut PageWriter, text: &str, size: f32, font: &IndirectFontRef) {
    let height = size * MM_PER_PT * 1.6;
    writer.reserve(height);
    writer.y -= height;
    writer.text(text, size, MARGIN, writer.y + size * MM_PER_PT * 0.4, font);
}

fn draw_table(writer: &mut PageWriter, rows: &[TableRow], fonts: &Fonts) {
    for row in rows {
        let lines = wrap_text(&row.value, VALUE_WRAP_CHARS);
        let height = lines.len() as f32 * TABLE_LINE + 2.0 * ROW_PADDING;
        writer.reserve(height);

        let top = writer.y;
        writer.rect_outline(MARGIN, top, LABEL_COL, height);
        writer.rect_outline(MARGIN + LABEL_COL, top, VALUE_COL, height);

        let first_baseline = top - ROW_PADDING - TABLE_LINE + 1.2;
        writer.text(&row.label, TABLE_FONT_SIZE, MARGIN + 2.0, first_baseline, &fonts.bold);
        for (i, line) in lines.iter().enumerate() {
            let baseline = first_baseline - i as f32 * TABLE_LINE;
            writer.text(
                line,
                TABLE_FONT_SIZE,
                MARGIN + LABEL_COL + 2.0,
                baseline,
                &fonts.regular,
            );
        }
        writer.y -= height;
    }
}

/// Embed the image scaled to exactly `width_in` × `height_in`. An image that
/// fails to decode is left out of the page; the rest of the report renders.
fn draw_image(writer: &mut PageWriter, path: &std::path::Path, width_in: f32, height_in: f32) {
    let decoded = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Report image could not be decoded, omitting");
            return;
        }
    };

    let width_px = (width_in * IMAGE_DPI).round() as u32;
    let height_px = (height_in * IMAGE_DPI).round() as u32;
    let rgb = decoded
        .resize_exact(width_px, height_px, image::imageops::FilterType::Triangle)
        .to_rgb8();

    let height = height_in * MM_PER_INCH;
    writer.reserve(height);
    writer.y -= height;

    Image::from_dynamic_image(&image::DynamicImage::ImageRgb8(rgb)).add_to_layer(
        writer.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN)),
            translate_y: Some(Mm(writer.y)),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
