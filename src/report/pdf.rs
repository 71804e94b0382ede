//! PDF rendering.
//!
//! A small PDF 1.4 writer: A4 portrait pages, the two standard Helvetica faces
//! with WinAnsi encoding, uncompressed content streams. A JPEG drawing is
//! embedded as-is (DCTDecode). A PNG drawing is decoded to 8-bit RGB and
//! embedded as a zlib stream (FlateDecode). PDF drawings are named only.

use anyhow::Result;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::fmt::Write as _;
use std::io::Write as _;

use super::{Renderer, Report, ReportFormat, ReportMetadata};
use crate::drawing::{Drawing, DrawingKind, ImageInfo};

const PAGE_WIDTH: f64 = 595.0;
const PAGE_HEIGHT: f64 = 842.0;
const TOP: f64 = 40.0;
const LEFT: f64 = 40.0;
const RIGHT: f64 = 555.0;
/// Cursor position past which a new page is started
const PAGE_BREAK_Y: f64 = 780.0;
const ROW_HEIGHT: f64 = 14.0;

const TITLE_SIZE: f64 = 16.0;
const TEXT_SIZE: f64 = 11.0;
const TABLE_SIZE: f64 = 10.0;

const COLUMN_X: [f64; 8] = [40.0, 240.0, 305.0, 340.0, 380.0, 430.0, 470.0, 520.0];
const COLUMN_HEADERS: [&str; 8] = [
    "Characteristic",
    "Nominal",
    "Tol-",
    "Tol+",
    "Measured",
    "Min",
    "Max",
    "OK?",
];
const CHARACTERISTIC_WIDTH: usize = 22;
/// Comment lines are wrapped to fit the text width at 11 pt
const WRAP_WIDTH: usize = 90;

/// Drawing page area, top-down coordinates: (x0, y0, x1, y1)
const IMAGE_BOX: (f64, f64, f64, f64) = (40.0, 80.0, 555.0, 800.0);

pub struct PdfRenderer;

impl Renderer for PdfRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Pdf
    }

    fn render(&self, report: &Report<'_>) -> Result<Vec<u8>> {
        let mut layout = Layout::new();
        let config = report.config;
        let metadata = report.metadata;

        layout.line(Font::Bold, TITLE_SIZE, &config.title);
        if let Some(company) = &config.company {
            layout.line(Font::Regular, TEXT_SIZE, company);
        }
        layout.gap(6.0);

        for (label, value) in metadata.header_lines(&config.date_format) {
            layout.line(Font::Regular, TEXT_SIZE, &format!("{}: {}", label, value));
        }
        let drawing_name = metadata
            .drawing
            .as_ref()
            .map(|d| d.file_name.as_str())
            .unwrap_or_default();
        layout.line(
            Font::Regular,
            TEXT_SIZE,
            &format!("Drawing: {}", ReportMetadata::display(drawing_name)),
        );

        let comment = ReportMetadata::display(&metadata.comment);
        for (i, line) in wrap(comment, WRAP_WIDTH).iter().enumerate() {
            let text = if i == 0 {
                format!("Comment: {}", line)
            } else {
                line.clone()
            };
            layout.line(Font::Regular, TEXT_SIZE, &text);
        }
        layout.gap(10.0);

        layout.table_header();
        for row in report.rows() {
            if layout.y + ROW_HEIGHT > PAGE_BREAK_Y {
                layout.new_page();
                layout.table_header();
            }
            let name: String = row.characteristic.chars().take(CHARACTERISTIC_WIDTH).collect();
            let cells: [&str; 8] = [
                &name,
                &row.nominal,
                &row.tolerance_minus,
                &row.tolerance_plus,
                &row.measured,
                &row.lower_bound,
                &row.upper_bound,
                row.verdict_short,
            ];
            let font = if row.status == "non_conforming" {
                Font::Bold
            } else {
                Font::Regular
            };
            for (x, cell) in COLUMN_X.iter().zip(cells) {
                layout.text(*x, layout.y, font, TABLE_SIZE, cell);
            }
            layout.y += ROW_HEIGHT;
        }

        layout.gap(10.0);
        layout.line(Font::Bold, TEXT_SIZE, &report.summary_line());

        let image = metadata.drawing.as_ref().and_then(embeddable_image);
        if let Some(image) = &image {
            layout.image_page(&image.info);
        } else if let Some(drawing) = metadata.drawing.as_ref().filter(|d| d.kind != DrawingKind::Pdf) {
            tracing::warn!(file = %drawing.file_name, "drawing cannot be embedded in PDF, referenced by name only");
        }

        Ok(layout.finish(&config.title, report, image.as_ref()))
    }
}

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "/F1",
            Font::Bold => "/F2",
        }
    }
}

/// Raw image stream ready for an XObject
struct EmbeddedImage {
    info: ImageInfo,
    dictionary: String,
    data: Vec<u8>,
}

fn embeddable_image(drawing: &Drawing) -> Option<EmbeddedImage> {
    let info = drawing.image?;
    if info.width == 0 || info.height == 0 {
        return None;
    }

    match drawing.kind {
        DrawingKind::Jpeg => {
            let color_space = match info.components {
                1 => "/DeviceGray",
                3 => "/DeviceRGB",
                4 => "/DeviceCMYK",
                _ => return None,
            };
            Some(EmbeddedImage {
                info,
                dictionary: format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode",
                    info.width, info.height, color_space
                ),
                data: drawing.bytes.clone(),
            })
        }
        DrawingKind::Png => match flate_rgb(drawing) {
            Ok((info, data)) => Some(EmbeddedImage {
                info,
                dictionary: format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode",
                    info.width, info.height
                ),
                data,
            }),
            Err(err) => {
                tracing::warn!(file = %drawing.file_name, error = %err, "drawing could not be decoded");
                None
            }
        },
        DrawingKind::Pdf => None,
    }
}

/// Decoded RGB samples, zlib-compressed.
fn flate_rgb(drawing: &Drawing) -> Result<(ImageInfo, Vec<u8>)> {
    let rgb = drawing.to_rgb()?;
    let info = ImageInfo {
        width: rgb.width(),
        height: rgb.height(),
        components: 3,
    };
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(rgb.as_raw())?;
    Ok((info, encoder.finish()?))
}

struct Page {
    content: Vec<u8>,
    has_image: bool,
}

impl Page {
    fn new() -> Self {
        Self {
            content: Vec::new(),
            has_image: false,
        }
    }
}

/// Top-down cursor layout over a list of pages
struct Layout {
    pages: Vec<Page>,
    y: f64,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Page::new()],
            y: TOP,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::new());
        self.y = TOP;
    }

    fn current(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn gap(&mut self, height: f64) {
        self.y += height;
    }

    /// Text whose baseline sits at top-down position `y`.
    fn text(&mut self, x: f64, y: f64, font: Font, size: f64, text: &str) {
        let content = &mut self.current().content;
        content.extend_from_slice(
            format!(
                "BT {} {} Tf {:.2} {:.2} Td (",
                font.resource(),
                size,
                x,
                PAGE_HEIGHT - y
            )
            .as_bytes(),
        );
        content.extend_from_slice(&escape_literal(&encode_win_ansi(text)));
        content.extend_from_slice(b") Tj ET\n");
    }

    /// Write a full-width line and advance the cursor.
    fn line(&mut self, font: Font, size: f64, text: &str) {
        if self.y + size > PAGE_BREAK_Y {
            self.new_page();
        }
        self.y += size;
        self.text(LEFT, self.y, font, size, text);
        self.y += 6.0;
    }

    fn table_header(&mut self) {
        self.y += TABLE_SIZE;
        for (x, header) in COLUMN_X.iter().zip(COLUMN_HEADERS) {
            self.text(*x, self.y, Font::Bold, TABLE_SIZE, header);
        }
        let rule_y = PAGE_HEIGHT - (self.y + 4.0);
        let rule = format!("0.5 w {} {:.2} m {} {:.2} l S\n", LEFT, rule_y, RIGHT, rule_y);
        self.current().content.extend_from_slice(rule.as_bytes());
        self.y += ROW_HEIGHT;
    }

    /// Put the drawing on a page of its own, scaled into the image box.
    fn image_page(&mut self, info: &ImageInfo) {
        self.new_page();

        let (x0, y0, x1, y1) = IMAGE_BOX;
        let (box_w, box_h) = (x1 - x0, y1 - y0);
        let (w, h) = (f64::from(info.width), f64::from(info.height));
        let scale = (box_w / w).min(box_h / h);
        let (draw_w, draw_h) = (w * scale, h * scale);
        let x = x0 + (box_w - draw_w) / 2.0;
        let top = y0 + (box_h - draw_h) / 2.0;
        let y = PAGE_HEIGHT - (top + draw_h);

        let ops = format!(
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im1 Do Q\n",
            draw_w, draw_h, x, y
        );
        let page = self.current();
        page.content.extend_from_slice(ops.as_bytes());
        page.has_image = true;
    }

    /// Serialize pages into a complete PDF file.
    fn finish(self, title: &str, report: &Report<'_>, image: Option<&EmbeddedImage>) -> Vec<u8> {
        let mut doc = PdfDocument::default();

        // Fixed object numbers: 1 catalog, 2 page tree, 3-4 fonts, 5 info, 6 image
        let catalog = doc.reserve();
        let pages_id = doc.reserve();
        let regular = doc.add(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_vec(),
        );
        let bold = doc.add(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        );

        let mut info = b"<< /Title (".to_vec();
        info.extend_from_slice(&escape_literal(&encode_win_ansi(title)));
        info.extend_from_slice(
            format!(
                ") /Producer (dimcheck {}) /CreationDate (D:{}) >>",
                env!("CARGO_PKG_VERSION"),
                report.metadata.generated_at.format("%Y%m%d%H%M%S")
            )
            .as_bytes(),
        );
        let info_id = doc.add(info);

        let image_id = image.map(|image| doc.add_stream(&image.dictionary, &image.data));

        let mut kids = Vec::new();
        for page in &self.pages {
            let content_id = doc.add_stream("", &page.content);
            let mut resources = format!("<< /Font << /F1 {} 0 R /F2 {} 0 R >>", regular, bold);
            if let (true, Some(id)) = (page.has_image, image_id) {
                let _ = write!(resources, " /XObject << /Im1 {} 0 R >>", id);
            }
            resources.push_str(" >>");

            let page_id = doc.add(
                format!(
                    "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources {} /Contents {} 0 R >>",
                    pages_id, PAGE_WIDTH, PAGE_HEIGHT, resources, content_id
                )
                .into_bytes(),
            );
            kids.push(format!("{} 0 R", page_id));
        }

        doc.set(
            pages_id,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                kids.len()
            )
            .into_bytes(),
        );
        doc.set(
            catalog,
            format!("<< /Type /Catalog /Pages {} 0 R >>", pages_id).into_bytes(),
        );

        doc.write(catalog, info_id)
    }
}

/// Numbered object store; object `n` lives at index `n - 1`.
#[derive(Default)]
struct PdfDocument {
    objects: Vec<Vec<u8>>,
}

impl PdfDocument {
    fn reserve(&mut self) -> usize {
        self.objects.push(Vec::new());
        self.objects.len()
    }

    fn add(&mut self, body: Vec<u8>) -> usize {
        self.objects.push(body);
        self.objects.len()
    }

    fn set(&mut self, id: usize, body: Vec<u8>) {
        self.objects[id - 1] = body;
    }

    fn add_stream(&mut self, dictionary: &str, data: &[u8]) -> usize {
        let mut body = if dictionary.is_empty() {
            format!("<< /Length {} >>\nstream\n", data.len())
        } else {
            format!("<< {} /Length {} >>\nstream\n", dictionary, data.len())
        }
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.add(body)
    }

    fn write(self, root: usize, info: usize) -> Vec<u8> {
        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(self.objects.len());

        for (i, body) in self.objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref = out.len();
        let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", self.objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(table, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            table,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.objects.len() + 1,
            root,
            info,
            xref
        );
        out.extend_from_slice(table.as_bytes());
        out
    }
}

/// Encode text for the WinAnsi-encoded standard fonts; unmappable characters become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

/// Escape bytes for a PDF literal string.
fn escape_literal(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out
}

/// Split text into lines of at most `width` characters, breaking on spaces.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
