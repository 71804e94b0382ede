//! Word (`.docx`) rendering.
//!
//! Builds a minimal Office Open XML package: content types, package and
//! document relationships, a style sheet, `word/document.xml` rendered from an
//! embedded template, and the drawing under `word/media/` when it can be
//! previewed.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{Cursor, Write};
use tera::Tera;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{Renderer, Report, ReportFormat, ReportMetadata, TABLE_HEADERS};
use crate::drawing::Drawing;

/// Embedded `word/document.xml` template
const DOCUMENT_XML: &str = include_str!("../../templates/report/document.xml");

/// English Metric Units per inch
const EMU_PER_INCH: f64 = 914_400.0;
/// Width the drawing is scaled to
const PICTURE_WIDTH_IN: f64 = 5.5;
const IMAGE_REL_ID: &str = "rId2";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Default Extension="jpeg" ContentType="image/jpeg"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="80"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:b/><w:sz w:val="36"/></w:rPr></w:style>
</w:styles>"#;

pub struct DocxRenderer;

impl Renderer for DocxRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Docx
    }

    fn render(&self, report: &Report<'_>) -> Result<Vec<u8>> {
        let picture = report.metadata.drawing.as_ref().and_then(Picture::from_drawing);
        let document = render_document(report, picture.as_ref())?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut parts: Vec<(String, &[u8])> = vec![
            ("[Content_Types].xml".to_string(), CONTENT_TYPES_XML.as_bytes()),
            ("_rels/.rels".to_string(), PACKAGE_RELS_XML.as_bytes()),
            ("word/styles.xml".to_string(), STYLES_XML.as_bytes()),
        ];
        let document_rels = document_rels(picture.as_ref());
        parts.push((
            "word/_rels/document.xml.rels".to_string(),
            document_rels.as_bytes(),
        ));
        parts.push(("word/document.xml".to_string(), document.as_bytes()));
        if let (Some(picture), Some(drawing)) = (&picture, &report.metadata.drawing) {
            parts.push((format!("word/{}", picture.target), drawing.bytes.as_slice()));
        }

        for (name, bytes) in parts {
            zip.start_file(name.as_str(), options)
                .with_context(|| format!("Failed to add {} to document", name))?;
            zip.write_all(bytes)
                .with_context(|| format!("Failed to write {} to document", name))?;
        }

        let cursor = zip.finish().context("Failed to finish document archive")?;
        Ok(cursor.into_inner())
    }
}

/// Inline picture placement
#[derive(Debug, Serialize)]
struct Picture {
    name: String,
    rel_id: &'static str,
    /// Part path relative to `word/`
    target: String,
    cx: u64,
    cy: u64,
}

impl Picture {
    fn from_drawing(drawing: &Drawing) -> Option<Self> {
        let info = drawing.image?;
        let cx = PICTURE_WIDTH_IN * EMU_PER_INCH;
        let cy = cx * info.aspect_ratio();
        Some(Self {
            name: xml_text(&drawing.file_name),
            rel_id: IMAGE_REL_ID,
            target: format!("media/drawing.{}", drawing.kind.extension()),
            cx: cx.round() as u64,
            cy: cy.round() as u64,
        })
    }
}

#[derive(Serialize)]
struct HeaderLine {
    label: &'static str,
    value: String,
}

#[derive(Serialize)]
struct TableRow {
    cells: Vec<String>,
    fill: Option<&'static str>,
}

fn document_rels(picture: Option<&Picture>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
"#,
    );
    if let Some(picture) = picture {
        xml.push_str(&format!(
            "<Relationship Id=\"{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"{}\"/>\n",
            picture.rel_id, picture.target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn render_document(report: &Report<'_>, picture: Option<&Picture>) -> Result<String> {
    let metadata = report.metadata;
    let config = report.config;

    // Values are escaped by xml_text; tera's HTML escaping would also rewrite '/'
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_template("document.xml", DOCUMENT_XML)
        .context("Failed to load document template")?;

    let header: Vec<HeaderLine> = metadata
        .header_lines(&config.date_format)
        .into_iter()
        .map(|(label, value)| HeaderLine {
            label,
            value: xml_text(&value),
        })
        .collect();

    let comment_lines: Vec<String> = ReportMetadata::display(&metadata.comment)
        .lines()
        .map(xml_text)
        .collect();

    let rows: Vec<TableRow> = report
        .rows()
        .into_iter()
        .map(|row| TableRow {
            cells: row.cells().iter().map(|c| xml_text(c)).collect(),
            fill: match row.status {
                "conforming" => Some("D9EAD3"),
                "non_conforming" => Some("F4CCCC"),
                _ => None,
            },
        })
        .collect();

    let drawing = metadata
        .drawing
        .as_ref()
        .map(|d| d.file_name.as_str())
        .unwrap_or_default();

    let mut context = tera::Context::new();
    context.insert("title", &xml_text(&config.title));
    context.insert("company", &config.company.as_deref().map(xml_text));
    context.insert("header", &header);
    context.insert("drawing", &xml_text(ReportMetadata::display(drawing)));
    context.insert("comment_lines", &comment_lines);
    context.insert("picture", &picture);
    context.insert("headers", &TABLE_HEADERS);
    context.insert("rows", &rows);
    context.insert("summary", &xml_text(&report.summary_line()));

    tera.render("document.xml", &context)
        .context("Failed to render document.xml")
}

/// Escape markup characters and drop characters XML 1.0 cannot carry.
fn xml_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            '\u{FFFE}' | '\u{FFFF}' => {}
            c if c < ' ' => {}
            c => out.push(c),
        }
    }
    out
}
