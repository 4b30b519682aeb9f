//! Text-to-PDF rendering.
//!
//! Renders finalized proposal text into an A4 document with a fixed bold
//! title on every page and a centered, page-numbered footer. Input is
//! sanitized to Latin-1: anything outside the encodable range is replaced
//! with `?`, never rejected.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use thiserror::Error;

/// Fixed page title, top of every page.
pub const PAGE_TITLE: &str = "Project Funding Proposal";

// A4 geometry in points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const BODY_TOP: i64 = 770;
const BODY_BOTTOM: i64 = 60;
const LEFT_MARGIN: i64 = 72;
const LEADING: i64 = 14;
const WRAP_COLUMNS: usize = 78;

const LINES_PER_PAGE: usize = ((BODY_TOP - BODY_BOTTOM) / LEADING) as usize;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF assembly failed: {0}")]
    Assembly(#[from] lopdf::Error),
    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Replace everything Latin-1 cannot carry. Newlines survive, tabs widen to
/// four spaces, other control characters are dropped.
fn sanitize_latin1(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push('\n'),
            '\r' => {}
            '\t' => out.push_str("    "),
            c if (c as u32) < 0x20 => {}
            c if (c as u32) <= 0xFF => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Greedy word wrap to `width` columns; words longer than a full line are
/// hard-split. Blank lines are preserved.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.trim().is_empty() {
        return vec![String::new()];
    }

    let mut wrapped = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let mut word = word;
        // Hard-split oversized words
        while word.chars().count() > width {
            let split_at = word
                .char_indices()
                .nth(width)
                .map(|(idx, _)| idx)
                .unwrap_or(word.len());
            let (head, tail) = word.split_at(split_at);
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
            }
            wrapped.push(head.to_string());
            word = tail;
        }
        let needed = word.chars().count() + if current.is_empty() { 0 } else { 1 };
        if current.chars().count() + needed > width && !current.is_empty() {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

/// Latin-1 byte encoding for a sanitized line.
fn latin1_bytes(line: &str) -> Vec<u8> {
    line.chars().map(|c| (c as u32) as u8).collect()
}

/// Content stream for one page: title, body lines, numbered footer.
fn page_content(body_lines: &[String], page_number: usize) -> Content {
    let mut operations = Vec::new();

    // Title
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec!["F2".into(), 15.into()]));
    operations.push(Operation::new("Td", vec![200.into(), 800.into()]));
    operations.push(Operation::new(
        "Tj",
        vec![Object::string_literal(PAGE_TITLE)],
    ));
    operations.push(Operation::new("ET", vec![]));

    // Body
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
    operations.push(Operation::new("TL", vec![LEADING.into()]));
    operations.push(Operation::new(
        "Td",
        vec![LEFT_MARGIN.into(), BODY_TOP.into()],
    ));
    for line in body_lines {
        if !line.is_empty() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(latin1_bytes(line), StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    // Footer
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec!["F3".into(), 8.into()]));
    operations.push(Operation::new("Td", vec![280.into(), 40.into()]));
    operations.push(Operation::new(
        "Tj",
        vec![Object::string_literal(format!("Page {page_number}"))],
    ));
    operations.push(Operation::new("ET", vec![]));

    Content { operations }
}

/// Render proposal text into a complete PDF byte stream.
pub fn render_proposal(text: &str) -> Result<Vec<u8>, PdfError> {
    let sanitized = sanitize_latin1(text);

    let mut lines: Vec<String> = Vec::new();
    for raw_line in sanitized.split('\n') {
        lines.extend(wrap_line(raw_line, WRAP_COLUMNS));
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    // WinAnsiEncoding so Latin-1 body bytes survive extraction; the
    // built-in StandardEncoding mangles everything above 0x7F.
    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let font_italic = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Oblique",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_regular,
            "F2" => font_bold,
            "F3" => font_italic,
        },
    });

    let mut page_ids: Vec<Object> = Vec::new();
    for (index, chunk) in lines.chunks(LINES_PER_PAGE).enumerate() {
        let content = page_content(chunk, index + 1);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Resources" => resources_id,
        });
        page_ids.push(page_id.into());
    }

    let page_count = page_ids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => page_count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
