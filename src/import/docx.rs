use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::Regex;
use zip::ZipArchive;

use super::ImportError;

const DOCUMENT_PART: &str = "word/document.xml";

static PARAGRAPH_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</w:p>|<w:br\s*/>").expect("valid paragraph regex"));
static TAB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:tab\s*/>").expect("valid tab regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Extracts the visible text of a DOCX document, one line per paragraph.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ImportError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| ImportError::Docx(format!("missing {DOCUMENT_PART}")))?
        .read_to_string(&mut xml)?;

    let with_breaks = PARAGRAPH_END_RE.replace_all(&xml, "\n");
    let with_tabs = TAB_RE.replace_all(&with_breaks, "\t");
    let stripped = TAG_RE.replace_all(&with_tabs, "");

    let text = stripped
        .lines()
        .map(|line| decode_entities(line.trim()))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(text.trim().to_string())
}

fn decode_entities(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
