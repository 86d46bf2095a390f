//! Document text extraction: turns an uploaded PDF or DOCX into plain text.
//!
//! Extraction is CPU-bound and runs on the blocking pool. Unsupported formats,
//! corrupted files and documents without any text are distinct errors: they
//! are reported to the client, never turned into a degraded analysis.

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::OnceLock;

use bytes::Bytes;
use quick_xml::events::Event;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use crate::analysis::segmenter::normalize_whitespace;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const DOCX_BODY: &str = "word/document.xml";
/// Upper bound on decompressed document XML (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file format: {0}. Upload a PDF or DOCX file.")]
    UnsupportedFormat(String),

    #[error("Could not read the document: {0}")]
    Unreadable(String),

    #[error("Could not extract text from the file")]
    EmptyText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Resolves the format from the file name extension, falling back to the
    /// declared content type.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Result<Self, DocumentError> {
        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => return Ok(DocumentFormat::Pdf),
            Some("docx") => return Ok(DocumentFormat::Docx),
            _ => {}
        }

        match content_type {
            Some(MIME_PDF) => Ok(DocumentFormat::Pdf),
            Some(MIME_DOCX) => Ok(DocumentFormat::Docx),
            _ => Err(DocumentError::UnsupportedFormat(
                file_name.or(content_type).unwrap_or("unknown").to_string(),
            )),
        }
    }
}

/// Uploaded bytes plus their format. Owned by the request that carried them.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Bytes,
    pub format: DocumentFormat,
}

/// Extracts plain text from `document`. Whitespace-only output is an error.
pub async fn extract_text(document: RawDocument) -> Result<String, DocumentError> {
    let format = document.format;
    let text = tokio::task::spawn_blocking(move || match document.format {
        DocumentFormat::Pdf => extract_pdf(&document.bytes),
        DocumentFormat::Docx => extract_docx(&document.bytes),
    })
    .await
    .map_err(|e| DocumentError::Unreadable(format!("extraction aborted: {e}")))??;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(DocumentError::EmptyText);
    }

    info!("Extracted {} characters from {:?} document", text.len(), format);
    Ok(text)
}

fn extract_pdf(bytes: &[u8]) -> Result<String, DocumentError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| DocumentError::Unreadable(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Unreadable(e.to_string()))?;

    let mut xml = Vec::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| DocumentError::Unreadable(format!("{DOCX_BODY}: {e}")))?
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut xml)
        .map_err(|e| DocumentError::Unreadable(e.to_string()))?;

    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(DocumentError::Unreadable(format!(
            "{DOCX_BODY} exceeds size limit"
        )));
    }

    docx_paragraphs(&xml)
}

/// Collects `w:t` runs, one output line per `w:p` paragraph.
fn docx_paragraphs(xml: &[u8]) -> Result<String, DocumentError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| DocumentError::Unreadable(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::Unreadable(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    debug!("DOCX body contained {} paragraphs", paragraphs.len());
    Ok(paragraphs.join("\n"))
}

fn disallowed_chars() -> &'static Regex {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    DISALLOWED.get_or_init(|| {
        Regex::new(r"[^\w\s.,;:!?()]").expect("character filter is a valid regex")
    })
}

/// Removes characters other than word characters, whitespace and basic
/// punctuation, then collapses whitespace. Applied to uploaded documents
/// before analysis.
pub fn clean_text(text: &str) -> String {
    normalize_whitespace(&disallowed_chars().replace_all(text, ""))
}
