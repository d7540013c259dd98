//! Document loading and text normalization.
//!
//! Uses pdf-extract for PDFs; text files are read as UTF-8 with a Latin-1
//! fallback.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use thiserror::Error;

/// Words per page used for the page estimate
const WORDS_PER_PAGE: usize = 250;

lazy_static! {
    static ref NON_ASCII_WS: Regex = Regex::new(r"[\s&&[^\x00-\x7F]]+").unwrap();
    static ref NON_ASCII: Regex = Regex::new(r"[^\x00-\x7F]+").unwrap();
    static ref HORIZONTAL_WS: Regex = Regex::new(r"[ \t\x0B\x0C\r]+").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("unsupported file type: {0} (expected PDF or plain text)")]
    UnsupportedType(String),
    #[error("failed to extract PDF text: {0}")]
    PdfError(String),
    #[error("file is not readable text (binary data at byte {0})")]
    DecodeError(usize),
    #[error("document contains no extractable text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Text,
}

impl MediaType {
    /// Guess the media type from a file name, then from magic bytes.
    pub fn detect(name: &str, bytes: &[u8]) -> Result<Self, DocumentError> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => Ok(MediaType::Pdf),
            Some("txt" | "text" | "md" | "csv" | "log") => Ok(MediaType::Text),
            _ if bytes.starts_with(b"%PDF-") => Ok(MediaType::Pdf),
            Some(other) => Err(DocumentError::UnsupportedType(other.to_string())),
            None => Ok(MediaType::Text),
        }
    }
}

/// Counts shown in the document info view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStats {
    pub words: usize,
    pub chars: usize,
    pub estimated_pages: usize,
    /// Actual page count, for PDFs
    pub pages: Option<usize>,
}

/// An uploaded file and its normalized text.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub media_type: MediaType,
    pub text: String,
    pub pages: Option<usize>,
}

impl Document {
    /// Read and normalize a file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, &bytes)
    }

    /// Build a document from raw bytes, detecting the media type from `name`
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, DocumentError> {
        let name = name.into();
        let media_type = MediaType::detect(&name, bytes)?;
        let (raw, pages) = match media_type {
            MediaType::Pdf => {
                let pages = extract_pdf_pages(bytes)?;
                (join_pages(&pages), Some(pages.len()))
            }
            MediaType::Text => (decode_text(bytes)?, None),
        };

        let text = normalize(&raw);
        if text.is_empty() {
            return Err(DocumentError::Empty);
        }

        tracing::debug!(
            name = %name,
            ?media_type,
            raw_chars = raw.len(),
            chars = text.len(),
            "document extracted"
        );

        Ok(Self {
            name,
            media_type,
            text,
            pages,
        })
    }

    pub fn stats(&self) -> DocumentStats {
        let words = self.text.split_whitespace().count();
        DocumentStats {
            words,
            chars: self.text.chars().count(),
            estimated_pages: (words / WORDS_PER_PAGE).max(1),
            pages: self.pages,
        }
    }
}

/// pdf-extract panics on some malformed fonts, so the panic is caught and
/// reported like any other extraction failure.
fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>, DocumentError> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes)) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(DocumentError::PdfError(e.to_string())),
        Err(_) => Err(DocumentError::PdfError("PDF parser crashed".to_string())),
    }
}

/// Concatenate pages in order with boundary markers.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| format!("--- Page {} ---\n{}", i + 1, page.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Decode UTF-8, falling back to Latin-1 for legacy text files.
pub fn decode_text(bytes: &[u8]) -> Result<String, DocumentError> {
    if let Some(pos) = bytes
        .iter()
        .position(|&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0C))
    {
        return Err(DocumentError::DecodeError(pos));
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string()),
        Err(_) => Ok(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// Strip non-ASCII characters and collapse whitespace.
///
/// Unicode spaces (no-break, em space, ...) become plain spaces first.
pub fn normalize(text: &str) -> String {
    let spaced = NON_ASCII_WS.replace_all(text, " ");
    let ascii = NON_ASCII.replace_all(&spaced, "");
    let collapsed = HORIZONTAL_WS.replace_all(&ascii, " ");
    let lines: Vec<&str> = collapsed.lines().map(str::trim).collect();
    let joined = lines.join("\n");
    BLANK_LINES.replace_all(&joined, "\n\n").trim().to_string()
}
