//! Format-specific text extraction for uploaded documents

use std::path::Path;

use crate::error::{Error, Result};

/// Document formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Old Microsoft Word document (.doc); parsed with the DOCX reader,
    /// real legacy binaries fail per-file and are reported
    Doc,
}

impl DocumentFormat {
    /// Detect format from a file extension, case-insensitively
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            _ => None,
        }
    }

    /// Detect format from a filename, or fail naming the offending extension
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = filename.rsplit('.').next().unwrap_or("");
        if ext == filename || ext.is_empty() {
            return Err(Error::UnsupportedFormat("(none)".to_string()));
        }
        Self::from_extension(ext).ok_or_else(|| Error::UnsupportedFormat(ext.to_lowercase()))
    }
}

/// Text extraction seam; the pipeline only depends on this trait
pub trait TextExtractor: Send + Sync {
    /// Produce the full plain-text content of the document at `path`
    fn extract(&self, path: &Path, format: DocumentFormat) -> Result<String>;
}

/// Real extractor backed by lopdf/pdf-extract and docx-rs
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, path: &Path, format: DocumentFormat) -> Result<String> {
        match format {
            DocumentFormat::Pdf => extract_pdf(path),
            DocumentFormat::Docx | DocumentFormat::Doc => extract_docx(path),
        }
    }
}

/// Extract PDF text page by page, in page order. Each page's text is
/// followed by a newline; pages with no extractable text contribute nothing.
fn extract_pdf(path: &Path) -> Result<String> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document.pdf".to_string());

    let doc = lopdf::Document::load(path)
        .map_err(|e| Error::processing(&filename, format!("Failed to load PDF: {}", e)))?;

    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("No text extracted from page {} of {}: {}", page_number, filename, e);
            }
        }
    }

    if text.trim().is_empty() {
        // Some PDFs defeat per-page extraction; try a whole-document pass
        tracing::warn!("Per-page extraction yielded no text for {}, trying fallback", filename);
        let data = std::fs::read(path)?;
        text = pdf_extract::extract_text_from_mem(&data)
            .map_err(|e| Error::processing(&filename, format!("Failed to extract PDF text: {}", e)))?;
    }

    tracing::info!("Extracted {} characters from PDF {}", text.len(), filename);
    Ok(text)
}

/// Extract DOCX text paragraph by paragraph, one newline per paragraph.
/// Empty paragraphs are preserved as blank lines.
fn extract_docx(path: &Path) -> Result<String> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document.docx".to_string());

    let data = std::fs::read(path)?;
    let doc = docx_rs::read_docx(&data)
        .map_err(|e| Error::processing(&filename, format!("Failed to read document: {}", e)))?;

    let mut text = String::new();
    for child in doc.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }

    tracing::info!("Extracted {} characters from DOCX {}", text.len(), filename);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("Docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("doc"), Some(DocumentFormat::Doc));
        assert_eq!(DocumentFormat::from_extension("txt"), None);
    }

    #[test]
    fn unknown_extension_names_the_offender() {
        let err = DocumentFormat::from_filename("notes.TXT").unwrap_err();
        match err {
            Error::UnsupportedFormat(ext) => assert_eq!(ext, "txt"),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn extension_required() {
        assert!(matches!(
            DocumentFormat::from_filename("README"),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn corrupt_pdf_is_a_processing_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = DocumentExtractor.extract(&path, DocumentFormat::Pdf).unwrap_err();
        assert!(matches!(err, Error::Processing { .. }));
    }

    #[test]
    fn docx_roundtrip_preserves_paragraph_newlines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sample.docx");

        let file = std::fs::File::create(&path).unwrap();
        docx_rs::Docx::new()
            .add_paragraph(
                docx_rs::Paragraph::new()
                    .add_run(docx_rs::Run::new().add_text("First paragraph.")),
            )
            .add_paragraph(docx_rs::Paragraph::new())
            .add_paragraph(
                docx_rs::Paragraph::new()
                    .add_run(docx_rs::Run::new().add_text("Second paragraph.")),
            )
            .build()
            .pack(file)
            .unwrap();

        let text = DocumentExtractor.extract(&path, DocumentFormat::Docx).unwrap();
        assert_eq!(text, "First paragraph.\n\nSecond paragraph.\n");
    }
}
