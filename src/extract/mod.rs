// Document text extraction for job descriptions and resumes.
// Failures never propagate: callers get an empty string and a log line.
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction error: {0}")]
    Pdf(String),

    #[error("DOCX read error: {0}")]
    Docx(#[from] docx_rs::ReaderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Dispatch on the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

pub trait DocumentReader: Send + Sync {
    fn read(&self, path: &Path, kind: DocumentKind) -> Result<String, ExtractError>;

    /// Text of the document, or an empty string when it cannot be read.
    fn text(&self, path: &Path, kind: DocumentKind) -> String {
        match self.read(path, kind) {
            Ok(text) => text,
            Err(e) => {
                warn!("Error extracting text from {}: {}", path.display(), e);
                String::new()
            }
        }
    }

    /// Like [`DocumentReader::text`], choosing the kind from the extension.
    /// Unknown extensions yield an empty string.
    fn text_by_extension(&self, path: &Path) -> String {
        match DocumentKind::from_path(path) {
            Some(kind) => self.text(path, kind),
            None => String::new(),
        }
    }
}

/// Reads PDFs with `pdf-extract` and DOCX files with `docx-rs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileReader;

impl DocumentReader for FileReader {
    fn read(&self, path: &Path, kind: DocumentKind) -> Result<String, ExtractError> {
        match kind {
            DocumentKind::Pdf => extract_pdf(path),
            DocumentKind::Docx => extract_docx(path),
        }
    }
}

pub fn extract_pdf(path: &Path) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text(path));
    let text = match result {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return Err(ExtractError::Pdf(e.to_string())),
        Err(_) => return Err(ExtractError::Pdf("parser panicked".to_string())),
    };
    Ok(text.trim().to_string())
}

pub fn extract_docx(path: &Path) -> Result<String, ExtractError> {
    let data = std::fs::read(path)?;
    let docx = docx_rs::read_docx(&data)?;

    let mut paragraphs = Vec::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            let mut text = String::new();
            for child in p.children {
                if let ParagraphChild::Run(run) = child {
                    for run_child in run.children {
                        match run_child {
                            RunChild::Text(t) => text.push_str(&t.text),
                            RunChild::Tab(_) => text.push('\t'),
                            RunChild::Break(_) => text.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            paragraphs.push(text);
        }
    }
    Ok(paragraphs.join("\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    fn write_docx(path: &Path, docx: Docx) {
        let file = std::fs::File::create(path).unwrap();
        docx.build().pack(file).unwrap();
    }

    /// Single-page PDF with one line of text in a standard font.
    fn write_pdf(path: &Path, line: &str) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 14.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn kind_follows_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("a/JD.PDF")), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_path(Path::new("jd.docx")), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_path(Path::new("jd.txt")), None);
        assert_eq!(DocumentKind::from_path(Path::new("jd")), None);
    }

    #[test]
    fn reads_docx_paragraphs_tabs_and_entities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jd.docx");
        write_docx(
            &path,
            Docx::new()
                .add_paragraph(
                    Paragraph::new().add_run(Run::new().add_text("Senior Rust Engineer")),
                )
                .add_paragraph(
                    Paragraph::new().add_run(
                        Run::new()
                            .add_text("Title:")
                            .add_tab()
                            .add_text("Don’t & Co <R&D>"),
                    ),
                ),
        );

        let text = FileReader.text_by_extension(&path);
        assert_eq!(text, "Senior Rust Engineer\nTitle:\tDon’t & Co <R&D>");
    }

    #[test]
    fn reads_pdf_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        write_pdf(&path, "Ann Lee Rust Engineer");

        let text = FileReader.text(&path, DocumentKind::Pdf);
        assert!(text.contains("Ann Lee Rust Engineer"), "got {text:?}");
        assert_eq!(extract_pdf(&path).unwrap(), text);
    }

    #[test]
    fn unreadable_documents_become_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("broken.pdf");
        std::fs::write(&pdf, b"this is not a pdf").unwrap();
        let docx = dir.path().join("broken.docx");
        std::fs::write(&docx, b"nor a zip").unwrap();

        assert_eq!(FileReader.text(&pdf, DocumentKind::Pdf), "");
        assert_eq!(FileReader.text(&docx, DocumentKind::Docx), "");
        assert_eq!(FileReader.text_by_extension(&dir.path().join("notes.txt")), "");
    }
}
