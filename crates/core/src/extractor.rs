use crate::error::ScreenError;
use lopdf::Document;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Extensions accepted for job descriptions and resumes, lower-case.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "pdf", "docx"];

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, ScreenError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" => Ok(DocumentFormat::PlainText),
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            _ => Err(ScreenError::UnsupportedFormat {
                path: path.display().to_string(),
                extension: if extension.is_empty() {
                    "<none>".to_string()
                } else {
                    format!(".{extension}")
                },
            }),
        }
    }

    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|supported| ext.eq_ignore_ascii_case(supported))
            })
    }
}

pub trait TextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ScreenError>;
}

/// Reads bytes and decodes them as UTF-8, replacing invalid sequences.
#[derive(Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ScreenError> {
        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[derive(Default)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ScreenError> {
        let mut document =
            Document::load(path).map_err(|error| ScreenError::extraction(path, error))?;

        // Permission-only encryption opens with the empty user password.
        if document.is_encrypted() {
            document.decrypt("").map_err(|error| {
                ScreenError::extraction(path, format!("pdf is encrypted: {error}"))
            })?;
        }

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| ScreenError::extraction(path, error))?;
            pages.push(text);
        }

        let text = pages.join("\n");
        if text.trim().is_empty() {
            warn!(path = %path.display(), "pdf has no extractable text");
        }

        Ok(text)
    }
}

/// Pulls paragraph text out of `word/document.xml` inside the archive.
#[derive(Default)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ScreenError> {
        let file = fs::File::open(path)?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|error| ScreenError::extraction(path, error))?;
        let mut body = archive
            .by_name(DOCX_BODY)
            .map_err(|error| ScreenError::extraction(path, error))?;

        let mut xml = String::new();
        body.read_to_string(&mut xml)
            .map_err(|error| ScreenError::extraction(path, error))?;

        docx_paragraphs(&xml)
            .map(|paragraphs| paragraphs.join("\n"))
            .map_err(|error| ScreenError::extraction(path, error))
    }
}

fn docx_paragraphs(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(tag) if tag.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(tag) => match tag.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(tag) => match tag.name().as_ref() {
                b"w:tab" => current.push(' '),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(text) if in_text_run => current.push_str(&text.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs)
}

/// Loads the full text of one document, dispatching on its extension.
pub fn load_document_text(path: &Path) -> Result<String, ScreenError> {
    let format = DocumentFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "loading document");

    match format {
        DocumentFormat::PlainText => PlainTextExtractor.extract_text(path),
        DocumentFormat::Pdf => LopdfExtractor.extract_text(path),
        DocumentFormat::Docx => DocxExtractor.extract_text(path),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    pub(crate) fn write_docx(path: &Path, paragraphs: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
        let body = paragraphs
            .iter()
            .map(|text| format!("<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>"))
            .collect::<String>();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        );

        let mut writer = zip::ZipWriter::new(fs::File::create(path)?);
        writer.start_file(DOCX_BODY, SimpleFileOptions::default())?;
        writer.write_all(xml.as_bytes())?;
        writer.finish()?;
        Ok(())
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let error = load_document_text(Path::new("resume.odt")).unwrap_err();
        assert!(matches!(
            error,
            ScreenError::UnsupportedFormat { ref extension, .. } if extension == ".odt"
        ));
    }

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("CV.PDF")).unwrap(),
            DocumentFormat::Pdf
        );
        assert!(DocumentFormat::is_supported(Path::new("a/b/Resume.Docx")));
        assert!(!DocumentFormat::is_supported(Path::new("notes.md")));
        assert!(!DocumentFormat::is_supported(Path::new("README")));
    }

    #[test]
    fn plain_text_replaces_invalid_utf8() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("cv.txt");
        fs::write(&path, b"Rust \xff developer")?;

        let text = load_document_text(&path)?;
        assert_eq!(text, "Rust \u{fffd} developer");
        Ok(())
    }

    #[test]
    fn docx_paragraphs_become_lines() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("cv.docx");
        write_docx(&path, &["Senior Engineer", "Python &amp; SQL"])?;

        let text = load_document_text(&path)?;
        assert_eq!(text, "Senior Engineer\nPython & SQL");
        Ok(())
    }

    #[test]
    fn docx_without_body_is_an_extraction_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.docx");
        let mut writer = zip::ZipWriter::new(fs::File::create(&path)?);
        writer.start_file("docProps/app.xml", SimpleFileOptions::default())?;
        writer.write_all(b"<Properties/>")?;
        writer.finish()?;

        let error = load_document_text(&path).unwrap_err();
        assert!(matches!(error, ScreenError::Extraction { .. }));
        Ok(())
    }

    fn write_pdf(path: &Path, line: &str) -> Result<(), Box<dyn std::error::Error>> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
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
        doc.save(path)?;
        Ok(())
    }

    #[test]
    fn unencrypted_pdf_text_is_extracted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("cv.pdf");
        write_pdf(&path, "Python developer")?;

        let text = load_document_text(&path)?;
        assert!(text.contains("Python developer"));
        Ok(())
    }

    #[test]
    fn corrupt_pdf_is_an_extraction_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4\n%broken")?;

        let error = load_document_text(&path).unwrap_err();
        assert!(matches!(error, ScreenError::Extraction { .. }));
        Ok(())
    }
}
