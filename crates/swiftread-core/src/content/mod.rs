//! Document ingestion: plain text, markup sections and EPUB packages into a
//! flat word sequence plus chapter starts.

mod epub;
mod html_entities;
mod markup;
mod scan;

use log::{debug, info};

use crate::{chapter::Chapter, error::IngestError};

pub const FULL_DOCUMENT_TITLE: &str = "Full Document";

/// Words and chapters produced by one ingestion.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Document {
    pub words: Vec<String>,
    pub chapters: Vec<Chapter>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocumentFormat {
    PlainText,
    Markup,
    Epub,
}

impl DocumentFormat {
    /// Format from the file extension, case-insensitive.
    pub fn from_file_name(file_name: &str) -> Result<Self, IngestError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" | "text" => Ok(Self::PlainText),
            "html" | "htm" | "xhtml" => Ok(Self::Markup),
            "epub" => Ok(Self::Epub),
            _ => Err(IngestError::UnsupportedFormat { extension }),
        }
    }
}

/// Ingest a whole file by name and content.
pub fn ingest(file_name: &str, bytes: &[u8]) -> Result<Document, IngestError> {
    let format = DocumentFormat::from_file_name(file_name)?;
    let document = match format {
        DocumentFormat::PlainText => ingest_plain_text(bytes),
        DocumentFormat::Markup => ingest_sections([bytes]),
        DocumentFormat::Epub => ingest_sections(epub::spine_documents(bytes)?),
    }?;

    info!(
        "content: ingested file={} format={:?} words={} chapters={}",
        file_name,
        format,
        document.words.len(),
        document.chapters.len()
    );
    Ok(document)
}

/// Whitespace-split text as a single chapter.
pub fn ingest_plain_text(bytes: &[u8]) -> Result<Document, IngestError> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
    if words.is_empty() {
        return Err(IngestError::Empty);
    }

    Ok(Document {
        words,
        chapters: vec![Chapter::new(FULL_DOCUMENT_TITLE, 0)],
    })
}

/// One chapter per markup section, in order.
///
/// Every section opens a chapter at the current word count, including
/// sections without words; loading the document collapses those.
pub fn ingest_sections<I>(sections: I) -> Result<Document, IngestError>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut document = Document::default();

    for (index, section) in sections.into_iter().enumerate() {
        let markup = String::from_utf8_lossy(section.as_ref());
        let extracted = markup::extract_section(&markup);

        let title = extracted
            .title
            .unwrap_or_else(|| format!("Section {}", index + 1));
        debug!(
            "content: section index={} title={:?} words={}",
            index,
            title,
            extracted.words.len()
        );

        document
            .chapters
            .push(Chapter::new(title, document.words.len()));
        document.words.extend(extracted.words);
    }

    if document.words.is_empty() {
        return Err(IngestError::ProtectedContent);
    }
    Ok(document)
}
