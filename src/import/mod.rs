pub mod docx;
pub mod table;

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

pub use docx::extract_docx_text;
pub use table::{parse_csv, ParsedTable};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("docx error: {0}")]
    Docx(String),
    #[error("unsupported file type: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum ImportedFile {
    Csv(ParsedTable),
    Docx(String),
}

pub trait FileImporter: Send + Sync {
    fn kind(&self) -> &'static str;
    fn extensions(&self) -> &'static [&'static str];
    fn import(&self, bytes: &[u8]) -> Result<ImportedFile, ImportError>;
}

#[derive(Clone, Serialize)]
pub struct ImporterInfo {
    pub kind: String,
    pub extensions: Vec<String>,
}

struct CsvImporter;

impl FileImporter for CsvImporter {
    fn kind(&self) -> &'static str {
        "csv"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    fn import(&self, bytes: &[u8]) -> Result<ImportedFile, ImportError> {
        let text = String::from_utf8_lossy(bytes);
        Ok(ImportedFile::Csv(parse_csv(&text)?))
    }
}

struct DocxImporter;

impl FileImporter for DocxImporter {
    fn kind(&self) -> &'static str {
        "docx"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["docx"]
    }

    fn import(&self, bytes: &[u8]) -> Result<ImportedFile, ImportError> {
        Ok(ImportedFile::Docx(extract_docx_text(bytes)?))
    }
}

fn active_importers() -> Vec<Box<dyn FileImporter>> {
    vec![Box::new(CsvImporter), Box::new(DocxImporter)]
}

pub fn list_importers() -> Vec<ImporterInfo> {
    active_importers()
        .into_iter()
        .map(|importer| ImporterInfo {
            kind: importer.kind().to_string(),
            extensions: importer
                .extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        })
        .collect()
}

fn find_importer(extension: &str) -> Option<Box<dyn FileImporter>> {
    active_importers().into_iter().find(|importer| {
        importer
            .extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    })
}

/// Imports `bytes` using the importer registered for the extension of `name`.
pub fn import_bytes(name: &str, bytes: &[u8]) -> Result<ImportedFile, ImportError> {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let importer =
        find_importer(extension).ok_or_else(|| ImportError::Unsupported(name.to_string()))?;
    tracing::debug!(name, kind = importer.kind(), size = bytes.len(), "importing file");
    importer.import(bytes)
}

pub fn import_file(path: &Path) -> Result<ImportedFile, ImportError> {
    let bytes = std::fs::read(path)?;
    import_bytes(&path.to_string_lossy(), &bytes)
}
