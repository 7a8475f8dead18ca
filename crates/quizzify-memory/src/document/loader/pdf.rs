use std::path::Path;
use std::pin::Pin;

use super::super::{DEFAULT_MAX_FILE_SIZE, DocumentError, LoadedDocument};
use super::{DocumentLoader, display_name};

/// Page-level PDF text extraction backed by `pdf-extract`.
pub struct PdfLoader {
    pub max_file_size: u64,
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl PdfLoader {
    /// Extract pages from an in-memory PDF.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is too large or cannot be parsed.
    pub fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<LoadedDocument, DocumentError> {
        let size = bytes.len() as u64;
        if size > self.max_file_size {
            return Err(DocumentError::FileTooLarge(size));
        }
        let pages = extract_pages(bytes)?;
        Ok(LoadedDocument {
            source: name.to_owned(),
            pages,
        })
    }
}

fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, DocumentError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| DocumentError::Pdf(e.to_string()))
}

impl DocumentLoader for PdfLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn Future<Output = Result<LoadedDocument, DocumentError>> + Send + '_>> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let meta = tokio::fs::metadata(&path).await?;
            if meta.len() > max_size {
                return Err(DocumentError::FileTooLarge(meta.len()));
            }

            let bytes = tokio::fs::read(&path).await?;
            let pages = tokio::task::spawn_blocking(move || extract_pages(&bytes))
                .await
                .map_err(|e| DocumentError::Io(std::io::Error::other(e)))??;

            tracing::debug!(path = %path.display(), pages = pages.len(), "PDF extracted");
            Ok(LoadedDocument {
                source: display_name(&path),
                pages,
            })
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}
