mod text;
#[cfg(feature = "pdf")]
mod pdf;

use std::path::Path;
use std::pin::Pin;

pub use text::TextLoader;
#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;

use super::{DocumentError, LoadedDocument};

pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn Future<Output = Result<LoadedDocument, DocumentError>> + Send + '_>>;

    fn supported_extensions(&self) -> &[&str];
}

/// Pick a loader from the file extension.
///
/// # Errors
///
/// Returns [`DocumentError::UnsupportedFormat`] for unknown extensions, or for
/// `.pdf` when the `pdf` feature is disabled.
pub fn loader_for_path(path: &Path) -> Result<Box<dyn DocumentLoader>, DocumentError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        #[cfg(feature = "pdf")]
        "pdf" => Ok(Box::new(PdfLoader::default())),
        "txt" | "md" | "markdown" => Ok(Box::new(TextLoader::default())),
        other => Err(DocumentError::UnsupportedFormat(if other.is_empty() {
            path.display().to_string()
        } else {
            other.to_owned()
        })),
    }
}

/// Display name used as chunk provenance: the bare file name.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_extensions_resolve() {
        for name in ["a.txt", "b.md", "c.MARKDOWN"] {
            let loader = loader_for_path(Path::new(name)).unwrap();
            assert!(loader.supported_extensions().contains(&"txt"));
        }
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_extension_resolves() {
        let loader = loader_for_path(Path::new("slides.PDF")).unwrap();
        assert_eq!(loader.supported_extensions(), &["pdf"]);
    }

    #[test]
    fn unknown_extension_rejected() {
        let result = loader_for_path(Path::new("image.png"));
        assert!(matches!(result, Err(DocumentError::UnsupportedFormat(ext)) if ext == "png"));
    }

    #[test]
    fn display_name_is_file_name() {
        assert_eq!(display_name(Path::new("/tmp/dir/biology.pdf")), "biology.pdf");
    }
}
