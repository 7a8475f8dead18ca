use std::path::Path;

use uuid::Uuid;

use super::{DocumentError, DocumentLoader, LoadedDocument, PageUnit};

/// In-memory aggregation of every page ingested during a session.
#[derive(Debug, Default)]
pub struct DocumentStore {
    pages: Vec<PageUnit>,
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one document's pages, numbering them from 1 and tagging them all
    /// with a fresh document id.
    pub fn add_document(&mut self, source: impl Into<String>, pages: Vec<String>) -> Uuid {
        let source = source.into();
        let document_id = Uuid::new_v4();
        let added = pages.len();

        self.pages
            .extend(pages.into_iter().zip(1u32..).map(|(text, page_number)| PageUnit {
                text,
                source: source.clone(),
                page_number,
                document_id,
            }));

        tracing::info!(%source, %document_id, pages = added, "document ingested");
        document_id
    }

    pub fn add_loaded(&mut self, document: LoadedDocument) -> Uuid {
        self.add_document(document.source, document.pages)
    }

    /// Load a file with `loader` and add its pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the loader fails.
    pub async fn ingest(
        &mut self,
        loader: &(dyn DocumentLoader + '_),
        path: &Path,
    ) -> Result<Uuid, DocumentError> {
        let document = loader.load(path).await?;
        Ok(self.add_loaded(document))
    }

    /// Extract and add the pages of an in-memory PDF byte stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable PDF.
    #[cfg(feature = "pdf")]
    pub fn ingest_pdf_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<Uuid, DocumentError> {
        let document = super::PdfLoader::default().load_bytes(name, bytes)?;
        Ok(self.add_loaded(document))
    }

    #[must_use]
    pub fn pages(&self) -> &[PageUnit] {
        &self.pages
    }

    /// Distinct document ids in ingestion order.
    #[must_use]
    pub fn documents(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::new();
        for page in &self.pages {
            if ids.last() != Some(&page.document_id) && !ids.contains(&page.document_id) {
                ids.push(page.document_id);
            }
        }
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextLoader;

    #[test]
    fn three_page_document_gets_sequential_pages_and_one_id() {
        let mut store = DocumentStore::new();
        let id = store.add_document(
            "guide.pdf",
            vec!["one".into(), "two".into(), "three".into()],
        );

        assert_eq!(store.len(), 3);
        let numbers: Vec<u32> = store.pages().iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(store.pages().iter().all(|p| p.document_id == id));
        assert!(store.pages().iter().all(|p| p.source == "guide.pdf"));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_bytes_keep_page_numbers_and_one_id() {
        let mut store = DocumentStore::new();
        let id = store
            .ingest_pdf_bytes(
                "earth-science.pdf",
                include_bytes!("../../tests/fixtures/three_pages.pdf"),
            )
            .unwrap();

        assert_eq!(store.len(), 3);
        let numbers: Vec<u32> = store.pages().iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(store.documents(), vec![id]);
        assert!(store.pages()[2].text.contains("Earthquakes"));
    }

    #[test]
    fn each_document_gets_a_fresh_id() {
        let mut store = DocumentStore::new();
        let a = store.add_document("a.pdf", vec!["x".into()]);
        let b = store.add_document("a.pdf", vec!["x".into(), "y".into()]);

        assert_ne!(a, b);
        assert_eq!(store.documents(), vec![a, b]);
        assert_eq!(store.pages()[1].page_number, 1);
        assert_eq!(store.pages()[2].page_number, 2);
    }

    #[test]
    fn clear_empties_store() {
        let mut store = DocumentStore::new();
        store.add_document("a", vec!["x".into()]);
        assert!(!store.is_empty());
        store.clear();
        assert!(store.is_empty());
        assert!(store.documents().is_empty());
    }

    #[tokio::test]
    async fn ingest_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "page one\x0Cpage two").unwrap();

        let mut store = DocumentStore::new();
        store.ingest(&TextLoader::default(), &file).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.pages()[0].source, "notes.txt");
        assert_eq!(store.pages()[1].text, "page two");
    }
}
