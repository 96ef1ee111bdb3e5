//! Source document ingestion.
//!
//! The pipeline treats text extraction as a collaborator: a
//! [`DocumentLoader`] produces page-level [`SourceDocument`]s annotated
//! with the owning tenant. A `lopdf`-backed [`PdfLoader`] is available
//! behind the `pdf` feature.

use std::path::Path;

use crate::document::SourceDocument;
use crate::error::Result;

/// Loads a source file into one [`SourceDocument`] per page.
pub trait DocumentLoader: Send + Sync {
    /// Load `path` on behalf of `user_id`.
    ///
    /// Every returned page carries the `user_id`, a `source` derived from
    /// the file name, and a page number consistent within the run.
    fn load(&self, path: &Path, user_id: &str) -> Result<Vec<SourceDocument>>;
}

/// Derive the source name from a path (the file name, or the whole path
/// when there is no file-name component).
pub(crate) fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(feature = "pdf")]
pub use self::pdf::PdfLoader;

#[cfg(feature = "pdf")]
mod pdf {
    use std::path::Path;

    use tracing::{debug, info};

    use super::{source_name, DocumentLoader};
    use crate::document::SourceDocument;
    use crate::error::{DocQaError, Result};

    /// A [`DocumentLoader`] that extracts per-page text from PDF files
    /// with [`lopdf`].
    ///
    /// Page numbers are 1-based. Pages with no extractable text are
    /// skipped.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PdfLoader;

    impl PdfLoader {
        /// Create a new PDF loader.
        pub fn new() -> Self {
            Self
        }

        fn ingestion_error(source: &str, message: impl Into<String>) -> DocQaError {
            DocQaError::Ingestion { source_name: source.to_string(), message: message.into() }
        }
    }

    impl DocumentLoader for PdfLoader {
        fn load(&self, path: &Path, user_id: &str) -> Result<Vec<SourceDocument>> {
            let source = source_name(path);

            let document = lopdf::Document::load(path)
                .map_err(|e| Self::ingestion_error(&source, format!("failed to open PDF: {e}")))?;

            let mut pages = Vec::new();
            for (page_number, _) in document.get_pages() {
                let text = document.extract_text(&[page_number]).map_err(|e| {
                    Self::ingestion_error(
                        &source,
                        format!("failed to extract text from page {page_number}: {e}"),
                    )
                })?;

                if text.trim().is_empty() {
                    debug!(%source, page = page_number, "skipping page with no extractable text");
                    continue;
                }

                pages.push(SourceDocument {
                    text,
                    page: page_number,
                    user_id: user_id.to_string(),
                    source: source.clone(),
                });
            }

            info!(%source, page_count = pages.len(), "ingested PDF");
            Ok(pages)
        }
    }
}
