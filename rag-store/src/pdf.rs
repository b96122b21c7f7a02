//! PDF text extraction.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::RagError;

/// Extracts the text of every page, in page order.
///
/// Parsing is CPU-bound and runs on the blocking pool.
///
/// # Errors
/// - [`RagError::Io`] if the file cannot be read
/// - [`RagError::Pdf`] if the document cannot be parsed or has no text layer
pub async fn extract_pages(path: impl AsRef<Path>) -> Result<Vec<String>, RagError> {
    let path: PathBuf = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || extract_pages_blocking(&path)).await?
}

fn extract_pages_blocking(path: &Path) -> Result<Vec<String>, RagError> {
    let bytes = std::fs::read(path)?;

    // pdf-extract panics on some malformed documents.
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
        .map_err(|_| RagError::Pdf(format!("pdf parser panicked on {path:?}")))?
        .map_err(|e| RagError::Pdf(format!("failed to extract text from {path:?}: {e}")))?;

    if pages.iter().all(|p| p.trim().is_empty()) {
        warn!(?path, pages = pages.len(), "pdf has no extractable text");
        return Err(RagError::Pdf(format!(
            "{path:?} contains no extractable text (may be image-based)"
        )));
    }

    debug!(?path, pages = pages.len(), "pdf text extracted");
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn garbage_bytes_are_a_pdf_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a pdf").unwrap();

        let err = extract_pages(file.path()).await.unwrap_err();
        assert!(matches!(err, RagError::Pdf(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn text_is_returned_per_page() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/two_pages.pdf");

        let pages = extract_pages(path).await.unwrap();

        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("ownership"), "page 1: {:?}", pages[0]);
        assert!(pages[1].contains("Tokio"), "page 2: {:?}", pages[1]);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_pages(dir.path().join("nope.pdf")).await.unwrap_err();
        assert!(matches!(err, RagError::Io(_)));
    }
}
