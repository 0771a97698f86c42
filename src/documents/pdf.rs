//! PDF text extraction.

use super::{IngestError, IngestResult};

/// Leading bytes of every PDF file.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extract the text layer of an in-memory PDF.
///
/// Pages are concatenated in order. A PDF without a text layer (scanned
/// images) yields an empty string rather than an error.
pub fn extract_pdf_text(bytes: &[u8]) -> IngestResult<String> {
    if bytes.is_empty() {
        return Err(IngestError::EmptyFile);
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(IngestError::PdfExtraction(
            "missing %PDF- header".to_string(),
        ));
    }

    // pdf-extract panics on some malformed inputs
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match result {
        Ok(Ok(text)) => {
            tracing::debug!(target: "documents", "extracted {} chars from PDF", text.len());
            Ok(text)
        }
        Ok(Err(e)) => Err(IngestError::PdfExtraction(e.to_string())),
        Err(_) => Err(IngestError::PdfExtraction(
            "PDF parser panicked on malformed input".to_string(),
        )),
    }
}

/// Whether `file_name` carries a `.pdf` extension (any case).
pub fn is_pdf_file_name(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
