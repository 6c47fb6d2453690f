//! Plain-text extraction from uploaded CV files.

use crate::errors::AppError;

/// Metadata of an uploaded file as reported by the multipart field.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn is_pdf(&self) -> bool {
        self.content_type.as_deref() == Some("application/pdf")
            || self
                .file_name
                .as_deref()
                .is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"))
            || self.bytes.starts_with(b"%PDF")
    }
}

/// Returns the CV text. PDFs go through `pdf-extract`; anything else is read as UTF-8.
pub fn cv_text(upload: &Upload) -> Result<String, AppError> {
    let text = if upload.is_pdf() {
        pdf_extract::extract_text_from_mem(&upload.bytes)
            .map_err(|e| AppError::Validation(format!("Could not read PDF CV: {e}")))?
    } else {
        String::from_utf8_lossy(&upload.bytes).into_owned()
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Validation("CV file contains no text".to_string()));
    }
    Ok(text)
}
