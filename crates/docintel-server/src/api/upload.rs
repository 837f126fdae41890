//! Reading the `file` field of a multipart upload.

use axum::extract::Multipart;
use tracing::debug;

use super::error::ApiError;

/// File types accepted by the upload routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    Image,
}

impl UploadKind {
    fn extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Pdf => &[".pdf"],
            UploadKind::Image => &[".png", ".jpg", ".jpeg"],
        }
    }

    fn rejection(&self) -> &'static str {
        match self {
            UploadKind::Pdf => "El archivo debe ser un PDF",
            UploadKind::Image => "El archivo debe ser una imagen (.png, .jpg, .jpeg)",
        }
    }

    /// Whether `file_name` ends with one of the accepted extensions (case-sensitive).
    pub fn accepts(&self, file_name: &str) -> bool {
        self.extensions().iter().any(|ext| file_name.ends_with(ext))
    }

    pub fn check(&self, file_name: &str) -> Result<(), ApiError> {
        if self.accepts(file_name) {
            Ok(())
        } else {
            Err(ApiError::BadUpload(self.rejection()))
        }
    }
}

/// An upload that passed the extension check.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Find the `file` field, check its name against `kind`, then read it.
///
/// The body is only read once the extension is accepted.
pub async fn read_upload(mut multipart: Multipart, kind: UploadKind) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::ReadFailure(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        kind.check(&file_name)?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::ReadFailure(e.to_string()))?;

        debug!("Received '{}' ({} bytes)", file_name, bytes.len());
        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::MissingFile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension() {
        assert!(UploadKind::Pdf.accepts("factura.pdf"));
        assert!(!UploadKind::Pdf.accepts("report.txt"));
        assert!(!UploadKind::Pdf.accepts("pdf"));
    }

    #[test]
    fn test_image_extensions() {
        for name in ["a.png", "b.jpg", "c.jpeg"] {
            assert!(UploadKind::Image.accepts(name), "{name}");
        }
        assert!(!UploadKind::Image.accepts("d.gif"));
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        assert!(!UploadKind::Image.accepts("SCAN.PNG"));
        assert!(!UploadKind::Pdf.accepts("DOC.PDF"));
    }

    #[test]
    fn test_check_message() {
        let err = UploadKind::Image.check("x.bmp").unwrap_err();
        assert_eq!(err.to_string(), "El archivo debe ser una imagen (.png, .jpg, .jpeg)");
    }
}
