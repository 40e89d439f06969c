use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Glyphs the engine is allowed to recognize when the whitelist is enabled.
pub const DEFAULT_CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.()-";

/// Fixed engine invocation parameters. Output parity depends on these, so
/// they are explicit rather than buried in the backend.
#[derive(Debug, Clone)]
pub struct EngineParams {
    pub lang: String,
    /// Tessdata directory; `None` uses the system default.
    pub data_path: Option<String>,
    /// Page segmentation mode. 6 = treat the image as a uniform block of text.
    pub page_seg_mode: u32,
    /// `None` disables the whitelist entirely.
    pub char_whitelist: Option<String>,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            lang: "eng".to_string(),
            data_path: None,
            page_seg_mode: 6,
            char_whitelist: Some(DEFAULT_CHAR_WHITELIST.to_string()),
        }
    }
}

/// Abstraction over an OCR backend.
/// Implementations accept preprocessed PNG bytes and return the recognized
/// text verbatim — no retries, no confidence filtering.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string — useful for unit testing the parsing pipeline
/// without requiring Tesseract to be installed.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{EngineParams, OcrBackend, OcrError};
    use leptess::{LepTess, Variable};

    /// System Tesseract via leptonica. Initialization uses the engine's
    /// default OCR mode (LSTM); segmentation and the glyph whitelist come
    /// from [`EngineParams`].
    pub struct TesseractRecognizer {
        params: EngineParams,
    }

    impl TesseractRecognizer {
        pub fn new(params: EngineParams) -> Self {
            Self { params }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.params.data_path.as_deref(), &self.params.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_variable(
                Variable::TesseditPagesegMode,
                &self.params.page_seg_mode.to_string(),
            )
            .map_err(|e| OcrError::Engine(e.to_string()))?;
            if let Some(whitelist) = &self.params.char_whitelist {
                lt.set_variable(Variable::TesseditCharWhitelist, whitelist)
                    .map_err(|e| OcrError::Engine(e.to_string()))?;
            }
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
