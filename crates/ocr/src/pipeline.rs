use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::parse::{split_line, ItemParser};
use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::ParsedItem;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("OCR worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Trimmed lines shorter than this many characters are dropped as engine
    /// noise before splitting. 0 disables the filter.
    pub min_line_len: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { min_line_len: 3 }
    }
}

/// Orchestrates: preprocess → OCR → line filter → split → parse.
///
/// Stateless across requests; the recognizer and parser are shared read-only.
pub struct ListPipeline<R: OcrBackend> {
    recognizer: Arc<R>,
    parser: ItemParser,
    options: PipelineOptions,
}

impl<R: OcrBackend + 'static> ListPipeline<R> {
    pub fn new(recognizer: R, parser: ItemParser) -> Self {
        Self::with_options(recognizer, parser, PipelineOptions::default())
    }

    pub fn with_options(recognizer: R, parser: ItemParser, options: PipelineOptions) -> Self {
        Self { recognizer: Arc::new(recognizer), parser, options }
    }

    /// Process an image file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<Vec<ParsedItem>, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes).await
    }

    /// Process raw uploaded image bytes. All-or-nothing: any preprocessing or
    /// engine failure aborts with no partial result.
    pub async fn process_bytes(&self, data: &[u8]) -> Result<Vec<ParsedItem>, PipelineError> {
        let recognizer = Arc::clone(&self.recognizer);
        let data = data.to_vec();

        // Filtering and recognition are CPU-bound and the engine call blocks;
        // both run on the blocking pool so async workers stay free.
        let ocr_text = tokio::task::spawn_blocking(move || -> Result<String, PipelineError> {
            let image_bytes = preprocess::prepare_for_ocr_from_bytes(&data)?;
            Ok(recognizer.recognize(&image_bytes)?)
        })
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))??;

        tracing::info!("Raw extracted text:\n{ocr_text}");

        let items = self.extract_items(&ocr_text);

        tracing::info!("Parsed {} item(s): {:?}", items.len(), items);

        Ok(items)
    }

    /// Turn raw engine text into the final item list. Item order follows the
    /// line order; split sub-items keep their left-to-right order.
    pub fn extract_items(&self, ocr_text: &str) -> Vec<ParsedItem> {
        let mut items = Vec::new();
        for line in ocr_text.lines() {
            if line.trim().chars().count() < self.options.min_line_len {
                continue;
            }
            for phrase in split_line(line) {
                if let Some(item) = self.parser.parse(&phrase) {
                    items.push(item);
                }
            }
        }
        items
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
