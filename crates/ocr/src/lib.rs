pub mod correct;
pub mod parse;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use correct::CorrectionTable;
pub use parse::{split_line, ItemParser};
pub use pipeline::{ListPipeline, PipelineError, PipelineOptions};
pub use preprocess::{prepare_for_ocr_from_bytes, PreprocessError};
pub use recognizer::{EngineParams, MockRecognizer, OcrBackend, OcrError};
pub use types::ParsedItem;
