use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use listscan_ocr::{ItemParser, ListPipeline, OcrBackend, PipelineOptions};

mod config;
mod error;
mod routes;

use config::ServerConfig;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::load()?;

    let parser = ItemParser::new(config.correction_table());
    let pipeline = ListPipeline::with_options(
        build_recognizer(&config),
        parser,
        PipelineOptions { min_line_len: config.min_line_len() },
    );

    let state = AppState { pipeline: Arc::new(pipeline) };
    let app = routes::router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "tesseract")]
fn build_recognizer(config: &ServerConfig) -> Box<dyn OcrBackend> {
    use listscan_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    Box::new(TesseractRecognizer::new(config.engine_params()))
}

#[cfg(not(feature = "tesseract"))]
fn build_recognizer(_config: &ServerConfig) -> Box<dyn OcrBackend> {
    use listscan_ocr::MockRecognizer;
    tracing::warn!(
        "Built without the `tesseract` feature; using the mock recognizer, \
         all uploads will parse to empty item lists"
    );
    Box::new(MockRecognizer::new(""))
}
