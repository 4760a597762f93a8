//! Document summarizer - upload a document, get its key fields and a summary.

mod config;
mod error;
mod extract;
mod fields;
mod pipeline;
mod schema;
mod summarizer;
mod upload;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::Json,
    routing::{get, post},
    Router,
};
use config::{AppConfig, SummarizerKind};
use error::AppError;
use extract::{TesseractCli, TextExtractor};
use fields::CompiledFields;
use pipeline::Pipeline;
use schema::ValidationReport;
use std::sync::Arc;
use summarizer::{HfInferenceSummarizer, OpenRouterSummarizer, Summarizer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upload::UploadStore;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "docsummary=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!(
        "Config: summarizer={:?}, model={}, ocr_lang={}, {} field patterns",
        config.summarizer,
        config.summary_model,
        config.ocr_lang,
        config.field_patterns.len()
    );

    let summarizer: Arc<dyn Summarizer> = match config.summarizer {
        SummarizerKind::HfInference => {
            let hf = HfInferenceSummarizer::new(
                &config.hf_api_base,
                &config.summary_model,
                config.hf_token.clone(),
            )?;
            info!("HF Inference endpoint: {}", hf.endpoint());
            Arc::new(hf)
        }
        SummarizerKind::OpenRouter => {
            Arc::new(OpenRouterSummarizer::from_env()?.with_model(&config.summary_model))
        }
    };
    info!("Summarizer initialized: {}", summarizer.name());

    let extractor = TextExtractor::new(Arc::new(TesseractCli::new(&config.ocr_lang)));
    if extractor.ocr_available().await {
        info!("OCR engine available: {}", extractor.ocr_name());
    } else {
        warn!(
            "OCR engine '{}' not found; image uploads will fail (apt install tesseract-ocr)",
            extractor.ocr_name()
        );
    }

    let uploads = UploadStore::new(&config.upload_dir)?;
    info!("Uploads stored in {}", uploads.dir().display());

    let pipeline = Pipeline::new(
        uploads,
        extractor,
        CompiledFields::compile(&config.field_patterns),
        summarizer,
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    let app = router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/validate", post(validate))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn home() -> &'static str {
    "Document summarizer backend is running"
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Upload a document, extract its text and key fields, and summarize it.
async fn validate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ValidationReport>, AppError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            upload = Some((filename, data));
            break;
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    if filename.is_empty() {
        return Err(AppError::BadRequest("No filename provided".to_string()));
    }

    info!("Received file: {} ({} bytes)", filename, data.len());

    let report = state.pipeline.run(&filename, &data).await?;

    info!("Validation complete: {}", report.request_id);
    Ok(Json(report))
}
