pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::header,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::services::compress::PdfCompressor;
use crate::services::janitor::Janitor;
use crate::services::office::OfficeConverter;
use crate::services::remover::{BackgroundRemover, create_remover};
use crate::services::temp::TempStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub temp: Arc<TempStore>,
    pub janitor: Arc<Janitor>,
    pub office: Arc<OfficeConverter>,
    pub compressor: Arc<PdfCompressor>,
    pub remover: Arc<dyn BackgroundRemover>,
}

impl AppState {
    /// Wire up every service from config. Creates the temp directory and
    /// sweeps leftovers from previous runs.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let temp = Arc::new(TempStore::new(config.tmp_dir.clone())?);
        let swept = temp.sweep();
        if swept > 0 {
            tracing::info!("Swept {} leftover temp entries", swept);
        }

        let timeout = Duration::from_secs(config.subprocess_timeout_secs);

        Ok(Self {
            temp,
            janitor: Janitor::new(Duration::from_secs(config.cleanup_delay_secs)),
            office: Arc::new(OfficeConverter::new(config.office_binary.clone(), timeout)),
            compressor: Arc::new(PdfCompressor::new(
                config.ghostscript_binary.clone(),
                timeout,
            )),
            remover: create_remover(&config.remover_type, &config.rembg_binary, timeout),
            config,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    // Browser clients need to read the attachment filename, so
    // Content-Disposition is exposed. The layer also answers OPTIONS
    // preflights before any route logic runs.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/remove-bg", post(handlers::image::remove_bg))
        .route("/image/convert-to-pdf", post(handlers::image::images_to_pdf))
        .route("/pdf/convert-to-word", post(handlers::pdf::convert_to_word))
        .route("/pdf/convert-to-pdf", post(handlers::pdf::convert_to_pdf))
        .route("/pdf/merge", post(handlers::pdf::merge))
        .route("/pdf/compress", post(handlers::pdf::compress))
        .route("/pdf/encrypt", post(handlers::pdf::encrypt))
        .route("/pdf/decrypt", post(handlers::pdf::decrypt))
        .layer(cors)
        .with_state(state)
}
