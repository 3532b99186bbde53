//! Classifies uploaded lung CT scans and histopathology slides.

pub mod classifier;
pub mod config;
pub mod error;
pub mod handlers;
pub mod labels;
pub mod logger;
pub mod models;
pub mod pages;
pub mod preprocess;
pub mod upload;

use std::path::PathBuf;

use actix_web::web;

pub use classifier::{Classifier, OnnxClassifier, Predictor};
pub use config::{AppConfig, Cli};
pub use error::{AppError, Result};
pub use models::{ModelKind, Prediction};

pub struct AppState {
    pub ct_scan: Predictor,
    pub histopathology: Predictor,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let ct_scan = Predictor::load(ModelKind::CtScan, &config.models.ct_scan)?;
        let histopathology =
            Predictor::load(ModelKind::Histopathology, &config.models.histopathology)?;
        Ok(Self {
            ct_scan,
            histopathology,
            upload_dir: config.upload_dir.clone(),
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }

    pub fn predictor(&self, kind: ModelKind) -> &Predictor {
        match kind {
            ModelKind::CtScan => &self.ct_scan,
            ModelKind::Histopathology => &self.histopathology,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(handlers::home)))
        .service(
            web::resource("/ct_scan")
                .route(web::get().to(handlers::ct_scan_page))
                .route(web::post().to(handlers::predict_ct_scan)),
        )
        .service(
            web::resource("/histo_image")
                .route(web::get().to(handlers::histo_image_page))
                .route(web::post().to(handlers::predict_histo_image)),
        )
        .service(web::resource("/health").route(web::get().to(handlers::health)));
}
