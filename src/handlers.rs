use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::models::{HealthResponse, ModelKind, PredictionResponse};
use crate::pages;
use crate::preprocess;
use crate::upload;
use crate::AppState;

pub async fn home() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(pages::HOME_HTML)
}

pub async fn ct_scan_page() -> HttpResponse {
    html(pages::upload_page("CT Scan Prediction", "/ct_scan"))
}

pub async fn histo_image_page() -> HttpResponse {
    html(pages::upload_page("Histopathology Image Prediction", "/histo_image"))
}

pub async fn predict_ct_scan(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse> {
    predict(state, payload, ModelKind::CtScan).await
}

pub async fn predict_histo_image(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse> {
    predict(state, payload, ModelKind::Histopathology).await
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "OK".to_string(),
    })
}

async fn predict(
    state: web::Data<AppState>,
    payload: Multipart,
    kind: ModelKind,
) -> Result<HttpResponse> {
    let saved = upload::save_upload(payload, &state.upload_dir, state.max_upload_bytes).await?;
    tracing::info!(
        "received {} upload {:?} ({} bytes)",
        kind.display_name(),
        saved.filename,
        saved.size
    );

    let predictor = state.predictor(kind).clone();
    let prediction = web::block(move || {
        let img = preprocess::decode_file(&saved.path)?;
        // removes the temporary directory
        drop(saved);
        predictor.predict(&img)
    })
    .await??;

    tracing::info!(
        "predicted {} class {} ({}) with score {:.4}",
        kind.display_name(),
        prediction.class_index,
        prediction.label,
        prediction.confidence
    );

    Ok(HttpResponse::Ok().json(PredictionResponse::from(prediction)))
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}
