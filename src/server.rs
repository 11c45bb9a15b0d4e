//! HTTP surface of the renderer.
//!
//! | Route | Body | Response |
//! |-------|------|----------|
//! | `POST /render` | [`RenderRequest`] | the pptx file as an attachment |
//! | `POST /inspect` | `{"templatePath": ...}` | [`crate::TemplateSummary`] as JSON |
//! | `GET /health` | | `{"status": "ok"}` |
//!
//! Errors are answered with `{"error": "<message>"}`: 400 when the template cannot be opened or
//! the body is not valid JSON, 500 for anything else.

use crate::{inspect_template, render_deck, Error, RenderRequest, PPTX_MEDIA_TYPE};
use actix_web::{
    error::{BlockingError, InternalError, JsonPayloadError},
    http::{header, StatusCode},
    web, HttpRequest, HttpResponse, ResponseError,
};
use serde::Deserialize;
use serde_json::json;

const ATTACHMENT: &str = r#"attachment; filename="presentation.pptx""#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectRequest {
    pub template_path: String,
}

/// Registers the routes and the JSON body settings.
pub fn configure(cfg: &mut web::ServiceConfig, settings: &crate::ServiceConfig) {
    cfg.app_data(json_config(settings.json_limit))
        .route("/render", web::post().to(render))
        .route("/inspect", web::post().to(inspect))
        .route("/health", web::get().to(health));
}

/// POST /render: builds a deck from a template and returns it as a download.
pub async fn render(body: web::Json<RenderRequest>) -> actix_web::Result<HttpResponse> {
    let request = body.into_inner();
    let bytes = web::block(move || render_deck(&request)).await.map_err(worker_failed)??;

    Ok(HttpResponse::Ok()
        .content_type(PPTX_MEDIA_TYPE)
        .insert_header((header::CONTENT_DISPOSITION, ATTACHMENT))
        .body(bytes))
}

/// POST /inspect: lists template slide texts with a default layout mapping.
pub async fn inspect(body: web::Json<InspectRequest>) -> actix_web::Result<HttpResponse> {
    let template_path = body.into_inner().template_path;
    let summary = web::block(move || inspect_template(&template_path)).await.map_err(worker_failed)??;

    Ok(HttpResponse::Ok().json(summary))
}

/// GET /health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::TemplateOpen { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        }
        json_error(status, &self.to_string())
    }
}

fn json_error(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message }))
}

fn worker_failed(e: BlockingError) -> actix_web::Error {
    log::error!("Render worker failed: {e}");
    InternalError::from_response(e, json_error(StatusCode::INTERNAL_SERVER_ERROR, "render worker failed")).into()
}

/// Answers malformed or oversized JSON bodies with the JSON error shape instead of plain text.
fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            let status = err.status_code();
            let message = format!("Invalid request body: {err}");
            log::warn!("{message}");
            InternalError::from_response(err, json_error(status, &message)).into()
        })
}
