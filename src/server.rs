use crate::{
    config::Config,
    error::ThumbnailError,
    logger::log_startup_info,
    models::{ErrorResponse, GenerateRequest, PreviewQuery},
    pipeline::ThumbnailPipeline,
};
use actix_web::{
    dev::Service,
    error::InternalError,
    http::{header, StatusCode},
    web, App, HttpResponse, HttpServer, ResponseError,
};
use serde_json::json;
use std::{io, time::Instant};
use uuid::Uuid;

pub const PREVIEW_CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=86400";
const MAX_BODY_BYTES: usize = 64 * 1024;

pub struct AppState {
    pub pipeline: ThumbnailPipeline,
}

impl AppState {
    pub fn new(pipeline: ThumbnailPipeline) -> Self {
        Self { pipeline }
    }
}

impl ResponseError for ThumbnailError {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ThumbnailError::CompositionError(_) => {
                log::error!("Invariant violated while compositing: {}", self);
            }
            e if e.is_client_error() => log::debug!("Rejected request: {}", e),
            e => log::error!("Request failed: {}", e),
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse { error: message })
}

/// Malformed bodies and unknown enum values become `400 {"error": ...}`.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req| {
            let response = bad_request(err.to_string());
            InternalError::from_response(err, response).into()
        })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = bad_request(err.to_string());
        InternalError::from_response(err, response).into()
    })
}

async fn generate(
    state: web::Data<AppState>,
    body: web::Json<GenerateRequest>,
) -> Result<HttpResponse, ThumbnailError> {
    let generated = state.pipeline.generate(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(generated.into_response()))
}

async fn preview(
    state: web::Data<AppState>,
    query: web::Query<PreviewQuery>,
) -> Result<HttpResponse, ThumbnailError> {
    let title = query.into_inner().title.unwrap_or_default();
    let png = state.pipeline.preview(&title).await?;
    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .insert_header((header::CACHE_CONTROL, PREVIEW_CACHE_CONTROL))
        .body(png))
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "analyzer": state.pipeline.analyzer_name(),
        "imageProviders": state.pipeline.background_providers(),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/generate", web::post().to(generate))
        .route("/preview", web::get().to(preview))
        .route("/health", web::get().to(health));
}

pub async fn run(config: Config) -> io::Result<()> {
    let port = config.port_or_default();
    let pipeline = ThumbnailPipeline::from_config(&config)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(AppState::new(pipeline));

    log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(configure)
            .wrap_fn(|req, srv| {
                let request_id = Uuid::new_v4();
                let method = req.method().clone();
                let path = req.path().to_string();
                let started = Instant::now();
                log::debug!("[{}] {} {}", request_id, method, path);
                let response = srv.call(req);
                async move {
                    let response = response.await?;
                    log::info!(
                        "[{}] {} {} → {} in {}ms",
                        request_id,
                        method,
                        path,
                        response.status().as_u16(),
                        started.elapsed().as_millis()
                    );
                    Ok(response)
                }
            })
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
