// src/handlers.rs
use crate::{AppState, errors::CarspotError, models::*, views};
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, http::header, web};
use futures_util::TryStreamExt;
use serde::Deserialize;
use std::time::Instant;

const IMAGE_FIELD: &str = "image";

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home))
        .route("/prediction", web::get().to(prediction_page))
        .route("/prediction/select", web::post().to(select_image))
        .route("/prediction/detect", web::post().to(detect))
        .route("/prediction/reset", web::post().to(reset))
        .route("/analytics", web::get().to(analytics_page))
        .route("/analytics/login", web::post().to(login))
        .route("/analytics/logout", web::post().to(logout))
        .route("/analytics/refresh", web::post().to(refresh_stats))
        .service(
            web::scope("/api")
                .route("/history", web::get().to(history))
                .route("/remote/predictions", web::get().to(remote_predictions)),
        )
        .route("/health", web::get().to(health_check));
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub async fn home() -> HttpResponse {
    html(views::home::render())
}

pub async fn prediction_page(data: web::Data<AppState>) -> HttpResponse {
    let controller = data.session.controller.lock().await;
    html(views::prediction::render(&controller, None))
}

/// Re-renders the prediction page with a message that did not change any state.
async fn prediction_rejected(data: &AppState, err: &CarspotError) -> HttpResponse {
    let controller = data.session.controller.lock().await;
    let body = views::prediction::render(&controller, Some(&err.to_string()));
    HttpResponse::build(actix_web::ResponseError::status_code(err))
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub async fn select_image(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let mut upload = None;

    while let Some(mut field) = payload.try_next().await? {
        if field.name() != IMAGE_FIELD {
            while field.try_next().await?.is_some() {}
            continue;
        }

        let filename = field
            .content_disposition()
            .get_filename()
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
            .to_string();

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        // Collect image data
        let mut image_data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if image_data.len() + chunk.len() > data.config.max_upload_bytes {
                let err = CarspotError::InvalidImage(format!(
                    "a file larger than {} bytes",
                    data.config.max_upload_bytes
                ));
                return Ok(prediction_rejected(&data, &err).await);
            }
            image_data.extend_from_slice(&chunk);
        }

        upload = Some(SelectedImage {
            filename,
            content_type,
            data: image_data.into(),
        });
    }

    let Some(image) = upload else {
        let err = CarspotError::InvalidImage("no file".to_string());
        return Ok(prediction_rejected(&data, &err).await);
    };

    match data.session.select_image(image).await {
        Ok(()) => Ok(see_other("/prediction")),
        Err(e) => Ok(prediction_rejected(&data, &e).await),
    }
}

pub async fn detect(data: web::Data<AppState>) -> HttpResponse {
    match data.session.detect().await {
        Err(e @ CarspotError::Busy) => prediction_rejected(&data, &e).await,
        // Other failures are recorded on the controller and shown by the page.
        _ => see_other("/prediction"),
    }
}

pub async fn reset(data: web::Data<AppState>) -> HttpResponse {
    data.session.reset().await;
    see_other("/prediction")
}

pub async fn analytics_page(data: web::Data<AppState>) -> HttpResponse {
    if !data.session.gate.lock().await.is_unlocked() {
        return html(views::analytics::render_login(false));
    }

    let dashboard = data.session.dashboard.lock().await;
    let history = data.session.history.read().await;
    html(views::analytics::render_dashboard(
        &dashboard,
        history.entries(),
        Instant::now(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

pub async fn login(form: web::Form<LoginForm>, data: web::Data<AppState>) -> HttpResponse {
    match data.session.login(&form.password).await {
        Ok(()) => see_other("/analytics"),
        Err(_) => HttpResponse::Unauthorized()
            .content_type("text/html; charset=utf-8")
            .body(views::analytics::render_login(true)),
    }
}

pub async fn logout(data: web::Data<AppState>) -> HttpResponse {
    data.session.logout().await;
    see_other("/analytics")
}

pub async fn refresh_stats(data: web::Data<AppState>) -> HttpResponse {
    if data.session.gate.lock().await.is_unlocked() {
        data.session.refresh_stats().await;
    }
    see_other("/analytics")
}

pub async fn history(data: web::Data<AppState>) -> HttpResponse {
    let history = data.session.history.read().await;
    HttpResponse::Ok().json(history.entries())
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

pub async fn remote_predictions(
    query: web::Query<PageQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, CarspotError> {
    let rows = data
        .session
        .classifier()
        .recent_predictions(query.skip, query.limit.min(500))
        .await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Sends near-miss page URLs (such as a trailing slash) to the canonical page.
pub async fn not_found(req: actix_web::HttpRequest) -> HttpResponse {
    match views::Page::from_path(req.path()) {
        Some(page) if page.path() != req.path() => see_other(page.path()),
        _ => HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(views::layout(views::Page::Home, "<h1>Page not found</h1>")),
    }
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "carspot",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
