use std::sync::Arc;

use actix_web::{web, HttpResponse};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::models::*;
use crate::notify::{mask_subject, Notifier};
use crate::otp::OtpManager;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/otp")
            .service(web::resource("/request").route(web::post().to(request_otp)))
            .service(web::resource("/validate").route(web::post().to(validate_otp))),
    );
    cfg.route("/health", web::get().to(health));
}

/// Exposed separately so tests and embedders can skip the Prometheus recorder.
pub fn metrics_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(render_metrics));
}

#[derive(Clone)]
pub struct AppState {
    pub otp: OtpManager,
    pub notifier: Arc<dyn Notifier>,
}

#[utoipa::path(
    post,
    path = "/otp/request",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "Code issued and handed to the notifier", body = OtpSent),
        (status = 400, description = "Missing mobile number", body = crate::error::ApiErrorBody)
    )
)]
pub async fn request_otp(
    data: web::Data<AppState>,
    payload: web::Json<OtpRequest>,
) -> Result<HttpResponse, ApiError> {
    let subject = payload.into_inner().mobile_number;
    if subject.trim().is_empty() {
        return Err(ApiError::BadRequest("mobileNumber is required"));
    }

    let code = data.otp.generate(&subject);
    info!(subject = %mask_subject(&subject), "otp requested");

    // Delivery runs detached; a failed send leaves the issued code untouched.
    let notifier = data.notifier.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = notifier.notify(&subject, &code).await {
            warn!(subject = %mask_subject(&subject), "otp delivery failed: {e}");
        }
    });

    Ok(HttpResponse::Ok().json(OtpSent {
        message: "otp sent".into(),
        expires_in_secs: data.otp.validity().as_secs(),
    }))
}

#[utoipa::path(
    post,
    path = "/otp/validate",
    request_body = OtpValidation,
    responses(
        (status = 200, description = "Code accepted and consumed", body = OtpAccepted),
        (status = 400, description = "Missing mobile number or code", body = crate::error::ApiErrorBody),
        (status = 401, description = "Invalid or expired code", body = crate::error::ApiErrorBody)
    )
)]
pub async fn validate_otp(
    data: web::Data<AppState>,
    payload: web::Json<OtpValidation>,
) -> Result<HttpResponse, ApiError> {
    let OtpValidation { mobile_number, otp } = payload.into_inner();
    if mobile_number.trim().is_empty() {
        return Err(ApiError::BadRequest("mobileNumber is required"));
    }
    if otp.is_empty() {
        return Err(ApiError::BadRequest("otp is required"));
    }

    if !data.otp.validate(&mobile_number, &otp) {
        info!(subject = %mask_subject(&mobile_number), "otp rejected");
        return Err(ApiError::Unauthorized);
    }
    info!(subject = %mask_subject(&mobile_number), "otp accepted");
    Ok(HttpResponse::Ok().json(OtpAccepted { message: "otp is valid".into() }))
}

#[utoipa::path(get, path = "/health", responses((status = 200, description = "Service is up")))]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status":"ok"}))
}

pub async fn render_metrics(handle: web::Data<PrometheusHandle>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(handle.render())
}
