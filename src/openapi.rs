use crate::error::ApiErrorBody;
use crate::models::{OtpAccepted, OtpRequest, OtpSent, OtpValidation};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::request_otp,
        crate::routes::validate_otp,
        crate::routes::health,
    ),
    components(schemas(OtpRequest, OtpValidation, OtpSent, OtpAccepted, ApiErrorBody)),
    tags(
        (name = "otp", description = "One-time passcode issue and validation"),
    )
)]
pub struct ApiDoc;
