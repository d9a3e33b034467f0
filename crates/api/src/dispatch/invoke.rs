use super::{dispatch, Trigger};
use crate::error::CalendarError;
use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use econ_calendar_api_structs::invoke::RequestBody;
use econ_calendar_infra::CalendarContext;
use tracing::warn;

/// Single entry point for queue messages and scheduled triggers
pub async fn invoke_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<CalendarContext>,
) -> Result<HttpResponse, CalendarError> {
    let trigger = Trigger::parse(&body.0).map_err(|e| {
        warn!("Dropping invocation. {}", e);
        e
    })?;

    dispatch(trigger, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(res))
}

/// Bodies that are not json never reach `Trigger::parse`, so they are dropped here
pub fn invoke_payload_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let e = CalendarError::UnrecognizedTrigger(err.to_string());
    warn!("Dropping invocation. {}", e);
    e.into()
}
