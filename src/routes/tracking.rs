use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::services::TrackingService;

/// GET /api/track/{token}
/// Public, unauthenticated repair lookup.
///
/// The token may be a ticket number, an email address, or a phone number
/// in any common formatting; classification happens server-side. Returns
/// a (possibly empty) list of sanitized summaries; a token with no usable
/// shape is a 400.
pub async fn track(
    service: web::Data<TrackingService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let summaries = service.find_trackable(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(summaries))
}

/// Configure public tracking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/track").route("/{token}", web::get().to(track)));
}
