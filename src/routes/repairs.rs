use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{NotificationKind, UpdateRepairStatus};
use crate::services::RepairService;

/// PATCH /api/repairs/{repair_id}/status
/// Applies one state-machine step to a ticket.
///
/// The transition is durable before the triggered customer notification
/// is dispatched in the background; a failed send never undoes it.
pub async fn update_status(
    service: web::Data<RepairService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateRepairStatus>,
) -> AppResult<HttpResponse> {
    let repair = service
        .update_status(path.into_inner(), body.status)
        .await?;

    Ok(HttpResponse::Ok().json(repair))
}

/// POST /api/repairs/{repair_id}/notify
/// Sends a notification right away and returns the per-channel outcome.
///
/// Unknown notification kinds are rejected at deserialization with a 400;
/// there is no fallback to a status update.
pub async fn send_notification(
    service: web::Data<RepairService>,
    path: web::Path<Uuid>,
    body: web::Json<NotificationKind>,
) -> AppResult<HttpResponse> {
    let result = service
        .send_notification(path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    50
}

/// GET /api/repairs/{repair_id}/notifications
/// Lists recent notification attempts for a ticket, newest first.
pub async fn notification_history(
    service: web::Data<RepairService>,
    path: web::Path<Uuid>,
    query: web::Query<HistoryQuery>,
) -> AppResult<HttpResponse> {
    let limit = query.limit.clamp(1, 100);
    let history = service
        .notification_history(path.into_inner(), limit)
        .await?;

    Ok(HttpResponse::Ok().json(history))
}

/// Configure repair routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/repairs")
            .route("/{repair_id}/status", web::patch().to(update_status))
            .route("/{repair_id}/notify", web::post().to(send_notification))
            .route(
                "/{repair_id}/notifications",
                web::get().to(notification_history),
            ),
    );
}
