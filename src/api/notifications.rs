use actix_web::{get, put, web, HttpResponse};

use crate::models::user::{MarkReadRequest, Notification, User};
use crate::services::auth_service::Claims;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub unread_count: usize,
    pub notifications: Vec<Notification>,
}

/// GET /api/notifications - Caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses((status = 200, description = "Notifications and unread count", body = NotificationsResponse)),
    security(("bearer_auth" = []))
)]
#[get("")]
pub async fn list_notifications(state: web::Data<AppState>, claims: web::ReqData<Claims>) -> AppResult<HttpResponse> {
    let user = state.repo::<User>().get(&claims.user_id).await?;
    let unread_count = user.unread_count();

    let mut notifications = user.notifications;
    notifications.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(HttpResponse::Ok().json(NotificationsResponse { unread_count, notifications }))
}

fn parse_ids(raw: serde_json::Value) -> AppResult<Vec<String>> {
    match raw {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect()),
        _ => Err(AppError::BadRequest("notificationIds must be an array".to_string())),
    }
}

/// PUT /api/notifications/read - Marks the listed notifications read
#[utoipa::path(
    put,
    path = "/api/notifications/read",
    tag = "Notifications",
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Remaining unread count"),
        (status = 400, description = "notificationIds is not an array")
    ),
    security(("bearer_auth" = []))
)]
#[put("/read")]
pub async fn mark_read(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    body: web::Json<MarkReadRequest>,
) -> AppResult<HttpResponse> {
    let ids = parse_ids(body.into_inner().notification_ids)?;

    let user = state
        .repo::<User>()
        .update(&claims.user_id, |user| {
            user.mark_read(&ids);
            Ok(())
        })
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Notifications marked as read",
        "unreadCount": user.unread_count(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_must_be_an_array() {
        assert_eq!(parse_ids(json!("abc")).unwrap_err().to_string(), "notificationIds must be an array");
        assert_eq!(parse_ids(json!(["a", 1, "b"])).unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
