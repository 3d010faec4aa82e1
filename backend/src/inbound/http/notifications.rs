//! Notification inbox HTTP handlers.
//!
//! ```text
//! GET  /api/v1/users/{id}/notifications?unreadOnly=true
//! POST /api/v1/users/{id}/notifications/{notificationId}/read
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Notification, NotificationId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, NotificationKindSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id};

/// One inbox entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBody {
    pub id: String,
    #[schema(value_type = NotificationKindSchema)]
    pub kind: String,
    pub payload: Value,
    #[schema(format = "date-time")]
    pub created_at: String,
    pub read: bool,
}

impl From<Notification> for NotificationBody {
    fn from(value: Notification) -> Self {
        Self {
            id: value.id.to_string(),
            kind: value.kind.to_string(),
            payload: value.payload,
            created_at: value.created_at.to_rfc3339(),
            read: value.read,
        }
    }
}

/// Inbox filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// List a user's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/notifications",
    params(("id" = String, Path, description = "Recipient identifier"), ListNotificationsQuery),
    responses(
        (status = 200, description = "Notifications", body = [NotificationBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/users/{id}/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ListNotificationsQuery>,
) -> ApiResult<web::Json<Vec<NotificationBody>>> {
    let recipient = parse_user_id(&path.into_inner(), FieldName::new("id"))?;
    let entries = state.inbox.list(recipient, query.unread_only).await?;
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

/// Mark one notification as read. Repeating the call is harmless.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/notifications/{notificationId}/read",
    params(
        ("id" = String, Path, description = "Recipient identifier"),
        ("notificationId" = String, Path, description = "Notification identifier")
    ),
    responses(
        (status = 204, description = "Marked as read"),
        (status = 404, description = "Unknown notification", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/users/{id}/notifications/{notification_id}/read")]
pub async fn mark_notification_read(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (user, notification) = path.into_inner();
    let recipient = parse_user_id(&user, FieldName::new("id"))?;
    state
        .inbox
        .mark_read(recipient, NotificationId::new(notification))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
