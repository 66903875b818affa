use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::{json_body, AppState};
use crate::domain::entities::{EmailAlertSubscription, NewEmailAlert};
use crate::domain::errors::ApiError;

/// Register an email alert subscription
pub async fn create_email_alert(
    State(service): State<AppState>,
    payload: Result<Json<NewEmailAlert>, JsonRejection>,
) -> Result<Json<EmailAlertSubscription>, ApiError> {
    let input = json_body(payload)?;
    Ok(Json(service.subscribe(input).await?))
}

pub async fn list_email_alerts(
    State(service): State<AppState>,
) -> Result<Json<Vec<EmailAlertSubscription>>, ApiError> {
    Ok(Json(service.subscriptions().await?))
}
