use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{query_params, AppState};
use crate::domain::errors::ApiError;
use crate::domain::services::movers::{MoverPeriod, TopMovers};
use crate::domain::services::sentiment_alert::SentimentAlert;

/// Query parameters for the movers endpoint
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MoversQuery {
    /// One of 1d, 7d, 30d, 1y (default 1d)
    pub period: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopMoversResponse {
    pub period: MoverPeriod,
    #[serde(flatten)]
    pub movers: TopMovers,
}

/// The sharpest sentiment move, or `null` when no commodity qualifies
pub async fn get_sentiment_alert(
    State(service): State<AppState>,
) -> Result<Json<Option<SentimentAlert>>, ApiError> {
    Ok(Json(service.sentiment_alert().await?))
}

/// Gainers and losers over the trailing week
pub async fn get_top_gainers_losers(
    State(service): State<AppState>,
) -> Result<Json<TopMovers>, ApiError> {
    Ok(Json(service.top_gainers_losers().await?))
}

pub async fn get_top_movers(
    State(service): State<AppState>,
    params: Result<Query<MoversQuery>, QueryRejection>,
) -> Result<Json<TopMoversResponse>, ApiError> {
    let params = query_params(params)?;
    let period = match params.period.as_deref() {
        Some(raw) => raw.parse::<MoverPeriod>()?,
        None => MoverPeriod::default(),
    };

    let movers = service.top_movers(period).await?;
    Ok(Json(TopMoversResponse { period, movers }))
}
