//! Ingestion endpoints used by the news and market data pipelines.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{json_body, path_params, query_params, AppState};
use crate::domain::entities::{
    NewNewsAnalysisResult, NewPriceObservation, NewRawNews, NewSentimentObservation,
    NewsAnalysisResult, PriceObservation, RawNews, SentimentObservation,
};
use crate::domain::errors::{ApiError, ValidationError};
use crate::domain::repositories::DateRange;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RawNewsQuery {
    /// Filter by analysis status; required
    pub status: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub analysis_status: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SummaryQuery {
    pub commodity: Option<String>,
}

/// Inclusive date bounds for price history
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// Raw news

pub async fn create_raw_news(
    State(service): State<AppState>,
    payload: Result<Json<NewRawNews>, JsonRejection>,
) -> Result<Json<RawNews>, ApiError> {
    let input = json_body(payload)?;
    Ok(Json(service.ingest_raw_news(input).await?))
}

pub async fn list_raw_news(
    State(service): State<AppState>,
    params: Result<Query<RawNewsQuery>, QueryRejection>,
) -> Result<Json<Vec<RawNews>>, ApiError> {
    let status = query_params(params)?
        .status
        .ok_or(ValidationError::MissingField("status"))?;
    Ok(Json(service.raw_news_by_status(status).await?))
}

pub async fn get_raw_news(
    State(service): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<RawNews>, ApiError> {
    let id = path_params(id)?;
    Ok(Json(service.raw_news(id).await?))
}

/// Mark a raw article as analysed (or not)
pub async fn update_raw_news_status(
    State(service): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = path_params(id)?;
    let update = json_body(payload)?;
    service.mark_raw_news(id, update.analysis_status).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// News analysis

pub async fn create_news_analysis(
    State(service): State<AppState>,
    payload: Result<Json<NewNewsAnalysisResult>, JsonRejection>,
) -> Result<Json<NewsAnalysisResult>, ApiError> {
    let input = json_body(payload)?;
    Ok(Json(service.ingest_analysis(input).await?))
}

pub async fn list_news_analysis(
    State(service): State<AppState>,
    raw_news_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<NewsAnalysisResult>>, ApiError> {
    let raw_news_id = path_params(raw_news_id)?;
    Ok(Json(service.analyses_for(raw_news_id).await?))
}

// Daily market summaries

pub async fn create_daily_summary(
    State(service): State<AppState>,
    payload: Result<Json<NewSentimentObservation>, JsonRejection>,
) -> Result<Json<SentimentObservation>, ApiError> {
    let input = json_body(payload)?;
    Ok(Json(service.ingest_daily_summary(input).await?))
}

pub async fn list_daily_summaries(
    State(service): State<AppState>,
    params: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<Vec<SentimentObservation>>, ApiError> {
    let params = query_params(params)?;
    Ok(Json(
        service.daily_summaries(params.commodity.as_deref()).await?,
    ))
}

pub async fn get_daily_summary(
    State(service): State<AppState>,
    path: Result<Path<(NaiveDate, String)>, PathRejection>,
) -> Result<Json<SentimentObservation>, ApiError> {
    let (date, commodity) = path_params(path)?;
    Ok(Json(service.daily_summary(date, &commodity).await?))
}

// Price history

pub async fn create_price(
    State(service): State<AppState>,
    payload: Result<Json<NewPriceObservation>, JsonRejection>,
) -> Result<Json<PriceObservation>, ApiError> {
    let input = json_body(payload)?;
    Ok(Json(service.ingest_price(input).await?))
}

/// Prices for one commodity, newest first
pub async fn get_price_history(
    State(service): State<AppState>,
    commodity: Result<Path<String>, PathRejection>,
    params: Result<Query<PriceRangeQuery>, QueryRejection>,
) -> Result<Json<Vec<PriceObservation>>, ApiError> {
    let commodity = path_params(commodity)?;
    let params = query_params(params)?;
    let range = DateRange {
        start: params.start_date,
        end: params.end_date,
    };
    Ok(Json(service.price_history(&commodity, range).await?))
}
