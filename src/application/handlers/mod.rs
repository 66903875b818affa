//! HTTP handlers
//!
//! Handlers take the shared [`MarketService`] as state. Extractor rejections
//! are taken as `Result` so malformed paths, query strings and bodies come
//! back as `400` with the usual `{"message": ...}` error body.

pub mod alert_handler;
pub mod chat_handler;
pub mod commodity_handler;
pub mod ingestion_handler;
pub mod market_handler;
pub mod news_handler;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;
use std::sync::Arc;

use crate::application::services::market_service::MarketService;
use crate::domain::errors::ApiError;

/// State shared by every handler
pub type AppState = Arc<MarketService>;

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

pub(crate) fn path_params<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(value)| value)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use crate::persistence::MemoryMarketStore;
    Arc::new(MarketService::new(Arc::new(MemoryMarketStore::new())))
}
