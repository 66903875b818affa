use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};

use super::{path_params, AppState};
use crate::domain::entities::{Commodity, NewsArticle, PriceObservation};
use crate::domain::errors::ApiError;

/// List every commodity with its latest price and sentiment
pub async fn list_commodities(
    State(service): State<AppState>,
) -> Result<Json<Vec<Commodity>>, ApiError> {
    Ok(Json(service.commodities().await?))
}

pub async fn get_commodity(
    State(service): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Commodity>, ApiError> {
    let id = path_params(id)?;
    Ok(Json(service.commodity(id).await?))
}

/// Price history for a commodity, oldest first
pub async fn get_commodity_history(
    State(service): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<PriceObservation>>, ApiError> {
    let id = path_params(id)?;
    Ok(Json(service.commodity_history(id).await?))
}

pub async fn get_commodity_news(
    State(service): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<NewsArticle>>, ApiError> {
    let id = path_params(id)?;
    Ok(Json(service.commodity_news(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_state;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_list_commodities_returns_catalog() {
        let result = list_commodities(State(test_state())).await;

        assert!(result.is_ok());
        let commodities = result.unwrap().0;
        assert_eq!(commodities.len(), 5);
        assert_eq!(commodities[0].name, "옥수수");
    }

    #[tokio::test]
    async fn test_get_commodity_not_found() {
        let result = get_commodity(State(test_state()), Ok(Path(999_999))).await;

        assert!(result.is_err());
        assert_eq!(result.err().unwrap().status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_history_and_news_empty_for_known_commodity() {
        let state = test_state();
        let history = get_commodity_history(State(state.clone()), Ok(Path(2)))
            .await
            .unwrap();
        assert!(history.0.is_empty());

        let news = get_commodity_news(State(state), Ok(Path(2))).await.unwrap();
        assert!(news.0.is_empty());
    }
}
