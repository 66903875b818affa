use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use super::{path_params, query_params, AppState};
use crate::domain::entities::{NewsArticle, NewsFeedItem};
use crate::domain::errors::ApiError;

/// Query parameters for the news feed
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FeedQuery {
    /// Items to return (default 10, clamped to 1..=50)
    pub limit: Option<usize>,
}

pub async fn get_news_article(
    State(service): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<NewsArticle>, ApiError> {
    let id = path_params(id)?;
    Ok(Json(service.article(id).await?))
}

/// Most recent relevant articles across all commodities
pub async fn get_latest_news(
    State(service): State<AppState>,
) -> Result<Json<Vec<NewsArticle>>, ApiError> {
    Ok(Json(service.latest_news().await?))
}

/// Compact feed with relative publish times
pub async fn get_latest_news_feed(
    State(service): State<AppState>,
    params: Result<Query<FeedQuery>, QueryRejection>,
) -> Result<Json<Vec<NewsFeedItem>>, ApiError> {
    let params = query_params(params)?;
    Ok(Json(service.news_feed(params.limit).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_state;
    use crate::domain::entities::NewRawNews;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};

    async fn seed_news(state: &AppState, count: usize) {
        for i in 0..count {
            state
                .ingest_raw_news(NewRawNews {
                    commodity: "금".into(),
                    title: format!("금 시장 소식 {}", i),
                    content: "금 가격이 안정세를 보이고 있다".into(),
                    source_url: None,
                    published_time: Utc::now() - Duration::hours(i as i64),
                    relevant_news: true,
                    analysis_status: false,
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_get_news_article_not_found() {
        let result = get_news_article(State(test_state()), Ok(Path(404))).await;

        assert!(result.is_err());
        assert_eq!(result.err().unwrap().status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_article_without_analysis_is_pending() {
        let state = test_state();
        seed_news(&state, 1).await;

        let article = get_news_article(State(state), Ok(Path(1))).await.unwrap().0;
        assert_eq!(article.commodity_id, 5);
        assert_eq!(article.sentiment_score, 0.0);
        assert_eq!(article.keywords, vec!["분석중"]);
        assert!(article.snippet.ends_with("..."));
    }

    #[tokio::test]
    async fn test_feed_limit_is_clamped() {
        let state = test_state();
        seed_news(&state, 3).await;

        let feed = get_latest_news_feed(
            State(state.clone()),
            Ok(Query(FeedQuery { limit: Some(0) })),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].emoji, "🥇");
        assert_eq!(feed[0].time_ago, "방금 전");

        let feed = get_latest_news_feed(State(state), Ok(Query(FeedQuery::default())))
            .await
            .unwrap()
            .0;
        assert_eq!(feed.len(), 3);
    }
}
