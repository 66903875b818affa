use axum::{
    extract::{DefaultBodyLimit, State},
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

use crate::application::handlers::{
    alert_handler, chat_handler, commodity_handler, ingestion_handler, market_handler,
    news_handler, AppState,
};
use crate::config::AppConfig;
use crate::rate_limit::{create_rate_limiter, rate_limit_middleware, RateLimiterConfig};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
}

/// Health check endpoint
async fn health_check(State(service): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        storage: service.backend_name().to_string(),
    })
}

/// Routes without middleware
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        // Dashboard reads
        .route("/api/commodities", get(commodity_handler::list_commodities))
        .route("/api/commodities/:id", get(commodity_handler::get_commodity))
        .route(
            "/api/commodities/:id/history",
            get(commodity_handler::get_commodity_history),
        )
        .route(
            "/api/commodities/:id/news",
            get(commodity_handler::get_commodity_news),
        )
        .route("/api/news/:id", get(news_handler::get_news_article))
        .route("/api/latest-news", get(news_handler::get_latest_news))
        .route(
            "/api/latest-news-feed",
            get(news_handler::get_latest_news_feed),
        )
        .route(
            "/api/sentiment-alert",
            get(market_handler::get_sentiment_alert),
        )
        .route(
            "/api/top-gainers-losers",
            get(market_handler::get_top_gainers_losers),
        )
        .route("/api/top-movers", get(market_handler::get_top_movers))
        // Chat and alerts
        .route("/api/rag-chatbot", post(chat_handler::post_chat))
        .route("/api/chat-messages", get(chat_handler::list_chat_messages))
        .route(
            "/api/email-alerts",
            post(alert_handler::create_email_alert).get(alert_handler::list_email_alerts),
        )
        // Ingestion
        .route(
            "/api/raw-news",
            post(ingestion_handler::create_raw_news).get(ingestion_handler::list_raw_news),
        )
        .route("/api/raw-news/:id", get(ingestion_handler::get_raw_news))
        .route(
            "/api/raw-news/:id/status",
            patch(ingestion_handler::update_raw_news_status),
        )
        .route(
            "/api/news-analysis",
            post(ingestion_handler::create_news_analysis),
        )
        .route(
            "/api/news-analysis/:raw_news_id",
            get(ingestion_handler::list_news_analysis),
        )
        .route(
            "/api/daily-summary",
            post(ingestion_handler::create_daily_summary)
                .get(ingestion_handler::list_daily_summaries),
        )
        .route(
            "/api/daily-summary/:date/:commodity",
            get(ingestion_handler::get_daily_summary),
        )
        .route("/api/price-history", post(ingestion_handler::create_price))
        .route(
            "/api/price-history/:commodity",
            get(ingestion_handler::get_price_history),
        )
}

/// Full application router with tracing, body limit and rate limiting
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let mut router = api_routes();

    match create_rate_limiter(RateLimiterConfig {
        requests_per_minute: config.rate_limit_per_minute,
    }) {
        Some(limiter) => {
            info!(
                "Rate limiting enabled: {} requests/minute",
                config.rate_limit_per_minute
            );
            router = router.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
        }
        None => info!("Rate limiting disabled"),
    }

    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
