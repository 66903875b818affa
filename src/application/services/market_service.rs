use crate::domain::catalog::{self, CommodityProfile};
use crate::domain::entities::{
    ChatLogEntry, Commodity, EmailAlertSubscription, NewChatLogEntry, NewEmailAlert,
    NewNewsAnalysisResult, NewPriceObservation, NewRawNews, NewSentimentObservation,
    NewsAnalysisResult, NewsArticle, NewsFeedItem, PriceObservation, RawNews,
    SentimentObservation,
};
use crate::domain::errors::{ApiError, ValidationError};
use crate::domain::repositories::{DateRange, MarketStore};
use crate::domain::services::chat_responder::CannedResponder;
use crate::domain::services::movers::{self, MoverPeriod, TopMovers, GAINERS_LOSERS_WINDOW_DAYS};
use crate::domain::services::news_feed::{self, ARTICLES_PER_PAGE};
use crate::domain::services::sentiment_alert::{self, AlertCandidate, SentimentAlert};
use crate::domain::services::snapshot::build_snapshot;
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Price rows needed for the day-over-day change
const SNAPSHOT_PRICE_ROWS: usize = 2;

pub type ServiceResult<T> = Result<T, ApiError>;

/// Read models and ingestion for the dashboard, on top of a [`MarketStore`]
pub struct MarketService {
    store: Arc<dyn MarketStore>,
    responder: CannedResponder,
}

impl MarketService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self {
            store,
            responder: CannedResponder::new(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    async fn stored_commodity(&self, id: i64) -> ServiceResult<Commodity> {
        self.store
            .get_commodity(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Commodity not found"))
    }

    /// Catalog entry for a commodity named in a read path
    fn profile_for_read(name: &str) -> ServiceResult<&'static CommodityProfile> {
        catalog::resolve(name).ok_or_else(|| ApiError::not_found(format!("Unknown commodity: {}", name)))
    }

    async fn snapshot(&self, stored: &Commodity) -> ServiceResult<Commodity> {
        let summaries = self.store.daily_summaries(Some(&stored.name)).await?;
        let prices = self
            .store
            .recent_prices(&stored.name, SNAPSHOT_PRICE_ROWS)
            .await?;
        Ok(build_snapshot(stored, summaries.first(), &prices))
    }

    // Commodities

    pub async fn commodities(&self) -> ServiceResult<Vec<Commodity>> {
        let stored = self.store.list_commodities().await?;
        let mut snapshots = Vec::with_capacity(stored.len());
        for commodity in &stored {
            snapshots.push(self.snapshot(commodity).await?);
        }
        debug!("Built {} commodity snapshots", snapshots.len());
        Ok(snapshots)
    }

    pub async fn commodity(&self, id: i64) -> ServiceResult<Commodity> {
        let stored = self.stored_commodity(id).await?;
        self.snapshot(&stored).await
    }

    /// Full price history for a commodity, oldest first
    pub async fn commodity_history(&self, id: i64) -> ServiceResult<Vec<PriceObservation>> {
        let stored = self.stored_commodity(id).await?;
        let mut history = self
            .store
            .price_history(&stored.name, DateRange::default())
            .await?;
        history.reverse();
        Ok(history)
    }

    pub async fn commodity_news(&self, id: i64) -> ServiceResult<Vec<NewsArticle>> {
        let stored = self.stored_commodity(id).await?;
        let articles = self
            .store
            .articles_for_commodity(&stored.name, ARTICLES_PER_PAGE)
            .await?;
        Ok(articles.iter().map(news_feed::to_article).collect())
    }

    // News

    pub async fn article(&self, id: i64) -> ServiceResult<NewsArticle> {
        self.store
            .article(id)
            .await?
            .map(|stored| news_feed::to_article(&stored))
            .ok_or_else(|| ApiError::not_found("News article not found"))
    }

    pub async fn latest_news(&self) -> ServiceResult<Vec<NewsArticle>> {
        let articles = self.store.latest_relevant_articles(ARTICLES_PER_PAGE).await?;
        Ok(articles.iter().map(news_feed::to_article).collect())
    }

    pub async fn news_feed(&self, limit: Option<usize>) -> ServiceResult<Vec<NewsFeedItem>> {
        let limit = news_feed::clamp_feed_limit(limit);
        let now = Utc::now();
        let articles = self.store.latest_relevant_articles(limit).await?;
        Ok(articles
            .iter()
            .map(|stored| news_feed::to_feed_item(stored, now))
            .collect())
    }

    // Market movements

    pub async fn sentiment_alert(&self) -> ServiceResult<Option<SentimentAlert>> {
        let commodities = self.store.list_commodities().await?;

        let mut histories = Vec::with_capacity(commodities.len());
        let mut latest_news = Vec::with_capacity(commodities.len());
        for commodity in &commodities {
            histories.push(self.store.daily_summaries(Some(&commodity.name)).await?);
            let article = self
                .store
                .articles_for_commodity(&commodity.name, 1)
                .await?
                .first()
                .map(news_feed::to_article);
            latest_news.push(article);
        }

        let candidates: Vec<AlertCandidate<'_>> = commodities
            .iter()
            .zip(&histories)
            .zip(&latest_news)
            .map(|((commodity, history), news)| AlertCandidate {
                commodity,
                history,
                latest_news: news.as_ref(),
            })
            .collect();

        let alert = sentiment_alert::select_sentiment_alert(&candidates);
        match &alert {
            Some(a) => info!(
                commodity = %a.commodity,
                score_change = a.score_change,
                "Selected sentiment alert"
            ),
            None => debug!("No commodity has enough sentiment history for an alert"),
        }
        Ok(alert)
    }

    async fn movers_over(&self, window_days: i64) -> ServiceResult<TopMovers> {
        let today = Utc::now().date_naive();
        let prices = self
            .store
            .prices_since(today - Duration::days(window_days))
            .await?;
        Ok(movers::top_movers(&prices, today, window_days))
    }

    pub async fn top_gainers_losers(&self) -> ServiceResult<TopMovers> {
        self.movers_over(GAINERS_LOSERS_WINDOW_DAYS).await
    }

    pub async fn top_movers(&self, period: MoverPeriod) -> ServiceResult<TopMovers> {
        self.movers_over(period.window_days()).await
    }

    // Chat

    /// Answer a question and record the exchange
    pub async fn chat(&self, question: &str) -> ServiceResult<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ValidationError::MissingField("question").into());
        }

        let topic = self.responder.match_topic(question).map(|t| t.name);
        let answer = self.responder.answer(question).to_string();
        info!(topic = topic.unwrap_or("fallback"), "Answered chat question");

        self.store
            .create_chat_message(NewChatLogEntry {
                question: question.to_string(),
                answer: answer.clone(),
            })
            .await?;
        Ok(answer)
    }

    pub async fn chat_messages(&self) -> ServiceResult<Vec<ChatLogEntry>> {
        Ok(self.store.chat_messages().await?)
    }

    // Email alerts

    pub async fn subscribe(&self, input: NewEmailAlert) -> ServiceResult<EmailAlertSubscription> {
        let input = input.validate()?;
        let subscription = self.store.create_email_alert(input).await?;
        info!(
            id = subscription.id,
            frequency = %subscription.frequency,
            "Created email alert subscription"
        );
        Ok(subscription)
    }

    pub async fn subscriptions(&self) -> ServiceResult<Vec<EmailAlertSubscription>> {
        Ok(self.store.email_alerts().await?)
    }

    // Ingestion

    pub async fn ingest_raw_news(&self, input: NewRawNews) -> ServiceResult<RawNews> {
        let input = input.validate()?;
        Ok(self.store.create_raw_news(input).await?)
    }

    pub async fn raw_news(&self, id: i64) -> ServiceResult<RawNews> {
        self.store
            .get_raw_news(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Raw news not found"))
    }

    pub async fn raw_news_by_status(&self, analysis_status: bool) -> ServiceResult<Vec<RawNews>> {
        Ok(self.store.raw_news_by_status(analysis_status).await?)
    }

    pub async fn mark_raw_news(&self, id: i64, analysis_status: bool) -> ServiceResult<()> {
        if self.store.set_raw_news_status(id, analysis_status).await? {
            Ok(())
        } else {
            Err(ApiError::not_found("Raw news not found"))
        }
    }

    pub async fn ingest_analysis(
        &self,
        input: NewNewsAnalysisResult,
    ) -> ServiceResult<NewsAnalysisResult> {
        let input = input.validate()?;
        if self.store.get_raw_news(input.raw_news_id).await?.is_none() {
            return Err(ApiError::not_found("Raw news not found"));
        }
        Ok(self.store.create_analysis(input).await?)
    }

    pub async fn analyses_for(&self, raw_news_id: i64) -> ServiceResult<Vec<NewsAnalysisResult>> {
        Ok(self.store.analyses_for(raw_news_id).await?)
    }

    pub async fn ingest_daily_summary(
        &self,
        input: NewSentimentObservation,
    ) -> ServiceResult<SentimentObservation> {
        let input = input.validate()?;
        Ok(self.store.create_daily_summary(input).await?)
    }

    pub async fn daily_summaries(
        &self,
        commodity: Option<&str>,
    ) -> ServiceResult<Vec<SentimentObservation>> {
        let name = commodity.map(Self::profile_for_read).transpose()?.map(|p| p.name);
        Ok(self.store.daily_summaries(name).await?)
    }

    pub async fn daily_summary(
        &self,
        date: NaiveDate,
        commodity: &str,
    ) -> ServiceResult<SentimentObservation> {
        let profile = Self::profile_for_read(commodity)?;
        self.store
            .daily_summary(date, profile.name)
            .await?
            .ok_or_else(|| ApiError::not_found("Daily summary not found"))
    }

    pub async fn ingest_price(&self, input: NewPriceObservation) -> ServiceResult<PriceObservation> {
        let input = input.validate()?;
        Ok(self.store.create_price(input).await?)
    }

    /// Prices for a commodity within an inclusive date range, newest first
    pub async fn price_history(
        &self,
        commodity: &str,
        range: DateRange,
    ) -> ServiceResult<Vec<PriceObservation>> {
        let profile = Self::profile_for_read(commodity)?;
        Ok(self.store.price_history(profile.name, range).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AlertFrequency, KeywordSet};
    use crate::persistence::MemoryMarketStore;
    use chrono::TimeZone;

    fn service() -> MarketService {
        MarketService::new(Arc::new(MemoryMarketStore::new()))
    }

    fn days_ago(n: i64) -> NaiveDate {
        Utc::now().date_naive() - Duration::days(n)
    }

    async fn add_price(service: &MarketService, commodity: &str, date: NaiveDate, price: f64) {
        service
            .ingest_price(NewPriceObservation {
                date,
                commodity: commodity.to_string(),
                closing_price: price,
            })
            .await
            .unwrap();
    }

    async fn add_summary(service: &MarketService, commodity: &str, date: NaiveDate, score: f64) {
        service
            .ingest_daily_summary(NewSentimentObservation {
                date,
                commodity: commodity.to_string(),
                daily_sentiment_score: score,
                rationale: None,
                daily_keywords: KeywordSet::default(),
                article_count: 0,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_commodity_snapshot_uses_latest_observations() {
        let service = service();
        add_price(&service, "corn", days_ago(1), 600.0).await;
        add_price(&service, "corn", days_ago(0), 612.0).await;
        add_summary(&service, "옥수수", days_ago(0), 91.0).await;

        let corn = service.commodity(1).await.unwrap();
        assert_eq!(corn.price, 612.0);
        assert_eq!(corn.price_change, 2.0);
        assert_eq!(corn.sentiment_score, 91.0);
    }

    #[tokio::test]
    async fn test_unknown_commodity_is_not_found() {
        let service = service();
        assert!(matches!(
            service.commodity(999_999).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service.commodity_history(999_999).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service.price_history("platinum", DateRange::default()).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_history_is_oldest_first() {
        let service = service();
        add_price(&service, "gold", days_ago(0), 1950.0).await;
        add_price(&service, "gold", days_ago(2), 1930.0).await;

        let history = service.commodity_history(5).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].date < history[1].date);
    }

    #[tokio::test]
    async fn test_sentiment_alert_uses_latest_article_headline() {
        let service = service();
        for (offset, score) in [(3, 50.0), (2, 52.0), (1, 55.0), (0, 62.5)] {
            add_summary(&service, "구리", days_ago(offset), score).await;
        }
        service
            .ingest_raw_news(NewRawNews {
                commodity: "copper".into(),
                title: "구리 가격 급등".into(),
                content: "수요 회복".into(),
                source_url: None,
                published_time: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
                relevant_news: true,
                analysis_status: false,
            })
            .await
            .unwrap();

        let alert = service.sentiment_alert().await.unwrap().unwrap();
        assert_eq!(alert.commodity, "구리");
        assert_eq!(alert.score_change, 12.5);
        assert_eq!(alert.headline, "구리 가격 급등");
        assert!(!alert.gap_detected);
    }

    #[tokio::test]
    async fn test_sentiment_alert_none_without_history() {
        assert!(service().sentiment_alert().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_top_movers_windows() {
        let service = service();
        add_price(&service, "corn", days_ago(5), 600.0).await;
        add_price(&service, "corn", days_ago(0), 660.0).await;
        add_price(&service, "wheat", days_ago(1), 340.0).await;
        add_price(&service, "wheat", days_ago(0), 323.0).await;

        let weekly = service.top_gainers_losers().await.unwrap();
        assert_eq!(weekly.gainers[0].commodity, "옥수수");
        assert_eq!(weekly.gainers[0].change, 10.0);
        assert_eq!(weekly.losers[0].change, -5.0);

        let daily = service.top_movers(MoverPeriod::OneDay).await.unwrap();
        assert!(daily.gainers.is_empty());
        assert_eq!(daily.losers.len(), 1);
    }

    #[tokio::test]
    async fn test_chat_records_exchange() {
        let service = service();
        let answer = service.chat("GOLD price?").await.unwrap();
        assert!(answer.contains("금"));
        assert!(matches!(
            service.chat("   ").await,
            Err(ApiError::Validation(ValidationError::MissingField("question")))
        ));
        assert_eq!(service.chat_messages().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_validates_input() {
        let service = service();
        let bad = NewEmailAlert {
            email: "not-an-email".into(),
            commodities: vec!["corn".into()],
            frequency: AlertFrequency::Daily,
        };
        assert!(matches!(
            service.subscribe(bad).await,
            Err(ApiError::Validation(ValidationError::InvalidEmail(_)))
        ));

        let good = NewEmailAlert {
            email: "a@b.com".into(),
            commodities: vec!["corn".into()],
            frequency: AlertFrequency::Daily,
        };
        let created = service.subscribe(good).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(service.subscriptions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_analysis_requires_existing_raw_news() {
        let service = service();
        let result = service
            .ingest_analysis(NewNewsAnalysisResult {
                raw_news_id: 42,
                sentiment_score: 60.0,
                keywords: KeywordSet::default(),
                rationale: None,
            })
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert!(matches!(
            service.mark_raw_news(42, true).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
