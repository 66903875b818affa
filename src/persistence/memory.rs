//! In-memory Market Store
//!
//! Process-local implementation of [`MarketStore`]. Rows are append-only so
//! ids are assigned from the table length. Optionally seeded with random demo
//! history so the dashboard has something to show without a database.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::catalog::COMMODITIES;
use crate::domain::entities::{
    ChatLogEntry, Commodity, EmailAlertSubscription, KeywordSet, NewChatLogEntry,
    NewEmailAlert, NewNewsAnalysisResult, NewPriceObservation, NewRawNews,
    NewSentimentObservation, NewsAnalysisResult, PriceObservation, RawNews,
    SentimentObservation, StoredArticle,
};
use crate::domain::repositories::{DateRange, MarketStore, StoreResult};
use crate::domain::services::price_change::round_to;

#[derive(Debug, Default)]
struct MemoryState {
    commodities: Vec<Commodity>,
    prices: Vec<PriceObservation>,
    summaries: Vec<SentimentObservation>,
    raw_news: Vec<RawNews>,
    analyses: Vec<NewsAnalysisResult>,
    chat: Vec<ChatLogEntry>,
    alerts: Vec<EmailAlertSubscription>,
}

impl MemoryState {
    fn stored_article(&self, raw: &RawNews) -> StoredArticle {
        StoredArticle {
            raw: raw.clone(),
            analysis: self
                .analyses
                .iter()
                .filter(|a| a.raw_news_id == raw.id)
                .last()
                .cloned(),
        }
    }

    fn newest_articles<'a>(
        &self,
        rows: impl Iterator<Item = &'a RawNews>,
        limit: usize,
    ) -> Vec<StoredArticle> {
        let mut rows: Vec<&RawNews> = rows.collect();
        rows.sort_by(|a, b| {
            b.published_time
                .cmp(&a.published_time)
                .then(b.id.cmp(&a.id))
        });
        rows.into_iter()
            .take(limit)
            .map(|raw| self.stored_article(raw))
            .collect()
    }
}

/// Market store backed by process memory
pub struct MemoryMarketStore {
    state: RwLock<MemoryState>,
}

impl Default for MemoryMarketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMarketStore {
    /// Store holding the catalog commodities and nothing else
    pub fn new() -> Self {
        let state = MemoryState {
            commodities: COMMODITIES.iter().map(Commodity::from_profile).collect(),
            ..Default::default()
        };
        MemoryMarketStore {
            state: RwLock::new(state),
        }
    }

    /// Store seeded with `days` of random daily prices and summaries ending today
    pub fn with_demo_history<R: Rng>(days: u32, rng: &mut R) -> Self {
        let mut store = Self::new();
        let today = Utc::now().date_naive();
        {
            let state = store.state.get_mut();
            seed_demo_history(state, days, today, rng);
            info!(
                days,
                prices = state.prices.len(),
                summaries = state.summaries.len(),
                "Seeded in-memory store with demo history"
            );
        }
        store
    }
}

fn seed_demo_history<R: Rng>(state: &mut MemoryState, days: u32, today: NaiveDate, rng: &mut R) {
    for profile in COMMODITIES {
        for offset in (0..days as i64).rev() {
            let date = today - Duration::days(offset);
            // ±5% price and ±10% sentiment around the base values
            let price_factor = 1.0 + (rng.gen::<f64>() - 0.5) * 0.1;
            let score_factor = 1.0 + (rng.gen::<f64>() - 0.5) * 0.2;

            let price_id = state.prices.len() as i64 + 1;
            state.prices.push(PriceObservation {
                id: price_id,
                date,
                commodity: profile.name.to_string(),
                closing_price: round_to(profile.base_price * price_factor, 2),
            });

            let summary_id = state.summaries.len() as i64 + 1;
            state.summaries.push(SentimentObservation {
                id: summary_id,
                date,
                commodity: profile.name.to_string(),
                daily_sentiment_score: round_to(profile.base_score * score_factor, 1),
                rationale: None,
                daily_keywords: KeywordSet {
                    top_keywords: profile
                        .default_keywords
                        .iter()
                        .map(|k| k.to_string())
                        .collect(),
                    ..Default::default()
                },
                article_count: 0,
            });
        }
    }
}

fn newest_first<T, K: Ord>(rows: &mut [T], key: impl Fn(&T) -> K) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl MarketStore for MemoryMarketStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_commodities(&self) -> StoreResult<Vec<Commodity>> {
        let state = self.state.read().await;
        let mut commodities = state.commodities.clone();
        commodities.sort_by_key(|c| c.id);
        Ok(commodities)
    }

    async fn get_commodity(&self, id: i64) -> StoreResult<Option<Commodity>> {
        let state = self.state.read().await;
        Ok(state.commodities.iter().find(|c| c.id == id).cloned())
    }

    async fn create_price(&self, input: NewPriceObservation) -> StoreResult<PriceObservation> {
        let mut state = self.state.write().await;
        let record = PriceObservation {
            id: state.prices.len() as i64 + 1,
            date: input.date,
            commodity: input.commodity,
            closing_price: input.closing_price,
        };
        state.prices.push(record.clone());
        debug!(id = record.id, commodity = %record.commodity, "Stored price observation");
        Ok(record)
    }

    async fn price_history(
        &self,
        commodity: &str,
        range: DateRange,
    ) -> StoreResult<Vec<PriceObservation>> {
        let state = self.state.read().await;
        let mut rows: Vec<PriceObservation> = state
            .prices
            .iter()
            .filter(|p| p.commodity == commodity && range.contains(p.date))
            .cloned()
            .collect();
        newest_first(&mut rows, |p| (p.date, p.id));
        Ok(rows)
    }

    async fn recent_prices(
        &self,
        commodity: &str,
        limit: usize,
    ) -> StoreResult<Vec<PriceObservation>> {
        let mut rows = self.price_history(commodity, DateRange::default()).await?;
        rows.truncate(limit);
        Ok(rows)
    }

    async fn prices_since(&self, since: NaiveDate) -> StoreResult<Vec<PriceObservation>> {
        let state = self.state.read().await;
        Ok(state
            .prices
            .iter()
            .filter(|p| p.date >= since)
            .cloned()
            .collect())
    }

    async fn create_daily_summary(
        &self,
        input: NewSentimentObservation,
    ) -> StoreResult<SentimentObservation> {
        let mut state = self.state.write().await;
        let record = SentimentObservation {
            id: state.summaries.len() as i64 + 1,
            date: input.date,
            commodity: input.commodity,
            daily_sentiment_score: input.daily_sentiment_score,
            rationale: input.rationale,
            daily_keywords: input.daily_keywords,
            article_count: input.article_count,
        };
        state.summaries.push(record.clone());
        Ok(record)
    }

    async fn daily_summary(
        &self,
        date: NaiveDate,
        commodity: &str,
    ) -> StoreResult<Option<SentimentObservation>> {
        let state = self.state.read().await;
        Ok(state
            .summaries
            .iter()
            .filter(|s| s.date == date && s.commodity == commodity)
            .last()
            .cloned())
    }

    async fn daily_summaries(
        &self,
        commodity: Option<&str>,
    ) -> StoreResult<Vec<SentimentObservation>> {
        let state = self.state.read().await;
        let mut rows: Vec<SentimentObservation> = state
            .summaries
            .iter()
            .filter(|s| commodity.map_or(true, |c| s.commodity == c))
            .cloned()
            .collect();
        newest_first(&mut rows, |s| (s.date, s.id));
        Ok(rows)
    }

    async fn create_raw_news(&self, input: NewRawNews) -> StoreResult<RawNews> {
        let mut state = self.state.write().await;
        let record = RawNews {
            id: state.raw_news.len() as i64 + 1,
            commodity: input.commodity,
            title: input.title,
            content: input.content,
            source_url: input.source_url,
            published_time: input.published_time,
            relevant_news: input.relevant_news,
            analysis_status: input.analysis_status,
            created_at: Utc::now(),
        };
        state.raw_news.push(record.clone());
        Ok(record)
    }

    async fn get_raw_news(&self, id: i64) -> StoreResult<Option<RawNews>> {
        let state = self.state.read().await;
        Ok(state.raw_news.iter().find(|r| r.id == id).cloned())
    }

    async fn raw_news_by_status(&self, analysis_status: bool) -> StoreResult<Vec<RawNews>> {
        let state = self.state.read().await;
        Ok(state
            .raw_news
            .iter()
            .filter(|r| r.analysis_status == analysis_status)
            .cloned()
            .collect())
    }

    async fn set_raw_news_status(&self, id: i64, analysis_status: bool) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.raw_news.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.analysis_status = analysis_status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_analysis(
        &self,
        input: NewNewsAnalysisResult,
    ) -> StoreResult<NewsAnalysisResult> {
        let mut state = self.state.write().await;
        let record = NewsAnalysisResult {
            id: state.analyses.len() as i64 + 1,
            raw_news_id: input.raw_news_id,
            sentiment_score: input.sentiment_score,
            keywords: input.keywords,
            rationale: input.rationale,
            created_at: Utc::now(),
        };
        state.analyses.push(record.clone());
        Ok(record)
    }

    async fn analyses_for(&self, raw_news_id: i64) -> StoreResult<Vec<NewsAnalysisResult>> {
        let state = self.state.read().await;
        Ok(state
            .analyses
            .iter()
            .filter(|a| a.raw_news_id == raw_news_id)
            .cloned()
            .collect())
    }

    async fn article(&self, id: i64) -> StoreResult<Option<StoredArticle>> {
        let state = self.state.read().await;
        Ok(state
            .raw_news
            .iter()
            .find(|r| r.id == id)
            .map(|raw| state.stored_article(raw)))
    }

    async fn articles_for_commodity(
        &self,
        commodity: &str,
        limit: usize,
    ) -> StoreResult<Vec<StoredArticle>> {
        let state = self.state.read().await;
        Ok(state.newest_articles(
            state.raw_news.iter().filter(|r| r.commodity == commodity),
            limit,
        ))
    }

    async fn latest_relevant_articles(&self, limit: usize) -> StoreResult<Vec<StoredArticle>> {
        let state = self.state.read().await;
        Ok(state.newest_articles(state.raw_news.iter().filter(|r| r.relevant_news), limit))
    }

    async fn create_chat_message(&self, input: NewChatLogEntry) -> StoreResult<ChatLogEntry> {
        let mut state = self.state.write().await;
        let record = ChatLogEntry {
            id: state.chat.len() as i64 + 1,
            question: input.question,
            answer: input.answer,
            created_at: Utc::now(),
        };
        state.chat.push(record.clone());
        Ok(record)
    }

    async fn chat_messages(&self) -> StoreResult<Vec<ChatLogEntry>> {
        let state = self.state.read().await;
        Ok(state.chat.iter().rev().cloned().collect())
    }

    async fn create_email_alert(
        &self,
        input: NewEmailAlert,
    ) -> StoreResult<EmailAlertSubscription> {
        let mut state = self.state.write().await;
        let record = EmailAlertSubscription {
            id: state.alerts.len() as i64 + 1,
            email: input.email,
            commodities: input.commodities,
            frequency: input.frequency,
            created_at: Utc::now(),
        };
        state.alerts.push(record.clone());
        debug!(id = record.id, frequency = %record.frequency, "Stored email alert subscription");
        Ok(record)
    }

    async fn email_alerts(&self) -> StoreResult<Vec<EmailAlertSubscription>> {
        let state = self.state.read().await;
        Ok(state.alerts.iter().rev().cloned().collect())
    }
}
