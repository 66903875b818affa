//! Market Store Trait
//!
//! The `MarketStore` trait is the storage port behind the REST layer. The
//! in-memory and SQLite stores implement it with the same semantics so the
//! backend can be chosen at startup and swapped in tests.
//!
//! Ordering contract:
//! - price and summary lists are newest first unless stated otherwise
//! - article lists are ordered by published time, newest first
//! - chat and subscription lists are newest first

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::entities::{
    ChatLogEntry, Commodity, EmailAlertSubscription, NewChatLogEntry, NewEmailAlert,
    NewNewsAnalysisResult, NewPriceObservation, NewRawNews, NewSentimentObservation,
    NewsAnalysisResult, PriceObservation, RawNews, SentimentObservation, StoredArticle,
};
use crate::domain::errors::StorageError;

/// Common result type for store operations
pub type StoreResult<T> = Result<T, StorageError>;

/// Inclusive date bounds; `None` leaves that side open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Short backend name for health output and logs
    fn backend_name(&self) -> &'static str;

    // Commodities

    /// Stored commodities in ascending id order
    async fn list_commodities(&self) -> StoreResult<Vec<Commodity>>;

    async fn get_commodity(&self, id: i64) -> StoreResult<Option<Commodity>>;

    // Price history

    async fn create_price(&self, input: NewPriceObservation) -> StoreResult<PriceObservation>;

    /// Prices for one commodity within `range`, newest first
    async fn price_history(
        &self,
        commodity: &str,
        range: DateRange,
    ) -> StoreResult<Vec<PriceObservation>>;

    /// The `limit` most recent prices for one commodity, newest first
    async fn recent_prices(&self, commodity: &str, limit: usize)
        -> StoreResult<Vec<PriceObservation>>;

    /// Prices of every commodity dated on or after `since`
    async fn prices_since(&self, since: NaiveDate) -> StoreResult<Vec<PriceObservation>>;

    // Daily market summaries

    async fn create_daily_summary(
        &self,
        input: NewSentimentObservation,
    ) -> StoreResult<SentimentObservation>;

    async fn daily_summary(
        &self,
        date: NaiveDate,
        commodity: &str,
    ) -> StoreResult<Option<SentimentObservation>>;

    /// Summaries newest first, optionally for a single commodity
    async fn daily_summaries(&self, commodity: Option<&str>)
        -> StoreResult<Vec<SentimentObservation>>;

    // Raw news and analysis

    async fn create_raw_news(&self, input: NewRawNews) -> StoreResult<RawNews>;

    async fn get_raw_news(&self, id: i64) -> StoreResult<Option<RawNews>>;

    async fn raw_news_by_status(&self, analysis_status: bool) -> StoreResult<Vec<RawNews>>;

    /// Returns `false` when no row has that id
    async fn set_raw_news_status(&self, id: i64, analysis_status: bool) -> StoreResult<bool>;

    async fn create_analysis(&self, input: NewNewsAnalysisResult)
        -> StoreResult<NewsAnalysisResult>;

    async fn analyses_for(&self, raw_news_id: i64) -> StoreResult<Vec<NewsAnalysisResult>>;

    async fn article(&self, id: i64) -> StoreResult<Option<StoredArticle>>;

    async fn articles_for_commodity(
        &self,
        commodity: &str,
        limit: usize,
    ) -> StoreResult<Vec<StoredArticle>>;

    /// Most recent articles flagged as relevant
    async fn latest_relevant_articles(&self, limit: usize) -> StoreResult<Vec<StoredArticle>>;

    // Chat log

    async fn create_chat_message(&self, input: NewChatLogEntry) -> StoreResult<ChatLogEntry>;

    async fn chat_messages(&self) -> StoreResult<Vec<ChatLogEntry>>;

    // Email alerts

    async fn create_email_alert(&self, input: NewEmailAlert)
        -> StoreResult<EmailAlertSubscription>;

    async fn email_alerts(&self) -> StoreResult<Vec<EmailAlertSubscription>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        let range = DateRange {
            start: Some(d(2)),
            end: Some(d(4)),
        };
        assert!(!range.contains(d(1)));
        assert!(range.contains(d(2)));
        assert!(range.contains(d(4)));
        assert!(!range.contains(d(5)));
        assert!(DateRange::default().contains(d(1)));
    }
}
