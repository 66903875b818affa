//! SQLite Market Store
//!
//! Data access layer implementing [`MarketStore`] over the sqlx pool.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{debug, error};

use super::models::*;
use super::DbPool;
use crate::domain::entities::{
    ChatLogEntry, Commodity, EmailAlertSubscription, NewChatLogEntry, NewEmailAlert,
    NewNewsAnalysisResult, NewPriceObservation, NewRawNews, NewSentimentObservation,
    NewsAnalysisResult, PriceObservation, RawNews, SentimentObservation, StoredArticle,
};
use crate::domain::errors::StorageError;
use crate::domain::repositories::{DateRange, MarketStore, StoreResult};

const ARTICLE_SELECT: &str = r#"
    SELECT r.id, r.commodity, r.title, r.content, r.source_url, r.published_time,
           r.relevant_news, r.analysis_status, r.created_at,
           a.id AS analysis_id,
           a.sentiment_score AS analysis_score,
           a.keywords AS analysis_keywords,
           a.rationale AS analysis_rationale,
           a.created_at AS analysis_created_at
    FROM raw_news r
    LEFT JOIN news_analysis_results a
        ON a.id = (SELECT MAX(id) FROM news_analysis_results WHERE raw_news_id = r.id)
"#;

/// Log a failed query and wrap it as a storage error
fn query_failed(context: &'static str) -> impl FnOnce(sqlx::Error) -> StorageError {
    move |e| {
        error!("Failed to {}: {}", context, e);
        StorageError::Database(e)
    }
}

fn collect<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StorageError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Market store backed by SQLite
pub struct SqliteMarketStore {
    pool: DbPool,
}

impl SqliteMarketStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarketStore for SqliteMarketStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn list_commodities(&self) -> StoreResult<Vec<Commodity>> {
        let rows = sqlx::query_as::<_, CommodityRecord>("SELECT * FROM commodities ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(query_failed("list commodities"))?;
        collect(rows)
    }

    async fn get_commodity(&self, id: i64) -> StoreResult<Option<Commodity>> {
        let row = sqlx::query_as::<_, CommodityRecord>("SELECT * FROM commodities WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed("get commodity"))?;
        row.map(Commodity::try_from).transpose()
    }

    async fn create_price(&self, input: NewPriceObservation) -> StoreResult<PriceObservation> {
        let row = sqlx::query_as::<_, PriceRecord>(
            r#"
            INSERT INTO price_history (date, commodity, closing_price, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, date, commodity, closing_price
            "#,
        )
        .bind(input.date)
        .bind(&input.commodity)
        .bind(input.closing_price)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(query_failed("create price observation"))?;

        debug!("Created price observation: {} for {}", row.id, row.commodity);
        Ok(row.into())
    }

    async fn price_history(
        &self,
        commodity: &str,
        range: DateRange,
    ) -> StoreResult<Vec<PriceObservation>> {
        let rows = sqlx::query_as::<_, PriceRecord>(
            r#"
            SELECT id, date, commodity, closing_price FROM price_history
            WHERE commodity = ?1
              AND (?2 IS NULL OR date >= ?2)
              AND (?3 IS NULL OR date <= ?3)
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(commodity)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("get price history"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn recent_prices(
        &self,
        commodity: &str,
        limit: usize,
    ) -> StoreResult<Vec<PriceObservation>> {
        let rows = sqlx::query_as::<_, PriceRecord>(
            r#"
            SELECT id, date, commodity, closing_price FROM price_history
            WHERE commodity = ?1
            ORDER BY date DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(commodity)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("get recent prices"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn prices_since(&self, since: NaiveDate) -> StoreResult<Vec<PriceObservation>> {
        let rows = sqlx::query_as::<_, PriceRecord>(
            r#"
            SELECT id, date, commodity, closing_price FROM price_history
            WHERE date >= ?1
            ORDER BY date ASC, id ASC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("get prices in window"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_daily_summary(
        &self,
        input: NewSentimentObservation,
    ) -> StoreResult<SentimentObservation> {
        let keywords = serde_json::to_string(&input.daily_keywords)?;
        let row = sqlx::query_as::<_, SummaryRecord>(
            r#"
            INSERT INTO daily_market_summary
                (date, commodity, daily_sentiment_score, rationale, daily_keywords,
                 article_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id, date, commodity, daily_sentiment_score, rationale,
                      daily_keywords, article_count
            "#,
        )
        .bind(input.date)
        .bind(&input.commodity)
        .bind(input.daily_sentiment_score)
        .bind(&input.rationale)
        .bind(&keywords)
        .bind(input.article_count)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(query_failed("create daily summary"))?;

        debug!("Created daily summary: {} for {} on {}", row.id, row.commodity, row.date);
        row.try_into()
    }

    async fn daily_summary(
        &self,
        date: NaiveDate,
        commodity: &str,
    ) -> StoreResult<Option<SentimentObservation>> {
        let row = sqlx::query_as::<_, SummaryRecord>(
            r#"
            SELECT id, date, commodity, daily_sentiment_score, rationale,
                   daily_keywords, article_count
            FROM daily_market_summary
            WHERE date = ?1 AND commodity = ?2
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(date)
        .bind(commodity)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed("get daily summary"))?;
        row.map(SentimentObservation::try_from).transpose()
    }

    async fn daily_summaries(
        &self,
        commodity: Option<&str>,
    ) -> StoreResult<Vec<SentimentObservation>> {
        let rows = sqlx::query_as::<_, SummaryRecord>(
            r#"
            SELECT id, date, commodity, daily_sentiment_score, rationale,
                   daily_keywords, article_count
            FROM daily_market_summary
            WHERE ?1 IS NULL OR commodity = ?1
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(commodity)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("list daily summaries"))?;
        collect(rows)
    }

    async fn create_raw_news(&self, input: NewRawNews) -> StoreResult<RawNews> {
        let row = sqlx::query_as::<_, RawNewsRecord>(
            r#"
            INSERT INTO raw_news
                (commodity, title, content, source_url, published_time,
                 relevant_news, analysis_status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING *
            "#,
        )
        .bind(&input.commodity)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.source_url)
        .bind(input.published_time)
        .bind(input.relevant_news)
        .bind(input.analysis_status)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(query_failed("create raw news"))?;

        debug!("Created raw news: {} for {}", row.id, row.commodity);
        Ok(row.into())
    }

    async fn get_raw_news(&self, id: i64) -> StoreResult<Option<RawNews>> {
        let row = sqlx::query_as::<_, RawNewsRecord>("SELECT * FROM raw_news WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed("get raw news"))?;
        Ok(row.map(Into::into))
    }

    async fn raw_news_by_status(&self, analysis_status: bool) -> StoreResult<Vec<RawNews>> {
        let rows = sqlx::query_as::<_, RawNewsRecord>(
            "SELECT * FROM raw_news WHERE analysis_status = ?1 ORDER BY id",
        )
        .bind(analysis_status)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("list raw news by status"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_raw_news_status(&self, id: i64, analysis_status: bool) -> StoreResult<bool> {
        let rows_affected = sqlx::query("UPDATE raw_news SET analysis_status = ?1 WHERE id = ?2")
            .bind(analysis_status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_failed("update raw news status"))?
            .rows_affected();

        debug!("Updated raw news {} analysis status: {}", id, analysis_status);
        Ok(rows_affected > 0)
    }

    async fn create_analysis(
        &self,
        input: NewNewsAnalysisResult,
    ) -> StoreResult<NewsAnalysisResult> {
        let keywords = serde_json::to_string(&input.keywords)?;
        let row = sqlx::query_as::<_, AnalysisRecord>(
            r#"
            INSERT INTO news_analysis_results
                (raw_news_id, sentiment_score, keywords, rationale, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING *
            "#,
        )
        .bind(input.raw_news_id)
        .bind(input.sentiment_score)
        .bind(&keywords)
        .bind(&input.rationale)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(query_failed("create news analysis"))?;
        row.try_into()
    }

    async fn analyses_for(&self, raw_news_id: i64) -> StoreResult<Vec<NewsAnalysisResult>> {
        let rows = sqlx::query_as::<_, AnalysisRecord>(
            "SELECT * FROM news_analysis_results WHERE raw_news_id = ?1 ORDER BY id",
        )
        .bind(raw_news_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("list news analysis"))?;
        collect(rows)
    }

    async fn article(&self, id: i64) -> StoreResult<Option<StoredArticle>> {
        let sql = format!("{} WHERE r.id = ?1", ARTICLE_SELECT);
        let row = sqlx::query_as::<_, ArticleRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed("get article"))?;
        row.map(StoredArticle::try_from).transpose()
    }

    async fn articles_for_commodity(
        &self,
        commodity: &str,
        limit: usize,
    ) -> StoreResult<Vec<StoredArticle>> {
        let sql = format!(
            "{} WHERE r.commodity = ?1 ORDER BY r.published_time DESC, r.id DESC LIMIT ?2",
            ARTICLE_SELECT
        );
        let rows = sqlx::query_as::<_, ArticleRecord>(&sql)
            .bind(commodity)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(query_failed("list commodity articles"))?;
        collect(rows)
    }

    async fn latest_relevant_articles(&self, limit: usize) -> StoreResult<Vec<StoredArticle>> {
        let sql = format!(
            "{} WHERE r.relevant_news = 1 ORDER BY r.published_time DESC, r.id DESC LIMIT ?1",
            ARTICLE_SELECT
        );
        let rows = sqlx::query_as::<_, ArticleRecord>(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(query_failed("list latest articles"))?;
        collect(rows)
    }

    async fn create_chat_message(&self, input: NewChatLogEntry) -> StoreResult<ChatLogEntry> {
        let row = sqlx::query_as::<_, ChatRecord>(
            r#"
            INSERT INTO chat_messages (question, answer, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING *
            "#,
        )
        .bind(&input.question)
        .bind(&input.answer)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(query_failed("create chat message"))?;
        Ok(row.into())
    }

    async fn chat_messages(&self) -> StoreResult<Vec<ChatLogEntry>> {
        let rows = sqlx::query_as::<_, ChatRecord>(
            "SELECT * FROM chat_messages ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("list chat messages"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_email_alert(
        &self,
        input: NewEmailAlert,
    ) -> StoreResult<EmailAlertSubscription> {
        let commodities = serde_json::to_string(&input.commodities)?;
        let row = sqlx::query_as::<_, EmailAlertRecord>(
            r#"
            INSERT INTO email_alerts (email, commodities, frequency, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(&input.email)
        .bind(&commodities)
        .bind(input.frequency.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(query_failed("create email alert"))?;

        debug!("Created email alert: {} ({})", row.id, row.frequency);
        row.try_into()
    }

    async fn email_alerts(&self) -> StoreResult<Vec<EmailAlertSubscription>> {
        let rows = sqlx::query_as::<_, EmailAlertRecord>(
            "SELECT * FROM email_alerts ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("list email alerts"))?;
        collect(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AlertFrequency, KeywordSet};
    use crate::persistence::{init_database, DatabaseConfig};
    use chrono::TimeZone;

    async fn store() -> SqliteMarketStore {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            log_queries: false,
        };
        SqliteMarketStore::new(init_database(&config).await.unwrap())
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[tokio::test]
    async fn test_commodities_seeded() {
        let store = store().await;
        let commodities = store.list_commodities().await.unwrap();
        assert_eq!(commodities.len(), 5);
        assert_eq!(commodities[3].english_name, "WTI Oil");
        assert_eq!(commodities[0].keywords.len(), 3);
        assert!(store.get_commodity(999_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_price_crud_and_range() {
        let store = store().await;
        for (day, price) in [(1, 600.0), (2, 606.0), (3, 612.0)] {
            store
                .create_price(NewPriceObservation {
                    date: d(day),
                    commodity: "옥수수".into(),
                    closing_price: price,
                })
                .await
                .unwrap();
        }

        let recent = store.recent_prices("옥수수", 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, d(3));
        assert_eq!(recent[1].closing_price, 606.0);

        let bounded = store
            .price_history(
                "옥수수",
                DateRange {
                    start: Some(d(2)),
                    end: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(bounded.len(), 2);

        let all = store.price_history("옥수수", DateRange::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let window = store.prices_since(d(2)).await.unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].date, d(2));
    }

    #[tokio::test]
    async fn test_daily_summary_crud() {
        let store = store().await;
        let created = store
            .create_daily_summary(NewSentimentObservation {
                date: d(2),
                commodity: "금".into(),
                daily_sentiment_score: 81.5,
                rationale: Some("안전자산 선호".into()),
                daily_keywords: KeywordSet {
                    positive: vec!["안전자산".into()],
                    ..Default::default()
                },
                article_count: 12,
            })
            .await
            .unwrap();
        assert_eq!(created.daily_keywords.positive, vec!["안전자산"]);

        let fetched = store.daily_summary(d(2), "금").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert!(store.daily_summary(d(3), "금").await.unwrap().is_none());

        assert_eq!(store.daily_summaries(Some("금")).await.unwrap().len(), 1);
        assert_eq!(store.daily_summaries(Some("밀")).await.unwrap().len(), 0);
        assert_eq!(store.daily_summaries(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_articles_join_latest_analysis() {
        let store = store().await;
        let raw = store
            .create_raw_news(NewRawNews {
                commodity: "구리".into(),
                title: "구리 수요 급증".into(),
                content: "전기차 수요가 늘고 있다".into(),
                source_url: Some("https://example.com/a".into()),
                published_time: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
                relevant_news: true,
                analysis_status: false,
            })
            .await
            .unwrap();

        let bare = store.article(raw.id).await.unwrap().unwrap();
        assert!(bare.analysis.is_none());

        for score in [55.0, 70.0] {
            store
                .create_analysis(NewNewsAnalysisResult {
                    raw_news_id: raw.id,
                    sentiment_score: score,
                    keywords: KeywordSet::default(),
                    rationale: None,
                })
                .await
                .unwrap();
        }

        let joined = store.article(raw.id).await.unwrap().unwrap();
        assert_eq!(joined.analysis.unwrap().sentiment_score, 70.0);
        assert_eq!(store.analyses_for(raw.id).await.unwrap().len(), 2);
        assert_eq!(store.articles_for_commodity("구리", 10).await.unwrap().len(), 1);
        assert_eq!(store.latest_relevant_articles(10).await.unwrap().len(), 1);

        assert!(store.set_raw_news_status(raw.id, true).await.unwrap());
        assert!(!store.set_raw_news_status(9999, true).await.unwrap());
        assert_eq!(store.raw_news_by_status(true).await.unwrap().len(), 1);
        assert_eq!(store.raw_news_by_status(false).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_chat_and_email_alerts() {
        let store = store().await;
        let chat = store
            .create_chat_message(NewChatLogEntry {
                question: "corn?".into(),
                answer: "답변".into(),
            })
            .await
            .unwrap();
        assert_eq!(chat.id, 1);
        assert_eq!(store.chat_messages().await.unwrap().len(), 1);

        let alert = store
            .create_email_alert(NewEmailAlert {
                email: "a@b.com".into(),
                commodities: vec!["corn".into(), "gold".into()],
                frequency: AlertFrequency::OnUpdate,
            })
            .await
            .unwrap();
        assert_eq!(alert.frequency, AlertFrequency::OnUpdate);
        assert_eq!(alert.commodities, vec!["corn", "gold"]);

        let alerts = store.email_alerts().await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].email, "a@b.com");
    }
}
