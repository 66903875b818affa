//! Database Models
//!
//! Row shapes for the SQLite tables. Keyword sets and string lists are kept
//! as JSON text and decoded when a row is turned into a domain entity.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::domain::entities::{
    AlertFrequency, ChatLogEntry, Commodity, EmailAlertSubscription, KeywordSet,
    NewsAnalysisResult, PriceObservation, RawNews, SentimentObservation, StoredArticle,
};
use crate::domain::errors::StorageError;

/// Commodity record in database
#[derive(Debug, Clone, FromRow)]
pub struct CommodityRecord {
    pub id: i64,
    pub name: String,
    pub english_name: String,
    pub sentiment_score: f64,
    pub price: f64,
    pub price_change: f64,
    pub keywords: String, // JSON array
}

impl TryFrom<CommodityRecord> for Commodity {
    type Error = StorageError;

    fn try_from(row: CommodityRecord) -> Result<Self, Self::Error> {
        Ok(Commodity {
            id: row.id,
            name: row.name,
            english_name: row.english_name,
            sentiment_score: row.sentiment_score,
            price: row.price,
            price_change: row.price_change,
            keywords: serde_json::from_str(&row.keywords)?,
        })
    }
}

/// Price history record in database
#[derive(Debug, Clone, FromRow)]
pub struct PriceRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub commodity: String,
    pub closing_price: f64,
}

impl From<PriceRecord> for PriceObservation {
    fn from(row: PriceRecord) -> Self {
        PriceObservation {
            id: row.id,
            date: row.date,
            commodity: row.commodity,
            closing_price: row.closing_price,
        }
    }
}

/// Daily market summary record in database
#[derive(Debug, Clone, FromRow)]
pub struct SummaryRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub commodity: String,
    pub daily_sentiment_score: f64,
    pub rationale: Option<String>,
    pub daily_keywords: String, // JSON keyword set
    pub article_count: i64,
}

impl TryFrom<SummaryRecord> for SentimentObservation {
    type Error = StorageError;

    fn try_from(row: SummaryRecord) -> Result<Self, Self::Error> {
        Ok(SentimentObservation {
            id: row.id,
            date: row.date,
            commodity: row.commodity,
            daily_sentiment_score: row.daily_sentiment_score,
            rationale: row.rationale,
            daily_keywords: serde_json::from_str(&row.daily_keywords)?,
            article_count: row.article_count,
        })
    }
}

/// Raw news record in database
#[derive(Debug, Clone, FromRow)]
pub struct RawNewsRecord {
    pub id: i64,
    pub commodity: String,
    pub title: String,
    pub content: String,
    pub source_url: Option<String>,
    pub published_time: DateTime<Utc>,
    pub relevant_news: bool,
    pub analysis_status: bool,
    pub created_at: DateTime<Utc>,
}

impl From<RawNewsRecord> for RawNews {
    fn from(row: RawNewsRecord) -> Self {
        RawNews {
            id: row.id,
            commodity: row.commodity,
            title: row.title,
            content: row.content,
            source_url: row.source_url,
            published_time: row.published_time,
            relevant_news: row.relevant_news,
            analysis_status: row.analysis_status,
            created_at: row.created_at,
        }
    }
}

/// News analysis record in database
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisRecord {
    pub id: i64,
    pub raw_news_id: i64,
    pub sentiment_score: f64,
    pub keywords: String, // JSON keyword set
    pub rationale: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AnalysisRecord> for NewsAnalysisResult {
    type Error = StorageError;

    fn try_from(row: AnalysisRecord) -> Result<Self, Self::Error> {
        Ok(NewsAnalysisResult {
            id: row.id,
            raw_news_id: row.raw_news_id,
            sentiment_score: row.sentiment_score,
            keywords: serde_json::from_str(&row.keywords)?,
            rationale: row.rationale,
            created_at: row.created_at,
        })
    }
}

/// Raw news left-joined with its latest analysis
#[derive(Debug, Clone, FromRow)]
pub struct ArticleRecord {
    #[sqlx(flatten)]
    pub raw: RawNewsRecord,
    pub analysis_id: Option<i64>,
    pub analysis_score: Option<f64>,
    pub analysis_keywords: Option<String>,
    pub analysis_rationale: Option<String>,
    pub analysis_created_at: Option<DateTime<Utc>>,
}

impl TryFrom<ArticleRecord> for StoredArticle {
    type Error = StorageError;

    fn try_from(row: ArticleRecord) -> Result<Self, Self::Error> {
        let analysis = match (row.analysis_id, row.analysis_score, row.analysis_created_at) {
            (Some(id), Some(sentiment_score), Some(created_at)) => {
                let keywords: KeywordSet = match row.analysis_keywords {
                    Some(json) => serde_json::from_str(&json)?,
                    None => KeywordSet::default(),
                };
                Some(NewsAnalysisResult {
                    id,
                    raw_news_id: row.raw.id,
                    sentiment_score,
                    keywords,
                    rationale: row.analysis_rationale,
                    created_at,
                })
            }
            _ => None,
        };
        Ok(StoredArticle {
            raw: row.raw.into(),
            analysis,
        })
    }
}

/// Chat message record in database
#[derive(Debug, Clone, FromRow)]
pub struct ChatRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatRecord> for ChatLogEntry {
    fn from(row: ChatRecord) -> Self {
        ChatLogEntry {
            id: row.id,
            question: row.question,
            answer: row.answer,
            created_at: row.created_at,
        }
    }
}

/// Email alert record in database
#[derive(Debug, Clone, FromRow)]
pub struct EmailAlertRecord {
    pub id: i64,
    pub email: String,
    pub commodities: String, // JSON array
    pub frequency: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EmailAlertRecord> for EmailAlertSubscription {
    type Error = StorageError;

    fn try_from(row: EmailAlertRecord) -> Result<Self, Self::Error> {
        let frequency: AlertFrequency = row
            .frequency
            .parse()
            .map_err(StorageError::CorruptRecord)?;
        Ok(EmailAlertSubscription {
            id: row.id,
            email: row.email,
            commodities: serde_json::from_str(&row.commodities)?,
            frequency,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_frequency_is_reported() {
        let row = EmailAlertRecord {
            id: 1,
            email: "a@b.com".into(),
            commodities: r#"["corn"]"#.into(),
            frequency: "monthly".into(),
            created_at: Utc::now(),
        };
        let err = EmailAlertSubscription::try_from(row).unwrap_err();
        assert!(matches!(err, StorageError::CorruptRecord(_)));
    }

    #[test]
    fn test_article_without_analysis_columns() {
        let now = Utc::now();
        let row = ArticleRecord {
            raw: RawNewsRecord {
                id: 3,
                commodity: "밀".into(),
                title: "t".into(),
                content: "c".into(),
                source_url: None,
                published_time: now,
                relevant_news: true,
                analysis_status: false,
                created_at: now,
            },
            analysis_id: None,
            analysis_score: None,
            analysis_keywords: None,
            analysis_rationale: None,
            analysis_created_at: None,
        };
        let article = StoredArticle::try_from(row).unwrap();
        assert!(article.analysis.is_none());
        assert_eq!(article.raw.id, 3);
    }
}
