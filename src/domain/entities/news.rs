use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::keywords::KeywordSet;
use crate::domain::entities::observation::canonical_commodity;
use crate::domain::errors::ValidationError;

/// Article as collected by the ingestion pipeline, before analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNews {
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

fn default_relevant() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRawNews {
    pub commodity: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub source_url: Option<String>,
    pub published_time: DateTime<Utc>,
    #[serde(default = "default_relevant")]
    pub relevant_news: bool,
    #[serde(default)]
    pub analysis_status: bool,
}

impl NewRawNews {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        self.commodity = canonical_commodity(&self.commodity)?;
        Ok(self)
    }
}

/// Sentiment analysis of a single raw article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsAnalysisResult {
    pub id: i64,
    pub raw_news_id: i64,
    pub sentiment_score: f64,
    pub keywords: KeywordSet,
    pub rationale: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNewsAnalysisResult {
    pub raw_news_id: i64,
    pub sentiment_score: f64,
    #[serde(default)]
    pub keywords: KeywordSet,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl NewNewsAnalysisResult {
    pub fn validate(self) -> Result<Self, ValidationError> {
        if !self.sentiment_score.is_finite() {
            return Err(ValidationError::MustBeFinite);
        }
        Ok(self)
    }
}

/// A raw article joined with its analysis, if any
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArticle {
    pub raw: RawNews,
    pub analysis: Option<NewsAnalysisResult>,
}

/// News article as served to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: i64,
    pub commodity_id: i64,
    pub title: String,
    pub content: String,
    pub snippet: String,
    pub sentiment_score: f64,
    pub keywords: Vec<String>,
    pub published_at: DateTime<Utc>,
}

/// Latest-news feed entry with relative time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsFeedItem {
    pub id: i64,
    pub title: String,
    pub commodity: String,
    pub emoji: String,
    pub time_ago: String,
    pub published_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_news_defaults() {
        let input: NewRawNews = serde_json::from_str(
            r#"{"commodity":"gold","title":"금값 상승","content":"본문","publishedTime":"2024-05-01T09:00:00Z"}"#,
        )
        .unwrap();
        assert!(input.relevant_news);
        assert!(!input.analysis_status);
        assert_eq!(input.validate().unwrap().commodity, "금");
    }

    #[test]
    fn test_raw_news_requires_title() {
        let input = NewRawNews {
            commodity: "gold".into(),
            title: "   ".into(),
            content: "본문".into(),
            source_url: None,
            published_time: Utc::now(),
            relevant_news: true,
            analysis_status: false,
        };
        assert_eq!(
            input.validate().unwrap_err(),
            ValidationError::MissingField("title")
        );
    }
}
