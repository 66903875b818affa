use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::catalog;
use crate::domain::entities::keywords::KeywordSet;
use crate::domain::errors::ValidationError;

/// Daily closing price of a commodity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    pub id: i64,
    pub date: NaiveDate,
    /// Localized commodity name
    pub commodity: String,
    pub closing_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPriceObservation {
    pub date: NaiveDate,
    pub commodity: String,
    pub closing_price: f64,
}

impl NewPriceObservation {
    /// Check the price and rewrite the commodity to its localized name
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if !self.closing_price.is_finite() {
            return Err(ValidationError::MustBeFinite);
        }
        self.commodity = canonical_commodity(&self.commodity)?;
        Ok(self)
    }
}

/// Daily market summary: the externally computed sentiment for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentObservation {
    pub id: i64,
    pub date: NaiveDate,
    pub commodity: String,
    pub daily_sentiment_score: f64,
    pub rationale: Option<String>,
    pub daily_keywords: KeywordSet,
    pub article_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSentimentObservation {
    pub date: NaiveDate,
    pub commodity: String,
    pub daily_sentiment_score: f64,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub daily_keywords: KeywordSet,
    #[serde(default)]
    pub article_count: i64,
}

impl NewSentimentObservation {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if !self.daily_sentiment_score.is_finite() {
            return Err(ValidationError::MustBeFinite);
        }
        self.commodity = canonical_commodity(&self.commodity)?;
        Ok(self)
    }
}

pub(crate) fn canonical_commodity(name: &str) -> Result<String, ValidationError> {
    catalog::resolve(name)
        .map(|profile| profile.name.to_string())
        .ok_or_else(|| ValidationError::UnknownCommodity(name.to_string()))
}
