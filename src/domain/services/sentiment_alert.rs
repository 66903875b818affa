//! Sentiment Alert Selection
//!
//! Picks the commodity whose sentiment moved the most over the last three
//! observations. The window is positional: the latest daily summary is
//! compared with the one three rows earlier, which only spans three calendar
//! days when there is exactly one summary per day. When the rows span a
//! different number of days the alert still fires but is marked with
//! `gap_detected`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::entities::{Commodity, NewsArticle, SentimentObservation};
use crate::domain::services::price_change::round_to;

/// Rows between the compared observations
pub const LOOKBACK_OBSERVATIONS: usize = 3;

/// Sentiment history for one commodity, with its most recent article
#[derive(Debug, Clone)]
pub struct AlertCandidate<'a> {
    pub commodity: &'a Commodity,
    pub history: &'a [SentimentObservation],
    pub latest_news: Option<&'a NewsArticle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentAlert {
    pub commodity_id: i64,
    pub commodity: String,
    pub english_name: String,
    /// `to - from`, one decimal
    pub score_change: f64,
    pub from: f64,
    pub to: f64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    /// Calendar days between the compared observations
    pub window_days: i64,
    pub gap_detected: bool,
    pub headline: String,
    pub summary: String,
}

/// Alert for a single commodity, or `None` with fewer than four observations
pub fn evaluate(candidate: &AlertCandidate<'_>) -> Option<SentimentAlert> {
    if candidate.history.len() <= LOOKBACK_OBSERVATIONS {
        debug!(
            commodity = %candidate.commodity.name,
            observations = candidate.history.len(),
            "Not enough sentiment history for alert"
        );
        return None;
    }

    let mut ordered: Vec<&SentimentObservation> = candidate.history.iter().collect();
    ordered.sort_by_key(|obs| obs.date);

    let latest = ordered[ordered.len() - 1];
    let prior = ordered[ordered.len() - 1 - LOOKBACK_OBSERVATIONS];
    let score_change = round_to(
        latest.daily_sentiment_score - prior.daily_sentiment_score,
        1,
    );
    let window_days = (latest.date - prior.date).num_days();
    let gap_detected = window_days != LOOKBACK_OBSERVATIONS as i64;

    if gap_detected {
        warn!(
            commodity = %candidate.commodity.name,
            from = %prior.date,
            to = %latest.date,
            window_days,
            "Sentiment history has gaps, alert window is not three days"
        );
    }

    let name = &candidate.commodity.name;
    let (headline, summary) = match candidate.latest_news {
        Some(article) => (article.title.clone(), article.snippet.clone()),
        None => (
            format!("{} 시장 동향", name),
            format!("{}의 시장 센티먼트가 변화하고 있습니다.", name),
        ),
    };

    Some(SentimentAlert {
        commodity_id: candidate.commodity.id,
        commodity: name.clone(),
        english_name: candidate.commodity.english_name.clone(),
        score_change,
        from: prior.daily_sentiment_score,
        to: latest.daily_sentiment_score,
        from_date: prior.date,
        to_date: latest.date,
        window_days,
        gap_detected,
        headline,
        summary,
    })
}

/// The candidate with the largest absolute score change.
///
/// Ties go to the lowest commodity id.
pub fn select_sentiment_alert(candidates: &[AlertCandidate<'_>]) -> Option<SentimentAlert> {
    candidates
        .iter()
        .filter_map(evaluate)
        .fold(None, |best: Option<SentimentAlert>, alert| match best {
            Some(current)
                if current.score_change.abs() > alert.score_change.abs()
                    || (current.score_change.abs() == alert.score_change.abs()
                        && current.commodity_id <= alert.commodity_id) =>
            {
                Some(current)
            }
            _ => Some(alert),
        })
}
