use crate::domain::entities::{Commodity, PriceObservation, SentimentObservation};
use crate::domain::services::price_change::latest_price_change;

/// Keywords shown when neither a summary nor stored defaults exist
pub const DEFAULT_SNAPSHOT_KEYWORDS: [&str; 2] = ["시장분석", "동향"];

/// Refresh a stored commodity with its latest observations.
///
/// `recent_prices` is ordered by date descending; only the first two rows
/// matter.
pub fn build_snapshot(
    stored: &Commodity,
    latest_summary: Option<&SentimentObservation>,
    recent_prices: &[PriceObservation],
) -> Commodity {
    let keywords = match latest_summary {
        Some(summary) if !summary.daily_keywords.is_empty() => summary.daily_keywords.flatten(),
        _ if !stored.keywords.is_empty() => stored.keywords.clone(),
        _ => DEFAULT_SNAPSHOT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
    };

    Commodity {
        id: stored.id,
        name: stored.name.clone(),
        english_name: stored.english_name.clone(),
        sentiment_score: latest_summary
            .map(|s| s.daily_sentiment_score)
            .unwrap_or(stored.sentiment_score),
        price: recent_prices
            .first()
            .map(|p| p.closing_price)
            .unwrap_or(stored.price),
        price_change: latest_price_change(recent_prices),
        keywords,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog;
    use crate::domain::entities::KeywordSet;
    use chrono::NaiveDate;

    fn price(day: u32, value: f64) -> PriceObservation {
        PriceObservation {
            id: day as i64,
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            commodity: "금".into(),
            closing_price: value,
        }
    }

    #[test]
    fn test_snapshot_without_observations_keeps_stored_values() {
        let stored = Commodity::from_profile(catalog::by_id(5).unwrap());
        let snapshot = build_snapshot(&stored, None, &[]);
        assert_eq!(snapshot.price, stored.price);
        assert_eq!(snapshot.sentiment_score, stored.sentiment_score);
        assert_eq!(snapshot.price_change, 0.0);
        assert_eq!(snapshot.keywords, stored.keywords);
    }

    #[test]
    fn test_snapshot_uses_latest_rows() {
        let stored = Commodity::from_profile(catalog::by_id(5).unwrap());
        let summary = SentimentObservation {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            commodity: "금".into(),
            daily_sentiment_score: 77.0,
            rationale: Some("달러 약세".into()),
            daily_keywords: KeywordSet {
                negative: vec!["금리".into()],
                ..Default::default()
            },
            article_count: 4,
        };
        let prices = vec![price(2, 2000.0), price(1, 1950.0)];
        let snapshot = build_snapshot(&stored, Some(&summary), &prices);
        assert_eq!(snapshot.price, 2000.0);
        assert_eq!(snapshot.price_change, 2.56);
        assert_eq!(snapshot.sentiment_score, 77.0);
        assert_eq!(snapshot.keywords, vec!["금리"]);
    }

    #[test]
    fn test_snapshot_default_keywords() {
        let mut stored = Commodity::from_profile(catalog::by_id(2).unwrap());
        stored.keywords.clear();
        let snapshot = build_snapshot(&stored, None, &[]);
        assert_eq!(snapshot.keywords, vec!["시장분석", "동향"]);
    }
}
