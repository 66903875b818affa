use serde::{Deserialize, Serialize};

use crate::domain::catalog::CommodityProfile;

/// Commodity snapshot as served to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commodity {
    pub id: i64,
    pub name: String,
    pub english_name: String,
    pub sentiment_score: f64,
    pub price: f64,
    /// Percent change between the two most recent closing prices
    pub price_change: f64,
    pub keywords: Vec<String>,
}

impl Commodity {
    /// Stored defaults for a catalog entry, before any observation exists
    pub fn from_profile(profile: &CommodityProfile) -> Self {
        Commodity {
            id: profile.id,
            name: profile.name.to_string(),
            english_name: profile.english_name.to_string(),
            sentiment_score: profile.base_score,
            price: profile.base_price,
            price_change: 0.0,
            keywords: profile
                .default_keywords
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog;

    #[test]
    fn test_from_profile() {
        let gold = Commodity::from_profile(catalog::by_id(5).unwrap());
        assert_eq!(gold.name, "금");
        assert_eq!(gold.english_name, "Gold");
        assert_eq!(gold.price, 1940.0);
        assert_eq!(gold.price_change, 0.0);
        assert_eq!(gold.keywords.len(), 3);
    }

    #[test]
    fn test_serializes_camel_case() {
        let corn = Commodity::from_profile(catalog::by_id(1).unwrap());
        let json = serde_json::to_value(&corn).unwrap();
        assert!(json.get("englishName").is_some());
        assert!(json.get("sentimentScore").is_some());
        assert!(json.get("priceChange").is_some());
    }
}
