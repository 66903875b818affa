use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::domain::catalog;
use crate::domain::entities::PriceObservation;
use crate::domain::errors::ValidationError;
use crate::domain::services::price_change::percentage_change;

/// Maximum entries on each side of a movers board
pub const MAX_MOVERS_PER_SIDE: usize = 3;

/// Window used by the gainers/losers board
pub const GAINERS_LOSERS_WINDOW_DAYS: i64 = 7;

/// Look-back period for the top movers board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoverPeriod {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "1y")]
    OneYear,
}

impl Default for MoverPeriod {
    fn default() -> Self {
        MoverPeriod::OneDay
    }
}

impl MoverPeriod {
    pub fn window_days(&self) -> i64 {
        match self {
            MoverPeriod::OneDay => 1,
            MoverPeriod::SevenDays => 7,
            MoverPeriod::ThirtyDays => 30,
            MoverPeriod::OneYear => 365,
        }
    }
}

impl FromStr for MoverPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(MoverPeriod::OneDay),
            "7d" => Ok(MoverPeriod::SevenDays),
            "30d" => Ok(MoverPeriod::ThirtyDays),
            "1y" => Ok(MoverPeriod::OneYear),
            _ => Err(ValidationError::InvalidPeriod(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub commodity: String,
    pub english_name: String,
    /// Percent change across the window, 2 decimals
    pub change: f64,
    pub emoji: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopMovers {
    pub gainers: Vec<Mover>,
    pub losers: Vec<Mover>,
}

/// Rank commodities by price change over the trailing window ending at `as_of`.
///
/// Rows dated before `as_of - window_days` are ignored. A commodity needs at
/// least two rows inside the window. Gainers are sorted by change descending,
/// losers by change ascending (largest drop first); equal changes keep catalog
/// order.
pub fn top_movers(prices: &[PriceObservation], as_of: NaiveDate, window_days: i64) -> TopMovers {
    let window_start = as_of - Duration::days(window_days);

    let mut by_commodity: HashMap<&str, Vec<&PriceObservation>> = HashMap::new();
    for obs in prices.iter().filter(|o| o.date >= window_start && o.date <= as_of) {
        by_commodity.entry(obs.commodity.as_str()).or_default().push(obs);
    }

    let mut ranked: Vec<(i64, Mover)> = by_commodity
        .into_iter()
        .filter(|(_, rows)| rows.len() >= 2)
        .filter_map(|(name, rows)| {
            let oldest = rows.iter().min_by_key(|o| o.date)?;
            let newest = rows.iter().max_by_key(|o| o.date)?;
            let profile = catalog::resolve(name);
            let mover = Mover {
                commodity: name.to_string(),
                english_name: profile
                    .map(|p| p.english_name.to_string())
                    .unwrap_or_else(|| name.to_string()),
                change: percentage_change(newest.closing_price, oldest.closing_price),
                emoji: catalog::emoji_for(name).to_string(),
            };
            Some((profile.map(|p| p.id).unwrap_or(i64::MAX), mover))
        })
        .collect();

    ranked.sort_by(|a, b| a.0.cmp(&b.0));
    // stable sort keeps catalog order for equal changes
    ranked.sort_by(|a, b| b.1.change.total_cmp(&a.1.change));

    let gainers = ranked
        .iter()
        .filter(|(_, m)| m.change > 0.0)
        .take(MAX_MOVERS_PER_SIDE)
        .map(|(_, m)| m.clone())
        .collect();

    let mut losers: Vec<Mover> = ranked
        .iter()
        .filter(|(_, m)| m.change < 0.0)
        .map(|(_, m)| m.clone())
        .collect();
    losers.sort_by(|a, b| a.change.total_cmp(&b.change));
    losers.truncate(MAX_MOVERS_PER_SIDE);

    TopMovers { gainers, losers }
}
