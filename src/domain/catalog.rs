//! Commodity Catalog
//!
//! The five tracked commodities and everything static about them: display
//! names, emoji, the aliases accepted in URLs and forms, and the base values
//! used to seed demo data. Every consumer resolves commodities through this
//! table instead of carrying its own name or emoji map.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Emoji used when a commodity name is not in the catalog
pub const DEFAULT_EMOJI: &str = "📈";

/// Static description of a tracked commodity
#[derive(Debug, Clone, PartialEq)]
pub struct CommodityProfile {
    pub id: i64,
    /// Localized display name, also the key used by price and news rows
    pub name: &'static str,
    pub english_name: &'static str,
    pub slug: &'static str,
    pub emoji: &'static str,
    /// Extra spellings accepted by [`resolve`]
    pub aliases: &'static [&'static str],
    pub base_price: f64,
    pub base_score: f64,
    pub default_keywords: &'static [&'static str],
}

pub static COMMODITIES: &[CommodityProfile] = &[
    CommodityProfile {
        id: 1,
        name: "옥수수",
        english_name: "Corn",
        slug: "corn",
        emoji: "🌽",
        aliases: &[],
        base_price: 600.0,
        base_score: 85.0,
        default_keywords: &["가뭄", "수출 증가", "USDA"],
    },
    CommodityProfile {
        id: 2,
        name: "밀",
        english_name: "Wheat",
        slug: "wheat",
        emoji: "🌾",
        aliases: &[],
        base_price: 340.0,
        base_score: 45.0,
        default_keywords: &["공급 과잉", "수요 감소", "풍작"],
    },
    CommodityProfile {
        id: 3,
        name: "구리",
        english_name: "Copper",
        slug: "copper",
        emoji: "🥉",
        aliases: &[],
        base_price: 8200.0,
        base_score: 76.0,
        default_keywords: &["전기차", "인프라", "재생에너지"],
    },
    CommodityProfile {
        id: 4,
        name: "WTI 오일",
        english_name: "WTI Oil",
        slug: "wti",
        emoji: "🛢️",
        aliases: &["wti-oil", "oil", "crude", "원유"],
        base_price: 75.0,
        base_score: 58.0,
        default_keywords: &["OPEC+", "감산", "재고"],
    },
    CommodityProfile {
        id: 5,
        name: "금",
        english_name: "Gold",
        slug: "gold",
        emoji: "🥇",
        aliases: &[],
        base_price: 1940.0,
        base_score: 82.0,
        default_keywords: &["안전자산", "인플레이션", "중앙은행"],
    },
];

static BY_ALIAS: Lazy<HashMap<String, &'static CommodityProfile>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for profile in COMMODITIES {
        map.insert(profile.name.to_lowercase(), profile);
        map.insert(profile.english_name.to_lowercase(), profile);
        map.insert(profile.slug.to_string(), profile);
        for alias in profile.aliases {
            map.insert(alias.to_lowercase(), profile);
        }
    }
    map
});

/// Resolve a localized name, English name, slug or alias (case-insensitive)
pub fn resolve(name: &str) -> Option<&'static CommodityProfile> {
    BY_ALIAS.get(name.trim().to_lowercase().as_str()).copied()
}

pub fn by_id(id: i64) -> Option<&'static CommodityProfile> {
    COMMODITIES.iter().find(|profile| profile.id == id)
}

/// Emoji for a commodity name, falling back to [`DEFAULT_EMOJI`]
pub fn emoji_for(name: &str) -> &'static str {
    resolve(name).map(|p| p.emoji).unwrap_or(DEFAULT_EMOJI)
}
