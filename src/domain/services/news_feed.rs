use chrono::{DateTime, Utc};

use crate::domain::catalog;
use crate::domain::entities::keywords::display_keywords;
use crate::domain::entities::{NewsArticle, NewsFeedItem, StoredArticle};

/// Characters of content kept in a snippet
pub const SNIPPET_CHARS: usize = 100;

/// Articles returned per commodity and for the latest-news list
pub const ARTICLES_PER_PAGE: usize = 10;

pub const DEFAULT_FEED_LIMIT: usize = 10;
pub const MAX_FEED_LIMIT: usize = 50;

pub fn snippet(content: &str) -> String {
    let head: String = content.chars().take(SNIPPET_CHARS).collect();
    format!("{}...", head)
}

/// Serve a stored article, filling in defaults for missing analysis
pub fn to_article(stored: &StoredArticle) -> NewsArticle {
    let raw = &stored.raw;
    NewsArticle {
        id: raw.id,
        commodity_id: catalog::resolve(&raw.commodity).map(|p| p.id).unwrap_or(0),
        title: raw.title.clone(),
        content: raw.content.clone(),
        snippet: snippet(&raw.content),
        sentiment_score: stored
            .analysis
            .as_ref()
            .map(|a| a.sentiment_score)
            .unwrap_or(0.0),
        keywords: display_keywords(stored.analysis.as_ref().map(|a| &a.keywords)),
        published_at: raw.published_time,
    }
}

/// Korean relative time: 방금 전, N분 전, N시간 전, N일 전
pub fn time_ago(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(published);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "방금 전".to_string()
    } else if minutes < 60 {
        format!("{}분 전", minutes)
    } else if elapsed.num_hours() < 24 {
        format!("{}시간 전", elapsed.num_hours())
    } else {
        format!("{}일 전", elapsed.num_days())
    }
}

/// Clamp a requested feed size into 1..=MAX_FEED_LIMIT
pub fn clamp_feed_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_FEED_LIMIT)
        .clamp(1, MAX_FEED_LIMIT)
}

pub fn to_feed_item(stored: &StoredArticle, now: DateTime<Utc>) -> NewsFeedItem {
    let raw = &stored.raw;
    NewsFeedItem {
        id: raw.id,
        title: raw.title.clone(),
        commodity: raw.commodity.clone(),
        emoji: catalog::emoji_for(&raw.commodity).to_string(),
        time_ago: time_ago(raw.published_time, now),
        published_at: raw.published_time,
    }
}
