//! Commodity Sentiment Service Library
//!
//! REST backend for a commodity market-sentiment dashboard: commodity
//! snapshots, price history, news with sentiment analysis, alerts and a canned
//! market chatbot.

pub mod application;
pub mod config;
pub mod domain;
pub mod persistence;
pub mod rate_limit;
