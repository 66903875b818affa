pub mod chat_responder;
pub mod movers;
pub mod news_feed;
pub mod price_change;
pub mod sentiment_alert;
pub mod snapshot;
