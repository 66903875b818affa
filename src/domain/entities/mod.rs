pub mod chat;
pub mod commodity;
pub mod email_alert;
pub mod keywords;
pub mod news;
pub mod observation;

pub use chat::{ChatLogEntry, NewChatLogEntry};
pub use commodity::Commodity;
pub use email_alert::{AlertFrequency, EmailAlertSubscription, NewEmailAlert};
pub use keywords::KeywordSet;
pub use news::{
    NewNewsAnalysisResult, NewRawNews, NewsAnalysisResult, NewsArticle, NewsFeedItem, RawNews,
    StoredArticle,
};
pub use observation::{
    NewPriceObservation, NewSentimentObservation, PriceObservation, SentimentObservation,
};
