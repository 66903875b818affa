use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One answered chatbot question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLogEntry {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChatLogEntry {
    pub question: String,
    pub answer: String,
}
