use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedConversation {
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub answer: String,
    #[serde(default = "default_helpful")]
    pub helpful: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackTopic {
    Sizing,
    Shipping,
    Returns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub answer: String,
    pub helpful: bool,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub topics: Vec<FeedbackTopic>,
    pub answer_length: usize,
    pub has_emoji: bool,
}

fn default_helpful() -> bool {
    true
}
