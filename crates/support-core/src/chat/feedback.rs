use chrono::{DateTime, Utc};

use crate::logs::{FeedbackRecord, FeedbackTopic, LoggedConversation};
use crate::models::{FeedbackRequest, RateResponseRequest};

const EMOJI_RANGE: std::ops::RangeInclusive<u32> = 0x1F300..=0x1F9FF;

pub fn extract_topics(question: &str) -> Vec<FeedbackTopic> {
    let lowered = question.to_lowercase();
    [
        ("size", FeedbackTopic::Sizing),
        ("ship", FeedbackTopic::Shipping),
        ("return", FeedbackTopic::Returns),
    ]
    .into_iter()
    .filter(|(keyword, _)| lowered.contains(keyword))
    .map(|(_, topic)| topic)
    .collect()
}

pub fn contains_emoji(text: &str) -> bool {
    text.chars().any(|ch| EMOJI_RANGE.contains(&u32::from(ch)))
}

pub fn feedback_record(request: FeedbackRequest, now: DateTime<Utc>) -> FeedbackRecord {
    FeedbackRecord {
        timestamp: now,
        topics: extract_topics(&request.question),
        answer_length: request.answer.chars().count(),
        has_emoji: contains_emoji(&request.answer),
        question: request.question,
        answer: request.answer,
        helpful: request.helpful,
        feedback: request.feedback,
    }
}

pub fn rated_conversation(
    request: RateResponseRequest,
    now: DateTime<Utc>,
) -> LoggedConversation {
    LoggedConversation {
        timestamp: now,
        question: request.question,
        answer: request.answer,
        helpful: request.helpful,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_come_from_keyword_containment() {
        assert_eq!(
            extract_topics("What SIZE should I get and when will it ship?"),
            vec![FeedbackTopic::Sizing, FeedbackTopic::Shipping]
        );
        assert_eq!(
            extract_topics("Can I return a sized-down polo?"),
            vec![FeedbackTopic::Sizing, FeedbackTopic::Returns]
        );
        assert!(extract_topics("Do you have gift cards?").is_empty());
    }

    #[test]
    fn emoji_detection_uses_pictograph_range() {
        assert!(contains_emoji("Happy golfing! 🏌️"));
        assert!(contains_emoji("Thanks 😊"));
        assert!(!contains_emoji("Thanks :)"));
        assert!(!contains_emoji("Price: €40 ✓"));
    }

    #[test]
    fn feedback_record_derives_metrics_from_answer() {
        let now = Utc::now();
        let record = feedback_record(
            FeedbackRequest {
                question: "How long does shipping take?".to_string(),
                answer: "5-10 days 🚚".to_string(),
                helpful: true,
                feedback: "quick answer".to_string(),
            },
            now,
        );

        assert_eq!(record.timestamp, now);
        assert_eq!(record.topics, vec![FeedbackTopic::Shipping]);
        assert_eq!(record.answer_length, 11);
        assert!(record.has_emoji);
        assert_eq!(record.feedback, "quick answer");
    }
}
