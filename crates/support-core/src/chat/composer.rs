use crate::logs::LoggedConversation;
use crate::models::ChatMessage;
use crate::store_data::StorePolicyData;

use super::measurement::MeasurementMatch;
use super::restricted::RestrictedTopic;
use super::sizing::SizeRecommendation;

pub const HISTORY_WINDOW: usize = 4;
pub const LEARNING_CONTEXT_LIMIT: usize = 3;

/// Last [`HISTORY_WINDOW`] turns, oldest first.
pub fn recent_history(history: &[ChatMessage]) -> &[ChatMessage] {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    &history[start..]
}

/// Up to three newest helpful exchanges whose question overlaps the message.
pub fn select_learning_context<'a>(
    logs: &'a [LoggedConversation],
    message: &str,
) -> Vec<&'a LoggedConversation> {
    let message = message.trim().to_lowercase();
    if message.is_empty() {
        return Vec::new();
    }

    let mut related = logs
        .iter()
        .filter(|entry| entry.helpful)
        .filter(|entry| {
            let question = entry.question.trim().to_lowercase();
            !question.is_empty() && (question.contains(&message) || message.contains(&question))
        })
        .collect::<Vec<_>>();
    related.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    related.truncate(LEARNING_CONTEXT_LIMIT);
    related
}

pub fn general_system_prompt(
    store: &StorePolicyData,
    store_name: &str,
    support_email: &str,
    learning: &[&LoggedConversation],
) -> String {
    let restricted = RestrictedTopic::ALL
        .iter()
        .map(|topic| format!("- {}", topic.directive()))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = format!(
        "You are a friendly and helpful customer service representative for {store_name}, an \
online golf apparel store. Your personality is warm, reassuring, and engaging.

RESPONSE STYLE:
- Start with a warm, personal greeting
- Write in a clear, conversational tone
- Use natural paragraph breaks
- Keep formatting simple and clean
- Use 1-2 relevant emojis maximum
- End with a friendly invitation to ask more questions

RESTRICTED TOPICS:
Do not answer questions about:
{restricted}
If a question falls outside orders, shipping, returns, sizing, or product care, politely \
redirect the customer to {support_email} instead of answering.

STORE INFORMATION:
{}",
        store.to_prompt_json()
    );

    if !learning.is_empty() {
        prompt.push_str("\n\nPREVIOUSLY HELPFUL ANSWERS (match this tone and detail):");
        for entry in learning {
            prompt.push_str(&format!("\nQ: {}\nA: {}", entry.question, entry.answer));
        }
    }

    prompt
}

pub fn sizing_system_prompt(
    store: &StorePolicyData,
    store_name: &str,
    measurement: &MeasurementMatch,
    recommendation: SizeRecommendation,
) -> String {
    let reference = &store.fit_reference;
    format!(
        "You are the sizing specialist for {store_name}, an online golf apparel store.

SIZE CHART (inclusive ranges):
{chart}
FIT REFERENCE:
Our model {model} is {ref_height} ({ref_cm} cm), {ref_weight} ({ref_kg} kg) and wears size \
{ref_size}.

CUSTOMER MEASUREMENTS:
Height: {raw_height} (about {height_cm:.0} cm)
Weight: {raw_weight} (about {weight_kg:.0} kg)

CHART RESULT: {result}
Present this result; do not pick a different size. If the result says to contact support, \
explain that the measurements fall between or outside our chart and suggest a custom fit \
consultation.

FORMAT YOUR ANSWER WITH THESE SECTIONS, IN THIS ORDER:
1. Your Measurements
2. Recommended Size
3. Why This Size
4. Fit Tips",
        chart = store.size_chart_table(),
        model = reference.model_name,
        ref_height = reference.height_display,
        ref_cm = reference.height_cm,
        ref_weight = reference.weight_display,
        ref_kg = reference.weight_kg,
        ref_size = reference.size,
        raw_height = measurement.raw_height,
        height_cm = measurement.height_cm(),
        raw_weight = measurement.raw_weight,
        weight_kg = measurement.weight_kg(),
        result = recommendation.describe(),
    )
}
