//! Request classification and prompt assembly for the storefront support chat.

pub mod canned;
pub mod composer;
pub mod feedback;
pub mod measurement;
pub mod restricted;
pub mod sizing;

use crate::llm::{CompletionRequest, ModelRoute, SamplingParams};
use crate::logs::LoggedConversation;
use crate::models::ChatMessage;
use crate::store_data::StorePolicyData;

pub use canned::{CannedAnswer, CannedCatalog};
pub use measurement::{Height, MeasurementMatch, detect_measurements, is_sizing_request};
pub use restricted::{RestrictedTopic, TopicFilter};
pub use sizing::{SizeRecommendation, recommend_size};

#[derive(Debug, Clone, PartialEq)]
pub enum Route<'a> {
    Canned(&'a CannedAnswer),
    Sizing(MeasurementMatch),
    Restricted(RestrictedTopic),
    General,
}

impl Route<'_> {
    pub fn key_name(&self) -> &'static str {
        match self {
            Self::Canned(_) => "canned",
            Self::Sizing(_) => "sizing",
            Self::Restricted(_) => "restricted",
            Self::General => "general",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeskSettings {
    pub store_name: String,
    pub support_email: String,
    pub models: ModelRoute,
}

/// Immutable per-process state: store data, canned answers and topic filter.
#[derive(Debug, Clone)]
pub struct SupportDesk {
    store: StorePolicyData,
    canned: CannedCatalog,
    topics: TopicFilter,
    settings: DeskSettings,
}

impl SupportDesk {
    pub fn new(store: StorePolicyData, settings: DeskSettings) -> Self {
        Self {
            canned: CannedCatalog::standard(
                &store,
                &settings.store_name,
                &settings.support_email,
            ),
            topics: TopicFilter::standard(),
            store,
            settings,
        }
    }

    pub fn store(&self) -> &StorePolicyData {
        &self.store
    }

    pub fn settings(&self) -> &DeskSettings {
        &self.settings
    }

    /// Canned label, then measurements, then restricted keywords; anything else is general.
    pub fn classify(&self, message: &str) -> Route<'_> {
        if let Some(answer) = self.canned.lookup(message) {
            return Route::Canned(answer);
        }

        if let Some(measurement) = detect_measurements(message) {
            return Route::Sizing(measurement);
        }

        if let Some(topic) = self.topics.check(message) {
            return Route::Restricted(topic);
        }

        Route::General
    }

    pub fn redirect_message(&self) -> String {
        restricted::redirect_message(&self.settings.store_name, &self.settings.support_email)
    }

    pub fn sizing_request(
        &self,
        message: &str,
        measurement: &MeasurementMatch,
    ) -> (CompletionRequest, SizeRecommendation) {
        let recommendation = recommend_size(&self.store, measurement);
        let system_prompt = composer::sizing_system_prompt(
            &self.store,
            &self.settings.store_name,
            measurement,
            recommendation,
        );

        let request = CompletionRequest {
            model: self.settings.models.sizing_model.clone(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(message)],
            sampling: SamplingParams::SIZING,
        };

        (request, recommendation)
    }

    pub fn general_request(
        &self,
        message: &str,
        history: &[ChatMessage],
        logs: &[LoggedConversation],
    ) -> CompletionRequest {
        let learning = composer::select_learning_context(logs, message);
        let system_prompt = composer::general_system_prompt(
            &self.store,
            &self.settings.store_name,
            &self.settings.support_email,
            &learning,
        );

        let recent = composer::recent_history(history);
        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend_from_slice(recent);
        messages.push(ChatMessage::user(message));

        CompletionRequest {
            model: self.settings.models.general_model.clone(),
            messages,
            sampling: SamplingParams::GENERAL,
        }
    }
}
