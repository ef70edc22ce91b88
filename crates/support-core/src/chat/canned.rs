use crate::models::{ChatOption, ChatResponse};
use crate::store_data::{ReturnPolicy, ShippingPolicy, StorePolicyData};

pub const SHIPPING_INFO: &str = "Shipping Info";
pub const RETURN_POLICY: &str = "Return Policy";
pub const HELP_WITH_SIZING: &str = "Help With Sizing";
pub const TRACK_MY_ORDER: &str = "Track My Order";
pub const RESTOCK_QUESTIONS: &str = "Restock Questions";
pub const SIZING_MENS: &str = "Sizing: Mens";
pub const SIZING_WOMENS: &str = "Sizing: Womens";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedAnswer {
    pub label: &'static str,
    pub text: String,
    pub options: Vec<ChatOption>,
    pub expect_measurements: bool,
}

impl CannedAnswer {
    fn plain(label: &'static str, text: String) -> Self {
        Self {
            label,
            text,
            options: Vec::new(),
            expect_measurements: false,
        }
    }

    pub fn to_response(&self) -> ChatResponse {
        let has_options = !self.options.is_empty();
        ChatResponse {
            response: self.text.clone(),
            show_options: has_options.then_some(true),
            options: has_options.then(|| self.options.clone()),
            expect_measurements: self.expect_measurements.then_some(true),
        }
    }
}

/// Quick-reply answers keyed by their exact button label.
#[derive(Debug, Clone)]
pub struct CannedCatalog {
    answers: Vec<CannedAnswer>,
}

impl CannedCatalog {
    /// Shipping and return answers are rendered from `store` so they match the prompts.
    pub fn standard(store: &StorePolicyData, store_name: &str, support_email: &str) -> Self {
        let measurements_prompt = |audience: &str| CannedAnswer {
            label: "",
            text: format!(
                "Great! For {audience} sizing, send me your height and weight \
                 (for example 5'10\" 165 lbs) and I'll match you to a size on our chart."
            ),
            options: Vec::new(),
            expect_measurements: true,
        };

        let answers = vec![
            CannedAnswer::plain(SHIPPING_INFO, shipping_text(&store.shipping)),
            CannedAnswer::plain(RETURN_POLICY, returns_text(&store.returns, support_email)),
            CannedAnswer {
                label: HELP_WITH_SIZING,
                text: format!(
                    "Happy to help you find the right fit at {store_name}! Which fit are you \
                     shopping for?"
                ),
                options: vec![
                    ChatOption {
                        text: "Men's".to_string(),
                        value: SIZING_MENS.to_string(),
                    },
                    ChatOption {
                        text: "Women's".to_string(),
                        value: SIZING_WOMENS.to_string(),
                    },
                ],
                expect_measurements: false,
            },
            CannedAnswer {
                label: SIZING_MENS,
                ..measurements_prompt("men's")
            },
            CannedAnswer {
                label: SIZING_WOMENS,
                ..measurements_prompt("women's")
            },
            CannedAnswer::plain(
                TRACK_MY_ORDER,
                format!(
                    "Your tracking link is in the shipping confirmation email we sent when your \
                     order left our warehouse. Can't find it? Email {support_email} with your \
                     order number and we'll look it up."
                ),
            ),
            CannedAnswer::plain(
                RESTOCK_QUESTIONS,
                format!(
                    "We restock popular styles regularly. Tap \"Notify me\" on the product page \
                     to get an email the moment your size is back, or reach us at \
                     {support_email} for an estimated date."
                ),
            ),
        ];

        Self { answers }
    }

    /// Exact, case-sensitive label match.
    pub fn lookup(&self, message: &str) -> Option<&CannedAnswer> {
        self.answers.iter().find(|answer| answer.label == message)
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.answers.iter().map(|answer| answer.label)
    }
}

fn shipping_text(shipping: &ShippingPolicy) -> String {
    let mut text = format!("Orders ship within {}.\n\nDelivery times:", shipping.processing);
    for method in &shipping.methods {
        text.push_str(&format!("\n- {}: {}", method.name, method.time));
    }
    text.push_str("\n\nGood to know:");
    for note in &shipping.notes {
        text.push_str(&format!("\n- {note}"));
    }
    text
}

fn returns_text(returns: &ReturnPolicy, support_email: &str) -> String {
    let mut text = format!(
        "You can return items within {} of delivery.\n\nConditions:",
        returns.timeframe
    );
    for condition in &returns.conditions {
        text.push_str(&format!("\n- {condition}"));
    }
    text.push_str("\n\nHow to return:");
    for (step, action) in returns.process.iter().enumerate() {
        text.push_str(&format!("\n{}. {action}", step + 1));
    }
    text.push_str(&format!("\n\nStart by emailing {support_email}."));
    text
}
