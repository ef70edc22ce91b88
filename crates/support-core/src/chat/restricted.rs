use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictedTopic {
    CompetitorMention,
    CreativeWriting,
    InternalBusiness,
}

impl RestrictedTopic {
    pub const ALL: [Self; 3] = [
        Self::CompetitorMention,
        Self::CreativeWriting,
        Self::InternalBusiness,
    ];

    pub fn key_name(self) -> &'static str {
        match self {
            Self::CompetitorMention => "competitor_mention",
            Self::CreativeWriting => "creative_writing",
            Self::InternalBusiness => "internal_business",
        }
    }

    /// Directive line used in the general system prompt.
    pub fn directive(self) -> &'static str {
        match self {
            Self::CompetitorMention => "other brands, competitors, or where else to shop",
            Self::CreativeWriting => {
                "creative writing unrelated to the store (poems, stories, essays, code)"
            }
            Self::InternalBusiness => {
                "internal business figures (revenue, margins, supplier costs, sales numbers)"
            }
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::CompetitorMention => &[
                "nike",
                "adidas",
                "under armour",
                "puma",
                "callaway",
                "titleist",
                "footjoy",
                "travismathew",
                "competitor",
            ],
            Self::CreativeWriting => &[
                "write a poem",
                "write me a poem",
                "write a story",
                "write me a story",
                "write an essay",
                "song lyrics",
                "write a song",
            ],
            Self::InternalBusiness => &[
                "revenue",
                "profit margin",
                "sales figures",
                "sales numbers",
                "wholesale cost",
                "supplier",
                "how much do you make",
            ],
        }
    }
}

/// Keyword pre-check run before the general prompt; the prompt directive is the second line.
#[derive(Debug, Clone)]
pub struct TopicFilter {
    patterns: Vec<(RestrictedTopic, Regex)>,
}

impl TopicFilter {
    pub fn standard() -> Self {
        let patterns = RestrictedTopic::ALL
            .into_iter()
            .filter_map(|topic| {
                let alternation = topic
                    .keywords()
                    .iter()
                    .map(|keyword| regex::escape(keyword))
                    .collect::<Vec<_>>()
                    .join("|");
                Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
                    .ok()
                    .map(|pattern| (topic, pattern))
            })
            .collect();

        Self { patterns }
    }

    pub fn check(&self, message: &str) -> Option<RestrictedTopic> {
        self.patterns
            .iter()
            .find(|(_, pattern)| pattern.is_match(message))
            .map(|(topic, _)| *topic)
    }
}

pub fn redirect_message(store_name: &str, support_email: &str) -> String {
    format!(
        "Thanks for asking! I can only help with questions about {store_name} orders, \
         shipping, returns, and sizing. For anything else, please reach out to our team at \
         {support_email} and they'll be glad to help. 😊"
    )
}
