//! Analysis actions selectable from the numbered menu, and their prompt templates.

/// Placeholder replaced with the stored article link.
pub const LINK_PLACEHOLDER: &str = "{link}";
/// Placeholder replaced with text fetched from the analytics backend.
pub const DATA_PLACEHOLDER: &str = "{data}";

/// Which history blob a data-driven action needs from the analytics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    /// `userSummary` endpoint.
    Summary,
    /// `newsFeedDigest` endpoint.
    Digest,
}

/// What an action's template is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionInput {
    Link,
    History(HistoryKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    BiasSentiment,
    SourceCredibility,
    AlternativeViewpoints,
    TrendingMisinformation,
    MediaConsumptionSummary,
    FactCheckedNewsDigest,
    TopicOverview,
}

impl Action {
    /// All actions in menu order.
    pub const ALL: [Action; 7] = [
        Action::BiasSentiment,
        Action::SourceCredibility,
        Action::AlternativeViewpoints,
        Action::TrendingMisinformation,
        Action::MediaConsumptionSummary,
        Action::FactCheckedNewsDigest,
        Action::TopicOverview,
    ];

    /// Map a menu selection ("1".."7") to its action. Anything else is None.
    pub fn from_selection(selection: &str) -> Option<Action> {
        match selection {
            "1" => Some(Action::BiasSentiment),
            "2" => Some(Action::SourceCredibility),
            "3" => Some(Action::AlternativeViewpoints),
            "4" => Some(Action::TrendingMisinformation),
            "5" => Some(Action::MediaConsumptionSummary),
            "6" => Some(Action::FactCheckedNewsDigest),
            "7" => Some(Action::TopicOverview),
            _ => None,
        }
    }

    /// Menu number.
    pub fn id(self) -> u8 {
        match self {
            Action::BiasSentiment => 1,
            Action::SourceCredibility => 2,
            Action::AlternativeViewpoints => 3,
            Action::TrendingMisinformation => 4,
            Action::MediaConsumptionSummary => 5,
            Action::FactCheckedNewsDigest => 6,
            Action::TopicOverview => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::BiasSentiment => "bias_sentiment",
            Action::SourceCredibility => "source_credibility",
            Action::AlternativeViewpoints => "alternative_viewpoints",
            Action::TrendingMisinformation => "trending_misinformation",
            Action::MediaConsumptionSummary => "media_consumption_summary",
            Action::FactCheckedNewsDigest => "fact_checked_news_digest",
            Action::TopicOverview => "topic_overview",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Action::BiasSentiment => "Bias & sentiment analysis",
            Action::SourceCredibility => "Source credibility check",
            Action::AlternativeViewpoints => "Alternative viewpoints",
            Action::TrendingMisinformation => "Trending misinformation",
            Action::MediaConsumptionSummary => "My media consumption summary",
            Action::FactCheckedNewsDigest => "Fact-checked news digest",
            Action::TopicOverview => "Topic overview",
        }
    }

    pub fn input(self) -> ActionInput {
        match self {
            Action::MediaConsumptionSummary => ActionInput::History(HistoryKind::Summary),
            Action::FactCheckedNewsDigest => ActionInput::History(HistoryKind::Digest),
            _ => ActionInput::Link,
        }
    }

    pub fn requires_link(self) -> bool {
        self.input() == ActionInput::Link
    }

    /// Prompt template; contains `{link}` for link actions and `{data}` for history actions.
    pub fn template(self) -> &'static str {
        match self {
            Action::BiasSentiment => {
                "Analyze the news article at {link} for political or ideological bias and overall sentiment. \
                 Point out loaded language, framing choices and omitted context. \
                 Rate the bias as left, center-left, center, center-right or right, and the sentiment as \
                 positive, neutral or negative, with a one-sentence justification for each. \
                 Keep the answer under 200 words and format it for a chat message."
            }
            Action::SourceCredibility => {
                "Assess the credibility of the source that published the article at {link}. \
                 Cover the outlet's reputation, its track record of corrections, whether the article cites \
                 verifiable primary sources, and whether the author is identifiable. \
                 Finish with a credibility rating of high, medium or low. \
                 Keep the answer under 200 words and format it for a chat message."
            }
            Action::AlternativeViewpoints => {
                "Summarize the main claim of the article at {link} in one sentence, then present two or three \
                 well-reasoned alternative viewpoints on the same topic from different perspectives. \
                 Suggest the kind of outlets where a reader could find each viewpoint. \
                 Keep the answer under 250 words and format it for a chat message."
            }
            Action::TrendingMisinformation => {
                "Identify any claims in the article at {link} that match known or trending misinformation \
                 narratives. For each claim, state what is actually supported by evidence and name a \
                 reputable fact-checking source where possible. If nothing matches, say so plainly. \
                 Keep the answer under 250 words and format it for a chat message."
            }
            Action::MediaConsumptionSummary => {
                "Below is a summary of the articles a reader has recently asked about:\n\n{data}\n\n\
                 Describe their media consumption habits: dominant topics, the balance of sources, and any \
                 blind spots. Give two concrete suggestions for a more balanced news diet. \
                 Keep the answer under 200 words and format it for a chat message."
            }
            Action::FactCheckedNewsDigest => {
                "Based on these topics the reader follows:\n\n{data}\n\n\
                 Write a short fact-checked news digest with three to five items. For each item give a \
                 one-line headline, two sentences of verified context, and flag anything still unconfirmed. \
                 Keep the answer under 300 words and format it for a chat message."
            }
            Action::TopicOverview => {
                "Give a neutral overview of the broader topic covered by the article at {link}: the key \
                 background, the main actors involved, what is established fact and what is still debated. \
                 Keep the answer under 250 words and format it for a chat message."
            }
        }
    }

    /// Fill the template: `{link}` for link actions, `{data}` for history actions.
    pub fn render_prompt(self, value: &str) -> String {
        let placeholder = match self.input() {
            ActionInput::Link => LINK_PLACEHOLDER,
            ActionInput::History(_) => DATA_PLACEHOLDER,
        };
        self.template().replace(placeholder, value)
    }

    /// Numbered option list, one per line.
    pub fn menu_text() -> String {
        Action::ALL
            .iter()
            .map(|a| format!("{}. {}", a.id(), a.label()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_mapping_is_total_over_menu() {
        for action in Action::ALL {
            assert_eq!(Action::from_selection(&action.id().to_string()), Some(action));
        }
        assert_eq!(Action::from_selection("0"), None);
        assert_eq!(Action::from_selection("8"), None);
        assert_eq!(Action::from_selection("9"), None);
        assert_eq!(Action::from_selection("01"), None);
        assert_eq!(Action::from_selection(""), None);
    }

    #[test]
    fn only_summary_and_digest_use_history() {
        let history: Vec<Action> = Action::ALL
            .into_iter()
            .filter(|a| !a.requires_link())
            .collect();
        assert_eq!(
            history,
            vec![Action::MediaConsumptionSummary, Action::FactCheckedNewsDigest]
        );
        assert_eq!(
            Action::MediaConsumptionSummary.input(),
            ActionInput::History(HistoryKind::Summary)
        );
        assert_eq!(
            Action::FactCheckedNewsDigest.input(),
            ActionInput::History(HistoryKind::Digest)
        );
    }

    #[test]
    fn templates_carry_exactly_their_placeholder() {
        for action in Action::ALL {
            let t = action.template();
            if action.requires_link() {
                assert!(t.contains(LINK_PLACEHOLDER), "{} lacks link placeholder", action);
                assert!(!t.contains(DATA_PLACEHOLDER));
            } else {
                assert!(t.contains(DATA_PLACEHOLDER), "{} lacks data placeholder", action);
                assert!(!t.contains(LINK_PLACEHOLDER));
            }
        }
    }

    #[test]
    fn render_prompt_substitutes_link() {
        let prompt = Action::BiasSentiment.render_prompt("https://example.com/a");
        assert!(prompt.contains("https://example.com/a"));
        assert!(!prompt.contains(LINK_PLACEHOLDER));
    }

    #[test]
    fn render_prompt_substitutes_data() {
        let prompt = Action::MediaConsumptionSummary.render_prompt("mostly sports");
        assert!(prompt.contains("mostly sports"));
        assert!(!prompt.contains(DATA_PLACEHOLDER));
    }

    #[test]
    fn menu_lists_all_actions_in_order() {
        let menu = Action::menu_text();
        let lines: Vec<&str> = menu.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("1. "));
        assert!(lines[6].starts_with("7. "));
    }
}
