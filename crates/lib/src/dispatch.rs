//! Action dispatch: build the prompt for a selected action, generate the analysis,
//! send the result to the user, then log the exchange in the background.

use crate::action::{Action, ActionInput, HistoryKind};
use crate::analytics::{Analytics, Interaction};
use crate::channels::Messenger;
use crate::error::RelayError;
use crate::llm::TextGenerator;
use std::sync::Arc;

/// Runs one selected action end to end. The final message is sent from here, not returned.
pub struct Dispatcher {
    messenger: Arc<dyn Messenger>,
    generator: Arc<dyn TextGenerator>,
    analytics: Arc<dyn Analytics>,
}

impl Dispatcher {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        generator: Arc<dyn TextGenerator>,
        analytics: Arc<dyn Analytics>,
    ) -> Self {
        Self {
            messenger,
            generator,
            analytics,
        }
    }

    /// Dispatch `action` for `sender`. `identity` is the sender's recorded identity, used for
    /// analytics lookups. `link` is required for link actions and ignored for history actions.
    pub async fn dispatch(
        &self,
        action: Action,
        link: Option<&str>,
        sender: &str,
        identity: &str,
    ) -> Result<(), RelayError> {
        let prompt = match action.input() {
            ActionInput::History(kind) => {
                let data = match kind {
                    HistoryKind::Summary => self.analytics.user_summary(identity).await?,
                    HistoryKind::Digest => self.analytics.news_feed_digest(identity).await?,
                };
                action.render_prompt(&data)
            }
            ActionInput::Link => {
                let link = link.ok_or(RelayError::NoLinkOnFile)?;
                action.render_prompt(link)
            }
        };

        log::info!("dispatch: running {} for {}", action, sender);
        let result = self.generator.generate(&prompt).await?;

        let message_sid = self.messenger.send_text(sender, &result).await?;
        log::debug!("dispatch: {} result delivered as {}", action, message_sid);

        if let (ActionInput::Link, Some(link)) = (action.input(), link) {
            let interaction = Interaction {
                user_phone_number: identity.to_string(),
                prompt: action.template().to_string(),
                result,
                link: link.to_string(),
            };
            let analytics = self.analytics.clone();
            tokio::spawn(async move {
                if let Err(e) = analytics.add_interaction(&interaction).await {
                    log::warn!("dispatch: interaction log for {} failed: {}", action, e);
                }
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{DATA_PLACEHOLDER, LINK_PLACEHOLDER};
    use crate::error::BackendError;
    use crate::testing::{
        AnalyticsCall, RecordingAnalytics, RecordingMessenger, ScriptedGenerator, Sent,
    };

    struct Fixture {
        messenger: Arc<RecordingMessenger>,
        generator: Arc<ScriptedGenerator>,
        analytics: Arc<RecordingAnalytics>,
        dispatcher: Dispatcher,
    }

    fn fixture(generator: ScriptedGenerator, analytics: RecordingAnalytics) -> Fixture {
        let messenger = Arc::new(RecordingMessenger::default());
        let generator = Arc::new(generator);
        let analytics = Arc::new(analytics);
        let dispatcher = Dispatcher::new(messenger.clone(), generator.clone(), analytics.clone());
        Fixture {
            messenger,
            generator,
            analytics,
            dispatcher,
        }
    }

    #[tokio::test]
    async fn link_action_substitutes_link_logs_and_sends() {
        let f = fixture(ScriptedGenerator::replying("Leans center."), RecordingAnalytics::default());
        f.dispatcher
            .dispatch(Action::BiasSentiment, Some("https://example.com/a"), "+1555", "+1555")
            .await
            .unwrap();

        let prompts = f.generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("https://example.com/a"));
        assert!(!prompts[0].contains(LINK_PLACEHOLDER));

        assert_eq!(
            f.analytics.wait_for_calls(1).await,
            vec![AnalyticsCall::AddInteraction(Interaction {
                user_phone_number: "+1555".to_string(),
                prompt: Action::BiasSentiment.template().to_string(),
                result: "Leans center.".to_string(),
                link: "https://example.com/a".to_string(),
            })]
        );
        assert_eq!(
            f.messenger.sent(),
            vec![Sent::Text {
                to: "+1555".to_string(),
                body: "Leans center.".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn summary_action_uses_history_and_skips_interaction_log() {
        let f = fixture(ScriptedGenerator::replying("Balanced diet."), RecordingAnalytics::default());
        f.dispatcher
            .dispatch(
                Action::MediaConsumptionSummary,
                Some("https://example.com/a"),
                "whatsapp:+1555",
                "whatsapp:+1555",
            )
            .await
            .unwrap();

        assert_eq!(
            f.analytics.calls(),
            vec![AnalyticsCall::UserSummary("whatsapp:+1555".to_string())]
        );
        let prompt = &f.generator.prompts()[0];
        assert!(prompt.contains("read 4 articles on climate policy"));
        assert!(!prompt.contains(DATA_PLACEHOLDER));
        assert!(!prompt.contains("https://example.com/a"));
        assert_eq!(f.messenger.sent().len(), 1);
    }

    #[tokio::test]
    async fn digest_action_uses_digest_endpoint() {
        let f = fixture(ScriptedGenerator::replying("Digest."), RecordingAnalytics::default());
        f.dispatcher
            .dispatch(Action::FactCheckedNewsDigest, None, "+1555", "+1555")
            .await
            .unwrap();
        assert_eq!(
            f.analytics.calls(),
            vec![AnalyticsCall::NewsFeedDigest("+1555".to_string())]
        );
        assert!(f.generator.prompts()[0].contains("elections, energy prices"));
    }

    #[tokio::test]
    async fn interaction_log_failure_does_not_block_reply() {
        let analytics = RecordingAnalytics {
            fail_writes: true,
            ..Default::default()
        };
        let f = fixture(ScriptedGenerator::replying("Credible."), analytics);
        f.dispatcher
            .dispatch(Action::SourceCredibility, Some("www.news.test/x"), "+1", "+1")
            .await
            .unwrap();
        assert_eq!(f.messenger.sent().len(), 1);
        assert_eq!(f.analytics.wait_for_calls(1).await.len(), 1);
    }

    #[tokio::test]
    async fn stalled_interaction_log_does_not_hold_the_result() {
        let analytics = RecordingAnalytics {
            stall_writes: true,
            ..Default::default()
        };
        let f = fixture(ScriptedGenerator::replying("Leans left."), analytics);
        tokio::time::timeout(
            std::time::Duration::from_secs(2),
            f.dispatcher
                .dispatch(Action::BiasSentiment, Some("https://x.test"), "+1", "+1"),
        )
        .await
        .expect("dispatch must not wait on the interaction log")
        .unwrap();
        assert_eq!(
            f.messenger.sent(),
            vec![Sent::Text {
                to: "+1".to_string(),
                body: "Leans left.".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn malformed_generation_is_backend_error_and_sends_nothing() {
        let f = fixture(ScriptedGenerator::malformed(), RecordingAnalytics::default());
        let err = f
            .dispatcher
            .dispatch(Action::TopicOverview, Some("https://x.test"), "+1", "+1")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Backend(BackendError::Generative(_))));
        assert!(f.messenger.sent().is_empty());
        assert!(f.analytics.calls().is_empty());
    }

    #[tokio::test]
    async fn link_action_without_link_is_rejected() {
        let f = fixture(ScriptedGenerator::replying("x"), RecordingAnalytics::default());
        let err = f
            .dispatcher
            .dispatch(Action::AlternativeViewpoints, None, "+1", "+1")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::NoLinkOnFile));
        assert!(f.generator.prompts().is_empty());
    }
}
