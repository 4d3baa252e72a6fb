use std::sync::Arc;

use ai_client::util::parse_json_lenient;
use ai_client::TextModel;
use anyhow::Result;
use tracing::warn;

use pressroom_common::{ReviewStatus, ReviewVerdict, Strategy, SECTION_MARKER};

/// Fully deterministic: the quality gate must be repeatable.
const TEMPERATURE: f32 = 0.0;

/// Reviews a finished draft against its strategy and scores it.
pub struct Controller {
    model: Arc<dyn TextModel>,
}

impl Controller {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub async fn review(&self, article_content: &str, strategy: &Strategy) -> Result<ReviewVerdict> {
        let prompt = format!(
            r#"You are the editor-in-chief for the recipe app 'Pantry Notes'.
Review this article draft.

Strategy goal: {angle}
Target audience: home cooks in their 30s

Draft content:
{article_content}

Checks:
1. Grammar and natural phrasing.
2. Tone is friendly and appropriate.
3. There are exactly 2 "{SECTION_MARKER}" markers (3 body parts), or close.
4. No harmful or inappropriate content.

Output (JSON only):
{{
    "status": "APPROVED",
    "score": 85,
    "comments": "brief feedback explaining the decision"
}}
status must be "APPROVED" or "REVIEW_REQUIRED"; score is 0-100."#,
            angle = strategy.marketing_angle,
        );

        let response = self.model.generate(&prompt, TEMPERATURE).await?;

        Ok(match parse_json_lenient::<ReviewVerdict>(&response) {
            Some(mut verdict) => {
                verdict.score = verdict.score.min(100);
                verdict
            }
            None => {
                warn!("Unparsable review response, failing safe to review-required");
                Self::fallback()
            }
        })
    }

    fn fallback() -> ReviewVerdict {
        ReviewVerdict {
            status: ReviewStatus::ReviewRequired,
            score: 0,
            comments: "Unparsable reviewer response".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    fn strategy() -> Strategy {
        Strategy {
            title: "t".to_string(),
            marketing_angle: "save time".to_string(),
            article_structure: vec![],
            tone_guide: String::new(),
        }
    }

    #[tokio::test]
    async fn parses_approved_verdict() {
        let model = ScriptedModel::new()
            .reply(r#"{"status": "APPROVED", "score": 88, "comments": "good"}"#);
        let controller = Controller::new(Arc::new(model));
        let verdict = controller.review("body", &strategy()).await.unwrap();
        assert_eq!(verdict.status, ReviewStatus::Approved);
        assert_eq!(verdict.score, 88);
    }

    #[tokio::test]
    async fn malformed_output_fails_safe() {
        let model = ScriptedModel::new().reply("looks fine to me");
        let controller = Controller::new(Arc::new(model));
        let verdict = controller.review("body", &strategy()).await.unwrap();
        assert_eq!(verdict.status, ReviewStatus::ReviewRequired);
        assert_eq!(verdict.score, 0);
    }
}
