use std::sync::Arc;

use ai_client::util::parse_json_lenient;
use ai_client::TextModel;
use anyhow::Result;
use tracing::info;

use pressroom_common::{AnalysisResult, AnalyticsSnapshot};

/// Consistency-critical: low temperature.
const TEMPERATURE: f32 = 0.2;

/// Picks today's topic from the analytics snapshot.
pub struct Analyst {
    model: Arc<dyn TextModel>,
}

impl Analyst {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    /// Analyze the snapshot and decide the most promising topic.
    ///
    /// `avoid_topics` is advisory prompt-level steering for batch runs; the
    /// authoritative duplicate check happens in the orchestrator.
    pub async fn analyze(
        &self,
        snapshot: &AnalyticsSnapshot,
        avoid_topics: &[String],
    ) -> Result<AnalysisResult> {
        let report = serde_json::to_string_pretty(snapshot)?;

        let avoid_instruction = if avoid_topics.is_empty() {
            String::new()
        } else {
            format!(
                "Important: these topics are already covered today, propose something different: {}.",
                avoid_topics.join(", ")
            )
        };

        let prompt = format!(
            r#"You are a data analyst for the recipe app 'Pantry Notes'.
Based on the following analytics report (top pages, previous day), pick the
single most promising topic for a new article to maximize page views and
app downloads. Target audience: home cooks in their 30s.

Analytics report:
{report}

{avoid_instruction}

Output (JSON only):
{{
    "direction": "editorial direction and why this topic was chosen",
    "topic": "the topic to write about",
    "keywords": ["keyword1", "keyword2"]
}}"#
        );

        let response = self.model.generate(&prompt, TEMPERATURE).await?;

        let result = match parse_json_lenient::<AnalysisResult>(&response) {
            Some(parsed) if !parsed.topic.trim().is_empty() => parsed,
            _ => Self::fallback(),
        };
        info!(topic = %result.topic, "Analyst decided topic");
        Ok(result)
    }

    fn fallback() -> AnalysisResult {
        AnalysisResult {
            direction: "Fallback after unparsable analysis; seasonal recipes are reliably popular"
                .to_string(),
            topic: "seasonal quick weeknight dinners".to_string(),
            keywords: vec!["easy recipe".to_string(), "dinner ideas".to_string()],
        }
    }
}
