use std::sync::Arc;

use ai_client::util::parse_json_lenient;
use ai_client::TextModel;
use anyhow::Result;

use pressroom_common::{AnalysisResult, Strategy};

/// Creativity-desired: high temperature.
const TEMPERATURE: f32 = 0.7;

/// Turns an analysis into a content strategy for one article.
pub struct Marketer {
    model: Arc<dyn TextModel>,
}

impl Marketer {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    /// `recent_context` is a rendering of recently published articles so the
    /// strategy varies from what was already covered.
    pub async fn create_strategy(
        &self,
        analysis: &AnalysisResult,
        recent_context: &str,
    ) -> Result<Strategy> {
        let prompt = format!(
            r#"You are a marketing strategist for the recipe app 'Pantry Notes'.

Selected topic: {topic}
Analysis: {direction}
Recently published articles (avoid repeating these angles):
{recent_context}

Task: develop a content strategy for a blog post on this topic. The post
should encourage readers to install the 'Pantry Notes' app. Target audience:
home cooks in their 30s, friendly blogger tone.

Output (JSON only):
{{
    "title": "catchy blog title",
    "marketing_angle": "how to position the app as the solution",
    "article_structure": ["Intro", "Point 1", "Point 2", "App promo", "Conclusion"],
    "tone_guide": "specific instructions for the writer"
}}"#,
            topic = analysis.topic,
            direction = analysis.direction,
        );

        let response = self.model.generate(&prompt, TEMPERATURE).await?;

        Ok(match parse_json_lenient::<Strategy>(&response) {
            Some(parsed) if !parsed.title.trim().is_empty() => parsed,
            _ => Self::fallback(&analysis.topic),
        })
    }

    fn fallback(topic: &str) -> Strategy {
        Strategy {
            title: format!("Enjoy {topic} at home!"),
            marketing_angle: "Standard app promotion".to_string(),
            article_structure: vec![
                "Intro".to_string(),
                "Tips".to_string(),
                "Conclusion".to_string(),
            ],
            tone_guide: "Friendly".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            direction: "trend".to_string(),
            topic: "winter soup".to_string(),
            keywords: vec![],
        }
    }

    #[tokio::test]
    async fn parses_strategy() {
        let model = ScriptedModel::new().reply(
            r#"{"title": "Soup season!", "marketing_angle": "save time", "article_structure": ["Intro", "Body", "Outro"]}"#,
        );
        let marketer = Marketer::new(Arc::new(model));
        let strategy = marketer.create_strategy(&analysis(), "[]").await.unwrap();
        assert_eq!(strategy.title, "Soup season!");
        assert_eq!(strategy.article_structure.len(), 3);
    }

    #[tokio::test]
    async fn malformed_output_yields_fallback_with_topic() {
        let model = ScriptedModel::new().reply("not json at all");
        let marketer = Marketer::new(Arc::new(model));
        let strategy = marketer.create_strategy(&analysis(), "[]").await.unwrap();
        assert!(strategy.title.contains("winter soup"));
        assert!(!strategy.article_structure.is_empty());
    }
}
