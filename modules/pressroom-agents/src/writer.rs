use std::sync::Arc;

use ai_client::TextModel;
use anyhow::Result;
use tracing::info;

use pressroom_common::{Strategy, SECTION_MARKER};

const TEMPERATURE: f32 = 0.7;

/// Writes the article body from a strategy. Output is free-form markdown
/// carrying exactly two section markers so images can be interleaved.
pub struct Writer {
    model: Arc<dyn TextModel>,
}

impl Writer {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub async fn write_article(&self, strategy: &Strategy) -> Result<String> {
        let strategy_json = serde_json::to_string_pretty(strategy)?;

        let prompt = format!(
            r#"You are a professional food blogger with a friendly, relatable voice.
Write a blog post for the recipe app 'Pantry Notes' following this strategy:

{strategy_json}

Requirements:
1. Tone: casual and empathetic. Occasional emoji are fine.
2. Structure: follow the provided article_structure.
3. Formatting: markdown.
4. Length: 1500-2000 characters.
5. Segmentation: split the main body into exactly 3 parts by inserting the
   marker "{SECTION_MARKER}" between them, so images can be placed in between.
   Never put the marker at the very beginning or end.

Return only the article text."#
        );

        let content = self.model.generate(&prompt, TEMPERATURE).await?;
        info!(chars = content.len(), "Article content written");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    #[tokio::test]
    async fn returns_model_text_verbatim() {
        let body = format!("intro {SECTION_MARKER} middle {SECTION_MARKER} end");
        let model = ScriptedModel::new().reply(&body);
        let writer = Writer::new(Arc::new(model));
        let strategy = Strategy {
            title: "t".to_string(),
            marketing_angle: "a".to_string(),
            article_structure: vec!["Intro".to_string()],
            tone_guide: String::new(),
        };
        let content = writer.write_article(&strategy).await.unwrap();
        assert_eq!(content, body);
    }
}
