use std::sync::Arc;

use ai_client::util::{parse_json_lenient, truncate_utf8};
use ai_client::TextModel;
use anyhow::Result;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::warn;

use pressroom_common::ImageModel;

const TEMPERATURE: f32 = 0.7;

/// Maximum article bytes embedded in the prompt.
const CONTENT_EXCERPT_BYTES: usize = 1500;

const FALLBACK_PROMPT: &str = "Warm flat-style illustration of a home cooking scene, orange accents";

/// What the model returns: one prompt per image slot.
#[derive(Debug, Deserialize, JsonSchema)]
struct ImagePromptSet {
    thumbnail_prompt: String,
    section1_prompt: String,
    section2_prompt: String,
    section3_prompt: String,
}

/// Creates the four image prompts (thumbnail + three sections) for a draft.
pub struct Designer {
    model: Arc<dyn TextModel>,
}

impl Designer {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    /// Returns exactly 4 prompts: `[thumbnail, section1, section2, section3]`.
    pub async fn image_prompts(
        &self,
        article_content: &str,
        title: &str,
        image_model: ImageModel,
    ) -> Result<Vec<String>> {
        let style_instruction = match image_model {
            ImageModel::Flat => {
                "Style: bright, warm, flat-design illustration.\n\
                 Requirement: STRICTLY NO TEXT inside the image. No characters,\n\
                 letters, or words. Focus purely on the food or cooking scene.\n\
                 Brand color: orange."
            }
            ImageModel::Infographic => {
                "Style: infographic / diagrammatic.\n\
                 Requirement: the image MUST include short Japanese text labels\n\
                 summarizing the key points of the section. Clean, professional,\n\
                 friendly design with orange accents."
            }
        };

        let excerpt = truncate_utf8(article_content, CONTENT_EXCERPT_BYTES);

        let prompt = format!(
            r#"You are a visual director. Create prompts for 4 images matching this
article, for the "{image_model}" image family.

Article title: {title}
Article excerpt: {excerpt}

{style_instruction}

Slots:
1. thumbnail
2. section 1
3. section 2
4. section 3

Output (JSON only):
{{
    "thumbnail_prompt": "English prompt...",
    "section1_prompt": "English prompt...",
    "section2_prompt": "English prompt...",
    "section3_prompt": "English prompt..."
}}"#
        );

        let response = self.model.generate(&prompt, TEMPERATURE).await?;

        Ok(match parse_json_lenient::<ImagePromptSet>(&response) {
            Some(set) => vec![
                set.thumbnail_prompt,
                set.section1_prompt,
                set.section2_prompt,
                set.section3_prompt,
            ],
            None => {
                warn!("Unparsable image prompt response, using stock prompts");
                vec![FALLBACK_PROMPT.to_string(); 4]
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    #[tokio::test]
    async fn returns_four_prompts_in_slot_order() {
        let model = ScriptedModel::new().reply(
            r#"{"thumbnail_prompt": "t", "section1_prompt": "s1",
                "section2_prompt": "s2", "section3_prompt": "s3"}"#,
        );
        let designer = Designer::new(Arc::new(model));
        let prompts = designer
            .image_prompts("body", "title", ImageModel::Flat)
            .await
            .unwrap();
        assert_eq!(prompts, vec!["t", "s1", "s2", "s3"]);
    }

    #[tokio::test]
    async fn malformed_output_yields_four_stock_prompts() {
        let model = ScriptedModel::new().reply("no json here");
        let designer = Designer::new(Arc::new(model));
        let prompts = designer
            .image_prompts("body", "title", ImageModel::Infographic)
            .await
            .unwrap();
        assert_eq!(prompts.len(), 4);
        assert!(prompts.iter().all(|p| !p.is_empty()));
    }
}
