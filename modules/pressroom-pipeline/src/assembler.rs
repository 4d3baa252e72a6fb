//! Content re-assembly: split article text on the section marker and
//! interleave generated images between the parts.
//!
//! The thumbnail (image index 0 of a draft) is handled separately as the
//! featured/cover image and is never passed in here.

use pressroom_common::SECTION_MARKER;

/// One body image in its target encoding.
#[derive(Debug, Clone)]
pub enum BodyImage {
    /// CMS block embed carrying the numeric media id.
    Block { media_id: u64, url: String },
    /// Markdown image tag carrying a direct URL.
    Inline { url: String },
}

impl BodyImage {
    fn render(&self, position: usize) -> String {
        match self {
            BodyImage::Block { media_id, url } => format!(
                "\n\n<!-- wp:image {{\"id\":{media_id}}} --><figure class=\"wp-block-image\"><img src=\"{url}\" /></figure><!-- /wp:image -->\n\n"
            ),
            BodyImage::Inline { url } => {
                format!("![Section Image {}]({url})\n\n", position + 1)
            }
        }
    }
}

/// Split article text on the literal section marker. Text with no marker is
/// a single part.
pub fn split_sections(raw_text: &str) -> Vec<&str> {
    raw_text.split(SECTION_MARKER).collect()
}

/// Interleave: part[0], image[0], part[1], image[1], part[2], image[2].
/// Missing parts or missing images degrade gracefully — only the pieces
/// present are emitted, and a `None` slot (e.g. a failed media upload) leaves
/// its position empty without shifting later images. Unsegmented text (no
/// marker) gets no images at all.
pub fn assemble(raw_text: &str, images: &[Option<BodyImage>]) -> String {
    let parts = split_sections(raw_text);
    let segmented = parts.len() > 1;

    let mut out = String::new();
    for (index, part) in parts.iter().enumerate() {
        out.push_str(part.trim_end());
        out.push_str("\n\n");
        if segmented {
            if let Some(Some(image)) = images.get(index) {
                out.push_str(&image.render(index));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline(url: &str) -> Option<BodyImage> {
        Some(BodyImage::Inline {
            url: url.to_string(),
        })
    }

    fn block(media_id: u64, url: &str) -> Option<BodyImage> {
        Some(BodyImage::Block {
            media_id,
            url: url.to_string(),
        })
    }

    #[test]
    fn two_markers_yield_three_parts() {
        let text = format!("a{SECTION_MARKER}b{SECTION_MARKER}c");
        assert_eq!(split_sections(&text), vec!["a", "b", "c"]);
    }

    #[test]
    fn no_marker_yields_one_part_and_no_inlined_images() {
        let out = assemble("just one part", &[inline("https://x/1.png")]);
        assert!(out.contains("just one part"));
        assert!(!out.contains("https://x/1.png"));
        assert_eq!(split_sections("just one part").len(), 1);
    }

    #[test]
    fn block_encoding_skipped_for_unsegmented_text() {
        let out = assemble("solo", &[block(42, "https://x/1.png")]);
        assert!(!out.contains("wp:image"));
    }

    #[test]
    fn interleaves_three_parts_with_three_images() {
        let text = format!("intro{SECTION_MARKER}middle{SECTION_MARKER}end");
        let images = vec![
            inline("https://x/1.png"),
            inline("https://x/2.png"),
            inline("https://x/3.png"),
        ];
        let out = assemble(&text, &images);

        let intro = out.find("intro").unwrap();
        let img1 = out.find("https://x/1.png").unwrap();
        let middle = out.find("middle").unwrap();
        let img2 = out.find("https://x/2.png").unwrap();
        let end = out.find("end").unwrap();
        let img3 = out.find("https://x/3.png").unwrap();
        assert!(intro < img1 && img1 < middle && middle < img2 && img2 < end && end < img3);
    }

    #[test]
    fn short_image_list_degrades_gracefully() {
        let text = format!("a{SECTION_MARKER}b{SECTION_MARKER}c");
        let out = assemble(&text, &[inline("https://x/1.png")]);
        assert!(out.contains("https://x/1.png"));
        assert!(out.contains('c'));
        assert_eq!(out.matches("![Section Image").count(), 1);
    }

    #[test]
    fn empty_image_list_emits_only_text() {
        let text = format!("a{SECTION_MARKER}b");
        let out = assemble(&text, &[]);
        assert!(out.contains('a') && out.contains('b'));
        assert!(!out.contains("!["));
    }

    #[test]
    fn block_encoding_carries_media_id() {
        let text = format!("a{SECTION_MARKER}b");
        let out = assemble(&text, &[block(42, "https://x/1.png")]);
        assert!(out.contains("wp:image"));
        assert!(out.contains("\"id\":42"));
        assert!(out.contains("https://x/1.png"));
    }

    #[test]
    fn failed_slot_leaves_position_empty_without_shifting() {
        let text = format!("a{SECTION_MARKER}b{SECTION_MARKER}c");
        let out = assemble(&text, &[inline("https://x/1.png"), None, inline("https://x/3.png")]);
        assert!(out.contains("![Section Image 1](https://x/1.png)"));
        assert!(!out.contains("Section Image 2"));
        assert!(out.contains("![Section Image 3](https://x/3.png)"));
        assert!(out.find('c').unwrap() < out.find("https://x/3.png").unwrap());
    }

    #[test]
    fn inline_alt_text_numbered_by_position() {
        let text = format!("a{SECTION_MARKER}b");
        let out = assemble(&text, &[inline("https://x/1.png"), inline("https://x/2.png")]);
        assert!(out.contains("![Section Image 1](https://x/1.png)"));
        assert!(out.contains("![Section Image 2](https://x/2.png)"));
    }
}
