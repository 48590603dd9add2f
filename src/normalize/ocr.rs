use serde_json::{json, Value};

use crate::services::{OcrPage, OcrResponse};

/// Inline the page's base64 images into its `![id](id)` placeholders.
fn page_markdown(page: &OcrPage) -> String {
    page.images.iter().fold(page.markdown.clone(), |markdown, image| {
        match &image.image_base64 {
            Some(data) => markdown.replace(
                &format!("![{}]({})", image.id, image.id),
                &format!("![{}]({})", image.id, data),
            ),
            None => markdown,
        }
    })
}

/// All pages as one markdown document, separated by blank lines.
pub fn combined_markdown(response: &OcrResponse) -> String {
    response
        .pages
        .iter()
        .map(page_markdown)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn normalize_ocr(response: &OcrResponse) -> Value {
    json!({ "markdown": combined_markdown(response) })
}
