//! DTOs for the OpenAI-compatible chat-completions wire format.
//!
//! Only the fields this adapter sends or reads are modelled; unknown response
//! fields are ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct ChatRequestDto<'a> {
    pub(super) model: &'a str,
    pub(super) messages: Vec<ChatMessageDto<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatMessageDto<'a> {
    pub(super) role: &'static str,
    pub(super) content: Vec<ContentPartDto<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum ContentPartDto<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrlDto },
}

#[derive(Debug, Serialize)]
pub(super) struct ImageUrlDto {
    pub(super) url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatResponseDto {
    #[serde(default)]
    pub(super) choices: Vec<ChoiceDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChoiceDto {
    pub(super) message: ChoiceMessageDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChoiceMessageDto {
    #[serde(default)]
    pub(super) content: Option<String>,
}

impl<'a> ChatRequestDto<'a> {
    /// Single user message carrying an instruction and one image.
    pub(super) fn with_image(model: &'a str, prompt: &'a str, image_url: String) -> Self {
        Self {
            model,
            messages: vec![ChatMessageDto {
                role: "user",
                content: vec![
                    ContentPartDto::Text { text: prompt },
                    ContentPartDto::ImageUrl {
                        image_url: ImageUrlDto { url: image_url },
                    },
                ],
            }],
        }
    }
}

impl ChatResponseDto {
    /// Text of the first choice. `None` when there are no choices; a `null`
    /// message content counts as empty text.
    pub(super) fn into_first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialises_text_then_image_parts() {
        let request =
            ChatRequestDto::with_image("model-x", "describe", "data:image/png;base64,AA==".into());
        let value = serde_json::to_value(&request).expect("request serialises");

        assert_eq!(
            value,
            json!({
                "model": "model-x",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "describe"},
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,AA=="}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn response_yields_first_choice() {
        let dto: ChatResponseDto = serde_json::from_value(json!({
            "id": "abc",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "# A"}},
                {"index": 1, "message": {"role": "assistant", "content": "# B"}}
            ]
        }))
        .expect("response decodes");
        assert_eq!(dto.into_first_content().as_deref(), Some("# A"));
    }

    #[test]
    fn null_content_is_empty_text() {
        let dto: ChatResponseDto = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .expect("response decodes");
        assert_eq!(dto.into_first_content().as_deref(), Some(""));
    }

    #[test]
    fn missing_choices_yield_none() {
        let dto: ChatResponseDto =
            serde_json::from_value(json!({"object": "chat.completion"})).expect("decodes");
        assert!(dto.into_first_content().is_none());
    }
}
