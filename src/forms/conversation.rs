use crate::models::{MessageStatus, NewMessage, Role};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "New Chat";
pub const MAX_TITLE_CHARS: usize = 200;

#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct ConversationForm {
    #[validate(max_length = 200)]
    pub title: Option<String>,
}

impl ConversationForm {
    pub fn title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => DEFAULT_TITLE.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RenameForm {
    pub title: String,
}

impl RenameForm {
    /// The trimmed title, if it holds 1 to [`MAX_TITLE_CHARS`] characters.
    pub fn title(&self) -> Option<String> {
        let title = self.title.trim();
        let len = title.chars().count();
        (1..=MAX_TITLE_CHARS).contains(&len).then(|| title.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct MessageForm {
    pub role: Role,
    #[validate(max_length = 100000)]
    pub content: String,
    pub status: Option<MessageStatus>,
}

impl MessageForm {
    pub fn into_new_message(self, conversation_id: Uuid) -> NewMessage {
        NewMessage {
            conversation_id,
            role: self.role,
            content: self.content,
            status: self.status.unwrap_or(MessageStatus::Complete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_falls_back_to_new_chat() {
        let form = ConversationForm {
            title: Some("   ".to_string()),
        };
        assert_eq!(form.title(), DEFAULT_TITLE);
    }

    #[test]
    fn rename_title_is_measured_after_trimming() {
        let form = RenameForm {
            title: "x".repeat(201),
        };
        assert_eq!(form.title(), None);

        let form = RenameForm {
            title: "   ".to_string(),
        };
        assert_eq!(form.title(), None);

        let form = RenameForm {
            title: "  Trip plan ".to_string(),
        };
        assert_eq!(form.title().as_deref(), Some("Trip plan"));

        let padded = format!("  {}  ", "é".repeat(MAX_TITLE_CHARS));
        let form = RenameForm { title: padded };
        assert_eq!(form.title(), Some("é".repeat(MAX_TITLE_CHARS)));
    }

    #[test]
    fn message_status_defaults_to_complete() {
        let form: MessageForm =
            serde_json::from_str(r#"{"role": "user", "content": "hello"}"#).unwrap();
        let message = form.into_new_message(Uuid::new_v4());
        assert_eq!(message.status, MessageStatus::Complete);
    }
}
