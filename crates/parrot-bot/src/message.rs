//! Inbound and outbound chat message types.
//!
//! These mirror what a chat transport hands to the bot and what it expects
//! back. Media is referenced by opaque file handles only; the bot never
//! touches media bytes.

use parrot_core::{MediaKind, TriggerRecord};
use serde::{Deserialize, Serialize};

/// Who sent a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Sender {
    pub fn new(id: i64, username: Option<String>) -> Self {
        Self { id, username }
    }

    /// Name for logs: the username, or the numeric id.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// A media item attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    pub file_ref: String,
}

/// A decoded message received from the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub sender: Sender,
    /// Message text. Empty for media-only messages.
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAttachment>,
    /// The message this one replies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Box<InboundMessage>>,
}

/// Content to store for a trigger, taken from a replied-to message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedContent {
    pub reply_text: String,
    pub media_kind: MediaKind,
    pub media_ref: String,
}

impl InboundMessage {
    /// Create a plain text message.
    pub fn text(chat_id: i64, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            sender,
            text: text.into(),
            caption: None,
            media: None,
            reply_to: None,
        }
    }

    /// Builder method to attach media
    pub fn with_media(mut self, kind: MediaKind, file_ref: impl Into<String>) -> Self {
        self.media = Some(MediaAttachment {
            kind,
            file_ref: file_ref.into(),
        });
        self
    }

    /// Builder method to set the caption
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Builder method to set the replied-to message
    pub fn with_reply_to(mut self, message: InboundMessage) -> Self {
        self.reply_to = Some(Box::new(message));
        self
    }

    /// Text used for trigger matching: the body, or the caption of a media
    /// message.
    pub fn match_text(&self) -> &str {
        if self.text.is_empty() {
            self.caption.as_deref().unwrap_or_default()
        } else {
            &self.text
        }
    }

    /// What a trigger saved from this message should reply with.
    ///
    /// A media attachment makes a media reply; anything else is a text reply.
    pub fn saved_content(&self) -> SavedContent {
        let reply_text = self.match_text().to_string();
        match &self.media {
            Some(media) if media.kind.is_media() && !media.file_ref.is_empty() => SavedContent {
                reply_text,
                media_kind: media.kind,
                media_ref: media.file_ref.clone(),
            },
            _ => SavedContent {
                reply_text,
                media_kind: MediaKind::Text,
                media_ref: String::new(),
            },
        }
    }
}

/// Content of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyContent {
    Text {
        text: String,
    },
    Photo {
        file_ref: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Sticker {
        file_ref: String,
    },
    Video {
        file_ref: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Voice {
        file_ref: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Audio {
        file_ref: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Animation {
        file_ref: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    VideoNote {
        file_ref: String,
    },
}

impl ReplyContent {
    /// Build the reply for a matched trigger.
    ///
    /// Returns `None` for a text trigger with an empty body, which has nothing
    /// to send. Stickers and video notes cannot carry a caption, so any stored
    /// text is dropped for them.
    pub fn from_record(record: &TriggerRecord) -> Option<Self> {
        let file_ref = record.media_ref.clone();
        let caption = Some(record.reply_text.clone()).filter(|c| !c.is_empty());

        let content = match record.media_kind {
            MediaKind::Text => {
                if record.reply_text.is_empty() {
                    return None;
                }
                Self::Text {
                    text: record.reply_text.clone(),
                }
            }
            MediaKind::Photo => Self::Photo { file_ref, caption },
            MediaKind::Sticker => Self::Sticker { file_ref },
            MediaKind::Video => Self::Video { file_ref, caption },
            MediaKind::Voice => Self::Voice { file_ref, caption },
            MediaKind::Audio => Self::Audio { file_ref, caption },
            MediaKind::Animation => Self::Animation { file_ref, caption },
            MediaKind::VideoNote => Self::VideoNote { file_ref },
        };
        Some(content)
    }
}

/// A send request for the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub chat_id: i64,
    #[serde(flatten)]
    pub content: ReplyContent,
}

impl OutboundMessage {
    /// Create a plain text message.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            content: ReplyContent::Text { text: text.into() },
        }
    }
}
