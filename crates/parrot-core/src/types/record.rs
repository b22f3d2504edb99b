//! Trigger record types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{ErrorCode, ParrotError, ParrotResult};

/// Field delimiter of the stored record form. Triggers may never contain it.
pub const FIELD_DELIMITER: char = '|';

/// Content type of a trigger's reply.
///
/// Names serialize to lowercase (`videonote` for [`MediaKind::VideoNote`]),
/// which is also the stored form in both backends.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Plain text reply; no media reference.
    #[default]
    Text,
    Photo,
    Sticker,
    Video,
    Voice,
    Audio,
    Animation,
    VideoNote,
}

impl MediaKind {
    /// Whether this kind carries an external media reference.
    pub fn is_media(&self) -> bool {
        !matches!(self, MediaKind::Text)
    }

    /// Stored names of every kind.
    pub fn all_names() -> Vec<&'static str> {
        Self::iter().map(|k| k.into()).collect()
    }
}

/// The stored association between a trigger and its reply content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
    /// Substring that activates this record. Unique across the store.
    pub trigger: String,
    /// Body or caption text. May be empty for pure media replies.
    pub reply_text: String,
    /// Which content field is meaningful.
    pub media_kind: MediaKind,
    /// Opaque external content handle. Empty for text replies.
    pub media_ref: String,
}

impl TriggerRecord {
    /// Create a validated record.
    pub fn new(
        trigger: impl Into<String>,
        reply_text: impl Into<String>,
        media_kind: MediaKind,
        media_ref: impl Into<String>,
    ) -> ParrotResult<Self> {
        let record = Self {
            trigger: trigger.into(),
            reply_text: reply_text.into(),
            media_kind,
            media_ref: media_ref.into(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Create a validated plain text record.
    pub fn text(trigger: impl Into<String>, reply_text: impl Into<String>) -> ParrotResult<Self> {
        Self::new(trigger, reply_text, MediaKind::Text, String::new())
    }

    /// Check the record invariants.
    pub fn validate(&self) -> ParrotResult<()> {
        validate_trigger(&self.trigger)?;

        if self.media_kind.is_media() && self.media_ref.is_empty() {
            return Err(ParrotError::validation(
                format!(
                    "media kind '{}' requires a media reference",
                    self.media_kind
                ),
                ErrorCode::ValMissingMediaRef,
            ));
        }

        Ok(())
    }
}

/// Check that a trigger string can be stored.
///
/// Line breaks are rejected as well as the delimiter, since the flat-file
/// backend keeps one record per line.
pub fn validate_trigger(trigger: &str) -> ParrotResult<()> {
    if trigger.is_empty() {
        return Err(ParrotError::validation(
            "trigger must not be empty",
            ErrorCode::ValEmptyTrigger,
        ));
    }

    if let Some(c) = trigger
        .chars()
        .find(|c| *c == FIELD_DELIMITER || *c == '\n' || *c == '\r')
    {
        return Err(ParrotError::validation(
            format!("trigger must not contain {:?}", c),
            ErrorCode::ValInvalidTrigger,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_media_kind_names() {
        assert_eq!(MediaKind::VideoNote.to_string(), "videonote");
        assert_eq!(MediaKind::from_str("photo").unwrap(), MediaKind::Photo);
        assert!(MediaKind::from_str("document").is_err());
        assert_eq!(MediaKind::all_names().len(), 8);
        assert!(!MediaKind::Text.is_media());
        assert!(MediaKind::Sticker.is_media());
    }

    #[test]
    fn test_media_kind_serde() {
        let json = serde_json::to_string(&MediaKind::VideoNote).unwrap();
        assert_eq!(json, "\"videonote\"");
        let kind: MediaKind = serde_json::from_str("\"animation\"").unwrap();
        assert_eq!(kind, MediaKind::Animation);
    }

    #[test]
    fn test_record_creation() {
        let record = TriggerRecord::new("lol", "", MediaKind::Photo, "file123").unwrap();
        assert_eq!(record.trigger, "lol");
        assert_eq!(record.media_kind, MediaKind::Photo);

        let text = TriggerRecord::text("hi", "hello there").unwrap();
        assert_eq!(text.media_kind, MediaKind::Text);
        assert!(text.media_ref.is_empty());
    }

    #[test]
    fn test_record_rejects_invalid_trigger() {
        let err = TriggerRecord::text("", "x").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValEmptyTrigger);

        let err = TriggerRecord::text("a|b", "x").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValInvalidTrigger);

        let err = TriggerRecord::text("two\nlines", "x").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValInvalidTrigger);
    }

    #[test]
    fn test_record_requires_media_ref() {
        let err = TriggerRecord::new("lol", "", MediaKind::Voice, "").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValMissingMediaRef);
    }
}
