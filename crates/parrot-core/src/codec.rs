//! Flat textual form of a trigger record.
//!
//! A record is stored as `trigger|reply_text|media_kind|media_ref`. The trigger
//! never contains the delimiter, so it is written as-is. The reply text and the
//! media reference are backslash-escaped (`\|`, `\\`, `\n`, `\r`) so that any
//! content survives a round trip and a record always fits on one line. Records
//! whose content needs no escaping encode to the plain pipe-joined form.
//!
//! Lines written without escaping that do not parse as escaped, such as
//! `t|C:\|text|` where a reply ends in a backslash, are read as a plain
//! four-way split instead.

use std::str::FromStr;

use crate::error::DecodeError;
use crate::types::{MediaKind, TriggerRecord, FIELD_DELIMITER};

const ESCAPE: char = '\\';

/// Encode a record into its stored line (without a trailing newline).
pub fn encode(record: &TriggerRecord) -> String {
    let mut out = String::with_capacity(
        record.trigger.len() + record.reply_text.len() + record.media_ref.len() + 16,
    );
    out.push_str(&record.trigger);
    out.push(FIELD_DELIMITER);
    escape_into(&record.reply_text, &mut out);
    out.push(FIELD_DELIMITER);
    out.push_str(record.media_kind.into());
    out.push(FIELD_DELIMITER);
    escape_into(&record.media_ref, &mut out);
    out
}

/// Encode a record into the bytes stored as a key-value value.
pub fn encode_bytes(record: &TriggerRecord) -> Vec<u8> {
    encode(record).into_bytes()
}

/// Decode a stored line back into a record.
pub fn decode(line: &str) -> Result<TriggerRecord, DecodeError> {
    let record = match decode_escaped(line) {
        Ok(record) => record,
        Err(err) => decode_plain(line).ok_or(err)?,
    };

    if record.media_kind.is_media() && record.media_ref.is_empty() {
        return Err(DecodeError::MissingMediaRef {
            kind: record.media_kind.to_string(),
        });
    }
    Ok(record)
}

fn decode_escaped(line: &str) -> Result<TriggerRecord, DecodeError> {
    let (trigger, rest) = line
        .split_once(FIELD_DELIMITER)
        .ok_or(DecodeError::Malformed { fields: 1 })?;
    let (reply_text, rest) = split_escaped(rest).ok_or(DecodeError::Malformed { fields: 2 })?;
    let (kind, media_ref) = rest
        .split_once(FIELD_DELIMITER)
        .ok_or(DecodeError::Malformed { fields: 3 })?;

    if trigger.is_empty() {
        return Err(DecodeError::EmptyTrigger);
    }

    let media_kind =
        MediaKind::from_str(kind).map_err(|_| DecodeError::UnknownMediaKind(kind.to_string()))?;

    Ok(TriggerRecord {
        trigger: trigger.to_string(),
        reply_text,
        media_kind,
        media_ref: unescape(media_ref),
    })
}

/// Unescaped four-way split, fields taken verbatim.
fn decode_plain(line: &str) -> Option<TriggerRecord> {
    let fields: Vec<&str> = line.splitn(4, FIELD_DELIMITER).collect();
    let [trigger, reply_text, kind, media_ref] = fields.as_slice() else {
        return None;
    };
    if trigger.is_empty() {
        return None;
    }

    Some(TriggerRecord {
        trigger: trigger.to_string(),
        reply_text: reply_text.to_string(),
        media_kind: MediaKind::from_str(kind).ok()?,
        media_ref: media_ref.to_string(),
    })
}

/// Decode a stored key-value value.
pub fn decode_bytes(bytes: &[u8]) -> Result<TriggerRecord, DecodeError> {
    let line = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
    decode(line)
}

/// Extract only the trigger field of a stored line, without decoding the rest.
pub fn trigger_of(line: &str) -> Option<&str> {
    line.split_once(FIELD_DELIMITER).map(|(trigger, _)| trigger)
}

/// Byte form of [`trigger_of`], usable on lines that are not valid UTF-8.
pub fn trigger_of_bytes(line: &[u8]) -> Option<&[u8]> {
    let delimiter = FIELD_DELIMITER as u8;
    line.iter()
        .position(|b| *b == delimiter)
        .map(|idx| &line[..idx])
}

fn escape_into(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            FIELD_DELIMITER => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
}

/// Unescape up to the first unescaped delimiter, returning the field and the
/// remainder after the delimiter.
fn split_escaped(input: &str) -> Option<(String, &str)> {
    let mut field = String::new();
    let mut chars = input.char_indices();

    while let Some((idx, c)) = chars.next() {
        match c {
            FIELD_DELIMITER => return Some((field, &input[idx + c.len_utf8()..])),
            ESCAPE => match chars.next() {
                Some((_, next)) => push_unescaped(next, &mut field),
                None => field.push(ESCAPE),
            },
            _ => field.push(c),
        }
    }

    None
}

fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c == ESCAPE {
            match chars.next() {
                Some(next) => push_unescaped(next, &mut out),
                None => out.push(ESCAPE),
            }
        } else {
            out.push(c);
        }
    }

    out
}

// Unknown escapes are kept literally so lines written without escaping
// (e.g. a reply containing a Windows path) still read back unchanged.
fn push_unescaped(c: char, out: &mut String) {
    match c {
        'n' => out.push('\n'),
        'r' => out.push('\r'),
        ESCAPE | FIELD_DELIMITER => out.push(c),
        other => {
            out.push(ESCAPE);
            out.push(other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(trigger: &str, reply: &str, kind: MediaKind, media_ref: &str) -> TriggerRecord {
        TriggerRecord {
            trigger: trigger.to_string(),
            reply_text: reply.to_string(),
            media_kind: kind,
            media_ref: media_ref.to_string(),
        }
    }

    #[test]
    fn test_encode_plain_form() {
        let r = record("lol", "", MediaKind::Photo, "file123");
        assert_eq!(encode(&r), "lol||photo|file123");

        let r = record("hi", "hello there", MediaKind::Text, "");
        assert_eq!(encode(&r), "hi|hello there|text|");

        let r = record("circle", "", MediaKind::VideoNote, "vn-1");
        assert_eq!(encode(&r), "circle||videonote|vn-1");
    }

    #[test]
    fn test_decode_plain_form() {
        let r = decode("cat|meow|sticker|CAACAgI").unwrap();
        assert_eq!(r, record("cat", "meow", MediaKind::Sticker, "CAACAgI"));
    }

    #[test]
    fn test_round_trip_with_special_characters() {
        let samples = [
            record("pipe", "a|b|c", MediaKind::Text, ""),
            record("multi", "line one\nline two\r\n", MediaKind::Text, ""),
            record("slash", "C:\\temp\\", MediaKind::Animation, "ref|with|pipes"),
            record("привіт", "вітаю", MediaKind::Voice, "AwACAgIAAx"),
            record("trailing", "ends with \\", MediaKind::Audio, "\\"),
        ];

        for r in samples {
            let line = encode(&r);
            assert!(!line.contains('\n'), "encoded line must be single-line: {line}");
            assert_eq!(decode(&line).unwrap(), r);
            assert_eq!(decode_bytes(&encode_bytes(&r)).unwrap(), r);
        }
    }

    #[test]
    fn test_decode_malformed() {
        assert_eq!(decode("just-a-trigger"), Err(DecodeError::Malformed { fields: 1 }));
        assert_eq!(decode("t|reply"), Err(DecodeError::Malformed { fields: 2 }));
        assert_eq!(decode("t|reply|text"), Err(DecodeError::Malformed { fields: 3 }));
        assert_eq!(decode(""), Err(DecodeError::Malformed { fields: 1 }));
    }

    #[test]
    fn test_decode_rejects_bad_fields() {
        assert_eq!(decode("|reply|text|"), Err(DecodeError::EmptyTrigger));
        assert_eq!(
            decode("t|reply|document|x"),
            Err(DecodeError::UnknownMediaKind("document".to_string()))
        );
        assert_eq!(decode_bytes(&[0x74, 0x7c, 0xff]), Err(DecodeError::InvalidUtf8));
    }

    #[test]
    fn test_unknown_escape_is_literal() {
        let r = decode("path|C:\\data|text|").unwrap();
        assert_eq!(r.reply_text, "C:\\data");
    }

    #[test]
    fn test_trigger_of() {
        assert_eq!(trigger_of("cat|meow|text|"), Some("cat"));
        assert_eq!(trigger_of("garbage"), None);
        assert_eq!(
            trigger_of_bytes(b"bad\xff|x|text|"),
            Some(b"bad\xff".as_slice())
        );
        assert_eq!(trigger_of_bytes(b"garbage"), None);
    }

    #[test]
    fn test_media_kind_without_ref_is_rejected() {
        assert_eq!(
            decode("t||photo|"),
            Err(DecodeError::MissingMediaRef {
                kind: "photo".to_string()
            })
        );
        assert!(decode("t|hi|text|").is_ok());
    }

    #[test]
    fn test_plain_line_with_trailing_backslash() {
        let r = decode("t|C:\\|text|").unwrap();
        assert_eq!(r, record("t", "C:\\", MediaKind::Text, ""));

        let r = decode("dir|D:\\|photo|ph1").unwrap();
        assert_eq!(r.reply_text, "D:\\");
        assert_eq!(r.media_ref, "ph1");
    }
}
