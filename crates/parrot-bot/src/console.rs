//! Local stdin/stdout chat transport.
//!
//! Every input line is a message from one local user in one chat. Outbound
//! messages are written as JSON lines. Media is simulated with lines of the
//! form `!<kind> <file_ref> [caption]`, e.g. `!photo AgACAgI look at this`.
//! A command line replies to the most recent non-command line, so
//! `/save <trigger>` stores whatever was typed just before it.

use anyhow::{bail, Result};
use parrot_core::MediaKind;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::command::is_command;
use crate::dispatcher::Dispatcher;
use crate::message::{InboundMessage, Sender};

/// Prefix of a simulated media line.
pub const MEDIA_PREFIX: char = '!';

/// Turns console lines into inbound messages.
#[derive(Debug, Clone)]
pub struct ConsoleTransport {
    chat_id: i64,
    sender: Sender,
    last_message: Option<InboundMessage>,
}

impl ConsoleTransport {
    pub fn new(chat_id: i64, sender: Sender) -> Self {
        Self {
            chat_id,
            sender,
            last_message: None,
        }
    }

    /// Parse one input line.
    ///
    /// Blank lines yield `Ok(None)`. A malformed media line is an error and
    /// leaves the replied-to message untouched.
    pub fn parse_line(&mut self, line: &str) -> Result<Option<InboundMessage>> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Ok(None);
        }

        let message = match line.strip_prefix(MEDIA_PREFIX) {
            Some(media) => self.media_message(media)?,
            None => InboundMessage::text(self.chat_id, self.sender.clone(), line),
        };

        if is_command(&message.text) {
            Ok(Some(match &self.last_message {
                Some(previous) => message.with_reply_to(previous.clone()),
                None => message,
            }))
        } else {
            self.last_message = Some(message.clone());
            Ok(Some(message))
        }
    }

    fn media_message(&self, line: &str) -> Result<InboundMessage> {
        let mut parts = line.splitn(3, ' ');
        let kind_name = parts.next().unwrap_or_default();
        let file_ref = parts.next().unwrap_or_default().trim();
        let caption = parts.next().map(str::trim).unwrap_or_default();

        let kind: MediaKind = match kind_name.parse() {
            Ok(kind) if kind != MediaKind::Text => kind,
            _ => bail!(
                "unknown media kind '{}', expected one of: {}",
                kind_name,
                MediaKind::all_names()
                    .into_iter()
                    .filter(|name| *name != "text")
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        if file_ref.is_empty() {
            bail!("media line needs a file reference: !{} <file_ref> [caption]", kind);
        }

        let message = InboundMessage::text(self.chat_id, self.sender.clone(), "")
            .with_media(kind, file_ref);
        Ok(if caption.is_empty() {
            message
        } else {
            message.with_caption(caption)
        })
    }
}

/// Read messages until end of input, writing every reply as a JSON line.
///
/// Returns the number of inbound messages handled.
pub async fn run<R, W>(
    dispatcher: &Dispatcher,
    transport: &mut ConsoleTransport,
    reader: R,
    mut writer: W,
) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.split(b'\n');
    let mut handled = 0u64;

    while let Some(raw) = lines.next_segment().await? {
        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(_) => {
                warn!("Skipping console line that is not valid UTF-8");
                continue;
            }
        };

        let message = match transport.parse_line(&line) {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, "Skipping console line");
                continue;
            }
        };

        handled += 1;
        for outbound in dispatcher.handle(&message) {
            let json = serde_json::to_string(&outbound)?;
            writer.write_all(json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
        writer.flush().await?;
    }

    debug!(handled, "Console input closed");
    Ok(handled)
}
