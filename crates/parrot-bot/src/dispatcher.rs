//! Routes inbound messages to the trigger service.

use std::sync::Arc;
use std::time::Instant;

use parrot_core::{ParrotError, TriggerService};
use tracing::{debug, warn};

use crate::command::{is_command, Command};
use crate::message::{InboundMessage, OutboundMessage, ReplyContent};

pub const WELCOME_TEXT: &str = "Welcome! This bot stores triggers and replies to them. \
Use /save, /del, /list, /ping and /help to manage it.";

pub const HELP_TEXT: &str = "Available commands:
/start - start using the bot
/save <trigger> - save the replied-to message as a trigger
/del <trigger> - delete a trigger
/list - show the trigger list
/ping - check that the bot is alive and how fast it answers
/help - show this help";

pub const SAVED_TEXT: &str = "Trigger saved.";
pub const EXISTS_TEXT: &str = "This trigger already exists.";
pub const DELETED_TEXT: &str = "Trigger deleted.";
pub const MISSING_TEXT: &str = "This trigger does not exist.";
pub const EMPTY_LIST_TEXT: &str = "The trigger list is empty.";
pub const FAILURE_TEXT: &str = "Something went wrong, please try again later.";

/// Turns inbound messages into outbound replies.
pub struct Dispatcher {
    service: Arc<TriggerService>,
}

impl Dispatcher {
    pub fn new(service: Arc<TriggerService>) -> Self {
        Self { service }
    }

    /// Handle one inbound message, returning the replies to send in order.
    pub fn handle(&self, message: &InboundMessage) -> Vec<OutboundMessage> {
        let started = Instant::now();
        let chat_id = message.chat_id;

        if is_command(&message.text) {
            let Some(command) = Command::parse(&message.text) else {
                debug!(text = %message.text, "Ignoring unrecognised command");
                return Vec::new();
            };
            return self.handle_command(command, message, started);
        }

        match self.service.find_reply(message.match_text()) {
            Ok(Some(record)) => {
                debug!(
                    trigger = %record.trigger,
                    sender = %message.sender.display_name(),
                    "Replying to trigger"
                );
                ReplyContent::from_record(&record)
                    .map(|content| vec![OutboundMessage { chat_id, content }])
                    .unwrap_or_default()
            }
            Ok(None) => Vec::new(),
            // Failures are already logged by the service; stay quiet in chat.
            Err(_) => Vec::new(),
        }
    }

    fn handle_command(
        &self,
        command: Command,
        message: &InboundMessage,
        started: Instant,
    ) -> Vec<OutboundMessage> {
        let chat_id = message.chat_id;
        let reply = |text: &str| vec![OutboundMessage::text(chat_id, text)];

        match command {
            Command::Start => reply(WELCOME_TEXT),
            Command::Help => reply(HELP_TEXT),
            Command::Ping => vec![
                OutboundMessage::text(chat_id, "Pong!"),
                OutboundMessage::text(
                    chat_id,
                    format!("Response time: {:?}", started.elapsed()),
                ),
            ],
            Command::List => match self.service.list() {
                Ok(triggers) => reply(&render_list(&triggers)),
                Err(_) => reply(FAILURE_TEXT),
            },
            Command::Save { trigger } => {
                let Some(source) = message.reply_to.as_deref() else {
                    debug!(%trigger, "Ignoring /save without a replied-to message");
                    return Vec::new();
                };
                let content = source.saved_content();
                let result = self.service.save(
                    &trigger,
                    &content.reply_text,
                    content.media_kind,
                    &content.media_ref,
                );
                match result {
                    Ok(_) => reply(SAVED_TEXT),
                    Err(ParrotError::AlreadyExists { .. }) => reply(EXISTS_TEXT),
                    Err(ParrotError::Validation { message: reason, .. }) => {
                        warn!(%trigger, %reason, "Rejected trigger");
                        reply(&format!("Cannot save this trigger: {}.", reason))
                    }
                    Err(_) => reply(FAILURE_TEXT),
                }
            }
            Command::Delete { trigger } => match self.service.delete(&trigger) {
                Ok(()) => reply(DELETED_TEXT),
                Err(ParrotError::NotFound { .. }) => reply(MISSING_TEXT),
                Err(_) => reply(FAILURE_TEXT),
            },
        }
    }
}

/// Render the trigger list reply.
pub fn render_list(triggers: &[String]) -> String {
    if triggers.is_empty() {
        return EMPTY_LIST_TEXT.to_string();
    }

    let mut out = String::from("Trigger list:\n");
    for trigger in triggers {
        out.push_str(" - ");
        out.push_str(trigger);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;
    use parrot_core::{MediaKind, SqliteTriggerBackend};

    fn dispatcher() -> Dispatcher {
        let backend = SqliteTriggerBackend::in_memory().unwrap();
        Dispatcher::new(Arc::new(TriggerService::new(Box::new(backend)).unwrap()))
    }

    fn msg(text: &str) -> InboundMessage {
        InboundMessage::text(100, Sender::new(1, Some("bob".to_string())), text)
    }

    fn texts(out: &[OutboundMessage]) -> Vec<String> {
        out.iter()
            .map(|m| match &m.content {
                ReplyContent::Text { text } => text.clone(),
                other => format!("{:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_save_from_reply_then_trigger() {
        let d = dispatcher();
        let source = msg("").with_media(MediaKind::Sticker, "CAACAgI");

        let out = d.handle(&msg("/save hello").with_reply_to(source));
        assert_eq!(texts(&out), vec![SAVED_TEXT]);

        let out = d.handle(&msg("well hello there"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].chat_id, 100);
        assert_eq!(
            out[0].content,
            ReplyContent::Sticker {
                file_ref: "CAACAgI".to_string()
            }
        );
    }

    #[test]
    fn test_save_duplicate() {
        let d = dispatcher();
        d.handle(&msg("/save hi").with_reply_to(msg("hello!")));
        let out = d.handle(&msg("/save hi").with_reply_to(msg("other")));
        assert_eq!(texts(&out), vec![EXISTS_TEXT]);
    }

    #[test]
    fn test_save_without_reply_is_ignored() {
        let d = dispatcher();
        assert!(d.handle(&msg("/save hi")).is_empty());
        assert_eq!(texts(&d.handle(&msg("/list"))), vec![EMPTY_LIST_TEXT]);
    }

    #[test]
    fn test_save_invalid_trigger() {
        let d = dispatcher();
        let out = d.handle(&msg("/save a|b").with_reply_to(msg("x")));
        assert!(texts(&out)[0].starts_with("Cannot save this trigger"));
    }

    #[test]
    fn test_delete() {
        let d = dispatcher();
        assert_eq!(texts(&d.handle(&msg("/del hi"))), vec![MISSING_TEXT]);

        d.handle(&msg("/save hi").with_reply_to(msg("hello!")));
        assert_eq!(texts(&d.handle(&msg("/del hi"))), vec![DELETED_TEXT]);
        assert!(d.handle(&msg("hi")).is_empty());
    }

    #[test]
    fn test_list() {
        let d = dispatcher();
        d.handle(&msg("/save b").with_reply_to(msg("2")));
        d.handle(&msg("/save a").with_reply_to(msg("1")));

        let out = d.handle(&msg("/list"));
        assert_eq!(texts(&out), vec!["Trigger list:\n - a\n - b\n"]);
    }

    #[test]
    fn test_static_commands() {
        let d = dispatcher();
        assert_eq!(texts(&d.handle(&msg("/start"))), vec![WELCOME_TEXT]);
        assert_eq!(texts(&d.handle(&msg("/help"))), vec![HELP_TEXT]);

        let pong = texts(&d.handle(&msg("/ping")));
        assert_eq!(pong.len(), 2);
        assert_eq!(pong[0], "Pong!");
        assert!(pong[1].starts_with("Response time: "));
    }

    #[test]
    fn test_unknown_command_does_not_match_triggers() {
        let d = dispatcher();
        d.handle(&msg("/save weather").with_reply_to(msg("sunny")));
        assert!(d.handle(&msg("/weather")).is_empty());
    }

    #[test]
    fn test_caption_is_matched() {
        let d = dispatcher();
        d.handle(&msg("/save cat").with_reply_to(msg("meow")));

        let photo = msg("").with_media(MediaKind::Photo, "p").with_caption("my cat");
        assert_eq!(texts(&d.handle(&photo)), vec!["meow"]);
    }

    #[test]
    fn test_render_list() {
        assert_eq!(render_list(&[]), EMPTY_LIST_TEXT);
        assert_eq!(
            render_list(&["x".to_string()]),
            "Trigger list:\n - x\n"
        );
    }
}
