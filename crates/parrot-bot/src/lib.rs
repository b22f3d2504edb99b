//! parrot-bot - chat front end for the parrot trigger store.
//!
//! Parses bot commands, routes messages through a
//! [`TriggerService`](parrot_core::TriggerService), and ships a console
//! transport for running the bot locally.

pub mod command;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod message;

pub use command::Command;
pub use config::BotConfig;
pub use console::ConsoleTransport;
pub use dispatcher::Dispatcher;
pub use message::{InboundMessage, MediaAttachment, OutboundMessage, ReplyContent, Sender};
