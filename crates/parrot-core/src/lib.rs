//! parrot-core - trigger store and matching engine for parrot.
//!
//! Users register a trigger string together with reply content (text or a media
//! reference). Inbound messages are scanned for the longest registered trigger
//! they contain, and the matching record is returned so the bot can reply.
//!
//! # Example
//!
//! ```
//! use parrot_core::{MediaKind, SqliteTriggerBackend, TriggerService};
//!
//! let service = TriggerService::new(Box::new(SqliteTriggerBackend::in_memory()?))?;
//! service.save("cat", "meow", MediaKind::Text, "")?;
//! service.save("category", "", MediaKind::Sticker, "CAACAgI")?;
//!
//! let hit = service.find_reply("this is a category")?.expect("a trigger matches");
//! assert_eq!(hit.trigger, "category");
//! # Ok::<(), parrot_core::ParrotError>(())
//! ```

pub mod backend;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod matcher;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use backend::{open_backend, FlatFileTriggerBackend, SqliteTriggerBackend, TriggerBackend};
pub use cache::TriggerIndex;
pub use config::{BackendKind, StoreConfig};
pub use error::{DecodeError, ErrorCode, ParrotError, ParrotResult};
pub use matcher::find_longest_match;
pub use service::TriggerService;
pub use types::{MediaKind, TriggerRecord};
