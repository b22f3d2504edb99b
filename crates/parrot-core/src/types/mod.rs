//! Core types for parrot.

mod record;

pub use record::*;
