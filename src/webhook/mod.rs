//! Webhook protocol layer: signatures, payload schemas, translation.
//!
//! Everything here operates on the delivery as received: signature
//! verification runs over the exact wire bytes before any JSON parsing,
//! and translation turns a platform payload into a normalized changeset
//! event draft.

pub mod payload;
pub mod signature;
pub mod translate;

pub use translate::{Translated, TranslatedEvent, translate};
