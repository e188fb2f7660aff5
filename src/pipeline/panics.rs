//! Panic payload formatting.

use std::any::Any;
use std::error::Error as StdError;
use std::io;

use crate::error::TapError;

/// Best-effort message for a caught panic payload.
///
/// Error payloads (raised with [`std::panic::panic_any`]) report their
/// `Display`; text payloads are used verbatim; anything else is
/// `"unknown panic"`.
pub(crate) fn describe(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else if let Some(err) = payload.downcast_ref::<TapError>() {
        err.to_string()
    } else if let Some(err) = payload.downcast_ref::<io::Error>() {
        err.to_string()
    } else if let Some(err) = payload.downcast_ref::<Box<dyn StdError + Send + Sync>>() {
        err.to_string()
    } else if let Some(err) = payload.downcast_ref::<Box<dyn StdError + Send>>() {
        err.to_string()
    } else {
        "unknown panic".to_string()
    }
}
