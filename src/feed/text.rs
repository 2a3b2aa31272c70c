//! Title and body resolution for display
//!
//! Notifications created before translation keys existed carry literal text,
//! so a failed lookup falls back to the stored text.

use crate::notification::Notification;
use crate::services::{Translator, TRANSLATION_NOT_FOUND};

/// Shown when a notification has no usable title
pub const NO_TITLE_FOUND: &str = "No title found";

/// Shown when a notification has no usable text
pub const NO_TEXT_FOUND: &str = "No text found";

pub fn resolve_title(notification: &Notification, translator: &dyn Translator) -> String {
    resolve(
        notification,
        notification.title.as_deref(),
        NO_TITLE_FOUND,
        translator,
    )
}

pub fn resolve_text(notification: &Notification, translator: &dyn Translator) -> String {
    resolve(
        notification,
        notification.text.as_deref(),
        NO_TEXT_FOUND,
        translator,
    )
}

fn resolve(
    notification: &Notification,
    raw: Option<&str>,
    default: &str,
    translator: &dyn Translator,
) -> String {
    let literal = || match raw {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => default.to_string(),
    };

    if !notification.text_is_placeholder {
        return literal();
    }

    let translated = translator.translate(
        raw.unwrap_or_default(),
        &notification.parsed_placeholder_values(),
    );
    if translated.contains(TRANSLATION_NOT_FOUND) {
        literal()
    } else {
        translated
    }
}
