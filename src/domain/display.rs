//! Display messages shown on a charging station screen
//!
//! Shared by SetDisplayMessage, GetDisplayMessages and NotifyDisplayMessages.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{Component, CustomData};

/// Encoding of a message's `content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageFormat {
    #[serde(rename = "ASCII")]
    Ascii,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "URI")]
    Uri,
    #[serde(rename = "UTF8")]
    Utf8,
    /// Content is text to be rendered as a QR code (new in 2.1).
    #[serde(rename = "QRCODE")]
    QrCode,
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ascii => "ASCII",
            Self::Html => "HTML",
            Self::Uri => "URI",
            Self::Utf8 => "UTF8",
            Self::QrCode => "QRCODE",
        };
        f.write_str(s)
    }
}

/// How a message is scheduled against other messages on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessagePriority {
    /// Always shown, overriding everything else.
    AlwaysFront,
    /// Shown before normal-cycle messages.
    InFront,
    /// Rotated with other normal-cycle messages.
    NormalCycle,
}

impl fmt::Display for MessagePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlwaysFront => write!(f, "AlwaysFront"),
            Self::InFront => write!(f, "InFront"),
            Self::NormalCycle => write!(f, "NormalCycle"),
        }
    }
}

/// Station state during which a message is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageState {
    Charging,
    Faulted,
    Idle,
    Unavailable,
    Suspended,
    Discharging,
}

impl fmt::Display for MessageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Charging => "Charging",
            Self::Faulted => "Faulted",
            Self::Idle => "Idle",
            Self::Unavailable => "Unavailable",
            Self::Suspended => "Suspended",
            Self::Discharging => "Discharging",
        };
        f.write_str(s)
    }
}

/// Text (or URI / QR payload) of a message in one language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    pub format: MessageFormat,
    /// RFC 5646 language tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 8))]
    pub language: Option<String>,
    #[validate(length(max = 1024))]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl MessageContent {
    pub fn new(format: MessageFormat, content: impl Into<String>) -> Self {
        Self {
            format,
            language: None,
            content: content.into(),
            custom_data: None,
        }
    }

    pub fn utf8(content: impl Into<String>) -> Self {
        Self::new(MessageFormat::Utf8, content)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.language {
            Some(language) => write!(f, "{} '{}' ({})", self.format, self.content, language),
            None => write!(f, "{} '{}'", self.format, self.content),
        }
    }
}

/// A display message with its scheduling constraints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_display_period"))]
pub struct MessageInfo {
    #[validate(range(min = 0))]
    pub id: i32,
    pub priority: MessagePriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<MessageState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<DateTime<Utc>>,
    /// Only show the message during this transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 36))]
    pub transaction_id: Option<String>,
    #[validate(nested)]
    pub message: MessageContent,
    /// Translations of `message` (at most 4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 4), nested)]
    pub message_extra: Option<Vec<MessageContent>>,
    /// The display to show the message on, when a station has several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub display: Option<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub custom_data: Option<CustomData>,
}

impl MessageInfo {
    pub fn new(id: i32, priority: MessagePriority, message: MessageContent) -> Self {
        Self {
            id,
            priority,
            state: None,
            start_date_time: None,
            end_date_time: None,
            transaction_id: None,
            message,
            message_extra: None,
            display: None,
            custom_data: None,
        }
    }

    /// Whether the message's validity window covers `at`.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.start_date_time.map_or(true, |start| start <= at)
            && self.end_date_time.map_or(true, |end| at < end)
    }

    /// Add a translation of `message`.
    pub fn with_translation(mut self, content: MessageContent) -> Self {
        self.message_extra.get_or_insert_with(Vec::new).push(content);
        self
    }

    pub fn translations(&self) -> &[MessageContent] {
        self.message_extra.as_deref().unwrap_or_default()
    }

    /// All languages this message is available in.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        std::iter::once(&self.message)
            .chain(self.translations())
            .filter_map(|m| m.language.as_deref())
    }
}

fn validate_display_period(info: &MessageInfo) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (info.start_date_time, info.end_date_time) {
        if end < start {
            let mut err = ValidationError::new("display_period");
            err.message = Some("endDateTime precedes startDateTime".into());
            return Err(err);
        }
    }
    Ok(())
}

impl fmt::Display for MessageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.id, self.priority, self.message)?;
        if let Some(state) = self.state {
            write!(f, " while {}", state)?;
        }
        if let Some(tx) = &self.transaction_id {
            write!(f, " in transaction {}", tx)?;
        }
        if !self.translations().is_empty() {
            write!(f, " (+{} translation(s))", self.translations().len())?;
        }
        Ok(())
    }
}
