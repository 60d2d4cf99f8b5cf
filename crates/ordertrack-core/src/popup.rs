use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupKind {
    Success,
    Error,
}

/// A transient, dismissible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popup {
    pub kind: PopupKind,
    pub text: String,
}

impl Popup {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: PopupKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: PopupKind::Error,
            text: text.into(),
        }
    }

    /// Headline shown above the message.
    pub fn title(&self) -> &'static str {
        match self.kind {
            PopupKind::Success => "Success",
            PopupKind::Error => "Action failed",
        }
    }
}

/// A server-side flash message handed to the page on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Space-separated level tags, e.g. `"alert-error error"`.
    #[serde(default)]
    pub level: String,
    pub text: String,
}

impl From<FlashMessage> for Popup {
    fn from(msg: FlashMessage) -> Self {
        if msg.level.contains("error") {
            Popup::error(msg.text)
        } else {
            Popup::success(msg.text)
        }
    }
}
