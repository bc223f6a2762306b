//! User-facing status lines.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }

    /// Text shown when the caller has nothing more specific to say.
    pub const fn default_text(self) -> &'static str {
        match self {
            Self::Success => "Operation Successful",
            Self::Warning => "Operation needs attention",
            Self::Error => "Operation failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    /// A blank `text` falls back to the kind's default.
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        let text = text.into();
        let text = if text.trim().is_empty() {
            kind.default_text().to_string()
        } else {
            text
        };
        Self { kind, text }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, text)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.title(), self.text)
    }
}
