//! Transient user-facing notifications
//!
//! Every editor action resolves to a [`Notice`] value instead of raising.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn success(description: impl Into<String>) -> Self {
        Self::info("Success", description)
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self::destructive("Error", description)
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.variant {
            NoticeVariant::Default => "✓",
            NoticeVariant::Destructive => "✗",
        };
        write!(f, "{} {}: {}", marker, self.title, self.description)
    }
}

/// Print a notice: successes to stdout, failures to stderr
pub fn print_notice(notice: &Notice) {
    if notice.is_destructive() {
        eprintln!("{}", notice);
    } else {
        println!("{}", notice);
    }
}

/// True when none of the notices is a failure
pub fn all_succeeded<'a>(notices: impl IntoIterator<Item = &'a Notice>) -> bool {
    notices.into_iter().all(|n| !n.is_destructive())
}
