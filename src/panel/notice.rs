//! Dismissible notifications raised by panel controllers.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A toast-style notification for the view to show and dismiss.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    #[must_use]
    pub fn info(title: &str, description: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, title: title.to_owned(), description: description.into() }
    }

    #[must_use]
    pub fn error(title: &str, description: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, title: title.to_owned(), description: description.into() }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
