//! User-facing notices.
//!
//! Notices are fire-and-forget: a [`Notifier`] never reports back whether the
//! message was shown.

use std::fmt;

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Neutral information, such as a rejected action.
    Info,
    /// Confirmation that an action completed.
    Success,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
        }
    }
}

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync + fmt::Debug {
    /// Show a notice.
    fn notify(&self, severity: Severity, message: &str);

    /// Show an informational notice.
    fn info(&self, message: &str) {
        self.notify(Severity::Info, message);
    }

    /// Show a success notice.
    fn success(&self, message: &str) {
        self.notify(Severity::Success, message);
    }
}

/// Writes notices to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        let marker = match severity {
            Severity::Info => "i",
            Severity::Success => "✓",
        };
        eprintln!("[{marker}] {message}");
    }
}

/// In-memory notifier for tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{Notifier, Severity};

    /// Keeps every notice in memory.
    #[derive(Debug, Default)]
    pub(crate) struct NoticeLog {
        notices: Mutex<Vec<(Severity, String)>>,
    }

    impl NoticeLog {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// All notices received so far, oldest first.
        pub(crate) fn notices(&self) -> Vec<(Severity, String)> {
            self.notices.lock().unwrap().clone()
        }

        pub(crate) fn last(&self) -> Option<(Severity, String)> {
            self.notices().pop()
        }

        pub(crate) fn len(&self) -> usize {
            self.notices.lock().unwrap().len()
        }

        pub(crate) fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl Notifier for NoticeLog {
        fn notify(&self, severity: Severity, message: &str) {
            self.notices
                .lock()
                .unwrap()
                .push((severity, message.to_string()));
        }
    }
}
