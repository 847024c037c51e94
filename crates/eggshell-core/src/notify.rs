#![forbid(unsafe_code)]

//! The toast boundary.
//!
//! Recognizers report successes through a [`NotificationSink`]. Delivery is
//! fire-and-forget: the sink owns display and removal timing, and the
//! caller never waits on it.

use std::time::Duration;

/// Default on-screen time for a toast.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

/// Visual flavour of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToastKind {
    #[default]
    Default,
    Success,
    Error,
}

impl ToastKind {
    /// CSS class suffix used by the page.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// One toast request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub duration: Duration,
    pub kind: ToastKind,
}

impl Notification {
    /// A default-kind toast shown for [`DEFAULT_DURATION`].
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            duration: DEFAULT_DURATION,
            kind: ToastKind::Default,
        }
    }

    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: ToastKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Receiver of toast requests.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

/// Collects notifications in order; the test and replay sink.
impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Adapter turning any closure into a sink.
#[derive(Debug, Clone)]
pub struct FnSink<F>(pub F);

impl<F: FnMut(Notification)> NotificationSink for FnSink<F> {
    fn notify(&mut self, notification: Notification) {
        (self.0)(notification);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _notification: Notification) {}
}
