#![forbid(unsafe_code)]

//! Toast payloads handed to the page's `notify` callback.
//!
//! Toasts are raised while the session is mutably borrowed, so they are
//! buffered in a [`ToastQueue`] and delivered by [`deliver_queued`] once the
//! borrow is released. A `notify` handler may then read session state.

use std::cell::RefCell;

use eggshell_core::notify::{Notification, NotificationSink};
use serde::Serialize;

/// JSON shape of one toast: `{title, message, duration_ms, kind}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToastJson<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub duration_ms: u64,
    pub kind: &'static str,
}

impl<'a> From<&'a Notification> for ToastJson<'a> {
    fn from(n: &'a Notification) -> Self {
        Self {
            title: &n.title,
            message: &n.message,
            duration_ms: u64::try_from(n.duration.as_millis()).unwrap_or(u64::MAX),
            kind: n.kind.as_str(),
        }
    }
}

/// Serialize a notification for the page.
pub fn toast_json(notification: &Notification) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ToastJson::from(notification))
}

/// Sink that holds toasts until the host delivers them.
#[derive(Debug, Default)]
pub struct ToastQueue {
    pending: Vec<Notification>,
}

impl ToastQueue {
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return everything queued, oldest first.
    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}

impl NotificationSink for ToastQueue {
    fn notify(&mut self, notification: Notification) {
        self.pending.push(notification);
    }
}

/// Drain the queue reached through `queue_of` and hand each toast to
/// `deliver` with no borrow of `session` held.
///
/// Toasts queued while delivering (a handler calling back into the
/// session) are delivered in the same pass.
pub fn deliver_queued<S, Q, D>(session: &RefCell<S>, mut queue_of: Q, mut deliver: D) -> usize
where
    Q: FnMut(&mut S) -> &mut ToastQueue,
    D: FnMut(Notification),
{
    let mut delivered = 0;
    loop {
        let pending = {
            let mut guard = session.borrow_mut();
            queue_of(&mut *guard).take()
        };
        if pending.is_empty() {
            return delivered;
        }
        delivered += pending.len();
        pending.into_iter().for_each(&mut deliver);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use eggshell_core::event::{InputEvent, Target};
    use eggshell_core::{EasterEggs, EggConfig};
    use eggshell_core::notify::ToastKind;
    use std::time::Duration;

    struct Page {
        eggs: EasterEggs<ToastQueue>,
    }

    fn page() -> RefCell<Page> {
        RefCell::new(Page {
            eggs: EasterEggs::new(EggConfig::default(), ToastQueue::default()).unwrap(),
        })
    }

    #[test]
    fn serializes_all_fields() {
        let n = Notification::new("Form Submission Failed", "Please fix the errors and try again.")
            .kind(ToastKind::Error)
            .duration(Duration::from_millis(3000));
        assert_eq!(
            toast_json(&n).unwrap(),
            r#"{"title":"Form Submission Failed","message":"Please fix the errors and try again.","duration_ms":3000,"kind":"error"}"#
        );
    }

    #[test]
    fn handler_can_read_session_while_toasts_are_delivered() {
        let session = page();
        for t in [1, 2, 3, 4] {
            session
                .borrow_mut()
                .eggs
                .handle(&InputEvent::secret_button(t));
        }
        assert_eq!(session.borrow().eggs.sink().len(), 1);

        let mut seen = Vec::new();
        let delivered = deliver_queued(
            &session,
            |p| p.eggs.sink_mut(),
            |n| {
                let dots = session.borrow().eggs.secret_dots();
                seen.push((n.title, dots));
            },
        );
        assert_eq!(delivered, 1);
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.starts_with("Secret Code Unlocked!"));
        assert_eq!(seen[0].1, 4);
        assert!(session.borrow().eggs.sink().is_empty());
    }

    #[test]
    fn toasts_raised_during_delivery_are_delivered_too() {
        let session = page();
        session
            .borrow_mut()
            .eggs
            .handle(&InputEvent::Click {
                target: Target::ClickCounter,
            });

        let mut titles = Vec::new();
        let delivered = deliver_queued(
            &session,
            |p| p.eggs.sink_mut(),
            |n| {
                if titles.is_empty() {
                    session.borrow_mut().eggs.handle(&InputEvent::Click {
                        target: Target::ClickCounter,
                    });
                }
                titles.push(n.message);
            },
        );
        assert_eq!(delivered, 2);
        assert_eq!(
            titles,
            vec![
                "You've clicked the button 1 times".to_string(),
                "You've clicked the button 2 times".to_string(),
            ]
        );
    }

    #[test]
    fn empty_queue_delivers_nothing() {
        let session = page();
        let delivered = deliver_queued(&session, |p| p.eggs.sink_mut(), |_| panic!("no toasts"));
        assert_eq!(delivered, 0);
    }
}
