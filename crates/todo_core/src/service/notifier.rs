//! User-facing notification channel.
//!
//! The store reports outcomes through an injected [`Notifier`] instead of a
//! global toast API. Notifications are fire-and-forget and never part of the
//! persisted data.

use log::{info, warn};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Store outcome that produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEvent {
    TaskAdded,
    /// Add or update rejected by text validation.
    InvalidText,
    TaskDeleted,
    /// Toggle moved a task to completed.
    TaskCompleted,
    /// Toggle moved a task back to incomplete.
    TaskReopened,
    TaskUpdated,
}

impl NotificationEvent {
    /// Stable id for logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskAdded => "task_added",
            Self::InvalidText => "invalid_text",
            Self::TaskDeleted => "task_deleted",
            Self::TaskCompleted => "task_completed",
            Self::TaskReopened => "task_reopened",
            Self::TaskUpdated => "task_updated",
        }
    }

    /// Display-language message.
    pub fn message(self) -> &'static str {
        match self {
            Self::TaskAdded => "Đã thêm công việc mới thành công!",
            Self::InvalidText => "Vui lòng nhập nội dung công việc hợp lệ (1-500 ký tự)",
            Self::TaskDeleted => "Đã xóa công việc thành công!",
            Self::TaskCompleted => "Đã đánh dấu hoàn thành!",
            Self::TaskReopened => "Đã đánh dấu chưa hoàn thành!",
            Self::TaskUpdated => "Đã cập nhật công việc thành công!",
        }
    }
}

/// One transient message raised by a store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub event: NotificationEvent,
}

impl Notification {
    pub fn success(event: NotificationEvent) -> Self {
        Self {
            level: NotificationLevel::Success,
            event,
        }
    }

    pub fn error(event: NotificationEvent) -> Self {
        Self {
            level: NotificationLevel::Error,
            event,
        }
    }

    pub fn message(&self) -> &'static str {
        self.event.message()
    }
}

/// Sink for store notifications.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

impl<F> Notifier for F
where
    F: Fn(Notification),
{
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}

/// Notifier that writes every notification to the log.
///
/// Useful for hosts without a toast surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => info!(
                "event=notify module=service status=ok kind={}",
                notification.event.as_str()
            ),
            NotificationLevel::Error => warn!(
                "event=notify module=service status=error kind={}",
                notification.event.as_str()
            ),
        }
    }
}
