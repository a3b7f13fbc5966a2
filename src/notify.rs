//! Notification sinks for user-facing notices

use crate::schema::Notice;
use std::sync::Mutex;

/// Receives notices; fire-and-forget
pub trait NotificationSink: Send + Sync {
    fn show(&self, notice: Notice);
}

/// Prints notices to stderr, keeping stdout for machine output.
///
/// Only prints; outcomes are already logged by the pipeline.
#[derive(Debug, Default)]
pub struct StderrSink;

impl NotificationSink for StderrSink {
    fn show(&self, notice: Notice) {
        eprintln!("[{}] {}", notice.title, notice.message);
    }
}

/// Keeps every notice in arrival order
#[derive(Debug, Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(notices) => notices.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl NotificationSink for RecordingSink {
    fn show(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NoticeLevel;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.show(Notice::info("first"));
        sink.show(Notice::warning("second"));

        let notices = sink.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].message, "first");
        assert_eq!(notices[1].level, NoticeLevel::Warning);
    }
}
