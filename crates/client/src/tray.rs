//! On-screen notices: synced city alerts plus local submission toasts.

use citypulse_core::alert::{Alert, Notice, NoticeKind};

pub const TOAST_SUBMITTED_TITLE: &str = "Report Submitted";
pub const TOAST_SUBMITTED_MESSAGE: &str = "Your issue has been reported successfully!";
pub const TOAST_FAILED_TITLE: &str = "Submission Error";
pub const TOAST_FAILED_MESSAGE: &str =
    "There was an error submitting your report. Please try again.";

/// Ordered list of dismissible notices, oldest first.
#[derive(Debug, Clone, Default)]
pub struct NoticeTray {
    notices: Vec<Notice>,
}

impl NoticeTray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a synced alert, keyed by its document id. Every delivery is
    /// appended, matching the one notification raised per added alert.
    pub fn push_alert(&mut self, alert: &Alert) {
        self.notices.push(Notice::from(alert));
    }

    pub fn push_success(&mut self, title: &str, message: &str) -> String {
        self.push_toast(title, message, NoticeKind::Success)
    }

    pub fn push_error(&mut self, title: &str, message: &str) -> String {
        self.push_toast(title, message, NoticeKind::Error)
    }

    fn push_toast(&mut self, title: &str, message: &str, kind: NoticeKind) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.notices.push(Notice {
            id: id.clone(),
            title: title.to_string(),
            message: message.to_string(),
            kind,
        });
        id
    }

    /// Remove a notice from view. Returns `false` for unknown ids.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(id: &str) -> Alert {
        Alert {
            id: id.into(),
            title: "Road closure".into(),
            message: "Main St closed".into(),
            created_at: None,
        }
    }

    #[test]
    fn alerts_are_warnings_keyed_by_document_id() {
        let mut tray = NoticeTray::new();
        tray.push_alert(&alert("a-1"));
        tray.push_alert(&alert("a-2"));

        assert_eq!(tray.len(), 2);
        assert_eq!(tray.notices()[0].id, "a-1");
        assert_eq!(tray.notices()[0].kind, NoticeKind::Warning);
    }

    #[test]
    fn every_alert_delivery_is_appended() {
        let mut tray = NoticeTray::new();
        tray.push_alert(&alert("a-1"));
        tray.push_alert(&alert("a-1"));
        assert_eq!(tray.len(), 2);

        // Dismissal is by document id, so both go together.
        assert!(tray.dismiss("a-1"));
        assert!(tray.is_empty());
    }

    #[test]
    fn toasts_get_fresh_ids_and_can_be_dismissed() {
        let mut tray = NoticeTray::new();
        let ok = tray.push_success(TOAST_SUBMITTED_TITLE, TOAST_SUBMITTED_MESSAGE);
        let err = tray.push_error(TOAST_FAILED_TITLE, TOAST_FAILED_MESSAGE);
        assert_ne!(ok, err);

        assert!(tray.dismiss(&ok));
        assert!(!tray.dismiss(&ok));
        assert_eq!(tray.notices()[0].kind, NoticeKind::Error);
    }
}
