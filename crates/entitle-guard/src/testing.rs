//! Test doubles for guard consumers.

use crate::{DenialNotice, Notifier};
use parking_lot::Mutex;

/// Records every notice it receives.
///
/// # Example
///
/// ```
/// use entitle_auth::AccessDenied;
/// use entitle_guard::testing::RecordingNotifier;
/// use entitle_guard::{DenialNotice, Notifier};
///
/// let recorder = RecordingNotifier::new();
/// recorder.notify(&DenialNotice {
///     guard: "g".into(),
///     path: "/x".into(),
///     reason: AccessDenied::NoLookup,
/// });
/// assert_eq!(recorder.count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<DenialNotice>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notices received.
    #[must_use]
    pub fn count(&self) -> usize {
        self.notices.lock().len()
    }

    /// Copies of every notice received, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<DenialNotice> {
        self.notices.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &DenialNotice) {
        self.notices.lock().push(notice.clone());
    }
}
