//! Open/closed state of the activity detail sheet.

use log::debug;

use crate::Activity;

/// The detail sheet shown when an activity row or marker is tapped.
///
/// Holds at most one activity; closing clears it.
#[derive(Debug, Clone, Default)]
pub struct ActivitySheet {
    activity: Option<Activity>,
}

impl ActivitySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `activity`, replacing whatever was open.
    pub fn open(&mut self, activity: Activity) {
        debug!("[ActivitySheet] Opening activity {}", activity.id);
        self.activity = Some(activity);
    }

    pub fn close(&mut self) {
        self.activity = None;
    }

    pub fn is_open(&self) -> bool {
        self.activity.is_some()
    }

    /// The activity on display, if the sheet is open.
    pub fn activity(&self) -> Option<&Activity> {
        self.activity.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_close() {
        let mut sheet = ActivitySheet::new();
        assert!(!sheet.is_open());

        sheet.open(Activity::new(1, "Market", "eat & drink"));
        assert!(sheet.is_open());
        assert_eq!(sheet.activity().map(|a| a.id), Some(1));

        sheet.open(Activity::new(2, "Museum", "tour & learn"));
        assert_eq!(sheet.activity().map(|a| a.id), Some(2));

        sheet.close();
        assert!(!sheet.is_open());
        assert!(sheet.activity().is_none());
    }
}
