//! Settings reconciliation between the local editor and the job record.

use rvid_models::VisualizationSettings;

/// Tracks which settings value is authoritative.
///
/// Before a job exists, the last locally-edited value wins. Once a
/// status response carries settings, the backend is the source of truth
/// and local edits no longer apply. Reconciliation always replaces the
/// whole value; merging field-by-field would mix stale and fresh option
/// sets.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsSync {
    current: VisualizationSettings,
    adopted: bool,
}

impl SettingsSync {
    pub fn new(local: VisualizationSettings) -> Self {
        Self {
            current: local,
            adopted: false,
        }
    }

    /// Apply a local edit. Returns false (and changes nothing) once the
    /// job's own settings have been adopted.
    pub fn edit_local(&mut self, settings: VisualizationSettings) -> bool {
        if self.adopted {
            return false;
        }
        self.current = settings;
        true
    }

    /// Adopt the authoritative value from a status response.
    pub fn adopt(&mut self, settings: VisualizationSettings) {
        self.current = settings;
        self.adopted = true;
    }

    /// The settings value to display and to attach to a start request.
    pub fn current(&self) -> &VisualizationSettings {
        &self.current
    }
}

impl Default for SettingsSync {
    fn default() -> Self {
        Self::new(VisualizationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(dir_font_size: u8) -> VisualizationSettings {
        VisualizationSettings {
            dir_font_size,
            ..Default::default()
        }
    }

    #[test]
    fn test_local_edits_before_job() {
        let mut sync = SettingsSync::default();
        assert!(sync.edit_local(custom(14)));
        assert_eq!(sync.current().dir_font_size, 14);
    }

    #[test]
    fn test_adoption_replaces_whole_value() {
        let mut sync = SettingsSync::new(VisualizationSettings {
            show_usernames: false,
            dir_font_size: 14,
            ..Default::default()
        });

        // The job record comes back with a different, complete value.
        sync.adopt(custom(7));
        assert_eq!(sync.current().dir_font_size, 7);
        // Not a field merge: the local show_usernames edit is gone.
        assert!(sync.current().show_usernames);
    }

    #[test]
    fn test_local_edits_rejected_after_adoption() {
        let mut sync = SettingsSync::default();
        sync.adopt(custom(7));
        assert!(!sync.edit_local(custom(14)));
        assert_eq!(sync.current().dir_font_size, 7);
    }
}
