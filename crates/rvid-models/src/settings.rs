//! Visualization settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Options controlling how the history visualization is rendered.
///
/// Any field omitted by the caller falls back to the baseline below.
/// Once attached to a job the whole value is immutable; status responses
/// echo it back verbatim so a page reload can reconstruct the exact
/// options the job was started with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VisualizationSettings {
    /// Show the file-extension color key overlay.
    pub show_file_extension_key: bool,
    /// Show committer usernames next to their avatars.
    pub show_usernames: bool,
    /// Show directory name labels.
    pub show_dirnames: bool,
    /// Directory label font size.
    #[validate(range(min = 1, max = 20))]
    pub dir_font_size: u8,
    /// File label font size.
    #[validate(range(min = 1, max = 20))]
    pub file_font_size: u8,
    /// Username label font size.
    #[validate(range(min = 1, max = 20))]
    pub user_font_size: u8,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self {
            show_file_extension_key: false,
            show_usernames: true,
            show_dirnames: true,
            dir_font_size: 11,
            file_font_size: 10,
            user_font_size: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = VisualizationSettings::default();
        assert!(!settings.show_file_extension_key);
        assert!(settings.show_usernames);
        assert!(settings.show_dirnames);
        assert_eq!(settings.dir_font_size, 11);
        assert_eq!(settings.file_font_size, 10);
        assert_eq!(settings.user_font_size, 12);
    }

    #[test]
    fn test_partial_body_fills_defaults() {
        let settings: VisualizationSettings =
            serde_json::from_str(r#"{"show_usernames": false, "dir_font_size": 14}"#).unwrap();
        assert!(!settings.show_usernames);
        assert_eq!(settings.dir_font_size, 14);
        // untouched fields keep the baseline
        assert_eq!(settings.file_font_size, 10);
        assert!(settings.show_dirnames);
    }

    #[test]
    fn test_font_size_bounds() {
        let ok = VisualizationSettings {
            dir_font_size: 20,
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let too_big = VisualizationSettings {
            user_font_size: 21,
            ..Default::default()
        };
        assert!(too_big.validate().is_err());

        let zero = VisualizationSettings {
            file_font_size: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_round_trip_is_exact() {
        let settings: VisualizationSettings =
            serde_json::from_str(r#"{"show_usernames": false, "dir_font_size": 14}"#).unwrap();
        let json = serde_json::to_string(&settings).unwrap();
        let back: VisualizationSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
