//! Job identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a visualization job.
///
/// Job ids are issued by the rendering backend and treated as opaque by
/// everything in this workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that an id is shaped like something the backend could have
    /// issued: alphanumeric characters and hyphens, 8-64 chars.
    pub fn is_well_formed(id: &str) -> bool {
        if id.len() > 64 || id.len() < 8 {
            return false;
        }
        id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_ids() {
        assert!(JobId::is_well_formed("12345678"));
        assert!(JobId::is_well_formed("954762ae-0e89-48c6-9e84-78fdbf9bd0ea"));
        assert!(JobId::is_well_formed(JobId::new().as_str()));
    }

    #[test]
    fn test_malformed_ids() {
        assert!(!JobId::is_well_formed(""));
        assert!(!JobId::is_well_formed("short"));
        assert!(!JobId::is_well_formed("has space"));
        assert!(!JobId::is_well_formed("has_underscore"));
        assert!(!JobId::is_well_formed("has/slash"));
        assert!(!JobId::is_well_formed(&"a".repeat(65)));
    }

    #[test]
    fn test_serde_transparent() {
        let id = JobId::from_string("job-12345678");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"job-12345678\"");
        let back: JobId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
