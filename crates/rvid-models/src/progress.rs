//! Visualization progress steps.
//!
//! The rendering backend reports the current step either as its numeric
//! value or as its PascalCase name depending on which code path produced
//! the response. Both spellings decode here, in one place; the rest of
//! the workspace only ever sees the enum.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Coarse-grained phase of job progress, in strictly increasing order.
///
/// The ordering is load-bearing: a poller must never show a step lower
/// than one it has already observed for the same job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProgressStep {
    InitializingProject = 1,
    AnalyzingHistory = 2,
    GeneratingVisualization = 3,
}

impl ProgressStep {
    /// Decode from the numeric wire value.
    pub fn from_number(n: u64) -> Option<Self> {
        match n {
            1 => Some(ProgressStep::InitializingProject),
            2 => Some(ProgressStep::AnalyzingHistory),
            3 => Some(ProgressStep::GeneratingVisualization),
            _ => None,
        }
    }

    /// Decode from the PascalCase wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "InitializingProject" => Some(ProgressStep::InitializingProject),
            "AnalyzingHistory" => Some(ProgressStep::AnalyzingHistory),
            "GeneratingVisualization" => Some(ProgressStep::GeneratingVisualization),
            _ => None,
        }
    }

    /// Numeric wire value.
    pub fn as_number(&self) -> u8 {
        *self as u8
    }

    /// PascalCase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStep::InitializingProject => "InitializingProject",
            ProgressStep::AnalyzingHistory => "AnalyzingHistory",
            ProgressStep::GeneratingVisualization => "GeneratingVisualization",
        }
    }

    /// The final step; a job carrying a video or error stays here.
    pub fn is_last(&self) -> bool {
        matches!(self, ProgressStep::GeneratingVisualization)
    }
}

impl fmt::Display for ProgressStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ProgressStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_number())
    }
}

impl<'de> Deserialize<'de> for ProgressStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StepVisitor;

        impl Visitor<'_> for StepVisitor {
            type Value = ProgressStep;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a progress step number (1-3) or name")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                ProgressStep::from_number(v)
                    .ok_or_else(|| E::custom(format!("unknown progress step {}", v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .ok()
                    .and_then(ProgressStep::from_number)
                    .ok_or_else(|| E::custom(format!("unknown progress step {}", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                ProgressStep::from_name(v)
                    .ok_or_else(|| E::custom(format!("unknown progress step '{}'", v)))
            }
        }

        deserializer.deserialize_any(StepVisitor)
    }
}
