//! Error types for the performance engine.
//!
//! Missing data is never an error: empty subject lists, empty attendance and
//! short GPA histories all resolve to documented defaults. Only structural
//! problems (a bad weight table, an out-of-range score) surface here.

use thiserror::Error;

use crate::models::ComponentType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown component type `{0}`")]
pub struct UnknownComponentType(pub String);

/// Failures raised while aggregating a single subject.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradingError {
    #[error("invalid weight configuration for {component}: {reason}")]
    InvalidWeightConfiguration {
        component: ComponentType,
        reason: String,
    },

    #[error("malformed {component} entry: points {points} outside [0, 10]")]
    MalformedGradeEntry {
        component: ComponentType,
        points: f64,
    },

    #[error("malformed score: points {points} outside [0, 10]")]
    MalformedScore { points: f64 },
}

impl GradingError {
    pub fn invalid_weight(component: ComponentType, reason: impl Into<String>) -> Self {
        GradingError::InvalidWeightConfiguration {
            component,
            reason: reason.into(),
        }
    }
}

/// Failures raised by the report compiler, tagged with where they happened.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("student {student_id}, period {period_label}: subject {subject_id} failed")]
    Subject {
        student_id: String,
        period_label: String,
        subject_id: String,
        /// Position of the failing subject in the input list.
        subject_index: usize,
        #[source]
        source: GradingError,
    },

    #[error("student {student_id}, period {period_label}: prior GPA {value} outside [0, 10]")]
    MalformedHistory {
        student_id: String,
        period_label: String,
        value: f64,
    },
}

impl ReportError {
    /// Subject id of a per-subject failure, if this is one.
    pub fn failed_subject(&self) -> Option<&str> {
        match self {
            ReportError::Subject { subject_id, .. } => Some(subject_id),
            ReportError::MalformedHistory { .. } => None,
        }
    }
}
