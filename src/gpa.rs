//! Period GPA and academic standing.
//!
//! Standing is resolved from an ordered rule table, first match wins. The top
//! three tiers are gated on conduct; `average` and `weak` are GPA-only.

use crate::grades::round2;
use crate::models::{AcademicStanding, ConductRating, SemesterGpa, SubjectAverage};

/// Conduct assumed when none was recorded for the period.
pub const DEFAULT_CONDUCT: ConductRating = ConductRating::Good;

#[derive(Debug, Clone, Copy)]
enum ConductGate {
    Any,
    Exactly(ConductRating),
    Not(ConductRating),
}

impl ConductGate {
    fn admits(&self, conduct: ConductRating) -> bool {
        match self {
            ConductGate::Any => true,
            ConductGate::Exactly(required) => conduct == *required,
            ConductGate::Not(excluded) => conduct != *excluded,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StandingRule {
    min_gpa: f64,
    conduct: ConductGate,
    standing: AcademicStanding,
}

const STANDING_RULES: [StandingRule; 4] = [
    StandingRule {
        min_gpa: 9.0,
        conduct: ConductGate::Exactly(ConductRating::Excellent),
        standing: AcademicStanding::Excellent,
    },
    StandingRule {
        min_gpa: 8.0,
        conduct: ConductGate::Not(ConductRating::Weak),
        standing: AcademicStanding::Good,
    },
    StandingRule {
        min_gpa: 6.5,
        conduct: ConductGate::Not(ConductRating::Weak),
        standing: AcademicStanding::Fair,
    },
    StandingRule {
        min_gpa: 5.0,
        conduct: ConductGate::Any,
        standing: AcademicStanding::Average,
    },
];

pub fn classify(gpa: f64, conduct: Option<ConductRating>) -> AcademicStanding {
    let conduct = conduct.unwrap_or(DEFAULT_CONDUCT);
    STANDING_RULES
        .iter()
        .find(|rule| gpa >= rule.min_gpa && rule.conduct.admits(conduct))
        .map(|rule| rule.standing)
        .unwrap_or(AcademicStanding::Weak)
}

/// Mean of subject finals, rounded to 2 decimals; 0 when there are no subjects.
pub fn period_gpa(subjects: &[SubjectAverage]) -> f64 {
    if subjects.is_empty() {
        return 0.0;
    }
    let total: f64 = subjects.iter().map(|subject| subject.final_grade).sum();
    round2(total / subjects.len() as f64)
}

pub fn semester_gpa(
    period_label: &str,
    subject_averages: Vec<SubjectAverage>,
    conduct: Option<ConductRating>,
) -> SemesterGpa {
    let gpa = period_gpa(&subject_averages);
    SemesterGpa {
        period_label: period_label.to_string(),
        gpa,
        standing: classify(gpa, conduct),
        subject_averages,
    }
}
