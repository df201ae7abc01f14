use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::UnknownComponentType;

/// Graded instrument a score was recorded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Oral,
    FifteenMin,
    OnePeriod,
    Midterm,
    Final,
}

impl ComponentType {
    pub const ALL: [ComponentType; 5] = [
        ComponentType::Oral,
        ComponentType::FifteenMin,
        ComponentType::OnePeriod,
        ComponentType::Midterm,
        ComponentType::Final,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Oral => "oral",
            ComponentType::FifteenMin => "fifteen_min",
            ComponentType::OnePeriod => "one_period",
            ComponentType::Midterm => "midterm",
            ComponentType::Final => "final",
        }
    }
}

impl std::str::FromStr for ComponentType {
    type Err = UnknownComponentType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ComponentType::ALL
            .into_iter()
            .find(|component| component.as_str() == value.trim())
            .ok_or_else(|| UnknownComponentType(value.to_string()))
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded score. `points_earned` is `None` when nothing was entered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub component_type: ComponentType,
    pub points_earned: Option<f64>,
    pub is_excused: bool,
    pub is_missing: bool,
}

impl GradeEntry {
    pub fn scored(component_type: ComponentType, points: f64) -> Self {
        GradeEntry {
            component_type,
            points_earned: Some(points),
            is_excused: false,
            is_missing: false,
        }
    }

    pub fn missing(component_type: ComponentType) -> Self {
        GradeEntry {
            component_type,
            points_earned: None,
            is_excused: false,
            is_missing: true,
        }
    }

    pub fn excused(component_type: ComponentType) -> Self {
        GradeEntry {
            component_type,
            points_earned: None,
            is_excused: true,
            is_missing: false,
        }
    }
}

/// Graded entries of one subject in one period, grouped by component type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentScoreSet {
    entries: BTreeMap<ComponentType, Vec<GradeEntry>>,
}

impl ComponentScoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: GradeEntry) {
        self.entries
            .entry(entry.component_type)
            .or_default()
            .push(entry);
    }

    pub fn with(mut self, entry: GradeEntry) -> Self {
        self.push(entry);
        self
    }

    pub fn entries(&self, component_type: ComponentType) -> &[GradeEntry] {
        self.entries
            .get(&component_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectScores {
    pub subject_id: String,
    pub subject_name: String,
    pub scores: ComponentScoreSet,
}

/// Final grade of one subject. `component_averages` always lists every
/// component type; ungraded types map to `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAverage {
    pub subject_id: String,
    pub subject_name: String,
    pub final_grade: f64,
    pub component_averages: BTreeMap<ComponentType, Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConductRating {
    Excellent,
    Good,
    Fair,
    Average,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcademicStanding {
    Excellent,
    Good,
    Fair,
    Average,
    Weak,
}

impl AcademicStanding {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcademicStanding::Excellent => "excellent",
            AcademicStanding::Good => "good",
            AcademicStanding::Fair => "fair",
            AcademicStanding::Average => "average",
            AcademicStanding::Weak => "weak",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AcademicStanding::Excellent => "Excellent",
            AcademicStanding::Good => "Good",
            AcademicStanding::Fair => "Fair",
            AcademicStanding::Average => "Average",
            AcademicStanding::Weak => "Weak",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterGpa {
    pub period_label: String,
    pub gpa: f64,
    pub subject_averages: Vec<SubjectAverage>,
    pub standing: AcademicStanding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub total_days: usize,
    pub present_days: usize,
    pub absent_days: usize,
    pub late_days: usize,
    pub excused_days: usize,
    /// Percentage of non-excused days attended (present or late).
    pub rate: f64,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    pub magnitude: f64,
}

/// Ordered so that a larger value is a more severe level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub recommendations: Vec<String>,
}

/// Everything the compiler needs for one student in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentPeriodInput {
    pub student_id: String,
    pub student_name: String,
    pub period_label: String,
    pub subjects: Vec<SubjectScores>,
    pub conduct: Option<ConductRating>,
    pub attendance: Vec<AttendanceMark>,
    /// Prior-period GPAs, oldest first. Excludes the period being compiled.
    pub gpa_history: Vec<f64>,
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub student_id: String,
    pub student_name: String,
    pub conduct: Option<ConductRating>,
    pub semester: SemesterGpa,
    pub attendance: AttendanceSummary,
    pub trend: TrendResult,
    pub risk: RiskAssessment,
}
