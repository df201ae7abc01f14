//! Risk level and recommendations.

use crate::models::{RiskAssessment, RiskLevel, TrendDirection, TrendResult};

pub const CRITICAL_GPA: f64 = 4.0;
pub const HIGH_GPA: f64 = 5.0;
pub const MEDIUM_GPA: f64 = 6.5;
pub const MEDIUM_ATTENDANCE_RATE: f64 = 80.0;

/// Attendance below this earns a recommendation even at low risk.
pub const ATTENDANCE_NOTICE_RATE: f64 = 90.0;
pub const GOOD_STANDING_GPA: f64 = 8.0;
/// Improvement worth calling out in the recommendations.
pub const STRONG_IMPROVEMENT: f64 = 0.5;

pub const MAX_RECOMMENDATIONS: usize = 5;
const MAX_LEVEL_RECOMMENDATIONS: usize = 2;

pub fn risk_level(gpa: f64, attendance_rate: f64) -> RiskLevel {
    if gpa < CRITICAL_GPA {
        RiskLevel::Critical
    } else if gpa < HIGH_GPA {
        RiskLevel::High
    } else if gpa < MEDIUM_GPA || attendance_rate < MEDIUM_ATTENDANCE_RATE {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn level_recommendations(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::Critical => &[
            "Hold a meeting with parents and the homeroom teacher",
            "Assign a dedicated academic mentor",
        ],
        RiskLevel::High => &[
            "Assign a peer tutor for core subjects",
            "Review progress with the homeroom teacher every two weeks",
        ],
        RiskLevel::Medium => &[
            "Monitor progress at the next checkpoint",
            "Encourage participation in after-school study sessions",
        ],
        RiskLevel::Low => &["Encourage enrichment or advanced coursework"],
    }
}

#[derive(Debug, Default)]
struct Recommendations {
    items: Vec<String>,
}

impl Recommendations {
    fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.items.len() < MAX_RECOMMENDATIONS && !self.items.contains(&message) {
            self.items.push(message);
        }
    }
}

fn gpa_message(gpa: f64) -> Option<&'static str> {
    if gpa < CRITICAL_GPA {
        Some("GPA is critically low; arrange an urgent academic intervention")
    } else if gpa < HIGH_GPA {
        Some("GPA is below the passing average; set up weekly tutoring")
    } else if gpa >= GOOD_STANDING_GPA {
        Some("Good academic standing; keep up the current study routine")
    } else {
        None
    }
}

fn trend_message(trend: &TrendResult) -> Option<String> {
    match trend.direction {
        TrendDirection::Declining => Some(format!(
            "GPA dropped {:.2} points since last period; review recent changes with the student",
            trend.magnitude.abs()
        )),
        TrendDirection::Improving if trend.magnitude >= STRONG_IMPROVEMENT => Some(format!(
            "GPA improved {:.2} points since last period; recognize the progress",
            trend.magnitude
        )),
        _ => None,
    }
}

fn weakness_message(weaknesses: &[String]) -> Option<String> {
    let mut names: Vec<&str> = Vec::new();
    for name in weaknesses.iter().map(|name| name.trim()) {
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    if names.is_empty() {
        None
    } else {
        Some(format!("Prioritize extra practice in: {}", names.join(", ")))
    }
}

pub fn assess(
    gpa: f64,
    trend: &TrendResult,
    attendance_rate: f64,
    weaknesses: &[String],
) -> RiskAssessment {
    let level = risk_level(gpa, attendance_rate);
    let mut recommendations = Recommendations::default();

    if let Some(message) = gpa_message(gpa) {
        recommendations.push(message);
    }
    if let Some(message) = trend_message(trend) {
        recommendations.push(message);
    }
    if attendance_rate < ATTENDANCE_NOTICE_RATE {
        recommendations.push(format!(
            "Attendance is {attendance_rate:.1}%; agree on an attendance plan with the family"
        ));
    }
    if let Some(message) = weakness_message(weaknesses) {
        recommendations.push(message);
    }
    for message in level_recommendations(level)
        .iter()
        .take(MAX_LEVEL_RECOMMENDATIONS)
    {
        recommendations.push(*message);
    }

    RiskAssessment {
        level,
        recommendations: recommendations.items,
    }
}
