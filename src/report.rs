use std::fmt::Write;

use crate::attendance;
use crate::batch::BatchEntry;
use crate::error::ReportError;
use crate::gpa;
use crate::grades::{SubjectAggregator, WeightTable, MAX_POINTS, MIN_POINTS};
use crate::models::{AcademicStanding, PerformanceReport, StudentPeriodInput, TrendDirection};
use crate::risk;
use crate::trend;

/// Runs subject aggregation, GPA, attendance, trend and risk in order and
/// assembles one report. Holds configuration only; every call is pure.
#[derive(Debug, Clone, Default)]
pub struct ReportCompiler {
    aggregator: SubjectAggregator,
}

impl ReportCompiler {
    pub fn new(weights: WeightTable) -> Self {
        Self::from_aggregator(SubjectAggregator::new(weights))
    }

    pub fn from_aggregator(aggregator: SubjectAggregator) -> Self {
        ReportCompiler { aggregator }
    }

    pub fn aggregator(&self) -> &SubjectAggregator {
        &self.aggregator
    }

    pub fn compile(&self, input: &StudentPeriodInput) -> Result<PerformanceReport, ReportError> {
        if let Some(value) = input
            .gpa_history
            .iter()
            .copied()
            .find(|value| !value.is_finite() || !(MIN_POINTS..=MAX_POINTS).contains(value))
        {
            return Err(ReportError::MalformedHistory {
                student_id: input.student_id.clone(),
                period_label: input.period_label.clone(),
                value,
            });
        }

        let subject_averages = input
            .subjects
            .iter()
            .enumerate()
            .map(|(subject_index, subject)| {
                self.aggregator
                    .aggregate(subject)
                    .map_err(|source| ReportError::Subject {
                        student_id: input.student_id.clone(),
                        period_label: input.period_label.clone(),
                        subject_id: subject.subject_id.clone(),
                        subject_index,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let semester = gpa::semester_gpa(&input.period_label, subject_averages, input.conduct);
        let attendance = attendance::summarize(&input.attendance);

        let mut history = input.gpa_history.clone();
        history.push(semester.gpa);
        let trend = trend::analyze(&history);

        let risk = risk::assess(semester.gpa, &trend, attendance.rate, &input.weaknesses);

        tracing::debug!(
            student_id = %input.student_id,
            period = %input.period_label,
            gpa = semester.gpa,
            standing = semester.standing.as_str(),
            risk = risk.level.as_str(),
            "compiled performance report"
        );

        Ok(PerformanceReport {
            student_id: input.student_id.clone(),
            student_name: input.student_name.clone(),
            conduct: input.conduct,
            semester,
            attendance,
            trend,
            risk,
        })
    }
}

/// Most severe first, then lowest GPA, then student id.
pub fn rank_by_risk<'a, I>(reports: I) -> Vec<&'a PerformanceReport>
where
    I: IntoIterator<Item = &'a PerformanceReport>,
{
    let mut ranked: Vec<&PerformanceReport> = reports.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.risk
            .level
            .cmp(&a.risk.level)
            .then(a.semester.gpa.total_cmp(&b.semester.gpa))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    ranked
}

const STANDING_ORDER: [AcademicStanding; 5] = [
    AcademicStanding::Excellent,
    AcademicStanding::Good,
    AcademicStanding::Fair,
    AcademicStanding::Average,
    AcademicStanding::Weak,
];

pub fn summarize_by_standing<'a, I>(reports: I) -> Vec<(AcademicStanding, usize)>
where
    I: IntoIterator<Item = &'a PerformanceReport>,
{
    let mut counts = [0usize; STANDING_ORDER.len()];
    for report in reports {
        if let Some(index) = STANDING_ORDER
            .iter()
            .position(|standing| *standing == report.semester.standing)
        {
            counts[index] += 1;
        }
    }
    STANDING_ORDER
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .collect()
}

pub fn render_markdown(period_label: &str, entries: &[BatchEntry]) -> String {
    let reports: Vec<&PerformanceReport> =
        entries.iter().filter_map(|entry| entry.report.as_ref()).collect();

    let mut output = String::new();

    let _ = writeln!(output, "# Academic Performance Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} students)",
        period_label,
        entries.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Standing Mix");

    let standings = summarize_by_standing(reports.iter().copied());
    if standings.is_empty() {
        let _ = writeln!(output, "No reports compiled for this period.");
    } else {
        for (standing, count) in standings {
            let _ = writeln!(output, "- {}: {} students", standing.label(), count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Students");

    if reports.is_empty() {
        let _ = writeln!(output, "No reports compiled for this period.");
    } else {
        for report in rank_by_risk(reports.iter().copied()).into_iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({}) risk {}, GPA {:.2} ({}), attendance {:.1}%",
                report.student_name,
                report.student_id,
                report.risk.level.as_str(),
                report.semester.gpa,
                report.semester.standing.label(),
                report.attendance.rate
            );
            for recommendation in &report.risk.recommendations {
                let _ = writeln!(output, "  - {recommendation}");
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Declining Students");

    let declining: Vec<&PerformanceReport> = reports
        .iter()
        .copied()
        .filter(|report| report.trend.direction == TrendDirection::Declining)
        .collect();
    if declining.is_empty() {
        let _ = writeln!(output, "No declining students this period.");
    } else {
        for report in declining {
            let _ = writeln!(
                output,
                "- {} ({}): GPA {:.2}, change {:+.2}",
                report.student_name, report.student_id, report.semester.gpa, report.trend.magnitude
            );
        }
    }

    let problems: Vec<&BatchEntry> = entries
        .iter()
        .filter(|entry| !entry.skipped_subjects.is_empty() || entry.error.is_some())
        .collect();
    if !problems.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Data Problems");
        for entry in problems {
            for skipped in &entry.skipped_subjects {
                let _ = writeln!(
                    output,
                    "- {}: subject {} skipped ({})",
                    entry.student_id, skipped.subject_id, skipped.reason
                );
            }
            if let Some(error) = &entry.error {
                let _ = writeln!(output, "- {}: no report ({})", entry.student_id, error);
            }
        }
    }

    output
}
