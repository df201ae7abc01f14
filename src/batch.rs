//! Batch report generation across many students.
//!
//! Each student is compiled independently on the rayon pool. A subject that
//! fails aggregation is dropped from that student's report and recorded, the
//! rest of the report is still compiled.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::ReportError;
use crate::models::{PerformanceReport, StudentPeriodInput};
use crate::report::ReportCompiler;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSubject {
    pub subject_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub student_id: String,
    pub report: Option<PerformanceReport>,
    pub skipped_subjects: Vec<SkippedSubject>,
    pub error: Option<String>,
}

pub fn compile_student(compiler: &ReportCompiler, input: &StudentPeriodInput) -> BatchEntry {
    let mut remaining = input.clone();
    let mut skipped_subjects = Vec::new();

    loop {
        match compiler.compile(&remaining) {
            Ok(report) => {
                return BatchEntry {
                    student_id: input.student_id.clone(),
                    report: Some(report),
                    skipped_subjects,
                    error: None,
                };
            }
            Err(ReportError::Subject {
                subject_id,
                subject_index,
                source,
                ..
            }) => {
                tracing::warn!(
                    student_id = %input.student_id,
                    period = %input.period_label,
                    subject_id = %subject_id,
                    error = %source,
                    "skipping subject"
                );
                // ids are not unique, so only the failing position goes
                remaining.subjects.remove(subject_index);
                skipped_subjects.push(SkippedSubject {
                    subject_id,
                    reason: source.to_string(),
                });
            }
            Err(err) => {
                tracing::warn!(student_id = %input.student_id, error = %err, "report not compiled");
                return BatchEntry {
                    student_id: input.student_id.clone(),
                    report: None,
                    skipped_subjects,
                    error: Some(err.to_string()),
                };
            }
        }
    }
}

/// Output order matches input order.
pub fn compile_batch(compiler: &ReportCompiler, inputs: &[StudentPeriodInput]) -> Vec<BatchEntry> {
    let entries: Vec<BatchEntry> = inputs
        .par_iter()
        .map(|input| compile_student(compiler, input))
        .collect();

    let compiled = entries.iter().filter(|entry| entry.report.is_some()).count();
    tracing::info!(students = inputs.len(), compiled, "batch compiled");
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::WeightTable;
    use crate::models::{ComponentScoreSet, ComponentType, GradeEntry, SubjectScores};

    fn subject(id: &str, entry: GradeEntry) -> SubjectScores {
        SubjectScores {
            subject_id: id.to_string(),
            subject_name: id.to_string(),
            scores: ComponentScoreSet::new().with(entry),
        }
    }

    fn student(subjects: Vec<SubjectScores>) -> StudentPeriodInput {
        StudentPeriodInput {
            student_id: "s-9".to_string(),
            student_name: "Le Minh".to_string(),
            period_label: "HK2".to_string(),
            subjects,
            conduct: None,
            attendance: Vec::new(),
            gpa_history: Vec::new(),
            weaknesses: Vec::new(),
        }
    }

    #[test]
    fn every_failing_subject_is_skipped_and_recorded() {
        let weights = WeightTable::new([(ComponentType::Final, 1.0)]).unwrap();
        let compiler = ReportCompiler::new(weights);
        let input = student(vec![
            subject("geo", GradeEntry::scored(ComponentType::Oral, 7.0)),
            subject("math", GradeEntry::scored(ComponentType::Final, 7.0)),
            subject("bio", GradeEntry::scored(ComponentType::Final, -1.0)),
        ]);

        let entry = compile_student(&compiler, &input);
        let report = entry.report.expect("report with the healthy subject");
        assert_eq!(report.semester.subject_averages.len(), 1);
        assert_eq!(report.semester.gpa, 7.0);
        let skipped: Vec<&str> = entry
            .skipped_subjects
            .iter()
            .map(|skipped| skipped.subject_id.as_str())
            .collect();
        assert_eq!(skipped, vec!["geo", "bio"]);
        assert!(entry.skipped_subjects[0].reason.contains("no weight configured"));
        assert!(entry.error.is_none());
    }

    #[test]
    fn shared_subject_id_keeps_the_healthy_subject() {
        let compiler = ReportCompiler::default();
        let input = student(vec![
            subject("math", GradeEntry::scored(ComponentType::Final, 8.0)),
            subject("math", GradeEntry::scored(ComponentType::Final, 11.0)),
        ]);

        let entry = compile_student(&compiler, &input);
        let report = entry.report.expect("report with the healthy subject");
        assert_eq!(report.semester.subject_averages.len(), 1);
        assert_eq!(report.semester.subject_averages[0].final_grade, 8.0);
        assert_eq!(report.semester.gpa, 8.0);
        assert_eq!(entry.skipped_subjects.len(), 1);
        assert_eq!(entry.skipped_subjects[0].subject_id, "math");
        assert!(entry.skipped_subjects[0].reason.contains("points 11"));
    }

    #[test]
    fn batch_preserves_input_order() {
        let compiler = ReportCompiler::default();
        let inputs: Vec<StudentPeriodInput> = (0..32)
            .map(|index| {
                let mut input = student(vec![subject(
                    "math",
                    GradeEntry::scored(ComponentType::Final, (index % 11) as f64),
                )]);
                input.student_id = format!("s-{index:02}");
                input
            })
            .collect();

        let entries = compile_batch(&compiler, &inputs);
        let ids: Vec<&str> = entries.iter().map(|entry| entry.student_id.as_str()).collect();
        let expected: Vec<String> = (0..32).map(|index| format!("s-{index:02}")).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(entries.iter().all(|entry| entry.report.is_some()));
    }
}
