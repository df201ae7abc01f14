//! CSV loading for one period: grades, attendance marks and student records.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::{
    AttendanceMark, AttendanceStatus, ComponentScoreSet, ComponentType, ConductRating, GradeEntry,
    StudentPeriodInput, SubjectScores,
};

#[derive(Debug, Deserialize)]
struct GradeRow {
    student_id: String,
    student_name: String,
    subject_id: String,
    subject_name: String,
    component_type: ComponentType,
    points_earned: Option<f64>,
    is_excused: bool,
    is_missing: bool,
}

#[derive(Debug, Deserialize)]
struct AttendanceRow {
    student_id: String,
    date: NaiveDate,
    status: AttendanceStatus,
}

#[derive(Debug, Deserialize)]
struct StudentRow {
    student_id: String,
    student_name: String,
    conduct: Option<ConductRating>,
    prior_gpas: Option<String>,
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<T>().enumerate() {
        // header is line 1
        let row = result.with_context(|| format!("{}: bad row {}", path.display(), index + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

/// `;`-separated GPAs, oldest first.
pub fn parse_prior_gpas(raw: &str) -> Result<Vec<f64>> {
    raw.split(';')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<f64>()
                .with_context(|| format!("invalid prior GPA `{value}`"))
        })
        .collect()
}

/// Students in first-seen order: student file, then grades, then attendance.
#[derive(Debug, Default)]
struct Roster {
    inputs: Vec<StudentPeriodInput>,
    index: HashMap<String, usize>,
}

impl Roster {
    fn student(
        &mut self,
        student_id: &str,
        student_name: &str,
        period_label: &str,
    ) -> &mut StudentPeriodInput {
        let position = match self.index.get(student_id) {
            Some(position) => *position,
            None => {
                self.inputs.push(StudentPeriodInput {
                    student_id: student_id.to_string(),
                    student_name: student_name.to_string(),
                    period_label: period_label.to_string(),
                    subjects: Vec::new(),
                    conduct: None,
                    attendance: Vec::new(),
                    gpa_history: Vec::new(),
                    weaknesses: Vec::new(),
                });
                self.index.insert(student_id.to_string(), self.inputs.len() - 1);
                self.inputs.len() - 1
            }
        };
        &mut self.inputs[position]
    }
}

pub fn load_period(
    grades_path: &Path,
    attendance_path: &Path,
    students_path: &Path,
    period_label: &str,
) -> Result<Vec<StudentPeriodInput>> {
    let mut roster = Roster::default();

    for row in read_rows::<StudentRow>(students_path)? {
        let gpa_history = match row.prior_gpas.as_deref() {
            Some(raw) => parse_prior_gpas(raw)
                .with_context(|| format!("student {}", row.student_id))?,
            None => Vec::new(),
        };
        let student = roster.student(&row.student_id, &row.student_name, period_label);
        student.conduct = row.conduct;
        student.gpa_history = gpa_history;
    }

    for row in read_rows::<GradeRow>(grades_path)? {
        let student = roster.student(&row.student_id, &row.student_name, period_label);
        let entry = GradeEntry {
            component_type: row.component_type,
            points_earned: row.points_earned,
            is_excused: row.is_excused,
            is_missing: row.is_missing,
        };
        match student
            .subjects
            .iter_mut()
            .find(|subject| subject.subject_id == row.subject_id)
        {
            Some(subject) => subject.scores.push(entry),
            None => student.subjects.push(SubjectScores {
                subject_id: row.subject_id,
                subject_name: row.subject_name,
                scores: ComponentScoreSet::new().with(entry),
            }),
        }
    }

    for row in read_rows::<AttendanceRow>(attendance_path)? {
        let student = roster.student(&row.student_id, &row.student_id, period_label);
        student.attendance.push(AttendanceMark {
            date: row.date,
            status: row.status,
        });
    }

    tracing::info!(
        students = roster.inputs.len(),
        period = period_label,
        "loaded period inputs"
    );
    Ok(roster.inputs)
}
