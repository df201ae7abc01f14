//! Class comparison: flags subjects where a student sits well below the
//! class mean for that subject.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::grades::{round2, SubjectAggregator};
use crate::models::{StudentPeriodInput, SubjectAverage};

/// Mean subject final per subject id, over the students who take it.
pub fn class_subject_averages(students: &[Vec<SubjectAverage>]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for subject in students.iter().flatten() {
        let entry = totals.entry(subject.subject_id.clone()).or_insert((0.0, 0));
        entry.0 += subject.final_grade;
        entry.1 += 1;
    }
    totals
        .into_iter()
        .map(|(subject_id, (total, count))| (subject_id, round2(total / count as f64)))
        .collect()
}

/// Subject names at least `margin` below the class mean, by subject id.
pub fn weaknesses(
    subjects: &[SubjectAverage],
    class_averages: &BTreeMap<String, f64>,
    margin: f64,
) -> Vec<String> {
    let mut below: Vec<&SubjectAverage> = subjects
        .iter()
        .filter(|subject| {
            class_averages
                .get(&subject.subject_id)
                .is_some_and(|class_mean| round2(class_mean - subject.final_grade) >= margin)
        })
        .collect();
    below.sort_by(|a, b| a.subject_id.cmp(&b.subject_id));
    below
        .into_iter()
        .map(|subject| subject.subject_name.clone())
        .collect()
}

/// Fill in `weaknesses` for every student from the class as a whole.
///
/// Subjects that fail aggregation are left out of the comparison; the
/// compiler reports them when the student is compiled.
pub fn attach_weaknesses(
    aggregator: &SubjectAggregator,
    inputs: &mut [StudentPeriodInput],
    margin: f64,
) {
    let per_student: Vec<Vec<SubjectAverage>> = inputs
        .par_iter()
        .map(|input| {
            input
                .subjects
                .iter()
                .filter_map(|subject| aggregator.aggregate(subject).ok())
                .collect()
        })
        .collect();

    let class_averages = class_subject_averages(&per_student);
    for (input, subjects) in inputs.iter_mut().zip(&per_student) {
        input.weaknesses = weaknesses(subjects, &class_averages, margin);
    }
}
