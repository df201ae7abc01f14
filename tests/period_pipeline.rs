use std::fs;
use std::path::{Path, PathBuf};

use groupscholar_academic_performance::{
    batch, cohort, input, report, AcademicStanding, ConductRating, RiskLevel, StudentPeriodInput,
    TrendDirection,
};
use groupscholar_academic_performance::{EngineConfig, ReportCompiler};

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

struct Fixture {
    _dir: tempfile::TempDir,
    grades: PathBuf,
    attendance: PathBuf,
    students: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let grades = write(
        dir.path(),
        "grades.csv",
        "student_id,student_name,subject_id,subject_name,component_type,points_earned,is_excused,is_missing
s-001,Nguyen Van An,math,Mathematics,oral,8,false,false
s-001,Nguyen Van An,math,Mathematics,fifteen_min,7,false,false
s-001,Nguyen Van An,math,Mathematics,one_period,9,false,false
s-001,Nguyen Van An,math,Mathematics,final,10,false,false
s-001,Nguyen Van An,lit,Literature,final,8,false,false
s-001,Nguyen Van An,lit,Literature,midterm,,true,false
s-002,Tran Thi Binh,math,Mathematics,final,4,false,false
s-002,Tran Thi Binh,math,Mathematics,midterm,,false,true
s-002,Tran Thi Binh,lit,Literature,final,12,false,false
s-002,Tran Thi Binh,lit,Literature,oral,6,false,false
",
    );
    let attendance = write(
        dir.path(),
        "attendance.csv",
        "student_id,date,status
s-001,2025-09-08,present
s-001,2025-09-09,late
s-001,2025-09-10,present
s-001,2025-09-11,excused
s-002,2025-09-08,absent
s-002,2025-09-09,present
s-002,2025-09-10,absent
s-002,2025-09-11,absent
",
    );
    let students = write(
        dir.path(),
        "students.csv",
        "student_id,student_name,conduct,prior_gpas
s-001,Nguyen Van An,good,7.9;8.6
s-002,Tran Thi Binh,,5.1
",
    );
    Fixture {
        _dir: dir,
        grades,
        attendance,
        students,
    }
}

fn load(fixture: &Fixture) -> Vec<StudentPeriodInput> {
    input::load_period(
        &fixture.grades,
        &fixture.attendance,
        &fixture.students,
        "HK1 2025-2026",
    )
    .unwrap()
}

#[test]
fn csv_rows_become_period_inputs() {
    let fixture = fixture();
    let inputs = load(&fixture);

    assert_eq!(inputs.len(), 2);
    let first = &inputs[0];
    assert_eq!(first.student_id, "s-001");
    assert_eq!(first.period_label, "HK1 2025-2026");
    assert_eq!(first.conduct, Some(ConductRating::Good));
    assert_eq!(first.gpa_history, vec![7.9, 8.6]);
    assert_eq!(first.subjects.len(), 2);
    assert_eq!(first.subjects[0].subject_id, "math");
    assert_eq!(first.attendance.len(), 4);

    let second = &inputs[1];
    assert_eq!(second.conduct, None);
    assert_eq!(second.gpa_history, vec![5.1]);
}

#[test]
fn batch_skips_the_failing_subject_and_keeps_the_rest() {
    let fixture = fixture();
    let inputs = load(&fixture);
    let entries = batch::compile_batch(&ReportCompiler::default(), &inputs);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].student_id, "s-001");
    assert_eq!(entries[1].student_id, "s-002");

    let first = entries[0].report.as_ref().unwrap();
    // math: (8 + 7 + 18 + 30) / 7 = 9.00, literature: 8.00
    assert_eq!(first.semester.gpa, 8.5);
    assert_eq!(first.semester.standing, AcademicStanding::Good);
    assert_eq!(first.attendance.rate, 100.0);
    assert_eq!(first.trend.direction, TrendDirection::Stable);
    assert_eq!(first.risk.level, RiskLevel::Low);
    assert!(entries[0].skipped_subjects.is_empty());

    let second = &entries[1];
    assert_eq!(second.skipped_subjects.len(), 1);
    assert_eq!(second.skipped_subjects[0].subject_id, "lit");
    let report = second.report.as_ref().unwrap();
    assert_eq!(report.semester.subject_averages.len(), 1);
    // final 4 * 3 + missing midterm 0 * 2 over 5
    assert_eq!(report.semester.gpa, 2.4);
    assert_eq!(report.semester.standing, AcademicStanding::Weak);
    assert_eq!(report.attendance.rate, 25.0);
    assert_eq!(report.trend.direction, TrendDirection::Declining);
    assert_eq!(report.risk.level, RiskLevel::Critical);
    assert_eq!(report.risk.recommendations.len(), 5);
}

#[test]
fn bad_history_leaves_the_student_without_a_report() {
    let fixture = fixture();
    let mut inputs = load(&fixture);
    inputs[0].gpa_history.push(11.0);
    let entries = batch::compile_batch(&ReportCompiler::default(), &inputs);

    assert!(entries[0].report.is_none());
    assert!(entries[0].error.as_deref().unwrap().contains("prior GPA 11"));
    assert!(entries[1].report.is_some());
}

#[test]
fn weaknesses_flow_into_recommendations() {
    let fixture = fixture();
    let mut inputs = load(&fixture);
    let config = EngineConfig::default();
    let compiler = config.compiler();
    cohort::attach_weaknesses(
        compiler.aggregator(),
        &mut inputs,
        config.cohort.weakness_margin,
    );

    // class math mean (9.0 + 2.4) / 2 = 5.7; literature only counts s-001
    assert!(inputs[0].weaknesses.is_empty());
    assert_eq!(inputs[1].weaknesses, vec!["Mathematics".to_string()]);

    let entries = batch::compile_batch(&compiler, &inputs);
    let report = entries[1].report.as_ref().unwrap();
    assert!(report
        .risk
        .recommendations
        .contains(&"Prioritize extra practice in: Mathematics".to_string()));
}

#[test]
fn markdown_report_lists_risk_and_problems() {
    let fixture = fixture();
    let inputs = load(&fixture);
    let entries = batch::compile_batch(&ReportCompiler::default(), &inputs);
    let markdown = report::render_markdown("HK1 2025-2026", &entries);

    assert!(markdown.starts_with("# Academic Performance Report"));
    assert!(markdown.contains("Generated for HK1 2025-2026 (2 students)"));
    assert!(markdown.contains("- Good: 1 students"));
    assert!(markdown.contains("- Weak: 1 students"));
    let critical = markdown.find("Tran Thi Binh (s-002) risk critical").unwrap();
    let low = markdown.find("Nguyen Van An (s-001) risk low").unwrap();
    assert!(critical < low);
    assert!(markdown.contains("## Declining Students"));
    assert!(markdown.contains("- s-002: subject lit skipped"));
}

#[test]
fn export_json_has_explicit_nulls() {
    let fixture = fixture();
    let inputs = load(&fixture);
    let entries = batch::compile_batch(&ReportCompiler::default(), &inputs);
    let json = serde_json::to_value(&entries).unwrap();

    assert!(json[0]["error"].is_null());
    assert!(json[1]["report"]["conduct"].is_null());
    assert!(json[0]["report"]["semester"]["subject_averages"][0]["component_averages"]["midterm"]
        .is_null());
    assert_eq!(json[1]["skipped_subjects"][0]["subject_id"], "lit");
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let fixture = fixture();
    let err = input::load_period(
        Path::new("/nonexistent/grades.csv"),
        &fixture.attendance,
        &fixture.students,
        "HK1",
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/grades.csv"));
}
