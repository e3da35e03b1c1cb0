mod common;

use attendance::{AttendanceError, ReportSummary, write_csv};
use common::{Fixture, SECTION, at, entries, fixture};

/// Three classes over two days for section A:
///
/// | day | period | subject | 21CSE001 | 21CSE002 | 21CSE003 |
/// |-----|--------|---------|----------|----------|----------|
/// | 15  | P1     | Python  | P        | A        | P        |
/// | 15  | P2     | Physics | P        | P        | A        |
/// | 16  | P1     | Python  | P        | P        | P        |
fn marked_fixture() -> Fixture {
    let mut f = fixture();
    let m = &mut f.manager;

    m.mark_attendance_at(&entries("Python", "P1", [true, false, true]), "faculty1", at(15, 9, 5))
        .unwrap();
    m.mark_attendance_at(&entries("Physics", "P2", [true, true, false]), "faculty1", at(15, 10, 5))
        .unwrap();
    m.mark_attendance_at(&entries("Python", "P1", [true; 3]), "faculty1", at(16, 9, 5))
        .unwrap();

    f
}

fn sections(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn reports_student_attendance_per_subject() {
    let mut f = marked_fixture();

    let rows = f
        .manager
        .student_attendance_report(&sections(&[SECTION]), "2024-01-01", "2024-01-31")
        .unwrap();

    let summary: Vec<(&str, &str, i64, i64, f64)> = rows
        .iter()
        .map(|row| {
            (
                row.ht_number.as_str(),
                row.subject.as_str(),
                row.total_classes,
                row.present_classes,
                row.attendance_percentage,
            )
        })
        .collect();

    let expected: Vec<(&str, &str, i64, i64, f64)> = vec![
        ("21CSE001", "Physics", 1, 1, 100.0),
        ("21CSE001", "Python", 2, 2, 100.0),
        ("21CSE002", "Physics", 1, 1, 100.0),
        ("21CSE002", "Python", 2, 1, 50.0),
        ("21CSE003", "Physics", 1, 0, 0.0),
        ("21CSE003", "Python", 2, 2, 100.0),
    ];
    assert_eq!(summary, expected);
    assert!(rows.iter().all(|row| row.section == SECTION));
    assert_eq!(rows[0].student_name, "Asha Rao");

    let stats = ReportSummary::from_rows(&rows);
    assert_eq!(stats.total_students, 3);
    assert_eq!(stats.average_attendance, 75.0);
    assert_eq!(stats.students_below_threshold, 2);
}

#[test]
fn student_report_honours_the_date_range() {
    let mut f = marked_fixture();

    let rows = f
        .manager
        .student_attendance_report(&sections(&[SECTION]), "2024-01-16", "2024-01-16")
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.subject == "Python" && row.total_classes == 1));
    assert!(rows.iter().all(|row| row.attendance_percentage == 100.0));
}

#[test]
fn student_report_only_covers_selected_sections() {
    let mut f = marked_fixture();

    let other = f
        .manager
        .student_attendance_report(&sections(&["B.Tech-I-CSE-B"]), "2024-01-01", "2024-01-31")
        .unwrap();
    assert!(other.is_empty());

    let both = f
        .manager
        .student_attendance_report(
            &sections(&["B.Tech-I-CSE-B", SECTION]),
            "2024-01-01",
            "2024-01-31",
        )
        .unwrap();
    assert_eq!(both.len(), 6);
}

#[test]
fn empty_filters_yield_empty_reports() {
    let mut f = marked_fixture();

    let students = f
        .manager
        .student_attendance_report(&[], "2024-01-01", "2024-01-31")
        .unwrap();
    let workload = f
        .manager
        .faculty_workload_report(&[], "2024-01-01", "2024-01-31")
        .unwrap();

    assert!(students.is_empty());
    assert!(workload.is_empty());
}

#[test]
fn rejects_invalid_date_ranges() {
    let mut f = marked_fixture();

    let inverted = f
        .manager
        .student_attendance_report(&sections(&[SECTION]), "2024-01-10", "2024-01-05");
    assert!(matches!(inverted, Err(AttendanceError::Validation(_))));

    let malformed = f
        .manager
        .faculty_workload_report(&sections(&["faculty1"]), "bad-date", "2024-01-10");
    assert!(matches!(malformed, Err(AttendanceError::Validation(_))));
}

#[test]
fn reports_faculty_workload() {
    let mut f = marked_fixture();
    let m = &mut f.manager;

    m.mark_attendance_at(&entries("Mathematics-I", "P3", [true; 3]), "faculty2", at(17, 11, 5))
        .unwrap();

    let rows = m
        .faculty_workload_report(
            &sections(&["faculty1", "faculty2", "faculty3"]),
            "2024-01-01",
            "2024-01-31",
        )
        .unwrap();

    // faculty3 taught nothing in the range and is left out.
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(first.faculty_name, "faculty1");
    assert_eq!(first.total_classes, 3);
    assert_eq!(first.working_days, 2);
    assert_eq!(first.unique_subjects, 2);
    assert_eq!(first.unique_sections, 1);
    assert_eq!(first.subjects_handled, "Physics,Python");
    assert_eq!(first.sections_handled, "(O)B.Tech-I-CSE-A");

    let second = &rows[1];
    assert_eq!(second.faculty_name, "faculty2");
    assert_eq!(second.total_classes, 1);
    assert_eq!(second.subjects_handled, "Mathematics-I");

    let narrowed = m
        .faculty_workload_report(&sections(&["faculty1"]), "2024-01-16", "2024-01-17")
        .unwrap();
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].total_classes, 1);
    assert_eq!(narrowed[0].working_days, 1);
}

#[test]
fn exports_reports_as_csv() {
    let mut f = marked_fixture();

    let rows = f
        .manager
        .student_attendance_report(&sections(&[SECTION]), "2024-01-01", "2024-01-31")
        .unwrap();

    let path = f.dir.path().join("attendance_report.csv");
    write_csv(&rows, std::fs::File::create(&path).unwrap()).unwrap();

    let csv = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 7);
    assert_eq!(
        lines[0],
        "HT Number,Student Name,Section,Subject,Total Classes,Present,Attendance %"
    );
    assert_eq!(lines[4], "21CSE002,Bilal Khan,B.Tech-I-CSE-A,Python,2,1,50.0");
}
