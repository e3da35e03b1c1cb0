use crate::manager::AttendanceManager;
use crate::models::SectionStudent;
use crate::recorder::MarkOutcome;
use crate::report::{ATTENDANCE_THRESHOLD, ReportSummary, StudentReportRow, WorkloadReportRow};
use crate::store::TableCounts;
use diesel::QueryResult;
use tabled::{Table, Tabled, settings::Style};

/// Pretty prints the number of rows in each table.
pub fn show_counts(counts: TableCounts) {
    let mut table = Table::new([counts]);
    table.with(Style::modern());

    println!("Attendance store:\n{table}");
}

/// Pretty prints the sections attendance can be taken for.
pub fn show_sections(manager: &mut AttendanceManager) -> QueryResult<()> {
    #[derive(Tabled)]
    struct SectionRow {
        section: String,
        subjects: String,
    }

    let sections = manager.get_sections()?;
    let rows: Vec<SectionRow> = sections
        .into_iter()
        .map(|section| SectionRow {
            subjects: manager.get_subjects(&section).join(", "),
            section,
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("Sections:\n{table}");

    Ok(())
}

/// Pretty prints the students attending a section.
pub fn show_students(section: &str, students: Vec<SectionStudent>) {
    if students.is_empty() {
        eprintln!("No students found in section '{section}'.");
        return;
    }

    let mut table = Table::new(students);
    table.with(Style::modern());
    println!("{section}:\n{table}");
}

/// Pretty prints the faculty and when they were added.
pub fn show_faculty(manager: &mut AttendanceManager) -> QueryResult<()> {
    #[derive(Tabled)]
    struct FacultyRow {
        name: String,
        created_at: String,
    }

    let faculty: Vec<FacultyRow> = manager
        .get_faculty()?
        .into_iter()
        .map(|member| FacultyRow {
            name: member.name,
            created_at: member.created_at.to_string(),
        })
        .collect();

    let mut table = Table::new(faculty);
    table.with(Style::modern());
    println!("Faculty:\n{table}");

    Ok(())
}

/// Pretty prints the period timings.
pub fn show_periods(manager: &AttendanceManager) {
    #[derive(Tabled)]
    struct PeriodRow {
        period: String,
        start: String,
        end: String,
    }

    let periods: Vec<PeriodRow> = manager
        .schedule()
        .periods()
        .iter()
        .map(|period| PeriodRow {
            period: period.code.clone(),
            start: period.start.format("%H:%M").to_string(),
            end: period.end.format("%H:%M").to_string(),
        })
        .collect();

    let mut table = Table::new(periods);
    table.with(Style::modern());
    println!("Period timings:\n{table}");
}

/// Prints how many students were marked, and warns about any entries that were left out.
pub fn show_mark_outcome(outcome: &MarkOutcome) {
    println!(
        "Attendance marked successfully: {} present, {} absent.",
        outcome.present, outcome.absent
    );

    if !outcome.is_complete() {
        eprintln!(
            "Warning: no student found for HT numbers {}; they were not marked.",
            outcome.skipped.join(", ")
        );
    }
}

/// Pretty prints a student attendance report with its summary figures.
pub fn show_student_report(rows: Vec<StudentReportRow>) {
    if rows.is_empty() {
        println!("No attendance records found for the selected criteria.");
        return;
    }

    let summary = ReportSummary::from_rows(&rows);
    println!("Total students: {}", summary.total_students);
    println!("Average attendance: {:.2}%", summary.average_attendance);
    println!(
        "Students below {ATTENDANCE_THRESHOLD}%: {}",
        summary.students_below_threshold
    );

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{table}");
}

/// Pretty prints a faculty workload report.
pub fn show_workload_report(rows: Vec<WorkloadReportRow>) {
    if rows.is_empty() {
        println!("No workload data found for the selected criteria.");
        return;
    }

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{table}");
}
