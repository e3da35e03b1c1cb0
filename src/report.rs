//! Student attendance and faculty workload reports over a date range.

use crate::error::{AttendanceError, Result};
use crate::schema::{faculty, faculty_workload, sections, subjects};
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Date, Text};
use diesel::sqlite::Sqlite;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use tabled::Tabled;

/// The date format accepted for report bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Students below this attendance percentage in any subject are flagged in the summary.
pub const ATTENDANCE_THRESHOLD: f64 = 75.0;

/// An inclusive range of dates, guaranteed to run forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(AttendanceError::Validation(format!(
                "invalid date range: {from} is after {to}"
            )));
        }

        Ok(Self { from, to })
    }

    /// Parses two `YYYY-MM-DD` dates into a range.
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        let parse = |value: &str| {
            NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
                AttendanceError::Validation(format!("invalid date '{value}', expected YYYY-MM-DD"))
            })
        };

        Self::new(parse(from)?, parse(to)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.from
    }

    pub fn end(&self) -> NaiveDate {
        self.to
    }
}

/// Whether `from` and `to` are both valid dates with `from <= to`. Malformed dates are invalid.
pub fn validate_date_range(from: &str, to: &str) -> bool {
    DateRange::parse(from, to).is_ok()
}

/// Rounds `present / total` to a percentage with two decimal places.
pub fn attendance_percentage(present: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }

    (present as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
}

/// One student's attendance in one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct StudentReportRow {
    #[serde(rename = "HT Number")]
    #[tabled(rename = "HT Number")]
    pub ht_number: String,
    #[serde(rename = "Student Name")]
    #[tabled(rename = "Student Name")]
    pub student_name: String,
    #[serde(rename = "Section")]
    #[tabled(rename = "Section")]
    pub section: String,
    #[serde(rename = "Subject")]
    #[tabled(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Total Classes")]
    #[tabled(rename = "Total Classes")]
    pub total_classes: i64,
    #[serde(rename = "Present")]
    #[tabled(rename = "Present")]
    pub present_classes: i64,
    #[serde(rename = "Attendance %")]
    #[tabled(rename = "Attendance %")]
    pub attendance_percentage: f64,
}

/// Headline figures for a student attendance report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportSummary {
    pub total_students: usize,
    /// Mean of the per-subject percentages, or `0.0` for an empty report.
    pub average_attendance: f64,
    /// Students with at least one subject below [`ATTENDANCE_THRESHOLD`].
    pub students_below_threshold: usize,
}

impl ReportSummary {
    pub fn from_rows(rows: &[StudentReportRow]) -> Self {
        let students: BTreeSet<&str> = rows.iter().map(|row| row.ht_number.as_str()).collect();

        let below: BTreeSet<&str> = rows
            .iter()
            .filter(|row| row.attendance_percentage < ATTENDANCE_THRESHOLD)
            .map(|row| row.ht_number.as_str())
            .collect();

        let average_attendance = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|row| row.attendance_percentage).sum::<f64>() / rows.len() as f64
        };

        Self {
            total_students: students.len(),
            average_attendance,
            students_below_threshold: below.len(),
        }
    }
}

/// One faculty member's teaching load over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct WorkloadReportRow {
    #[serde(rename = "Faculty Name")]
    #[tabled(rename = "Faculty Name")]
    pub faculty_name: String,
    /// Distinct (date, period) slots taught.
    #[serde(rename = "Total Classes")]
    #[tabled(rename = "Total Classes")]
    pub total_classes: usize,
    #[serde(rename = "Working Days")]
    #[tabled(rename = "Working Days")]
    pub working_days: usize,
    #[serde(rename = "Subjects")]
    #[tabled(rename = "Subjects")]
    pub unique_subjects: usize,
    #[serde(rename = "Sections")]
    #[tabled(rename = "Sections")]
    pub unique_sections: usize,
    /// Comma-separated, sorted subject names.
    #[serde(rename = "Subjects Handled")]
    #[tabled(rename = "Subjects Handled")]
    pub subjects_handled: String,
    /// Comma-separated, sorted section names.
    #[serde(rename = "Sections Handled")]
    #[tabled(rename = "Sections Handled")]
    pub sections_handled: String,
}

#[derive(QueryableByName)]
struct StudentTally {
    #[diesel(sql_type = Text)]
    ht_number: String,
    #[diesel(sql_type = Text)]
    student_name: String,
    #[diesel(sql_type = Text)]
    section: String,
    #[diesel(sql_type = Text)]
    subject: String,
    #[diesel(sql_type = BigInt)]
    total_classes: i64,
    #[diesel(sql_type = BigInt)]
    present_classes: i64,
}

/// Builds `?, ?, ?` for `count` parameters.
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Tallies attendance per student and subject for students attending any of `sections`.
///
/// An empty `sections` list yields an empty report.
pub(crate) fn student_attendance_report(
    conn: &mut SqliteConnection,
    sections: &[String],
    range: DateRange,
) -> QueryResult<Vec<StudentReportRow>> {
    if sections.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT s.ht_number AS ht_number,
                s.name AS student_name,
                sec.name AS section,
                sub.name AS subject,
                COUNT(*) AS total_classes,
                SUM(CASE WHEN a.status = 'P' THEN 1 ELSE 0 END) AS present_classes
         FROM students s
         JOIN sections sec ON s.manipulated_section_id = sec.id
         JOIN attendance a ON s.id = a.student_id
         JOIN subjects sub ON a.subject_id = sub.id
         WHERE sec.name IN ({})
           AND a.date BETWEEN ? AND ?
         GROUP BY s.ht_number, s.name, sec.name, sub.name
         ORDER BY sec.name, s.ht_number, sub.name",
        placeholders(sections.len())
    );

    let mut query = diesel::sql_query(sql).into_boxed::<Sqlite>();
    for section in sections {
        query = query.bind::<Text, _>(section.clone());
    }

    let tallies = query
        .bind::<Date, _>(range.start())
        .bind::<Date, _>(range.end())
        .load::<StudentTally>(conn)?;

    Ok(tallies
        .into_iter()
        .map(|tally| StudentReportRow {
            attendance_percentage: attendance_percentage(
                tally.present_classes,
                tally.total_classes,
            ),
            ht_number: tally.ht_number,
            student_name: tally.student_name,
            section: tally.section,
            subject: tally.subject,
            total_classes: tally.total_classes,
            present_classes: tally.present_classes,
        })
        .collect())
}

#[derive(Default)]
struct WorkloadTally {
    classes: BTreeSet<(NaiveDate, String)>,
    days: BTreeSet<NaiveDate>,
    subjects: BTreeSet<String>,
    sections: BTreeSet<String>,
}

/// Summarizes the workload of each faculty member in `faculty_names` who taught within `range`,
/// ordered by name.
///
/// An empty `faculty_names` list yields an empty report.
pub(crate) fn faculty_workload_report(
    conn: &mut SqliteConnection,
    faculty_names: &[String],
    range: DateRange,
) -> QueryResult<Vec<WorkloadReportRow>> {
    if faculty_names.is_empty() {
        return Ok(Vec::new());
    }

    let records = faculty_workload::table
        .inner_join(faculty::table)
        .inner_join(subjects::table)
        .inner_join(sections::table)
        .filter(faculty::name.eq_any(faculty_names))
        .filter(faculty_workload::date.between(range.start(), range.end()))
        .select((
            faculty::name,
            faculty_workload::date,
            faculty_workload::period,
            subjects::name,
            sections::name,
        ))
        .load::<(String, NaiveDate, String, String, String)>(conn)?;

    let mut tallies: BTreeMap<String, WorkloadTally> = BTreeMap::new();
    for (name, date, period, subject, section) in records {
        let tally = tallies.entry(name).or_default();
        tally.classes.insert((date, period));
        tally.days.insert(date);
        tally.subjects.insert(subject);
        tally.sections.insert(section);
    }

    let join = |names: &BTreeSet<String>| names.iter().cloned().collect::<Vec<_>>().join(",");

    Ok(tallies
        .into_iter()
        .map(|(faculty_name, tally)| WorkloadReportRow {
            faculty_name,
            total_classes: tally.classes.len(),
            working_days: tally.days.len(),
            unique_subjects: tally.subjects.len(),
            unique_sections: tally.sections.len(),
            subjects_handled: join(&tally.subjects),
            sections_handled: join(&tally.sections),
        })
        .collect())
}

/// Writes report rows as CSV, with a header row taken from the report's column names.
pub fn write_csv<T: Serialize, W: io::Write>(rows: &[T], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
