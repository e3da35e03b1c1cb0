//! Recording per-period attendance for a batch of students.

use crate::error::{AttendanceError, Result};
use crate::models::{NewAttendance, NewWorkload, Status};
use crate::schema::{attendance, faculty, faculty_workload, students, subjects};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use diesel::sql_types::{Date, Text, Time};
use tracing::{info, warn};

/// One student's attendance for one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub ht_number: String,
    pub subject: String,
    pub period: String,
    pub present: bool,
}

/// What happened when a batch of attendance was recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkOutcome {
    /// Number of students marked present.
    pub present: usize,
    /// Number of students marked absent.
    pub absent: usize,
    /// HT numbers that did not match any student and were left out.
    pub skipped: Vec<String>,
}

impl MarkOutcome {
    pub fn recorded(&self) -> usize {
        self.present + self.absent
    }

    /// Whether every entry in the batch was recorded.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A faculty member's attendance submission for one section, subject, and period.
///
/// Every student in the section is marked present unless their HT number is listed in `absent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceRequest {
    pub faculty: String,
    pub section: String,
    pub subject: String,
    pub period: String,
    pub absent: Vec<String>,
}

impl AttendanceRequest {
    /// Rejects requests with a missing selection.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("faculty", &self.faculty),
            ("section", &self.section),
            ("subject", &self.subject),
            ("period", &self.period),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AttendanceError::Validation(format!(
                "please select {} to proceed",
                missing.join(", ")
            )))
        }
    }
}

#[derive(QueryableByName)]
struct ExistingMark {
    #[diesel(sql_type = Text)]
    faculty_name: String,
    #[diesel(sql_type = Text)]
    subject_name: String,
    #[diesel(sql_type = Time)]
    marked_at: NaiveTime,
}

/// Looks for attendance already taken on `date` during `period` for any student whose manipulated
/// or original section is `section`.
///
/// Returns a message naming who marked it, for which subject, and when. This is only a hint for
/// the user: the unique constraint on `(student_id, date, period)` is what actually prevents
/// double marking.
pub(crate) fn check_duplicate_attendance(
    conn: &mut SqliteConnection,
    section: &str,
    period: &str,
    date: NaiveDate,
) -> QueryResult<Option<String>> {
    let existing = diesel::sql_query(
        "SELECT f.name AS faculty_name, sub.name AS subject_name, a.time AS marked_at
         FROM attendance a
         JOIN students s ON a.student_id = s.id
         JOIN sections manip ON s.manipulated_section_id = manip.id
         JOIN sections orig ON s.original_section_id = orig.id
         JOIN faculty f ON a.faculty_id = f.id
         JOIN subjects sub ON a.subject_id = sub.id
         WHERE (manip.name = ? OR orig.name = ?) AND a.period = ? AND a.date = ?
         ORDER BY a.id
         LIMIT 1",
    )
    .bind::<Text, _>(section)
    .bind::<Text, _>(section)
    .bind::<Text, _>(period)
    .bind::<Date, _>(date)
    .get_result::<ExistingMark>(conn)
    .optional()?;

    Ok(existing.map(|mark| {
        format!(
            "Attendance already marked by {} for {} at {}",
            mark.faculty_name,
            mark.subject_name,
            mark.marked_at.format("%H:%M:%S")
        )
    }))
}

fn faculty_id(conn: &mut SqliteConnection, name: &str) -> Result<i32> {
    faculty::table
        .filter(faculty::name.eq(name))
        .select(faculty::id)
        .first(conn)
        .optional()?
        .ok_or_else(|| AttendanceError::lookup("faculty", name))
}

fn subject_id(conn: &mut SqliteConnection, name: &str) -> Result<i32> {
    subjects::table
        .filter(subjects::name.eq(name))
        .select(subjects::id)
        .order(subjects::id)
        .first(conn)
        .optional()?
        .ok_or_else(|| AttendanceError::lookup("subject", name))
}

/// Inserts an attendance row and a workload row for every entry, stamped with `now`, in a single
/// transaction.
///
/// Entries whose HT number matches no student are left out and reported in
/// [`MarkOutcome::skipped`]. An unknown faculty member or subject, or any failed insert, rolls
/// back the whole batch.
pub(crate) fn mark_attendance(
    conn: &mut SqliteConnection,
    entries: &[AttendanceEntry],
    faculty_name: &str,
    now: NaiveDateTime,
) -> Result<MarkOutcome> {
    let date = now.date();
    let time = now.time();

    let outcome = conn.transaction(|conn| {
        let faculty_id = faculty_id(conn, faculty_name)?;
        let mut outcome = MarkOutcome::default();

        for entry in entries {
            let student = students::table
                .filter(students::ht_number.eq(&entry.ht_number))
                .select((students::id, students::original_section_id))
                .first::<(i32, i32)>(conn)
                .optional()?;

            let Some((student_id, section_id)) = student else {
                warn!(ht_number = %entry.ht_number, "no such student, skipping attendance entry");
                outcome.skipped.push(entry.ht_number.clone());
                continue;
            };

            let subject_id = subject_id(conn, &entry.subject)?;
            let status = Status::from_present(entry.present);

            diesel::insert_into(attendance::table)
                .values(&NewAttendance {
                    student_id,
                    faculty_id,
                    subject_id,
                    section_id,
                    date,
                    time,
                    period: &entry.period,
                    status,
                })
                .execute(conn)?;

            diesel::insert_into(faculty_workload::table)
                .values(&NewWorkload {
                    faculty_id,
                    section_id,
                    subject_id,
                    date,
                    time,
                    period: &entry.period,
                })
                .execute(conn)?;

            match status {
                Status::Present => outcome.present += 1,
                Status::Absent => outcome.absent += 1,
            }
        }

        Ok::<_, AttendanceError>(outcome)
    })?;

    info!(
        faculty = faculty_name,
        present = outcome.present,
        absent = outcome.absent,
        skipped = outcome.skipped.len(),
        "recorded attendance"
    );

    Ok(outcome)
}
