//! Looking up sections, students, and faculty, and importing student rosters.

use crate::catalog::original_section_name;
use crate::error::{AttendanceError, Result};
use crate::models::{NewStudent, SectionStudent, StudentRecord};
use crate::schema::{faculty, sections, students};
use diesel::prelude::*;
use diesel::sql_types::Text;
use std::io;
use tracing::info;

/// Returns the names of every faculty member, sorted.
pub(crate) fn faculty_names(conn: &mut SqliteConnection) -> QueryResult<Vec<String>> {
    faculty::table
        .select(faculty::name)
        .order(faculty::name)
        .load(conn)
}

/// Returns the names of the manipulated sections attendance can be taken for, sorted.
pub(crate) fn manipulated_sections(conn: &mut SqliteConnection) -> QueryResult<Vec<String>> {
    sections::table
        .filter(sections::is_original.eq(false))
        .select(sections::name)
        .order(sections::name)
        .load(conn)
}

/// Returns the students attending a manipulated section, ordered by HT number.
pub(crate) fn students_in_section(
    conn: &mut SqliteConnection,
    section: &str,
) -> QueryResult<Vec<SectionStudent>> {
    diesel::sql_query(
        "SELECT s.ht_number AS ht_number, s.name AS name, orig.name AS original_section
         FROM students s
         JOIN sections manip ON s.manipulated_section_id = manip.id
         JOIN sections orig ON s.original_section_id = orig.id
         WHERE manip.name = ?
         ORDER BY s.ht_number",
    )
    .bind::<Text, _>(section)
    .load(conn)
}

fn section_id(conn: &mut SqliteConnection, name: &str, is_original: bool) -> Result<i32> {
    sections::table
        .filter(sections::name.eq(name))
        .filter(sections::is_original.eq(is_original))
        .select(sections::id)
        .first(conn)
        .optional()?
        .ok_or_else(|| AttendanceError::lookup("section", name))
}

/// Inserts the students listed in a CSV roster with `ht_number`, `name`, and `section` columns and
/// an optional `original_section` column.
///
/// The whole roster is inserted in one transaction: an unknown section or an HT number that is
/// already on file rejects all of it. Returns the number of students added.
pub(crate) fn import_students<R: io::Read>(conn: &mut SqliteConnection, reader: R) -> Result<usize> {
    let mut reader = csv::Reader::from_reader(reader);
    let records = reader
        .deserialize()
        .collect::<Result<Vec<StudentRecord>, csv::Error>>()?;

    conn.transaction(|conn| {
        for record in &records {
            let original = record
                .original_section
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| original_section_name(&record.section));

            let student = NewStudent {
                ht_number: &record.ht_number,
                name: &record.name,
                manipulated_section_id: section_id(conn, &record.section, false)?,
                original_section_id: section_id(conn, &original, true)?,
            };

            diesel::insert_into(students::table)
                .values(&student)
                .execute(conn)?;
        }

        info!(students = records.len(), "imported student roster");

        Ok(records.len())
    })
}
