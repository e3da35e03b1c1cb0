use crate::schema::{attendance, faculty, faculty_workload, sections, students, subjects};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = faculty)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Faculty {
    pub id: i32,
    pub name: String,
    pub credential: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = faculty)]
pub struct NewFaculty<'a> {
    pub name: &'a str,
    pub credential: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = sections)]
pub struct NewSection<'a> {
    pub name: &'a str,
    pub is_original: bool,
}

#[derive(Insertable)]
#[diesel(table_name = subjects)]
pub struct NewSubject<'a> {
    pub name: &'a str,
    pub program: &'a str,
    pub year: &'a str,
    pub branch: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Student {
    pub id: i32,
    pub ht_number: String,
    pub name: String,
    pub manipulated_section_id: i32,
    pub original_section_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = students)]
pub struct NewStudent<'a> {
    pub ht_number: &'a str,
    pub name: &'a str,
    pub manipulated_section_id: i32,
    pub original_section_id: i32,
}

/// A student as listed for a manipulated section, alongside their original section.
#[derive(Debug, Clone, PartialEq, Eq, QueryableByName, Serialize, Tabled)]
pub struct SectionStudent {
    #[diesel(sql_type = Text)]
    #[serde(rename = "HT Number")]
    #[tabled(rename = "HT Number")]
    pub ht_number: String,
    #[diesel(sql_type = Text)]
    #[serde(rename = "Student Name")]
    #[tabled(rename = "Student Name")]
    pub name: String,
    #[diesel(sql_type = Text)]
    #[serde(rename = "Original Section")]
    #[tabled(rename = "Original Section")]
    pub original_section: String,
}

/// One row of a student roster upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudentRecord {
    pub ht_number: String,
    pub name: String,
    /// The manipulated section the student attends.
    pub section: String,
    /// The student's home section. Defaults to the original counterpart of `section`.
    #[serde(default)]
    pub original_section: Option<String>,
}

/// Whether a student attended a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum Status {
    Present,
    Absent,
}

impl Status {
    pub fn from_present(present: bool) -> Self {
        if present {
            Status::Present
        } else {
            Status::Absent
        }
    }

    /// The single-letter code stored in the database.
    pub fn code(self) -> &'static str {
        match self {
            Status::Present => "P",
            Status::Absent => "A",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl ToSql<Text, Sqlite> for Status {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.code());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for Status {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        match <String as FromSql<Text, Sqlite>>::from_sql(bytes)?.as_str() {
            "P" => Ok(Status::Present),
            "A" => Ok(Status::Absent),
            other => Err(format!("unrecognized attendance status '{other}'").into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = attendance)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Attendance {
    pub id: i32,
    pub student_id: i32,
    pub faculty_id: i32,
    pub subject_id: i32,
    pub section_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub period: String,
    pub status: Status,
}

#[derive(Insertable)]
#[diesel(table_name = attendance)]
pub struct NewAttendance<'a> {
    pub student_id: i32,
    pub faculty_id: i32,
    pub subject_id: i32,
    pub section_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub period: &'a str,
    pub status: Status,
}

#[derive(Insertable)]
#[diesel(table_name = faculty_workload)]
pub struct NewWorkload<'a> {
    pub faculty_id: i32,
    pub section_id: i32,
    pub subject_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub period: &'a str,
}
