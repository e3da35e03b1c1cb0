use crate::auth::{self, Role};
use crate::error::{AttendanceError, Result};
use crate::models::{Attendance, Faculty, SectionStudent, Student};
use crate::recorder::{self, AttendanceEntry, AttendanceRequest, MarkOutcome};
use crate::report::{self, DateRange, StudentReportRow, WorkloadReportRow};
use crate::settings::{PeriodSchedule, Settings};
use crate::store::{self, TableCounts};
use crate::{roster, schema};
use chrono::{Local, NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::result::QueryResult;
use std::fs::File;
use std::io;
use std::path::Path;

/// The manager for recording and reporting on attendance data.
pub struct AttendanceManager {
    db: SqliteConnection,
    settings: Settings,
    schedule: PeriodSchedule,
}

impl AttendanceManager {
    /// Loads [`Settings`] from `config.toml` and the environment, then opens the store they name.
    pub fn connect() -> Result<Self> {
        Self::open(Settings::load()?)
    }

    /// Opens the store at `settings.database_url`, creating and seeding it on first use.
    ///
    /// A store file that is not a valid database is discarded and recreated. If initialization
    /// fails, the store file is removed and [`AttendanceError::Initialization`] is returned.
    pub fn open(settings: Settings) -> Result<Self> {
        let schedule = settings.period_schedule()?;
        let db = store::open(&settings)?;

        Ok(Self {
            db,
            settings,
            schedule,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn schedule(&self) -> &PeriodSchedule {
        &self.schedule
    }

    /// Returns the number of rows in each table.
    pub fn table_counts(&mut self) -> QueryResult<TableCounts> {
        store::table_counts(&mut self.db)
    }

    /// Checks a username and password for the given [`Role`].
    pub fn check_credentials(
        &mut self,
        username: &str,
        password: &str,
        role: Role,
    ) -> QueryResult<bool> {
        auth::check_credentials(&mut self.db, &self.settings, username, password, role)
    }

    /// Retrieves every faculty member, ordered by name.
    pub fn get_faculty(&mut self) -> QueryResult<Vec<Faculty>> {
        use schema::faculty::dsl::*;

        faculty.select(Faculty::as_select()).order(name).load(&mut self.db)
    }

    /// Retrieves the names of every faculty member, sorted.
    pub fn get_faculty_names(&mut self) -> QueryResult<Vec<String>> {
        roster::faculty_names(&mut self.db)
    }

    /// Retrieves the names of the sections attendance can be taken for.
    pub fn get_sections(&mut self) -> QueryResult<Vec<String>> {
        roster::manipulated_sections(&mut self.db)
    }

    /// Returns the subjects taught to a section, according to the catalog.
    pub fn get_subjects(&self, section: &str) -> &[String] {
        self.settings.catalog.subjects_for_section(section)
    }

    /// Retrieves the students attending a section, ordered by HT number.
    pub fn get_students(&mut self, section: &str) -> QueryResult<Vec<SectionStudent>> {
        roster::students_in_section(&mut self.db, section)
    }

    /// Retrieves a student given their HT number.
    pub fn get_student(&mut self, ht: &str) -> QueryResult<Option<Student>> {
        use schema::students::dsl::*;

        students
            .filter(ht_number.eq(ht))
            .select(Student::as_select())
            .first(&mut self.db)
            .optional()
    }

    /// Retrieves every attendance record taken on `day`.
    pub fn get_attendance_on(&mut self, day: NaiveDate) -> QueryResult<Vec<Attendance>> {
        use schema::attendance::dsl::*;

        attendance
            .filter(date.eq(day))
            .select(Attendance::as_select())
            .order(id)
            .load(&mut self.db)
    }

    /// Inserts the students listed in a CSV roster. See [`Self::import_students_from_path`].
    pub fn import_students<R: io::Read>(&mut self, reader: R) -> Result<usize> {
        roster::import_students(&mut self.db, reader)
    }

    /// Inserts the students listed in the CSV roster at `path`.
    ///
    /// The roster has `ht_number`, `name`, and `section` columns, where `section` is the section
    /// the student attends. An optional `original_section` column names their home section, which
    /// otherwise defaults to the original counterpart of `section`. Either every student is added
    /// or none are.
    pub fn import_students_from_path(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let file = File::open(path)?;
        self.import_students(file)
    }

    /// Looks for attendance already taken for `section` during `period` on `date`, returning a
    /// message describing the existing record.
    pub fn check_duplicate_attendance(
        &mut self,
        section: &str,
        period: &str,
        date: NaiveDate,
    ) -> QueryResult<Option<String>> {
        recorder::check_duplicate_attendance(&mut self.db, section, period, date)
    }

    /// Records a batch of attendance entries on behalf of `faculty`, stamped with the current local
    /// time.
    ///
    /// Either every resolvable entry is recorded or none are. Entries for unknown students are
    /// skipped and listed in the returned [`MarkOutcome`].
    pub fn mark_attendance(
        &mut self,
        entries: &[AttendanceEntry],
        faculty: &str,
    ) -> Result<MarkOutcome> {
        self.mark_attendance_at(entries, faculty, Local::now().naive_local())
    }

    /// Same as [`Self::mark_attendance`], stamped with `now`.
    pub fn mark_attendance_at(
        &mut self,
        entries: &[AttendanceEntry],
        faculty: &str,
        now: NaiveDateTime,
    ) -> Result<MarkOutcome> {
        recorder::mark_attendance(&mut self.db, entries, faculty, now)
    }

    /// Takes attendance for a whole section at `now`.
    ///
    /// The request is rejected if a selection is missing, the subject is not taught to the
    /// section, the period is not in session at `now`, attendance for the section and period has
    /// already been taken today, or the section has no students.
    pub fn submit_attendance(
        &mut self,
        request: &AttendanceRequest,
        now: NaiveDateTime,
    ) -> Result<MarkOutcome> {
        request.validate()?;

        if !self.get_subjects(&request.section).contains(&request.subject) {
            return Err(AttendanceError::Validation(format!(
                "{} is not taught to {}",
                request.subject, request.section
            )));
        }

        if !self.schedule.is_active(&request.period, now.time()) {
            return Err(AttendanceError::Validation(format!(
                "period {} is not currently active",
                request.period
            )));
        }

        if let Some(message) =
            self.check_duplicate_attendance(&request.section, &request.period, now.date())?
        {
            return Err(AttendanceError::DuplicateEntry(message));
        }

        let students = self.get_students(&request.section)?;
        if students.is_empty() {
            return Err(AttendanceError::Validation(format!(
                "no students found in {}",
                request.section
            )));
        }

        if let Some(unknown) = request
            .absent
            .iter()
            .find(|ht| !students.iter().any(|student| &student.ht_number == *ht))
        {
            return Err(AttendanceError::Validation(format!(
                "{unknown} is not a student of {}",
                request.section
            )));
        }

        let entries: Vec<AttendanceEntry> = students
            .into_iter()
            .map(|student| AttendanceEntry {
                present: !request.absent.contains(&student.ht_number),
                ht_number: student.ht_number,
                subject: request.subject.clone(),
                period: request.period.clone(),
            })
            .collect();

        self.mark_attendance_at(&entries, &request.faculty, now)
    }

    /// Builds the per-student, per-subject attendance report for students attending any of
    /// `sections` between `from` and `to` (inclusive, `YYYY-MM-DD`).
    pub fn student_attendance_report(
        &mut self,
        sections: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<StudentReportRow>> {
        let range = DateRange::parse(from, to)?;
        Ok(report::student_attendance_report(
            &mut self.db,
            sections,
            range,
        )?)
    }

    /// Builds the workload report for the named faculty between `from` and `to` (inclusive,
    /// `YYYY-MM-DD`).
    pub fn faculty_workload_report(
        &mut self,
        faculty: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<WorkloadReportRow>> {
        let range = DateRange::parse(from, to)?;
        Ok(report::faculty_workload_report(
            &mut self.db,
            faculty,
            range,
        )?)
    }
}
