//! Creating, validating, and seeding the SQLite store.

use crate::catalog::original_section_name;
use crate::error::{AttendanceError, Result};
use crate::models::{NewFaculty, NewSection, NewSubject};
use crate::schema;
use crate::settings::Settings;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use std::fs;
use std::path::Path;
use tabled::Tabled;
use tracing::{debug, info, warn};

/// The full schema. Every statement is idempotent so it runs on every open.
const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS faculty (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    credential TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS sections (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    is_original BOOLEAN NOT NULL DEFAULT 0,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS subjects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    program TEXT NOT NULL,
    year TEXT NOT NULL,
    branch TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY,
    ht_number TEXT UNIQUE NOT NULL,
    name TEXT NOT NULL,
    manipulated_section_id INTEGER NOT NULL REFERENCES sections(id),
    original_section_id INTEGER NOT NULL REFERENCES sections(id),
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS attendance (
    id INTEGER PRIMARY KEY,
    student_id INTEGER NOT NULL REFERENCES students(id),
    faculty_id INTEGER NOT NULL REFERENCES faculty(id),
    subject_id INTEGER NOT NULL REFERENCES subjects(id),
    section_id INTEGER NOT NULL REFERENCES sections(id),
    date DATE NOT NULL,
    time TIME NOT NULL,
    period TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('P', 'A')),
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (student_id, date, period)
);

CREATE TABLE IF NOT EXISTS faculty_workload (
    id INTEGER PRIMARY KEY,
    faculty_id INTEGER NOT NULL REFERENCES faculty(id),
    section_id INTEGER NOT NULL REFERENCES sections(id),
    subject_id INTEGER NOT NULL REFERENCES subjects(id),
    date DATE NOT NULL,
    time TIME NOT NULL,
    period TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Row counts for every table in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Tabled)]
pub struct TableCounts {
    pub faculty: i64,
    pub sections: i64,
    pub subjects: i64,
    pub students: i64,
    pub attendance: i64,
    pub faculty_workload: i64,
}

/// Opens a connection with foreign key enforcement turned on.
pub(crate) fn establish(database_url: &str) -> Result<SqliteConnection> {
    let mut conn = SqliteConnection::establish(database_url)?;
    conn.batch_execute("PRAGMA foreign_keys = ON;")?;

    Ok(conn)
}

/// Opens the store at `settings.database_url`, creating the schema and seeding the catalog rows
/// if this is the first run.
///
/// On failure the store file is deleted so that the next attempt starts from a clean slate.
pub(crate) fn open(settings: &Settings) -> Result<SqliteConnection> {
    let database_url = settings.database_url.as_str();

    match try_open(settings) {
        Ok(conn) => Ok(conn),
        Err(err) => {
            // The failed connection has been dropped by now, so the file is free to delete.
            if is_file_backed(database_url) && Path::new(database_url).exists() {
                if let Err(remove_err) = fs::remove_file(database_url) {
                    warn!(%database_url, error = %remove_err, "could not remove failed store");
                }
            }

            Err(AttendanceError::Initialization(err.to_string()))
        }
    }
}

fn try_open(settings: &Settings) -> Result<SqliteConnection> {
    let database_url = settings.database_url.as_str();

    if is_file_backed(database_url)
        && Path::new(database_url).exists()
        && !is_readable_database(database_url)
    {
        warn!(%database_url, "store is not a valid database, recreating it");
        fs::remove_file(database_url)?;
    }

    let mut conn = create(database_url)?;

    if let Err(err) = verify_schema(&mut conn) {
        if !is_file_backed(database_url) {
            return Err(err.into());
        }

        warn!(%database_url, error = %err, "store has an incompatible schema, recreating it");
        drop(conn);
        fs::remove_file(database_url)?;
        conn = create(database_url)?;
    }

    seed(&mut conn, settings)?;

    Ok(conn)
}

fn create(database_url: &str) -> Result<SqliteConnection> {
    let mut conn = establish(database_url)?;
    conn.batch_execute(CREATE_TABLES)?;

    Ok(conn)
}

/// Selects every column `schema.rs` knows about from each table, so a store left behind by an
/// older layout fails here instead of on first use.
fn verify_schema(conn: &mut SqliteConnection) -> QueryResult<()> {
    schema::faculty::table.limit(0).execute(conn)?;
    schema::sections::table.limit(0).execute(conn)?;
    schema::subjects::table.limit(0).execute(conn)?;
    schema::students::table.limit(0).execute(conn)?;
    schema::attendance::table.limit(0).execute(conn)?;
    schema::faculty_workload::table.limit(0).execute(conn)?;

    Ok(())
}

/// In-memory and URI-style databases have no file for us to manage.
fn is_file_backed(database_url: &str) -> bool {
    database_url != ":memory:" && !database_url.starts_with("file:")
}

fn is_readable_database(database_url: &str) -> bool {
    establish(database_url)
        .and_then(|mut conn| {
            conn.batch_execute("SELECT count(*) FROM sqlite_master;")?;
            Ok(())
        })
        .is_ok()
}

/// Whether any of the tables filled by [`seed`] already has rows.
fn is_seeded(conn: &mut SqliteConnection) -> QueryResult<bool> {
    let faculty: i64 = schema::faculty::table.count().get_result(conn)?;
    let sections: i64 = schema::sections::table.count().get_result(conn)?;
    let subjects: i64 = schema::subjects::table.count().get_result(conn)?;

    debug!(faculty, sections, subjects, "existing catalog rows");
    Ok(faculty + sections + subjects > 0)
}

/// Inserts the faculty, subject, and section rows derived from the settings, unless the store has
/// already been seeded.
///
/// Returns whether any rows were inserted.
fn seed(conn: &mut SqliteConnection, settings: &Settings) -> Result<bool> {
    conn.transaction(|conn| {
        if is_seeded(conn)? {
            debug!("store already seeded");
            return Ok(false);
        }

        let faculty: Vec<NewFaculty> = settings
            .faculty
            .iter()
            .map(|credential| NewFaculty {
                name: &credential.username,
                credential: &credential.password,
            })
            .collect();

        diesel::insert_into(schema::faculty::table)
            .values(&faculty)
            .execute(conn)?;

        let catalog = &settings.catalog;

        let subjects: Vec<NewSubject> = catalog
            .combinations()
            .flat_map(|(program, year, branch)| {
                catalog
                    .subjects_for(program, year, branch)
                    .iter()
                    .map(move |name| NewSubject {
                        name,
                        program,
                        year,
                        branch,
                    })
            })
            .collect();

        diesel::insert_into(schema::subjects::table)
            .values(&subjects)
            .execute(conn)?;

        // Each physical section gets a manipulated row and an original row.
        let names: Vec<(String, String)> = catalog
            .sections()
            .map(|placement| {
                let name = placement.name();
                let original = original_section_name(&name);
                (name, original)
            })
            .collect();

        let sections: Vec<NewSection> = names
            .iter()
            .flat_map(|(name, original)| {
                [
                    NewSection {
                        name,
                        is_original: false,
                    },
                    NewSection {
                        name: original,
                        is_original: true,
                    },
                ]
            })
            .collect();

        diesel::insert_into(schema::sections::table)
            .values(&sections)
            .execute(conn)?;

        info!(
            faculty = faculty.len(),
            subjects = subjects.len(),
            sections = sections.len(),
            "seeded attendance store"
        );

        Ok(true)
    })
}

/// Counts the rows in every table.
pub(crate) fn table_counts(conn: &mut SqliteConnection) -> QueryResult<TableCounts> {
    Ok(TableCounts {
        faculty: schema::faculty::table.count().get_result(conn)?,
        sections: schema::sections::table.count().get_result(conn)?,
        subjects: schema::subjects::table.count().get_result(conn)?,
        students: schema::students::table.count().get_result(conn)?,
        attendance: schema::attendance::table.count().get_result(conn)?,
        faculty_workload: schema::faculty_workload::table.count().get_result(conn)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_in(dir: &TempDir) -> Settings {
        Settings {
            database_url: dir.path().join("attendance.db").display().to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn seeds_catalog_rows_once() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);

        let mut conn = open(&settings).unwrap();
        let first = table_counts(&mut conn).unwrap();
        drop(conn);

        assert_eq!(first.faculty, 3);
        // 39 physical sections, each stored twice.
        assert_eq!(first.sections, 78);
        assert_eq!(first.subjects, 8);
        assert_eq!(first.students, 0);

        let mut conn = open(&settings).unwrap();
        assert_eq!(table_counts(&mut conn).unwrap(), first);
    }

    #[test]
    fn recreates_a_corrupt_store() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        fs::write(&settings.database_url, b"this is not a sqlite database at all").unwrap();

        let mut conn = open(&settings).unwrap();
        assert_eq!(table_counts(&mut conn).unwrap().faculty, 3);
    }

    #[test]
    fn reopens_a_store_seeded_without_faculty() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            faculty: vec![],
            ..settings_in(&dir)
        };

        let mut conn = open(&settings).unwrap();
        conn.batch_execute(
            "INSERT INTO students (ht_number, name, manipulated_section_id, original_section_id)
             SELECT '21CSE001', 'Asha Rao', manip.id, orig.id
             FROM sections manip, sections orig
             WHERE manip.name = 'B.Tech-I-CSE-A' AND orig.name = '(O)B.Tech-I-CSE-A';",
        )
        .unwrap();
        let first = table_counts(&mut conn).unwrap();
        drop(conn);

        assert_eq!(first.faculty, 0);
        assert_eq!(first.sections, 78);
        assert_eq!(first.students, 1);

        let mut conn = open(&settings).unwrap();
        assert_eq!(table_counts(&mut conn).unwrap(), first);
    }

    #[test]
    fn recreates_a_store_with_an_outdated_schema() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);

        let mut legacy = establish(&settings.database_url).unwrap();
        legacy
            .batch_execute(
                "CREATE TABLE faculty (
                     id INTEGER PRIMARY KEY,
                     name TEXT UNIQUE NOT NULL,
                     password TEXT NOT NULL
                 );
                 CREATE TABLE sections (id INTEGER PRIMARY KEY, name TEXT UNIQUE NOT NULL);
                 CREATE TABLE students (
                     id INTEGER PRIMARY KEY,
                     ht_number TEXT UNIQUE NOT NULL,
                     name TEXT NOT NULL,
                     section_id INTEGER NOT NULL REFERENCES sections(id)
                 );
                 INSERT INTO faculty (name, password) VALUES ('legacy', 'secret');",
            )
            .unwrap();
        drop(legacy);

        let mut conn = open(&settings).unwrap();

        assert_eq!(table_counts(&mut conn).unwrap().faculty, 3);
        assert_eq!(crate::roster::manipulated_sections(&mut conn).unwrap().len(), 39);
        assert!(
            crate::roster::students_in_section(&mut conn, "B.Tech-I-CSE-A")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn removes_the_store_when_seeding_fails() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        // Faculty names are unique, so this seed cannot be inserted.
        settings.faculty.push(settings.faculty[0].clone());

        let err = open(&settings).err().expect("open should fail");

        assert!(matches!(err, AttendanceError::Initialization(_)));
        assert!(!Path::new(&settings.database_url).exists());
    }
}
