#![allow(dead_code)]

use attendance::{AttendanceEntry, AttendanceManager, Settings};
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

pub const SECTION: &str = "B.Tech-I-CSE-A";

pub const ROSTER: &str = "\
ht_number,name,section,original_section
21CSE001,Asha Rao,B.Tech-I-CSE-A,
21CSE002,Bilal Khan,B.Tech-I-CSE-A,
21CSE003,Chen Li,B.Tech-I-CSE-A,
21CSE101,Dara Singh,B.Tech-I-CSE-B,
";

pub const STUDENTS: [&str; 3] = ["21CSE001", "21CSE002", "21CSE003"];

/// A store in a scratch directory. The directory is deleted when this is dropped.
pub struct Fixture {
    pub manager: AttendanceManager,
    pub dir: TempDir,
}

pub fn settings_in(dir: &TempDir) -> Settings {
    Settings {
        database_url: dir.path().join("attendance.db").display().to_string(),
        ..Settings::default()
    }
}

/// Opens a freshly seeded store with [`ROSTER`] imported.
pub fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let mut manager = AttendanceManager::open(settings_in(&dir)).unwrap();
    manager.import_students(ROSTER.as_bytes()).unwrap();

    Fixture { manager, dir }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

pub fn at(d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    day(d).and_hms_opt(hour, minute, 0).unwrap()
}

/// Builds entries for [`STUDENTS`] with the given present flags.
pub fn entries(subject: &str, period: &str, present: [bool; 3]) -> Vec<AttendanceEntry> {
    STUDENTS
        .iter()
        .zip(present)
        .map(|(ht_number, present)| AttendanceEntry {
            ht_number: ht_number.to_string(),
            subject: subject.to_string(),
            period: period.to_string(),
            present,
        })
        .collect()
}
