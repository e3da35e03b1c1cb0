//! Imports a student roster.
//!
//! This binary reads the CSV roster at the path given as its only argument (or [`ROSTER_PATH`] if
//! none is given) and adds every listed student to the store. The roster needs `ht_number`, `name`,
//! and `section` columns, and may name each student's home section in an `original_section`
//! column.

use anyhow::Context;
use attendance::AttendanceManager;
use std::env;
use tracing_subscriber::EnvFilter;

/// The default path to the roster of students.
const ROSTER_PATH: &str = "roster.csv";

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args().nth(1).unwrap_or_else(|| ROSTER_PATH.to_string());

    let mut manager = AttendanceManager::connect()?;

    let before = manager.table_counts()?.students;
    let added = manager
        .import_students_from_path(&path)
        .with_context(|| format!("failed to import roster {path}"))?;

    println!("Students added: {added} ({} on file)", before as usize + added);

    Ok(())
}
