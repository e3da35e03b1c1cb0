//! Per-period classroom attendance for faculty, with attendance and workload reports for
//! administrators, backed by SQLite.

pub mod auth;
pub mod catalog;
pub mod cli;
pub mod display;
pub mod error;
pub mod manager;
pub mod models;
pub mod recorder;
pub mod report;
pub mod roster;
pub mod schema;
pub mod settings;
pub mod store;

pub use crate::auth::Role;
pub use crate::error::{AttendanceError, Result};
pub use crate::manager::AttendanceManager;
pub use crate::recorder::{AttendanceEntry, AttendanceRequest, MarkOutcome};
pub use crate::report::{
    DateRange, ReportSummary, StudentReportRow, WorkloadReportRow, validate_date_range, write_csv,
};
pub use crate::settings::Settings;
