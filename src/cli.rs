//! This module contains the command-line interface [`Cli`] parser for taking attendance and
//! generating reports.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::Role;

/// The command line configuration struct, where the command-line interface parser is automatically
/// derived by [`clap::Parser`].
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// The different commands available for taking attendance and generating reports.
    #[command(subcommand)]
    pub command: Command,
}

/// Credentials supplied with a command that needs them.
#[derive(Args, Debug, Clone)]
#[group(skip)]
pub struct Login {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create and seed the attendance store if needed, then show its row counts.
    Init,

    /// Check a username and password.
    Login {
        #[arg(long, value_enum, default_value_t = Role::Faculty)]
        role: Role,

        #[command(flatten)]
        login: Login,
    },

    /// List the sections attendance can be taken for.
    Sections,

    /// List the subjects taught to a section.
    Subjects { section: String },

    /// List the students attending a section.
    Students {
        section: String,

        /// Also write the list to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// List the faculty.
    Faculty,

    /// Show the period timings.
    Periods,

    /// Take attendance for a section during the current period. Students not listed as absent are
    /// marked present.
    Mark {
        #[command(flatten)]
        login: Login,

        #[arg(long)]
        section: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        period: String,

        /// Comma-separated HT numbers of absent students.
        #[arg(long, value_delimiter = ',')]
        absent: Vec<String>,
    },

    /// Generate an attendance or workload report (admin only).
    Report {
        #[command(flatten)]
        login: Login,

        #[command(subcommand)]
        report: ReportCommand,
    },

    /// Import students from a CSV roster (admin only).
    Import {
        #[command(flatten)]
        login: Login,

        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Per-student, per-subject attendance for the given sections.
    Students {
        /// First day of the report, as YYYY-MM-DD.
        #[arg(long)]
        from: String,

        /// Last day of the report, as YYYY-MM-DD.
        #[arg(long)]
        to: String,

        /// Comma-separated section names.
        #[arg(long, value_delimiter = ',', required = true)]
        sections: Vec<String>,

        /// Also write the report to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Classes, days, subjects, and sections handled by the given faculty.
    Workload {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Comma-separated faculty names.
        #[arg(long, value_delimiter = ',', required = true)]
        faculty: Vec<String>,

        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_mark() {
        let cli = Cli::parse_from([
            "attendance",
            "mark",
            "-u",
            "faculty1",
            "-p",
            "pass1",
            "--section",
            "B.Tech-I-CSE-A",
            "--subject",
            "Python",
            "--period",
            "P1",
            "--absent",
            "21A,21C",
        ]);

        match cli.command {
            Command::Mark { login, absent, .. } => {
                assert_eq!(login.username, "faculty1");
                assert_eq!(absent, ["21A", "21C"]);
            }
            other => panic!("parsed the wrong command: {other:?}"),
        }
    }

    #[test]
    fn parses_student_export() {
        let cli = Cli::parse_from([
            "attendance",
            "students",
            "B.Tech-I-CSE-A",
            "--csv",
            "students.csv",
        ]);

        match cli.command {
            Command::Students { section, csv } => {
                assert_eq!(section, "B.Tech-I-CSE-A");
                assert_eq!(csv, Some(PathBuf::from("students.csv")));
            }
            other => panic!("parsed the wrong command: {other:?}"),
        }
    }

    #[test]
    fn parses_workload_report() {
        let cli = Cli::parse_from([
            "attendance",
            "report",
            "-u",
            "admin",
            "-p",
            "admin123",
            "workload",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
            "--faculty",
            "faculty1,faculty2",
        ]);

        match cli.command {
            Command::Report {
                report: ReportCommand::Workload { faculty, csv, .. },
                ..
            } => {
                assert_eq!(faculty, ["faculty1", "faculty2"]);
                assert!(csv.is_none());
            }
            other => panic!("parsed the wrong command: {other:?}"),
        }
    }
}
