use anyhow::{Context, bail};
use attendance::cli::{Cli, Command, Login, ReportCommand};
use attendance::{AttendanceManager, AttendanceRequest, Role, display, write_csv};
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut manager =
        AttendanceManager::connect().context("failed to initialize the attendance store")?;

    match cli.command {
        Command::Init => display::show_counts(manager.table_counts()?),
        Command::Login { role, login } => {
            authenticate(&mut manager, &login, role)?;
            println!("Logged in as {} ({role:?}).", login.username);
        }
        Command::Sections => display::show_sections(&mut manager)?,
        Command::Subjects { section } => {
            let subjects = manager.get_subjects(&section);
            if subjects.is_empty() {
                println!("No subjects are configured for '{section}'.");
            } else {
                println!("{}", subjects.join("\n"));
            }
        }
        Command::Students { section, csv } => {
            let students = manager.get_students(&section)?;
            if let Some(path) = csv {
                export(&students, &path)?;
            }
            display::show_students(&section, students);
        }
        Command::Faculty => display::show_faculty(&mut manager)?,
        Command::Periods => display::show_periods(&manager),
        Command::Mark {
            login,
            section,
            subject,
            period,
            absent,
        } => {
            authenticate(&mut manager, &login, Role::Faculty)?;

            let request = AttendanceRequest {
                faculty: login.username,
                section,
                subject,
                period,
                absent,
            };
            let outcome = manager.submit_attendance(&request, Local::now().naive_local())?;
            display::show_mark_outcome(&outcome);
        }
        Command::Report { login, report } => {
            authenticate(&mut manager, &login, Role::Admin)?;

            match report {
                ReportCommand::Students {
                    from,
                    to,
                    sections,
                    csv,
                } => {
                    let rows = manager.student_attendance_report(&sections, &from, &to)?;
                    if let Some(path) = csv {
                        export(&rows, &path)?;
                    }
                    display::show_student_report(rows);
                }
                ReportCommand::Workload {
                    from,
                    to,
                    faculty,
                    csv,
                } => {
                    let rows = manager.faculty_workload_report(&faculty, &from, &to)?;
                    if let Some(path) = csv {
                        export(&rows, &path)?;
                    }
                    display::show_workload_report(rows);
                }
            }
        }
        Command::Import { login, file } => {
            authenticate(&mut manager, &login, Role::Admin)?;

            let added = manager
                .import_students_from_path(&file)
                .with_context(|| format!("failed to import {}", file.display()))?;
            println!("Imported {added} students.");
        }
    }

    Ok(())
}

fn authenticate(manager: &mut AttendanceManager, login: &Login, role: Role) -> anyhow::Result<()> {
    if !manager.check_credentials(&login.username, &login.password, role)? {
        bail!("Invalid credentials");
    }

    Ok(())
}

fn export<T: Serialize>(rows: &[T], path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(rows, file)?;
    println!("Wrote {} rows to {}.", rows.len(), path.display());

    Ok(())
}
