//! Runtime configuration: the catalog, period timings, seeded credentials, and the database
//! location.
//!
//! Settings are layered from the built-in defaults, an optional `config.toml` in the working
//! directory, and `ATTENDANCE__*` environment variables (`.env` is honoured).

use crate::catalog::Catalog;
use crate::error::{AttendanceError, Result};
use chrono::NaiveTime;
use config::{Config, ConfigError, Environment, File, Source};
use serde::{Deserialize, Serialize};

/// Environment variables named `ATTENDANCE__<FIELD>` override the configuration files.
const ENV_PREFIX: &str = "ATTENDANCE";

/// The format period start and end times are written in.
const PERIOD_TIME_FORMAT: &str = "%H:%M";

/// A username and plaintext credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// A period code with its `HH:MM` start and end times, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTiming {
    pub code: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Path of the SQLite database file.
    pub database_url: String,
    pub admin_credentials: Vec<Credential>,
    /// Faculty rows inserted when the store is first created.
    pub faculty: Vec<Credential>,
    pub periods: Vec<PeriodTiming>,
    pub catalog: Catalog,
}

impl Default for Settings {
    fn default() -> Self {
        let period = |code: &str, start: &str, end: &str| PeriodTiming {
            code: code.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        };

        Self {
            database_url: "attendance.db".to_string(),
            admin_credentials: vec![Credential::new("admin", "admin123")],
            faculty: vec![
                Credential::new("faculty1", "pass1"),
                Credential::new("faculty2", "pass2"),
                Credential::new("faculty3", "pass3"),
            ],
            periods: vec![
                period("P1", "09:00", "10:00"),
                period("P2", "10:00", "11:00"),
                period("P3", "11:00", "12:00"),
                period("P4", "12:00", "13:00"),
                period("P5", "13:45", "14:45"),
                period("P6", "14:45", "16:00"),
            ],
            catalog: Catalog::default(),
        }
    }
}

impl Settings {
    /// Loads settings from the defaults, `config.toml`, and the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::layered(
            File::with_name("config").required(false),
            Environment::with_prefix(ENV_PREFIX).separator("__"),
        )
    }

    /// Layers `file` and then `env` over the defaults. A list set by a later layer replaces the
    /// earlier list rather than being merged into it.
    fn layered<F, E>(file: F, env: E) -> Result<Self>
    where
        F: Source + Send + Sync + 'static,
        E: Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(env)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Returns the admin password for `username`, if it is a configured admin.
    pub fn admin_password(&self, username: &str) -> Option<&str> {
        self.admin_credentials
            .iter()
            .find(|credential| credential.username == username)
            .map(|credential| credential.password.as_str())
    }

    /// Parses the configured period timings.
    pub fn period_schedule(&self) -> Result<PeriodSchedule> {
        let parse = |code: &str, value: &str| {
            NaiveTime::parse_from_str(value, PERIOD_TIME_FORMAT).map_err(|err| {
                AttendanceError::Config(ConfigError::Message(format!(
                    "period {code} has an invalid time '{value}': {err}"
                )))
            })
        };

        let periods = self
            .periods
            .iter()
            .map(|timing| -> Result<Period> {
                Ok(Period {
                    code: timing.code.clone(),
                    start: parse(&timing.code, &timing.start)?,
                    end: parse(&timing.code, &timing.end)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PeriodSchedule { periods })
    }
}

/// A classroom time slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub code: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Period {
    /// Whether `time` falls within this period, inclusive of both ends.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

/// The parsed set of periods a day is divided into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSchedule {
    periods: Vec<Period>,
}

impl PeriodSchedule {
    pub fn get(&self, code: &str) -> Option<&Period> {
        self.periods.iter().find(|period| period.code == code)
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Whether the period `code` is in session at `now`. Unknown periods are never active.
    pub fn is_active(&self, code: &str, now: NaiveTime) -> bool {
        self.get(code).is_some_and(|period| period.contains(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn period_window_is_inclusive() {
        let schedule = Settings::default().period_schedule().unwrap();

        assert!(schedule.is_active("P1", at(9, 0)));
        assert!(schedule.is_active("P1", at(9, 30)));
        assert!(schedule.is_active("P1", at(10, 0)));
        assert!(!schedule.is_active("P1", at(10, 1)));
        assert!(!schedule.is_active("P5", at(13, 30)));
        assert!(!schedule.is_active("P9", at(9, 30)));
    }

    #[test]
    fn rejects_malformed_period_times() {
        let mut settings = Settings::default();
        settings.periods[0].start = "nine".to_string();

        assert!(matches!(
            settings.period_schedule(),
            Err(AttendanceError::Config(_))
        ));
    }

    #[test]
    fn layers_file_and_environment_over_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
database_url = "from-file.db"

[[faculty]]
username = "mca1"
password = "secret"

[[admin_credentials]]
username = "principal"
password = "letmein"
"#,
        )
        .unwrap();

        let vars: config::Map<String, String> = [(
            "ATTENDANCE__DATABASE_URL".to_string(),
            "/var/lib/attendance/attendance.db".to_string(),
        )]
        .into_iter()
        .collect();

        let settings = Settings::layered(
            File::from(path),
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(Some(vars)),
        )
        .unwrap();

        let defaults = Settings::default();
        assert_eq!(settings.database_url, "/var/lib/attendance/attendance.db");
        assert_eq!(settings.faculty, [Credential::new("mca1", "secret")]);
        assert_eq!(settings.admin_password("principal"), Some("letmein"));
        assert_eq!(settings.admin_password("admin"), None);
        assert_eq!(settings.periods, defaults.periods);
        assert_eq!(settings.catalog, defaults.catalog);
    }

    #[test]
    fn missing_config_file_keeps_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let vars = config::Map::<String, String>::new();

        let settings = Settings::layered(
            File::from(dir.path().join("config.toml")).required(false),
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(Some(vars)),
        )
        .unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn finds_admin_passwords() {
        let settings = Settings::default();

        assert_eq!(settings.admin_password("admin"), Some("admin123"));
        assert_eq!(settings.admin_password("root"), None);
    }
}
