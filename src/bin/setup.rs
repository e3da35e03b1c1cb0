//! Creates and seeds the attendance store named by the configuration, then prints its row counts.
//!
//! Running this against a store that already exists leaves its contents untouched.

use attendance::{AttendanceManager, display};
use tracing_subscriber::EnvFilter;

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut manager = AttendanceManager::connect()?;

    println!("Store: {}", manager.settings().database_url);
    display::show_counts(manager.table_counts()?);

    Ok(())
}
