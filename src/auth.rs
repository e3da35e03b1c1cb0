use crate::schema::faculty;
use crate::settings::Settings;
use clap::ValueEnum;
use diesel::prelude::*;

/// Who is logging in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    Admin,
    Faculty,
}

/// Compares a username and password against the configured admins or the `faculty` table.
///
/// Credentials are stored and compared in plaintext. Unknown users are rejected, not an error.
pub(crate) fn check_credentials(
    conn: &mut SqliteConnection,
    settings: &Settings,
    username: &str,
    password: &str,
    role: Role,
) -> QueryResult<bool> {
    match role {
        Role::Admin => Ok(settings.admin_password(username) == Some(password)),
        Role::Faculty => {
            let credential = faculty::table
                .filter(faculty::name.eq(username))
                .select(faculty::credential)
                .first::<String>(conn)
                .optional()?;

            Ok(credential.as_deref() == Some(password))
        }
    }
}
