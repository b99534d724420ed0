//! Interactive connection builders, one per database kind.

use std::path::Path;
use tracing::debug;

use crate::error::{OrmError, Result};
use crate::profile::{ConnectionProfile, Credentials, DatabaseKind};
use crate::prompt::Prompter;
use crate::sqlite_path::validate_sqlite_path;

const DOCS_URL: &str = "https://docs.djangoproject.com/en/stable/ref/databases";
const POSTGRESQL_DRIVER: &str = "psycopg2";

/// Checks whether the framework's environment can load a backend driver.
///
/// Errors mean the check itself could not run (no interpreter), which is
/// different from the driver being absent.
pub trait DriverProbe {
    fn has_driver(&self, library: &str) -> Result<bool>;
}

/// Prompt for a new connection of `kind`
pub fn build_profile(
    kind: DatabaseKind,
    use_env: bool,
    prompter: &mut dyn Prompter,
    drivers: &dyn DriverProbe,
    user_root: &Path,
) -> Result<ConnectionProfile> {
    debug!(%kind, use_env, "building connection profile");
    match kind {
        DatabaseKind::Oracle => oracle(prompter, use_env),
        DatabaseKind::Postgresql => postgresql(prompter, drivers, use_env),
        DatabaseKind::Sqlite if use_env => Err(OrmError::EnvModeUnsupported { kind }),
        DatabaseKind::Sqlite => sqlite(prompter, user_root),
    }
}

fn env_config(prompter: &mut dyn Prompter) -> Result<ConnectionProfile> {
    prompter.say(
        "Identify the name of the environment variable the connection URI will be bound to. You will have to\n\
         set this environment variable manually outside of standalorm, and the name must match EXACTLY\n\
         what you input here (including case sensitivity).",
    );
    let var = prompter.text("Environment variable:")?;
    Ok(ConnectionProfile::from_env_var(var.trim()))
}

fn credentials(prompter: &mut dyn Prompter) -> Result<Credentials> {
    Ok(Credentials {
        name: prompter.text("Name:")?,
        user: prompter.text("User:")?,
        password: prompter.password("Password:")?,
        host: prompter.text("Host:")?,
        port: prompter.text("Port:")?,
    })
}

fn oracle(prompter: &mut dyn Prompter, use_env: bool) -> Result<ConnectionProfile> {
    let profile = if use_env {
        env_config(prompter)?
    } else {
        prompter.say(&format!(
            "Please read Django's documentation for Oracle databases before proceeding. It contains\n\
             important information you'll need to keep in mind when setting up the database connection.\n\
             {}/#oracle-notes",
            DOCS_URL
        ));
        prompter.text("Press Enter to continue.")?;
        prompter.say("Please provide the following information about the Oracle database:");
        ConnectionProfile::direct(DatabaseKind::Oracle, credentials(prompter)?)
    };

    let threaded = prompter.confirm(
        "Set threaded option to true? (If you're unsure or don't know what this means, say no.)",
        false,
    )?;

    Ok(profile.with_threaded(threaded))
}

fn postgresql(
    prompter: &mut dyn Prompter,
    drivers: &dyn DriverProbe,
    use_env: bool,
) -> Result<ConnectionProfile> {
    if !drivers.has_driver(POSTGRESQL_DRIVER)? {
        return Err(OrmError::DriverMissing {
            kind: DatabaseKind::Postgresql,
            library: POSTGRESQL_DRIVER,
        });
    }

    if use_env {
        return env_config(prompter);
    }

    prompter.say("Please provide the following information about the PostgreSQL database:");
    Ok(ConnectionProfile::direct(
        DatabaseKind::Postgresql,
        credentials(prompter)?,
    ))
}

fn sqlite(prompter: &mut dyn Prompter, user_root: &Path) -> Result<ConnectionProfile> {
    prompter.say(&format!(
        "Enter the path to an SQLite3 (.sqlite3) database. The path must be relative to {}.\n\
         If no SQLite3 database exists at this path, one will be created the first time you apply migrations.",
        user_root.display()
    ));

    let mut message = "Path:";
    loop {
        let path = prompter.text(message)?;
        match validate_sqlite_path(&path, user_root) {
            Ok(()) => return Ok(ConnectionProfile::sqlite(path)),
            Err(rejection) => {
                debug!(%path, %rejection, "rejected sqlite path");
                prompter.warn(&rejection.to_string());
                message = "Enter the path to an SQLite3 database:";
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ORACLE_ENGINE, POSTGRESQL_ENGINE, SQLITE_ENGINE};
    use crate::prompt::ScriptedPrompter;
    use std::path::PathBuf;

    struct Drivers(bool);

    impl DriverProbe for Drivers {
        fn has_driver(&self, _library: &str) -> Result<bool> {
            Ok(self.0)
        }
    }

    fn root() -> PathBuf {
        PathBuf::from("/home/user/project")
    }

    #[test]
    fn test_oracle_direct_prompts_five_fields_then_threaded() {
        let mut prompter =
            ScriptedPrompter::new(["", "orcl", "scott", "tiger", "db.example.com", "1521", "y"]);
        let profile =
            build_profile(DatabaseKind::Oracle, false, &mut prompter, &Drivers(true), &root())
                .unwrap();

        assert_eq!(profile.engine.as_deref(), Some(ORACLE_ENGINE));
        assert_eq!(profile.get_str("USER"), Some("scott"));
        assert_eq!(profile.get_str("PASSWORD"), Some("tiger"));
        assert_eq!(profile.get_str("PORT"), Some("1521"));
        assert_eq!(profile.threaded(), Some(true));
        assert_eq!(prompter.asked[0], "Press Enter to continue.");
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_oracle_env_mode_still_asks_threaded() {
        let mut prompter = ScriptedPrompter::new(["ORACLE_URL", "n"]);
        let profile =
            build_profile(DatabaseKind::Oracle, true, &mut prompter, &Drivers(true), &root())
                .unwrap();

        assert!(profile.engine.is_none());
        assert!(profile.uses_env());
        assert_eq!(profile.env_var(), Some("ORACLE_URL"));
        assert_eq!(profile.threaded(), Some(false));
    }

    #[test]
    fn test_postgresql_requires_driver() {
        let mut prompter = ScriptedPrompter::default();
        let err = build_profile(
            DatabaseKind::Postgresql,
            false,
            &mut prompter,
            &Drivers(false),
            &root(),
        )
        .unwrap_err();

        assert!(matches!(err, OrmError::DriverMissing { library: "psycopg2", .. }));
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn test_postgresql_env_mode() {
        let mut prompter = ScriptedPrompter::new(["DATABASE_URL"]);
        let profile = build_profile(
            DatabaseKind::Postgresql,
            true,
            &mut prompter,
            &Drivers(true),
            &root(),
        )
        .unwrap();

        assert!(profile.engine.is_none());
        assert!(profile.uses_env());
        assert_eq!(profile.env_var(), Some("DATABASE_URL"));
        assert!(profile.threaded().is_none());
        assert!(!profile.fields.contains_key("OPTIONS"));
        assert_eq!(prompter.remaining(), 0);

        // the driver check comes before any environment-mode prompt
        let mut prompter = ScriptedPrompter::new(["DATABASE_URL"]);
        let err = build_profile(
            DatabaseKind::Postgresql,
            true,
            &mut prompter,
            &Drivers(false),
            &root(),
        )
        .unwrap_err();

        assert!(matches!(err, OrmError::DriverMissing { .. }));
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn test_driver_check_failure_propagates() {
        struct NoInterpreter;

        impl DriverProbe for NoInterpreter {
            fn has_driver(&self, _library: &str) -> Result<bool> {
                Err(OrmError::InterpreterNotFound {
                    tried: "python3".into(),
                })
            }
        }

        let mut prompter = ScriptedPrompter::default();
        let err = build_profile(
            DatabaseKind::Postgresql,
            false,
            &mut prompter,
            &NoInterpreter,
            &root(),
        )
        .unwrap_err();
        assert!(matches!(err, OrmError::InterpreterNotFound { .. }));
    }

    #[test]
    fn test_postgresql_direct_has_no_options() {
        let mut prompter = ScriptedPrompter::new(["app", "pg", "secret", "localhost", "5432"]);
        let profile = build_profile(
            DatabaseKind::Postgresql,
            false,
            &mut prompter,
            &Drivers(true),
            &root(),
        )
        .unwrap();

        assert_eq!(profile.engine.as_deref(), Some(POSTGRESQL_ENGINE));
        assert_eq!(profile.get_str("HOST"), Some("localhost"));
        assert!(profile.threaded().is_none());
    }

    #[test]
    fn test_sqlite_reprompts_until_valid() {
        let mut prompter = ScriptedPrompter::new([
            "",
            "db/prod.db",
            "/var/tmp/prod.sqlite3",
            "db/prod.sqlite3",
        ]);
        let profile =
            build_profile(DatabaseKind::Sqlite, false, &mut prompter, &Drivers(true), &root())
                .unwrap();

        assert_eq!(profile.engine.as_deref(), Some(SQLITE_ENGINE));
        assert_eq!(profile.get_str("NAME"), Some("db/prod.sqlite3"));
        assert_eq!(prompter.warnings.len(), 3);
        assert!(prompter.warnings[0].contains("not a valid filepath"));
        assert!(prompter.warnings[1].contains(".sqlite3"));
        assert!(prompter.warnings[2].contains("must be relative to"));
    }

    #[test]
    fn test_sqlite_rejects_env_mode() {
        let mut prompter = ScriptedPrompter::default();
        let err = build_profile(DatabaseKind::Sqlite, true, &mut prompter, &Drivers(true), &root())
            .unwrap_err();
        assert!(matches!(err, OrmError::EnvModeUnsupported { .. }));
    }
}
