//! Operator commands.

use clap::Subcommand;
use stepwise_core::{MigrationError, Migrator};

/// Operator command.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the current version and lock state
    Status,
    /// Clear a lock left behind by a crashed run
    Unlock,
    /// Reset the control record to version 0, unlocked
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

/// Execute a command and return the text to print.
pub fn execute(
    migrator: &Migrator<sled::Db>,
    command: &Command,
    json: bool,
) -> Result<String, MigrationError> {
    match command {
        Command::Status => {
            let record = migrator.status()?;
            if json {
                Ok(serde_json::json!({
                    "version": record.version,
                    "locked": record.locked,
                })
                .to_string())
            } else {
                Ok(format!(
                    "Version: {}\nLocked:  {}",
                    record.version,
                    if record.locked { "yes" } else { "no" }
                ))
            }
        }

        Command::Unlock => {
            let was_locked = migrator.status()?.locked;
            migrator.unlock()?;
            Ok(if was_locked {
                "Lock cleared".to_string()
            } else {
                "Not locked".to_string()
            })
        }

        Command::Reset { yes } => {
            if !yes {
                return Ok("Refusing to reset without --yes".to_string());
            }
            migrator.reset()?;
            Ok("Control record reset to version 0".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_core::{ControlBackend, ControlRecord, MigratorOptions};

    fn migrator(db: &sled::Db) -> Migrator<sled::Db> {
        let mut migrator = Migrator::new(MigratorOptions::new().with_log(false));
        migrator.config(db.clone()).unwrap();
        migrator
    }

    fn temp_db() -> (sled::Db, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        (db, dir)
    }

    #[test]
    fn test_status_text_and_json() {
        let (db, _dir) = temp_db();
        let migrator = migrator(&db);

        let text = execute(&migrator, &Command::Status, false).unwrap();
        assert_eq!(text, "Version: 0\nLocked:  no");

        let json = execute(&migrator, &Command::Status, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 0);
        assert_eq!(value["locked"], false);
    }

    #[test]
    fn test_unlock() {
        let (db, _dir) = temp_db();
        let migrator = migrator(&db);
        db.open_control("migrations")
            .unwrap()
            .write(ControlRecord::new(3, true))
            .unwrap();

        assert_eq!(execute(&migrator, &Command::Unlock, false).unwrap(), "Lock cleared");
        assert_eq!(migrator.status().unwrap(), ControlRecord::new(3, false));
        assert_eq!(execute(&migrator, &Command::Unlock, false).unwrap(), "Not locked");
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let (db, _dir) = temp_db();
        let migrator = migrator(&db);
        db.open_control("migrations")
            .unwrap()
            .write(ControlRecord::new(5, false))
            .unwrap();

        let output = execute(&migrator, &Command::Reset { yes: false }, false).unwrap();
        assert!(output.contains("--yes"));
        assert_eq!(migrator.get_version().unwrap(), 5);

        execute(&migrator, &Command::Reset { yes: true }, false).unwrap();
        assert_eq!(migrator.status().unwrap(), ControlRecord::default());
    }

    #[test]
    fn test_status_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = sled::open(dir.path()).unwrap();
            db.open_control("migrations")
                .unwrap()
                .write(ControlRecord::new(2, true))
                .unwrap();
        }

        let db = sled::open(dir.path()).unwrap();
        let migrator = migrator(&db);
        let text = execute(&migrator, &Command::Status, false).unwrap();
        assert_eq!(text, "Version: 2\nLocked:  yes");
    }

    #[test]
    fn test_args_parse() {
        use crate::Args;
        use clap::Parser;

        let args = Args::parse_from(["stepwise", "-d", "/tmp/db", "--json", "reset", "--yes"]);
        assert_eq!(args.data_path, std::path::PathBuf::from("/tmp/db"));
        assert_eq!(args.collection, "migrations");
        assert!(args.json);
        assert_eq!(args.command, Command::Reset { yes: true });
    }
}
