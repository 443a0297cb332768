//! Migration executor - moves the control record to a target version.
//!
//! A run resolves the target, takes the control lock, then applies `up`
//! steps in ascending order or `down` steps in descending order. The new
//! version is persisted after every successful step, so a failed run stops
//! at the last completed step and a later run resumes from there.

use super::config::MigratorOptions;
use super::definition::{Direction, MigrationDefinition};
use super::error::MigrationError;
use super::lock::{LockGuard, LockManager};
use super::logger::Severity;
use super::registry::MigrationRegistry;
use super::resolver::{TargetDescriptor, TargetSpec, VersionResolver};
use crate::control::{ControlBackend, ControlDocument, ControlRecord};
use tracing::warn;

/// Outcome of a successful [`Migrator::migrate_to`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version before the run.
    pub from_version: u64,
    /// Version after the run.
    pub to_version: u64,
    /// Direction taken; `None` when nothing was run.
    pub direction: Option<Direction>,
    /// Number of steps executed.
    pub steps_executed: usize,
}

impl MigrationReport {
    fn unchanged(version: u64) -> Self {
        Self {
            from_version: version,
            to_version: version,
            direction: None,
            steps_executed: 0,
        }
    }
}

/// Data store bound by [`Migrator::config`].
struct Binding<D> {
    db: D,
    control: ControlDocument,
    lock: LockManager,
}

/// Sequential migration engine over a data-store handle `D`.
pub struct Migrator<D> {
    options: MigratorOptions,
    registry: MigrationRegistry<D>,
    binding: Option<Binding<D>>,
}

impl<D: ControlBackend> Migrator<D> {
    /// Create an unconfigured migrator.
    pub fn new(options: MigratorOptions) -> Self {
        Self {
            options,
            registry: MigrationRegistry::new(),
            binding: None,
        }
    }

    /// The options this migrator was created with.
    pub fn options(&self) -> &MigratorOptions {
        &self.options
    }

    /// Bind a data store and make sure its control record exists.
    ///
    /// Calling this again rebinds; an existing control record is left as is.
    pub fn config(&mut self, db: D) -> Result<(), MigrationError> {
        let store = db.open_control(&self.options.collection_name)?;
        let control = ControlDocument::new(store);
        let record = control.get_control()?;

        self.log(
            Severity::Debug,
            &format!(
                "configured collection '{}' at {}",
                self.options.collection_name, record
            ),
        );

        self.binding = Some(Binding {
            db,
            lock: LockManager::new(control.clone()),
            control,
        });
        Ok(())
    }

    /// Register a migration.
    pub fn add(&mut self, migration: MigrationDefinition<D>) -> Result<(), MigrationError> {
        self.registry.add(migration)
    }

    /// Registered migrations in ascending version order.
    pub fn migrations(&self) -> impl Iterator<Item = &MigrationDefinition<D>> {
        self.registry.iter()
    }

    /// Number of registered migrations.
    pub fn get_number_of_migrations(&self) -> usize {
        self.registry.len()
    }

    /// Current persisted version. Does not take the lock.
    pub fn get_version(&self) -> Result<u64, MigrationError> {
        Ok(self.status()?.version)
    }

    /// Current persisted control record. Does not take the lock.
    pub fn status(&self) -> Result<ControlRecord, MigrationError> {
        Ok(self.binding()?.control.get_control()?)
    }

    /// Force-clear a stuck lock.
    pub fn unlock(&self) -> Result<(), MigrationError> {
        self.binding()?.lock.unlock()
    }

    /// Force the control record back to version 0, unlocked, bypassing the lock.
    pub fn reset(&self) -> Result<(), MigrationError> {
        self.binding()?.control.reset()?;
        self.log(Severity::Info, "control record reset to version 0");
        Ok(())
    }

    /// Migrate the store to `target`.
    ///
    /// `target` is a version, `"latest"`, or either followed by `",rerun"`.
    /// On error the run has stopped; [`get_version`](Self::get_version)
    /// reports how far it got.
    pub async fn migrate_to(
        &self,
        target: impl Into<TargetDescriptor>,
    ) -> Result<MigrationReport, MigrationError> {
        let binding = self.binding()?;
        let descriptor = target.into();
        let target = VersionResolver::resolve(&descriptor, &self.registry)?;

        let guard = match binding.lock.acquire() {
            Ok(guard) => guard,
            Err(e @ MigrationError::LockHeld) => {
                self.log(Severity::Warning, "not migrating, control is locked");
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        let result = self.run_locked(binding, &guard, target).await;

        match (result, guard.release()) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), release) => {
                if let Err(release_err) = release {
                    warn!(error = %release_err, "failed to release migration lock");
                }
                self.log(Severity::Error, &e.to_string());
                Err(e)
            }
        }
    }

    async fn run_locked(
        &self,
        binding: &Binding<D>,
        guard: &LockGuard,
        target: TargetSpec,
    ) -> Result<MigrationReport, MigrationError> {
        let current = guard.record().version;

        // The persisted version must be 0 or a registered version.
        if current != 0 && !self.registry.contains(current) {
            return Err(MigrationError::validation(format!(
                "can't find migration version {current}"
            )));
        }

        if target.version == current {
            if target.rerun {
                return self.rerun(binding, current).await;
            }
            if self.options.log_if_latest {
                self.log(
                    Severity::Info,
                    &format!("not migrating, already at version {current}"),
                );
            }
            return Ok(MigrationReport::unchanged(current));
        }

        let (direction, steps) = if target.version > current {
            (Direction::Up, self.registry.ascending(current, target.version))
        } else {
            (Direction::Down, self.registry.descending(current, target.version))
        };

        self.log(
            Severity::Info,
            &format!(
                "migrating {direction} from version {current} to version {}",
                target.version
            ),
        );

        let mut report = MigrationReport {
            from_version: current,
            to_version: current,
            direction: Some(direction),
            steps_executed: 0,
        };

        for migration in steps {
            report.to_version = self.run_step(binding, migration, direction).await?;
            report.steps_executed += 1;
        }

        self.log(
            Severity::Info,
            &format!("finished migrating to version {}", report.to_version),
        );
        Ok(report)
    }

    /// Run the `up` step of the current version again, keeping the version.
    async fn rerun(
        &self,
        binding: &Binding<D>,
        current: u64,
    ) -> Result<MigrationReport, MigrationError> {
        let mut report = MigrationReport::unchanged(current);

        // Version 0 has no step of its own.
        if let Some(migration) = self.registry.get(current) {
            self.log(Severity::Info, &format!("rerunning version {current}"));
            report.to_version = self.run_step(binding, migration, Direction::Up).await?;
            report.direction = Some(Direction::Up);
            report.steps_executed = 1;
        }

        self.log(
            Severity::Info,
            &format!("finished migrating to version {}", report.to_version),
        );
        Ok(report)
    }

    /// Run one step and persist the version it leaves the store at.
    async fn run_step(
        &self,
        binding: &Binding<D>,
        migration: &MigrationDefinition<D>,
        direction: Direction,
    ) -> Result<u64, MigrationError> {
        self.log(
            Severity::Info,
            &format!(
                "running {direction}() on version {} ({})",
                migration.version, migration.name
            ),
        );

        (migration.step(direction))(binding.db.clone())
            .await
            .map_err(|source| MigrationError::StepFailed {
                version: migration.version,
                name: migration.name.clone(),
                direction,
                source,
            })?;

        let version = match direction {
            Direction::Up => migration.version,
            Direction::Down => self.registry.previous_version(migration.version),
        };
        binding
            .control
            .set_control(ControlRecord::new(version, true))?;

        self.log(Severity::Debug, &format!("control record at version {version}"));
        Ok(version)
    }

    fn binding(&self) -> Result<&Binding<D>, MigrationError> {
        self.binding.as_ref().ok_or(MigrationError::NotConfigured)
    }

    fn log(&self, severity: Severity, message: &str) {
        if self.options.log {
            self.options.logger.log(severity, message);
        }
    }
}

impl<D: ControlBackend> Default for Migrator<D> {
    fn default() -> Self {
        Self::new(MigratorOptions::default())
    }
}
