//! Registry of migration definitions, ordered by version.

use super::definition::MigrationDefinition;
use super::error::MigrationError;

/// Append-only, version-sorted set of migrations.
pub struct MigrationRegistry<D> {
    migrations: Vec<MigrationDefinition<D>>,
}

impl<D> MigrationRegistry<D> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    /// Register a migration, keeping the registry sorted.
    pub fn add(&mut self, migration: MigrationDefinition<D>) -> Result<(), MigrationError> {
        if migration.version == 0 {
            return Err(MigrationError::validation(
                "migration version 0 is reserved for the initial state",
            ));
        }

        match self.position(migration.version) {
            Ok(_) => Err(MigrationError::DuplicateVersion {
                version: migration.version,
            }),
            Err(idx) => {
                self.migrations.insert(idx, migration);
                Ok(())
            }
        }
    }

    /// Number of registered migrations.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Check if no migrations are registered.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Check if `version` is registered.
    pub fn contains(&self, version: u64) -> bool {
        self.position(version).is_ok()
    }

    /// Get a migration by version.
    pub fn get(&self, version: u64) -> Option<&MigrationDefinition<D>> {
        self.position(version).ok().map(|idx| &self.migrations[idx])
    }

    /// Highest registered version, or 0 when empty.
    pub fn latest_version(&self) -> u64 {
        self.migrations.last().map_or(0, |m| m.version)
    }

    /// The registered version immediately below `version`, or 0 if none.
    pub fn previous_version(&self, version: u64) -> u64 {
        let idx = match self.position(version) {
            Ok(idx) | Err(idx) => idx,
        };
        idx.checked_sub(1)
            .map_or(0, |prev| self.migrations[prev].version)
    }

    /// Migrations with version in `(from, to]`, ascending.
    pub fn ascending(&self, from: u64, to: u64) -> Vec<&MigrationDefinition<D>> {
        self.migrations
            .iter()
            .filter(|m| m.version > from && m.version <= to)
            .collect()
    }

    /// Migrations with version in `(to, from]`, descending.
    pub fn descending(&self, from: u64, to: u64) -> Vec<&MigrationDefinition<D>> {
        self.migrations
            .iter()
            .rev()
            .filter(|m| m.version > to && m.version <= from)
            .collect()
    }

    /// Iterate over migrations in ascending version order.
    pub fn iter(&self) -> impl Iterator<Item = &MigrationDefinition<D>> {
        self.migrations.iter()
    }

    fn position(&self, version: u64) -> Result<usize, usize> {
        self.migrations
            .binary_search_by_key(&version, |m| m.version)
    }
}

impl<D> Default for MigrationRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}
