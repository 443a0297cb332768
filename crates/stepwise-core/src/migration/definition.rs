//! Migration definitions.

use super::error::StepError;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Direction of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Forward, increasing version.
    Up,
    /// Backward, decreasing version.
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Future returned by a step.
pub type StepFuture = BoxFuture<'static, Result<(), StepError>>;

/// One unit of migration work against a data-store handle `D`.
///
/// Synchronous work is simply a future that is ready immediately.
pub type StepFn<D> = Arc<dyn Fn(D) -> StepFuture + Send + Sync>;

/// A versioned pair of forward and backward operations.
pub struct MigrationDefinition<D> {
    /// Unique, positive version.
    pub version: u64,
    /// Human-readable name.
    pub name: String,
    up: StepFn<D>,
    down: StepFn<D>,
}

impl<D: 'static> MigrationDefinition<D> {
    /// Create a definition from two asynchronous step functions.
    pub fn new<U, UF, W, WF>(version: u64, name: impl Into<String>, up: U, down: W) -> Self
    where
        U: Fn(D) -> UF + Send + Sync + 'static,
        UF: Future<Output = Result<(), StepError>> + Send + 'static,
        W: Fn(D) -> WF + Send + Sync + 'static,
        WF: Future<Output = Result<(), StepError>> + Send + 'static,
    {
        Self {
            version,
            name: name.into(),
            up: Arc::new(move |db| -> StepFuture { Box::pin(up(db)) }),
            down: Arc::new(move |db| -> StepFuture { Box::pin(down(db)) }),
        }
    }

    /// Create a definition from two synchronous step functions.
    pub fn new_sync<U, W>(version: u64, name: impl Into<String>, up: U, down: W) -> Self
    where
        U: Fn(D) -> Result<(), StepError> + Send + Sync + 'static,
        W: Fn(D) -> Result<(), StepError> + Send + Sync + 'static,
    {
        Self {
            version,
            name: name.into(),
            up: Arc::new(move |db| -> StepFuture { Box::pin(futures::future::ready(up(db))) }),
            down: Arc::new(move |db| -> StepFuture { Box::pin(futures::future::ready(down(db))) }),
        }
    }

    /// The step for the given direction.
    pub fn step(&self, direction: Direction) -> &StepFn<D> {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }
}

impl<D> Clone for MigrationDefinition<D> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            name: self.name.clone(),
            up: Arc::clone(&self.up),
            down: Arc::clone(&self.down),
        }
    }
}

impl<D> std::fmt::Debug for MigrationDefinition<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationDefinition")
            .field("version", &self.version)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
