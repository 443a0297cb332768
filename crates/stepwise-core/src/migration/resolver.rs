//! Target descriptor parsing and resolution.
//!
//! A descriptor is a version number, `latest`, or either of those followed
//! by `,rerun` (for example `"0,rerun"` or `"latest, rerun"`).

use super::error::MigrationError;
use super::registry::MigrationRegistry;

/// Keyword resolving to the highest registered version.
pub const LATEST: &str = "latest";

/// Modifier forcing the target step to run again.
pub const RERUN: &str = "rerun";

/// Caller-supplied target, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDescriptor {
    /// A numeric version.
    Version(u64),
    /// A textual descriptor.
    Text(String),
}

impl From<u64> for TargetDescriptor {
    fn from(version: u64) -> Self {
        TargetDescriptor::Version(version)
    }
}

/// Bare integer literals land here. A negative value is kept as text so
/// that resolution rejects it.
impl From<i32> for TargetDescriptor {
    fn from(version: i32) -> Self {
        match u64::try_from(version) {
            Ok(version) => TargetDescriptor::Version(version),
            Err(_) => TargetDescriptor::Text(version.to_string()),
        }
    }
}

impl From<&str> for TargetDescriptor {
    fn from(text: &str) -> Self {
        TargetDescriptor::Text(text.to_string())
    }
}

impl From<String> for TargetDescriptor {
    fn from(text: String) -> Self {
        TargetDescriptor::Text(text)
    }
}

impl std::fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetDescriptor::Version(v) => write!(f, "{v}"),
            TargetDescriptor::Text(text) => write!(f, "{text}"),
        }
    }
}

/// A resolved target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    /// Concrete target version (0 or a registered version).
    pub version: u64,
    /// Whether to re-run the target step when already at it.
    pub rerun: bool,
}

/// Resolves descriptors against a registry.
pub struct VersionResolver;

impl VersionResolver {
    /// Resolve a descriptor into a concrete target.
    pub fn resolve<D>(
        descriptor: &TargetDescriptor,
        registry: &MigrationRegistry<D>,
    ) -> Result<TargetSpec, MigrationError> {
        let (version, rerun) = match descriptor {
            TargetDescriptor::Version(v) => (*v, false),
            TargetDescriptor::Text(text) => Self::parse(text, registry)?,
        };

        if version != 0 && !registry.contains(version) {
            return Err(MigrationError::validation(format!(
                "can't find migration version {version}"
            )));
        }

        Ok(TargetSpec { version, rerun })
    }

    fn parse<D>(text: &str, registry: &MigrationRegistry<D>) -> Result<(u64, bool), MigrationError> {
        let mut parts = text.split(',').map(str::trim);
        let target = parts.next().unwrap_or_default();

        let rerun = match parts.next() {
            None => false,
            Some(RERUN) => true,
            Some(other) => {
                return Err(MigrationError::validation(format!(
                    "unknown modifier '{other}' in target '{text}'"
                )))
            }
        };
        if parts.next().is_some() {
            return Err(MigrationError::validation(format!(
                "too many modifiers in target '{text}'"
            )));
        }

        let version = if target == LATEST {
            registry.latest_version()
        } else {
            target.parse::<u64>().map_err(|_| {
                MigrationError::validation(format!("invalid target version '{target}'"))
            })?
        };

        Ok((version, rerun))
    }
}
