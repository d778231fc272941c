//! Solution resolver.
//!
//! Resolution is a pure lookup against already-compiled state: a miss means
//! the identifier does not exist, not a transient failure, so there is no
//! retry anywhere on this path. Callers branch on [`Resolution`] explicitly
//! rather than catching errors.

use kata_grader_types::OperationInfo;
use tracing::debug;

/// Outcome of a registry lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The identifier names a compiled callable.
    Found(OperationInfo),
    /// No compiled callable matches the identifier.
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// The resolution registry seam: maps a name to a compiled callable.
pub trait CallableRegistry: Send + Sync {
    fn resolve(&self, name: &str) -> Resolution;
}

/// Resolve a solution identifier, logging the attempt and its outcome.
///
/// Both hits and misses log at debug verbosity; the `outcome` field is what
/// distinguishes them.
pub fn resolve_solution(registry: &dyn CallableRegistry, identifier: &str) -> Resolution {
    let resolution = registry.resolve(identifier);
    match &resolution {
        Resolution::Found(op) => {
            debug!(identifier = %identifier, operation = %op, outcome = "found", "resolved solution");
        }
        Resolution::NotFound => {
            debug!(identifier = %identifier, outcome = "not_found", "resolved solution");
        }
    }
    resolution
}
